use crate::clients::record::RawRecord;
use crate::domain::RecordId;
use crate::models::Listable;
use crate::models::schema::{self, TableSchema, content};
use crate::normalizer::{self as n, EntityKind, FromRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: RecordId,
    pub title: String,
    pub thumbnail: Option<String>,
    pub description: String,
    pub release_date: Option<NaiveDate>,
    pub views: u64,
    pub revenue: Option<f64>,
    pub categories: BTreeSet<String>,
    /// Genre as a set; records that store a single genre contribute one entry.
    pub genres: BTreeSet<String>,
    pub performer_ids: Vec<RecordId>,
    pub affiliate_url: Option<String>,
    pub maker: Option<String>,
    pub uniform_category_ids: Vec<RecordId>,
    pub published: bool,
}

impl Content {
    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.contains(genre)
    }
}

impl FromRecord for Content {
    const KIND: EntityKind = EntityKind::Content;

    fn from_record(record: &RawRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: n::text(record, content::TITLE),
            thumbnail: n::image(record, content::THUMBNAIL),
            description: n::text(record, content::DESCRIPTION),
            release_date: n::date(record, content::RELEASE_DATE),
            views: n::count(record, content::VIEWS),
            revenue: n::number(record, content::REVENUE),
            categories: n::tag_set(record, content::CATEGORIES),
            genres: n::tag_set(record, content::GENRE),
            performer_ids: n::relation_ids(record, content::PERFORMERS),
            affiliate_url: n::url(record, content::AFFILIATE_URL),
            maker: n::opt_text(record, content::MAKER),
            uniform_category_ids: n::relation_ids(record, content::UNIFORM_CATEGORIES),
            published: n::checkbox(record, content::PUBLISHED),
        }
    }

    fn is_published(&self) -> bool {
        self.published
    }
}

impl Listable for Content {
    const SCHEMA: TableSchema = schema::CONTENT;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    fn views(&self) -> u64 {
        self.views
    }

    fn revenue(&self) -> Option<f64> {
        self.revenue
    }

    fn recency(&self) -> Option<NaiveDate> {
        self.release_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::record::{FileObject, PropertyValue};

    #[test]
    fn single_and_multi_genre_both_reconcile_to_sets() {
        let single = RawRecord::new("c1").with(content::GENRE, PropertyValue::select("ijime"));
        let multi = RawRecord::new("c2")
            .with(content::GENRE, PropertyValue::multi_select(["ijime", "seifuku"]));
        assert!(Content::from_record(&single).has_genre("ijime"));
        let multi = Content::from_record(&multi);
        assert!(multi.has_genre("ijime"));
        assert!(multi.has_genre("seifuku"));
    }

    #[test]
    fn maps_counters_relations_and_links() {
        let record = RawRecord::new("c1")
            .with(content::TITLE, PropertyValue::title("Spring"))
            .with(
                content::THUMBNAIL,
                PropertyValue::files(vec![FileObject::uploaded("https://files/t.jpg")]),
            )
            .with(content::VIEWS, PropertyValue::number(7.0))
            .with(content::REVENUE, PropertyValue::number(1200.5))
            .with(
                content::PERFORMERS,
                PropertyValue::relation([RecordId::new("p1"), RecordId::new("p2")]),
            )
            .with(content::AFFILIATE_URL, PropertyValue::url("https://aff/1"))
            .with(content::RELEASE_DATE, PropertyValue::date("2023-01-02"))
            .with(content::PUBLISHED, PropertyValue::checkbox(true));
        let content = Content::from_record(&record);
        assert_eq!(content.title, "Spring");
        assert_eq!(content.thumbnail.as_deref(), Some("https://files/t.jpg"));
        assert_eq!(content.views, 7);
        assert_eq!(content.revenue, Some(1200.5));
        assert_eq!(content.performer_ids.len(), 2);
        assert_eq!(content.affiliate_url.as_deref(), Some("https://aff/1"));
        assert_eq!(content.release_date, NaiveDate::from_ymd_opt(2023, 1, 2));
        assert!(content.published);
    }

    #[test]
    fn empty_record_gets_defaults() {
        let content = Content::from_record(&RawRecord::new("c1"));
        assert_eq!(content.title, "");
        assert_eq!(content.views, 0);
        assert_eq!(content.revenue, None);
        assert!(content.genres.is_empty());
        assert!(content.performer_ids.is_empty());
        assert!(!content.published);
    }
}
