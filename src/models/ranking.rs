use crate::clients::record::RawRecord;
use crate::domain::RecordId;
use crate::models::schema::{ranking, ranking_detail};
use crate::normalizer::{self as n, EntityKind, FromRecord};
use crate::query::SortField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reads the sort directive select; unknown or empty values rank by views.
#[must_use]
pub fn parse_sort_directive(label: &str) -> SortField {
    match label.trim().to_lowercase().as_str() {
        "売上順" | "revenue" | "by-revenue" => SortField::Revenue,
        "新着順" | "recency" | "by-recency" => SortField::Recency,
        "名前順" | "name" | "by-name" => SortField::Name,
        _ => SortField::Views,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingArticle {
    pub id: RecordId,
    pub title: String,
    pub slug: String,
    pub theme: Option<String>,
    pub thumbnail: Option<String>,
    pub meta_description: String,
    pub intro: String,
    pub conclusion: String,
    pub target_tags: BTreeSet<String>,
    pub target_categories: BTreeSet<String>,
    pub sort: SortField,
    /// `None` when the article leaves the size to the catalog default.
    pub limit: Option<usize>,
    pub published_date: Option<NaiveDate>,
    pub published: bool,
}

impl FromRecord for RankingArticle {
    const KIND: EntityKind = EntityKind::RankingArticle;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_record(record: &RawRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: n::text(record, ranking::TITLE),
            slug: n::text(record, ranking::SLUG),
            theme: n::opt_text(record, ranking::THEME),
            thumbnail: n::image(record, ranking::THUMBNAIL),
            meta_description: n::text(record, ranking::META_DESCRIPTION),
            intro: n::text(record, ranking::INTRO),
            conclusion: n::text(record, ranking::CONCLUSION),
            target_tags: n::tag_set(record, ranking::TARGET_TAGS),
            target_categories: n::tag_set(record, ranking::TARGET_CATEGORIES),
            sort: parse_sort_directive(&n::text(record, ranking::SORT)),
            limit: n::number(record, ranking::LIMIT)
                .filter(|l| *l >= 1.0)
                .map(|l| l as usize),
            published_date: n::date(record, ranking::PUBLISHED_DATE),
            published: n::checkbox(record, ranking::PUBLISHED),
        }
    }

    fn is_published(&self) -> bool {
        self.published
    }
}

/// One hand-written entry of a ranking article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingDetail {
    pub id: RecordId,
    pub label: String,
    pub rank: u32,
    pub blurb: String,
    pub person_ids: Vec<RecordId>,
    pub article_ids: Vec<RecordId>,
}

impl RankingDetail {
    /// The person this entry is about. Only the first relation entry counts.
    #[must_use]
    pub fn person_id(&self) -> Option<&RecordId> {
        self.person_ids.first()
    }
}

impl FromRecord for RankingDetail {
    const KIND: EntityKind = EntityKind::RankingDetail;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_record(record: &RawRecord) -> Self {
        Self {
            id: record.id.clone(),
            label: n::text(record, ranking_detail::LABEL),
            rank: n::number(record, ranking_detail::RANK)
                .filter(|r| *r >= 0.0)
                .map_or(u32::MAX, |r| r.round() as u32),
            blurb: n::text(record, ranking_detail::BLURB),
            person_ids: n::relation_ids(record, ranking_detail::PERSON),
            article_ids: n::relation_ids(record, ranking_detail::ARTICLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::record::PropertyValue;

    #[test]
    fn sort_directive_labels() {
        assert_eq!(parse_sort_directive("売上順"), SortField::Revenue);
        assert_eq!(parse_sort_directive("By-Name"), SortField::Name);
        assert_eq!(parse_sort_directive("新着順"), SortField::Recency);
        assert_eq!(parse_sort_directive(""), SortField::Views);
    }

    #[test]
    fn article_limit_ignores_nonsense() {
        let zero = RawRecord::new("r1").with(ranking::LIMIT, PropertyValue::number(0.0));
        assert_eq!(RankingArticle::from_record(&zero).limit, None);
        let five = RawRecord::new("r1").with(ranking::LIMIT, PropertyValue::number(5.0));
        assert_eq!(RankingArticle::from_record(&five).limit, Some(5));
    }

    #[test]
    fn detail_takes_first_person_and_unranked_sorts_last() {
        let record = RawRecord::new("d1").with(
            ranking_detail::PERSON,
            PropertyValue::relation([RecordId::new("p1"), RecordId::new("p2")]),
        );
        let detail = RankingDetail::from_record(&record);
        assert_eq!(detail.person_id(), Some(&RecordId::new("p1")));
        assert_eq!(detail.rank, u32::MAX);
    }
}
