//! Record normalizer: raw tagged properties into typed entities.
//!
//! Every extractor here is total. A missing property, a property of another
//! kind than expected, or an empty payload yields the documented default
//! (empty string, empty set, `None`, `0`); nothing in this module returns an
//! error.

use crate::clients::record::{PropertyValue, RawRecord, RichText};
use crate::domain::RecordId;
use crate::models::{
    AffiliateWidget, Content, Genre, Person, RankingArticle, RankingDetail, Review,
    UniformCategory,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Implemented by every entity the catalog reads from the store.
pub trait FromRecord: Sized {
    const KIND: EntityKind;

    fn from_record(record: &RawRecord) -> Self;

    /// Publish flag; entities without one are always visible.
    fn is_published(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Content,
    Genre,
    UniformCategory,
    RankingArticle,
    RankingDetail,
    Review,
    AffiliateWidget,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Content => "content",
            Self::Genre => "genre",
            Self::UniformCategory => "uniform_category",
            Self::RankingArticle => "ranking",
            Self::RankingDetail => "ranking_detail",
            Self::Review => "review",
            Self::AffiliateWidget => "affiliate",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Person(Person),
    Content(Content),
    Genre(Genre),
    UniformCategory(UniformCategory),
    RankingArticle(RankingArticle),
    RankingDetail(RankingDetail),
    Review(Review),
    AffiliateWidget(AffiliateWidget),
}

/// Normalizes a raw record as the given kind of entity.
#[must_use]
pub fn normalize(record: &RawRecord, kind: EntityKind) -> Entity {
    match kind {
        EntityKind::Person => Entity::Person(Person::from_record(record)),
        EntityKind::Content => Entity::Content(Content::from_record(record)),
        EntityKind::Genre => Entity::Genre(Genre::from_record(record)),
        EntityKind::UniformCategory => {
            Entity::UniformCategory(UniformCategory::from_record(record))
        }
        EntityKind::RankingArticle => Entity::RankingArticle(RankingArticle::from_record(record)),
        EntityKind::RankingDetail => Entity::RankingDetail(RankingDetail::from_record(record)),
        EntityKind::Review => Entity::Review(Review::from_record(record)),
        EntityKind::AffiliateWidget => {
            Entity::AffiliateWidget(AffiliateWidget::from_record(record))
        }
    }
}

fn join_plain(parts: &[RichText]) -> String {
    parts.iter().map(|t| t.plain_text.as_str()).collect()
}

/// Text of a title, rich-text, select or url property; empty when absent.
#[must_use]
pub fn text(record: &RawRecord, name: &str) -> String {
    let raw = match record.property(name) {
        Some(PropertyValue::Title { title }) => join_plain(title),
        Some(PropertyValue::RichText { rich_text }) => join_plain(rich_text),
        Some(PropertyValue::Select {
            select: Some(option),
        }) => option.name.clone(),
        Some(PropertyValue::Url { url: Some(url) }) => url.clone(),
        _ => String::new(),
    };
    raw.trim().to_string()
}

/// Like [`text`], but `None` for blank values.
#[must_use]
pub fn opt_text(record: &RawRecord, name: &str) -> Option<String> {
    Some(text(record, name)).filter(|s| !s.is_empty())
}

/// Tag set of a property that may be stored as a multi-select on some records
/// and as a single select on others. Whichever representation is present and
/// non-empty is used; a single value becomes a one-element set.
#[must_use]
pub fn tag_set(record: &RawRecord, name: &str) -> BTreeSet<String> {
    let names: Vec<&str> = match record.property(name) {
        Some(PropertyValue::MultiSelect { multi_select }) => {
            multi_select.iter().map(|o| o.name.as_str()).collect()
        }
        Some(PropertyValue::Select {
            select: Some(option),
        }) => vec![option.name.as_str()],
        _ => Vec::new(),
    };
    names
        .into_iter()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

#[must_use]
pub fn relation_ids(record: &RawRecord, name: &str) -> Vec<RecordId> {
    match record.property(name) {
        Some(PropertyValue::Relation { relation }) => relation
            .iter()
            .map(|r| r.id.clone())
            .filter(|id| !id.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// First usable URL across the attachments of a files property.
#[must_use]
pub fn image(record: &RawRecord, name: &str) -> Option<String> {
    match record.property(name) {
        Some(PropertyValue::Files { files }) => {
            files.iter().find_map(|f| f.url()).map(str::to_string)
        }
        Some(PropertyValue::Url { url: Some(url) }) if !url.trim().is_empty() => {
            Some(url.trim().to_string())
        }
        _ => None,
    }
}

#[must_use]
pub fn checkbox(record: &RawRecord, name: &str) -> bool {
    matches!(
        record.property(name),
        Some(PropertyValue::Checkbox { checkbox: true })
    )
}

#[must_use]
pub fn number(record: &RawRecord, name: &str) -> Option<f64> {
    match record.property(name) {
        Some(PropertyValue::Number { number: Some(n) }) if n.is_finite() => Some(*n),
        _ => None,
    }
}

/// Non-negative whole counter; `0` when absent.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count(record: &RawRecord, name: &str) -> u64 {
    number(record, name).map_or(0, |n| n.max(0.0).round() as u64)
}

/// Start date of a date property. Date-times are truncated to their date.
#[must_use]
pub fn date(record: &RawRecord, name: &str) -> Option<NaiveDate> {
    let start = match record.property(name) {
        Some(PropertyValue::Date { date: Some(range) }) => range.start.as_deref()?,
        _ => return None,
    };
    parse_date(start)
}

#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let head = value.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[must_use]
pub fn url(record: &RawRecord, name: &str) -> Option<String> {
    match record.property(name) {
        Some(PropertyValue::Url { url: Some(url) }) if !url.trim().is_empty() => {
            Some(url.trim().to_string())
        }
        Some(PropertyValue::RichText { .. }) => opt_text(record, name),
        _ => None,
    }
}
