use crate::clients::record::RawRecord;
use crate::domain::RecordId;
use crate::models::schema::review;
use crate::normalizer::{self as n, EntityKind, FromRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a review is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ReviewSubject {
    Person(RecordId),
    Content(RecordId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: RecordId,
    pub subject: Option<ReviewSubject>,
    pub author: String,
    /// Star rating clamped to `1..=5`; `None` when unrated.
    pub rating: Option<u8>,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
    pub published: bool,
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

impl FromRecord for Review {
    const KIND: EntityKind = EntityKind::Review;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_record(record: &RawRecord) -> Self {
        let subject = n::relation_ids(record, review::PERSON)
            .into_iter()
            .next()
            .map(ReviewSubject::Person)
            .or_else(|| {
                n::relation_ids(record, review::CONTENT)
                    .into_iter()
                    .next()
                    .map(ReviewSubject::Content)
            });

        let created_at = match record.property(review::CREATED_AT) {
            Some(crate::clients::record::PropertyValue::Date { date: Some(range) }) => {
                range.start.as_deref().and_then(parse_timestamp)
            }
            _ => None,
        }
        .or_else(|| record.created_time.as_deref().and_then(parse_timestamp));

        Self {
            id: record.id.clone(),
            subject,
            author: n::text(record, review::AUTHOR),
            rating: n::number(record, review::RATING)
                .filter(|r| *r > 0.0)
                .map(|r| r.round().clamp(1.0, 5.0) as u8),
            body: n::text(record, review::BODY),
            created_at,
            published: n::checkbox(record, review::PUBLISHED),
        }
    }

    fn is_published(&self) -> bool {
        self.published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::record::PropertyValue;

    #[test]
    fn subject_prefers_person_then_content() {
        let record = RawRecord::new("r1")
            .with(review::CONTENT, PropertyValue::relation([RecordId::new("c1")]));
        assert_eq!(
            Review::from_record(&record).subject,
            Some(ReviewSubject::Content(RecordId::new("c1")))
        );
    }

    #[test]
    fn rating_is_clamped_and_timestamp_falls_back_to_created_time() {
        let mut record = RawRecord::new("r1").with(review::RATING, PropertyValue::number(9.0));
        record.created_time = Some("2024-02-01T09:30:00.000Z".to_string());
        let review = Review::from_record(&record);
        assert_eq!(review.rating, Some(5));
        assert!(review.created_at.is_some());
        assert_eq!(Review::from_record(&RawRecord::new("r2")).rating, None);
    }
}
