use crate::clients::record::RawRecord;
use crate::domain::RecordId;
use crate::models::genre::display_order;
use crate::models::schema::uniform;
use crate::normalizer::{self as n, EntityKind, FromRecord};
use serde::{Deserialize, Serialize};

/// A uniform style that contents link to through a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformCategory {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
    pub order: i64,
    pub published: bool,
}

impl FromRecord for UniformCategory {
    const KIND: EntityKind = EntityKind::UniformCategory;

    fn from_record(record: &RawRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: n::text(record, uniform::NAME),
            slug: n::text(record, uniform::SLUG),
            description: n::text(record, uniform::DESCRIPTION),
            image: n::image(record, uniform::IMAGE),
            order: display_order(n::number(record, uniform::ORDER)),
            published: n::checkbox(record, uniform::PUBLISHED),
        }
    }

    fn is_published(&self) -> bool {
        self.published
    }
}
