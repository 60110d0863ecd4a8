use crate::clients::record::RawRecord;
use crate::domain::RecordId;
use crate::models::schema::affiliate;
use crate::normalizer::{self as n, EntityKind, FromRecord};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDGET_KIND: &str = "DMM";

/// An affiliate widget placed on a given site path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateWidget {
    pub id: RecordId,
    pub name: String,
    pub data_id: String,
    pub kind: String,
    pub placement: String,
    pub published: bool,
}

impl FromRecord for AffiliateWidget {
    const KIND: EntityKind = EntityKind::AffiliateWidget;

    fn from_record(record: &RawRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: n::text(record, affiliate::NAME),
            data_id: n::text(record, affiliate::DATA_ID),
            kind: n::opt_text(record, affiliate::KIND)
                .unwrap_or_else(|| DEFAULT_WIDGET_KIND.to_string()),
            placement: n::text(record, affiliate::PLACEMENT),
            published: n::checkbox(record, affiliate::PUBLISHED),
        }
    }

    fn is_published(&self) -> bool {
        self.published
    }
}
