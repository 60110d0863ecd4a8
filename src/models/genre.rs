use crate::clients::record::RawRecord;
use crate::domain::RecordId;
use crate::models::schema::genre;
use crate::normalizer::{self as n, EntityKind, FromRecord};
use serde::{Deserialize, Serialize};

/// Display order assigned to rows that leave the order column empty, so they
/// sort after every ordered row.
pub const DEFAULT_DISPLAY_ORDER: i64 = 999;

const SLUGS: &[(&str, &str)] = &[
    ("制服", "seifuku"),
    ("セーラー服", "sailor"),
    ("ブレザー", "blazer"),
    ("体操服", "gym-uniform"),
    ("スクール水着", "school-swimsuit"),
    ("ブルマ", "bloomers"),
    ("美少女", "bishojo"),
    ("いじめ", "ijime"),
];

/// URL slug for a genre name: a fixed romanization for the known genres,
/// the lowercased name otherwise.
#[must_use]
pub fn slug_for(name: &str) -> String {
    SLUGS
        .iter()
        .find(|(known, _)| *known == name)
        .map_or_else(|| name.to_lowercase(), |(_, slug)| (*slug).to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
    pub order: i64,
    pub published: bool,
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn display_order(value: Option<f64>) -> i64 {
    value
        .filter(|v| *v != 0.0)
        .map_or(DEFAULT_DISPLAY_ORDER, |v| v.round() as i64)
}

impl FromRecord for Genre {
    const KIND: EntityKind = EntityKind::Genre;

    fn from_record(record: &RawRecord) -> Self {
        let name = n::text(record, genre::NAME);
        Self {
            id: record.id.clone(),
            slug: slug_for(&name),
            name,
            description: n::text(record, genre::DESCRIPTION),
            image: n::image(record, genre::IMAGE),
            order: display_order(n::number(record, genre::ORDER)),
            published: n::checkbox(record, genre::PUBLISHED),
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
    fn known_names_get_fixed_slugs() {
        assert_eq!(slug_for("セーラー服"), "sailor");
        assert_eq!(slug_for("Idol"), "idol");
    }

    #[test]
    fn missing_order_sorts_last() {
        let genre = Genre::from_record(&RawRecord::new("g1"));
        assert_eq!(genre.order, DEFAULT_DISPLAY_ORDER);
        let ordered = Genre::from_record(
            &RawRecord::new("g2").with(genre::ORDER, PropertyValue::number(2.0)),
        );
        assert_eq!(ordered.order, 2);
    }
}
