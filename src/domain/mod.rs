//! Domain types for the catalog with strong typing.
//!
//! This module provides type-safe wrappers for the identifiers the upstream
//! store hands out. It follows the Newtype pattern to prevent mixing record ids
//! with table ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a single record (page) in the remote store.
///
/// The upstream accepts ids with or without dashes and returns them dashed.
/// Ids that parse as UUIDs are stored in canonical hyphenated lowercase form so
/// that `"ab12…"` and `"ab12-…"` compare equal; anything else is kept verbatim
/// (trimmed), which keeps hand-written fixtures such as `"person-1"` usable.
///
/// # Examples
///
/// ```rust
/// use navi::domain::RecordId;
///
/// let dashed = RecordId::new("0f8fad5b-d9cb-469f-a165-70867728950e");
/// let plain = RecordId::new("0f8fad5bd9cb469fa16570867728950e");
/// assert_eq!(dashed, plain);
/// assert_eq!(plain.short(), "7728950e");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a `RecordId`, canonicalizing UUID-shaped input.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        match Uuid::parse_str(trimmed) {
            Ok(uuid) => Self(uuid.hyphenated().to_string()),
            Err(_) => Self(trimmed.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last eight characters of the dashless id, used as the public slug.
    #[must_use]
    pub fn short(&self) -> String {
        let compact: Vec<char> = self.0.chars().filter(|c| *c != '-').collect();
        let start = compact.len().saturating_sub(8);
        compact[start..].iter().collect()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RecordId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

/// Identifier of a remote table (database). Opaque configuration value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort direction enumeration to replace boolean blindness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }

    /// Wire name used by the upstream sort expression.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_canonicalizes_uuid_forms() {
        let a = RecordId::new("0F8FAD5B-D9CB-469F-A165-70867728950E");
        let b = RecordId::new("0f8fad5bd9cb469fa16570867728950e");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0f8fad5b-d9cb-469f-a165-70867728950e");
    }

    #[test]
    fn record_id_keeps_non_uuid_verbatim() {
        let id = RecordId::new("  person-1 ");
        assert_eq!(id.as_str(), "person-1");
        assert_eq!(id.short(), "person1");
    }

    #[test]
    fn record_id_short_uses_last_eight_hex_chars() {
        let id = RecordId::new("b070b2eb-8ab2-4ebe-ad49-aeaedebf52e1");
        assert_eq!(id.short(), "debf52e1");
    }

    #[test]
    fn record_id_serialization() {
        let id = RecordId::new("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn sort_direction_wire_names() {
        assert_eq!(SortDirection::Ascending.as_str(), "ascending");
        assert_eq!(SortDirection::Descending.as_str(), "descending");
        assert!(SortDirection::default().is_ascending());
    }
}
