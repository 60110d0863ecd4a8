//! Wire shapes of the remote table store.
//!
//! Every property of a record arrives as a tagged variant (`{"type": "select",
//! "select": {...}}`). [`PropertyValue`] mirrors the kinds the catalog reads;
//! anything else, or a known kind with an unexpected payload shape, decodes as
//! [`PropertyValue::Unsupported`] so that one odd property never fails a page.

use crate::domain::RecordId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

impl RichText {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

impl SelectOption {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileUrl {
    #[serde(default)]
    pub url: String,
}

/// An attachment: either uploaded to the store (`file`) or hosted elsewhere
/// (`external`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileObject {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<FileUrl>,
}

impl FileObject {
    #[must_use]
    pub fn uploaded(url: impl Into<String>) -> Self {
        Self {
            file: Some(FileUrl { url: url.into() }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn external(url: impl Into<String>) -> Self {
        Self {
            external: Some(FileUrl { url: url.into() }),
            ..Self::default()
        }
    }

    /// Uploaded URL first, external URL second; empty strings count as absent.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        [self.file.as_ref(), self.external.as_ref()]
            .into_iter()
            .flatten()
            .map(|f| f.url.trim())
            .find(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// One property of a record, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Relation {
        #[serde(default)]
        relation: Vec<RelationRef>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileObject>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Date {
        #[serde(default)]
        date: Option<DateRange>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

impl PropertyValue {
    #[must_use]
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title {
            title: vec![RichText::plain(text)],
        }
    }

    #[must_use]
    pub fn rich_text(text: impl Into<String>) -> Self {
        Self::RichText {
            rich_text: vec![RichText::plain(text)],
        }
    }

    #[must_use]
    pub fn select(name: impl Into<String>) -> Self {
        Self::Select {
            select: Some(SelectOption::named(name)),
        }
    }

    #[must_use]
    pub fn multi_select<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiSelect {
            multi_select: names.into_iter().map(SelectOption::named).collect(),
        }
    }

    #[must_use]
    pub fn relation<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = RecordId>,
    {
        Self::Relation {
            relation: ids.into_iter().map(|id| RelationRef { id }).collect(),
        }
    }

    #[must_use]
    pub const fn checkbox(value: bool) -> Self {
        Self::Checkbox { checkbox: value }
    }

    #[must_use]
    pub const fn number(value: f64) -> Self {
        Self::Number {
            number: Some(value),
        }
    }

    #[must_use]
    pub fn date(start: impl Into<String>) -> Self {
        Self::Date {
            date: Some(DateRange {
                start: Some(start.into()),
                end: None,
            }),
        }
    }

    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url {
            url: Some(url.into()),
        }
    }

    #[must_use]
    pub const fn files(files: Vec<FileObject>) -> Self {
        Self::Files { files }
    }

    /// Payload in the form the update endpoint expects (`{"number": 3}`),
    /// i.e. the tagged form without its `type` discriminator.
    #[must_use]
    pub fn to_update_payload(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(map) = value.as_object_mut() {
            map.remove("type");
        }
        value
    }
}

fn lenient_properties<'de, D>(deserializer: D) -> Result<BTreeMap<String, PropertyValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| {
            let parsed = serde_json::from_value(value).unwrap_or(PropertyValue::Unsupported);
            (name, parsed)
        })
        .collect())
}

/// A record exactly as the store returns it, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_properties")]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl RawRecord {
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter, mostly for fixtures.
    #[must_use]
    pub fn with(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// One page of a table query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<RawRecord>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Partial field set for a single-record update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub properties: BTreeMap<String, PropertyValue>,
}

impl RecordPatch {
    #[must_use]
    pub fn set(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), value.to_update_payload()))
            .collect();
        serde_json::json!({ "properties": properties })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_property_kinds() {
        let raw = json!({
            "id": "p1",
            "properties": {
                "Name": {"id": "title", "type": "title", "title": [{"plain_text": "Aoi"}]},
                "Tags": {"type": "multi_select", "multi_select": [{"id": "x", "name": "A"}]},
                "Views": {"type": "number", "number": 12},
                "Public": {"type": "checkbox", "checkbox": true}
            }
        });
        let record: RawRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.property("Name"), Some(&PropertyValue::title("Aoi")));
        assert_eq!(
            record.property("Tags"),
            Some(&PropertyValue::multi_select(["A"]))
        );
        assert_eq!(record.property("Views"), Some(&PropertyValue::number(12.0)));
        assert_eq!(record.property("Public"), Some(&PropertyValue::checkbox(true)));
    }

    #[test]
    fn unknown_kind_and_bad_shape_become_unsupported() {
        let raw = json!({
            "id": "p1",
            "properties": {
                "Formula": {"type": "formula", "formula": {"number": 1}},
                "Broken": {"type": "multi_select", "multi_select": "not-a-list"},
                "Untagged": 42
            }
        });
        let record: RawRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.property("Formula"), Some(&PropertyValue::Unsupported));
        assert_eq!(record.property("Broken"), Some(&PropertyValue::Unsupported));
        assert_eq!(record.property("Untagged"), Some(&PropertyValue::Unsupported));
    }

    #[test]
    fn missing_properties_object_is_empty() {
        let record: RawRecord = serde_json::from_value(json!({"id": "p1"})).unwrap();
        assert!(record.properties.is_empty());
    }

    #[test]
    fn file_url_prefers_uploaded_then_external() {
        let both = FileObject {
            name: String::new(),
            file: Some(FileUrl { url: String::new() }),
            external: Some(FileUrl {
                url: "https://cdn/x.jpg".to_string(),
            }),
        };
        assert_eq!(both.url(), Some("https://cdn/x.jpg"));
        assert_eq!(FileObject::uploaded("u").url(), Some("u"));
        assert_eq!(FileObject::default().url(), None);
    }

    #[test]
    fn patch_payload_drops_type_tag() {
        let patch = RecordPatch::default().set("Views", PropertyValue::number(4.0));
        assert_eq!(
            patch.to_json(),
            json!({"properties": {"Views": {"number": 4.0}}})
        );
    }
}
