//! Query builder for the fixed set of catalog queries.
//!
//! Filters are a small closed algebra (checkbox, contains, equals, AND, OR)
//! that renders into the upstream filter expression. The same filter can be
//! evaluated locally against a [`RawRecord`], which the in-memory transport
//! relies on.

use crate::clients::record::{PropertyValue, RawRecord};
use crate::domain::{RecordId, SortDirection, TableId};
use crate::models::schema::TableSchema;
use serde_json::{Value, json};
use std::cmp::Ordering;

/// Largest page the upstream will return.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    CheckboxEquals { property: String, value: bool },
    MultiSelectContains { property: String, value: String },
    SelectEquals { property: String, value: String },
    RichTextEquals { property: String, value: String },
    RelationContains { property: String, id: RecordId },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    #[must_use]
    pub fn published(property: &str) -> Self {
        Self::CheckboxEquals {
            property: property.to_string(),
            value: true,
        }
    }

    #[must_use]
    pub fn tag_contains(property: &str, value: &str) -> Self {
        Self::MultiSelectContains {
            property: property.to_string(),
            value: value.to_string(),
        }
    }

    #[must_use]
    pub fn select_equals(property: &str, value: &str) -> Self {
        Self::SelectEquals {
            property: property.to_string(),
            value: value.to_string(),
        }
    }

    #[must_use]
    pub fn text_equals(property: &str, value: &str) -> Self {
        Self::RichTextEquals {
            property: property.to_string(),
            value: value.to_string(),
        }
    }

    #[must_use]
    pub fn relation_contains(property: &str, id: &RecordId) -> Self {
        Self::RelationContains {
            property: property.to_string(),
            id: id.clone(),
        }
    }

    /// Renders the upstream filter expression.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::CheckboxEquals { property, value } => {
                json!({ "property": property, "checkbox": { "equals": value } })
            }
            Self::MultiSelectContains { property, value } => {
                json!({ "property": property, "multi_select": { "contains": value } })
            }
            Self::SelectEquals { property, value } => {
                json!({ "property": property, "select": { "equals": value } })
            }
            Self::RichTextEquals { property, value } => {
                json!({ "property": property, "rich_text": { "equals": value } })
            }
            Self::RelationContains { property, id } => {
                json!({ "property": property, "relation": { "contains": id.as_str() } })
            }
            Self::And(parts) => json!({ "and": parts.iter().map(Self::to_json).collect::<Vec<_>>() }),
            Self::Or(parts) => json!({ "or": parts.iter().map(Self::to_json).collect::<Vec<_>>() }),
        }
    }

    /// Evaluates the filter against a record the way the upstream does.
    #[must_use]
    pub fn matches(&self, record: &RawRecord) -> bool {
        match self {
            Self::CheckboxEquals { property, value } => {
                let actual = matches!(
                    record.property(property),
                    Some(PropertyValue::Checkbox { checkbox: true })
                );
                actual == *value
            }
            Self::MultiSelectContains { property, value } => match record.property(property) {
                Some(PropertyValue::MultiSelect { multi_select }) => {
                    multi_select.iter().any(|o| o.name == *value)
                }
                _ => false,
            },
            Self::SelectEquals { property, value } => match record.property(property) {
                Some(PropertyValue::Select {
                    select: Some(option),
                }) => option.name == *value,
                _ => false,
            },
            Self::RichTextEquals { property, value } => match record.property(property) {
                Some(PropertyValue::RichText { rich_text }) => {
                    rich_text.iter().map(|t| t.plain_text.as_str()).collect::<String>() == *value
                }
                _ => false,
            },
            Self::RelationContains { property, id } => match record.property(property) {
                Some(PropertyValue::Relation { relation }) => relation.iter().any(|r| r.id == *id),
                _ => false,
            },
            Self::And(parts) => parts.iter().all(|f| f.matches(record)),
            Self::Or(parts) => parts.iter().any(|f| f.matches(record)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

impl Sort {
    #[must_use]
    pub fn ascending(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    #[must_use]
    pub fn descending(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: SortDirection::Descending,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({ "property": self.property, "direction": self.direction.as_str() })
    }

    /// Orders two records by this sort's property; empty values sort last.
    #[must_use]
    pub fn compare(&self, a: &RawRecord, b: &RawRecord) -> Ordering {
        let left = sort_key(a.property(&self.property));
        let right = sort_key(b.property(&self.property));
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => {
                let ord = l.partial_cmp(&r).unwrap_or(Ordering::Equal);
                if self.direction.is_ascending() {
                    ord
                } else {
                    ord.reverse()
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(value: Option<&PropertyValue>) -> Option<SortKey> {
    match value? {
        PropertyValue::Number { number } => number.map(SortKey::Number),
        PropertyValue::Title { title } => Some(SortKey::Text(
            title.iter().map(|t| t.plain_text.as_str()).collect(),
        )),
        PropertyValue::RichText { rich_text } => Some(SortKey::Text(
            rich_text.iter().map(|t| t.plain_text.as_str()).collect(),
        )),
        PropertyValue::Date { date } => date
            .as_ref()
            .and_then(|d| d.start.clone())
            .map(SortKey::Text),
        PropertyValue::Select { select } => select.as_ref().map(|s| SortKey::Text(s.name.clone())),
        PropertyValue::Checkbox { checkbox } => Some(SortKey::Number(f64::from(u8::from(*checkbox)))),
        _ => None,
    }
}

/// The four sortable dimensions a catalog view can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Recency,
    Views,
    Revenue,
    Name,
}

impl SortField {
    /// Natural direction: names ascend, everything else descends.
    #[must_use]
    pub const fn default_direction(self) -> SortDirection {
        match self {
            Self::Name => SortDirection::Ascending,
            Self::Recency | Self::Views | Self::Revenue => SortDirection::Descending,
        }
    }

    /// Maps the field onto a table's property, if the table has one.
    #[must_use]
    pub fn to_sort(self, schema: &TableSchema) -> Option<Sort> {
        let property = match self {
            Self::Recency => schema.recency,
            Self::Views => schema.views,
            Self::Revenue => schema.revenue,
            Self::Name => Some(schema.name),
        }?;
        Some(Sort {
            property: property.to_string(),
            direction: self.default_direction(),
        })
    }
}

/// A complete table query as consumed by the pager and transport.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDef {
    pub table: TableId,
    pub filter: Option<Filter>,
    pub sorts: Vec<Sort>,
    pub page_size: usize,
    /// Publish-flag property of the table, kept so a widened query can still
    /// enforce visibility.
    pub publish_property: Option<String>,
}

impl QueryDef {
    /// Request body for one page of this query.
    #[must_use]
    pub fn to_body(&self, cursor: Option<&str>, page_size: usize) -> Value {
        let mut body = serde_json::Map::new();
        if let Some(filter) = &self.filter {
            body.insert("filter".to_string(), filter.to_json());
        }
        if !self.sorts.is_empty() {
            body.insert(
                "sorts".to_string(),
                Value::Array(self.sorts.iter().map(Sort::to_json).collect()),
            );
        }
        body.insert(
            "page_size".to_string(),
            json!(page_size.clamp(1, MAX_PAGE_SIZE)),
        );
        if let Some(cursor) = cursor {
            body.insert("start_cursor".to_string(), json!(cursor));
        }
        Value::Object(body)
    }

    /// The same query reduced to the publish-flag filter only ("all
    /// published"), sorts preserved.
    #[must_use]
    pub fn widened(&self) -> Self {
        Self {
            filter: self.publish_property.as_deref().map(Filter::published),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// Composes filters (AND of primitives and OR-groups) and sorts into a
/// [`QueryDef`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: TableId,
    publish_property: Option<String>,
    all: Vec<Filter>,
    sorts: Vec<Sort>,
    page_size: usize,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            publish_property: None,
            all: Vec::new(),
            sorts: Vec::new(),
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Restricts the query to published records of a table.
    #[must_use]
    pub fn for_published(table: TableId, schema: &TableSchema) -> Self {
        Self::new(table).published(schema.published)
    }

    #[must_use]
    pub fn published(mut self, property: &str) -> Self {
        self.publish_property = Some(property.to_string());
        self.all.push(Filter::published(property));
        self
    }

    #[must_use]
    pub fn and(mut self, filter: Filter) -> Self {
        self.all.push(filter);
        self
    }

    /// Adds a disjunctive group; an empty group is ignored.
    #[must_use]
    pub fn any_of(mut self, filters: Vec<Filter>) -> Self {
        match filters.len() {
            0 => {}
            1 => self.all.extend(filters),
            _ => self.all.push(Filter::Or(filters)),
        }
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    #[must_use]
    pub fn sort_by(mut self, field: SortField, schema: &TableSchema) -> Self {
        if let Some(sort) = field.to_sort(schema) {
            self.sorts.push(sort);
        }
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    #[must_use]
    pub fn build(self) -> QueryDef {
        let filter = match self.all.len() {
            0 => None,
            1 => self.all.into_iter().next(),
            _ => Some(Filter::And(self.all)),
        };
        QueryDef {
            table: self.table,
            filter,
            sorts: self.sorts,
            page_size: self.page_size,
            publish_property: self.publish_property,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::{CONTENT, PERSON};

    fn table() -> TableId {
        TableId::new("contents")
    }

    #[test]
    fn single_filter_is_not_wrapped() {
        let query = QueryBuilder::for_published(table(), &CONTENT).build();
        assert_eq!(
            query.filter.unwrap().to_json(),
            json!({"property": CONTENT.published, "checkbox": {"equals": true}})
        );
    }

    #[test]
    fn and_of_or_group() {
        let query = QueryBuilder::for_published(table(), &CONTENT)
            .any_of(vec![
                Filter::tag_contains("Tags", "a"),
                Filter::tag_contains("Tags", "b"),
            ])
            .build();
        let json = query.filter.unwrap().to_json();
        assert_eq!(json["and"].as_array().unwrap().len(), 2);
        assert_eq!(json["and"][1]["or"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_or_group_is_dropped() {
        let query = QueryBuilder::for_published(table(), &CONTENT)
            .any_of(Vec::new())
            .build();
        assert!(matches!(query.filter, Some(Filter::CheckboxEquals { .. })));
    }

    #[test]
    fn widened_keeps_publish_filter_and_sorts() {
        let query = QueryBuilder::for_published(table(), &CONTENT)
            .and(Filter::tag_contains("Tags", "a"))
            .sort_by(SortField::Views, &CONTENT)
            .build();
        let wide = query.widened();
        assert_eq!(wide.filter, Some(Filter::published(CONTENT.published)));
        assert_eq!(wide.sorts, query.sorts);
    }

    #[test]
    fn body_clamps_page_size_and_carries_cursor() {
        let query = QueryBuilder::new(table()).build();
        let body = query.to_body(Some("c1"), 500);
        assert_eq!(body["page_size"], json!(100));
        assert_eq!(body["start_cursor"], json!("c1"));
        assert!(body.get("filter").is_none());
    }

    #[test]
    fn sort_field_maps_per_table() {
        let sort = SortField::Name.to_sort(&PERSON).unwrap();
        assert_eq!(sort.property, PERSON.name);
        assert!(sort.direction.is_ascending());
        assert!(SortField::Views.to_sort(&crate::models::schema::GENRE).is_none());
    }

    #[test]
    fn local_evaluation_matches_upstream_semantics() {
        let record = RawRecord::new("c1")
            .with("Public", PropertyValue::checkbox(true))
            .with("Tags", PropertyValue::multi_select(["a", "b"]))
            .with("Genre", PropertyValue::select("g"));
        assert!(Filter::published("Public").matches(&record));
        assert!(Filter::tag_contains("Tags", "b").matches(&record));
        assert!(!Filter::tag_contains("Tags", "B").matches(&record));
        assert!(Filter::select_equals("Genre", "g").matches(&record));
        assert!(!Filter::published("Missing").matches(&record));
        assert!(
            Filter::Or(vec![
                Filter::tag_contains("Tags", "z"),
                Filter::select_equals("Genre", "g"),
            ])
            .matches(&record)
        );
    }

    #[test]
    fn sort_compare_puts_missing_last() {
        let sort = Sort::descending("Views");
        let a = RawRecord::new("a").with("Views", PropertyValue::number(3.0));
        let b = RawRecord::new("b").with("Views", PropertyValue::number(9.0));
        let c = RawRecord::new("c");
        let mut rows = vec![a.clone(), c.clone(), b.clone()];
        rows.sort_by(|x, y| sort.compare(x, y));
        assert_eq!(rows, vec![b, a, c]);
    }
}
