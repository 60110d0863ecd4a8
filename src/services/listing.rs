use crate::domain::{RecordId, TableId};
use crate::models::Listable;
use crate::query::{Filter, QueryBuilder, QueryDef, SortField};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Parameters of a people or contents listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    /// Every listed category must be present on the record.
    pub categories: Vec<String>,
    pub genre: Option<String>,
    /// Contents only: restrict to one performer.
    pub performer: Option<RecordId>,
    /// Contents only: restrict to one uniform category.
    pub uniform_category: Option<RecordId>,
    pub search: Option<String>,
    pub sort: SortField,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ListingQuery {
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether some filter can only be applied after fetching, which forces a
    /// full table walk.
    #[must_use]
    pub fn needs_full_scan(&self) -> bool {
        self.genre.as_deref().is_some_and(|g| !g.is_empty()) || self.search_term().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub has_more: bool,
}

impl<T> Listing<T> {
    #[must_use]
    pub const fn empty(offset: usize) -> Self {
        Self {
            items: Vec::new(),
            offset,
            has_more: false,
        }
    }

    /// Offset of the next "load more" window.
    #[must_use]
    pub fn next_offset(&self) -> Option<usize> {
        self.has_more.then(|| self.offset + self.items.len())
    }
}

/// Upstream part of a listing: publish flag, conjunctive categories, the
/// relation scope and the requested sort.
#[must_use]
pub fn listing_query<T: Listable>(
    table: TableId,
    query: &ListingQuery,
    scope: Vec<Filter>,
    page_size: usize,
) -> QueryDef {
    let schema = T::SCHEMA;
    let mut builder = QueryBuilder::for_published(table, &schema)
        .sort_by(query.sort, &schema)
        .page_size(page_size);

    if let Some(property) = schema.categories {
        for category in query.categories.iter().filter(|c| !c.is_empty()) {
            builder = builder.and(Filter::tag_contains(property, category));
        }
    }
    for filter in scope {
        builder = builder.and(filter);
    }
    builder.build()
}

/// Client-side part of a listing: genre (either representation) and a
/// case-insensitive search over name and description.
#[must_use]
pub fn matches_client_filters<T: Listable>(item: &T, query: &ListingQuery) -> bool {
    if let Some(genre) = query.genre.as_deref().filter(|g| !g.is_empty()) {
        if !item.genres().contains(genre) {
            return false;
        }
    }
    if let Some(term) = query.search_term() {
        let hit = item.display_name().to_lowercase().contains(&term)
            || item.description().to_lowercase().contains(&term);
        if !hit {
            return false;
        }
    }
    true
}

fn none_last<V: PartialOrd>(a: Option<V>, b: Option<V>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable client sort; descending for everything but names.
pub fn sort_items<T: Listable>(items: &mut [T], field: SortField) {
    match field {
        SortField::Name => items.sort_by(|a, b| a.display_name().cmp(b.display_name())),
        SortField::Recency => items.sort_by(|a, b| none_last(a.recency(), b.recency())),
        SortField::Views => items.sort_by(|a, b| b.views().cmp(&a.views())),
        SortField::Revenue => items.sort_by(|a, b| none_last(a.revenue(), b.revenue())),
    }
}

/// Cuts the `offset`/`limit` window out of the fully ordered result.
#[must_use]
pub fn window<T>(items: Vec<T>, offset: usize, limit: usize) -> Listing<T> {
    let has_more = items.len() > offset.saturating_add(limit);
    Listing {
        items: items.into_iter().skip(offset).take(limit).collect(),
        offset,
        has_more,
    }
}
