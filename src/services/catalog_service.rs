//! Domain service for the catalog views.
//!
//! The presentation layer talks to [`CatalogService`] only; it never sees raw
//! records, cursors or upstream errors.

use crate::clients::transport::UpstreamError;
use crate::domain::RecordId;
use crate::models::schema;
use crate::models::{
    AffiliateWidget, Content, Genre, Person, RankingArticle, UniformCategory,
};
use crate::normalizer::EntityKind;
use crate::services::listing::{Listing, ListingQuery};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    pub fn not_found(kind: EntityKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Maps a failed primary fetch: upstream not-found stays not-found,
    /// everything else means the catalog cannot answer right now.
    pub fn from_upstream(kind: EntityKind, key: impl Into<String>, err: UpstreamError) -> Self {
        if err.is_not_found() {
            Self::not_found(kind, key)
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

/// Person page bundle.
#[derive(Debug, Clone, Serialize)]
pub struct PersonDetail {
    pub person: Person,
    /// Contents the person appears in, newest first.
    pub contents: Vec<Content>,
    pub related: Vec<Content>,
}

/// Content page bundle. Unresolvable performers appear as placeholders.
#[derive(Debug, Clone, Serialize)]
pub struct ContentDetail {
    pub content: Content,
    pub performers: Vec<Person>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub person: Person,
    pub blurb: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingView {
    pub article: RankingArticle,
    pub entries: Vec<RankingEntry>,
}

/// Records carrying a view counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCounter {
    Person,
    Content,
}

impl ViewCounter {
    #[must_use]
    pub const fn property(self) -> &'static str {
        match self {
            Self::Person => schema::person::VIEWS,
            Self::Content => schema::content::VIEWS,
        }
    }

    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Person => EntityKind::Person,
            Self::Content => EntityKind::Content,
        }
    }
}

/// Read-mostly catalog over the remote tables.
///
/// Listings and derived sets never fail: an upstream failure is logged and
/// yields an empty result. Primary-entity lookups return [`CatalogError`].
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_people(&self, query: &ListingQuery) -> Listing<Person>;

    async fn list_contents(&self, query: &ListingQuery) -> Listing<Content>;

    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] if the record is missing or unpublished
    /// - [`CatalogError::Unavailable`] if the upstream cannot be reached
    async fn person(&self, id: &RecordId) -> Result<Person, CatalogError>;

    /// Person, own contents and related contents for a person page.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogService::person`]; sub-queries degrade to empty.
    async fn person_by_slug(&self, slug: &str) -> Result<PersonDetail, CatalogError>;

    /// # Errors
    ///
    /// Same as [`CatalogService::person`].
    async fn content(&self, id: &RecordId) -> Result<ContentDetail, CatalogError>;

    /// Random published contents sharing a performer or a category with
    /// `person`, drawn from the most viewed candidates and widened to all
    /// published contents when too few match.
    async fn related_contents(&self, person: &Person, limit: usize) -> Vec<Content>;

    /// Published genres by display order.
    async fn genres(&self) -> Vec<Genre>;

    /// # Errors
    ///
    /// Same as [`CatalogService::person`].
    async fn genre_by_slug(&self, slug: &str) -> Result<Genre, CatalogError>;

    async fn uniform_categories(&self) -> Vec<UniformCategory>;

    /// # Errors
    ///
    /// Same as [`CatalogService::person`].
    async fn uniform_category_by_slug(&self, slug: &str)
    -> Result<UniformCategory, CatalogError>;

    /// Sorted union of the category tags used by people and contents.
    async fn categories(&self) -> Vec<String>;

    /// Published ranking articles, newest first.
    async fn rankings(&self) -> Vec<RankingArticle>;

    /// # Errors
    ///
    /// Same as [`CatalogService::person`].
    async fn ranking_by_slug(&self, slug: &str) -> Result<RankingView, CatalogError>;

    /// Adds one to a record's view counter and returns the new value.
    ///
    /// Read-then-write without a version check: concurrent increments can
    /// lose updates.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] if the record does not exist
    /// - [`CatalogError::Unavailable`] if the upstream cannot be reached
    async fn increment_views(
        &self,
        counter: ViewCounter,
        id: &RecordId,
    ) -> Result<u64, CatalogError>;

    /// Published widgets placed on `placement`.
    async fn affiliate_widgets(&self, placement: &str) -> Vec<AffiliateWidget>;
}
