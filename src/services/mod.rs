pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{
    CatalogError, CatalogService, ContentDetail, PersonDetail, RankingEntry, RankingView,
    ViewCounter,
};
pub use catalog_service_impl::NotionCatalogService;

pub mod listing;
pub use listing::{Listing, ListingQuery};

pub mod related;

pub mod resolver;
pub use resolver::{Joined, RelationResolver};
