//! Read-only catalog command handlers

use super::print_json;
use crate::cli::ListingArgs;
use crate::domain::RecordId;
use crate::services::{CatalogService, ListingQuery};

impl ListingArgs {
    fn to_query(&self) -> ListingQuery {
        ListingQuery {
            categories: self.categories.clone(),
            genre: self.genre.clone(),
            search: self.search.clone(),
            sort: self.sort,
            offset: self.offset,
            limit: self.limit,
            ..ListingQuery::default()
        }
    }
}

pub async fn cmd_people(service: &dyn CatalogService, args: &ListingArgs) -> anyhow::Result<()> {
    print_json(&service.list_people(&args.to_query()).await)
}

pub async fn cmd_contents(
    service: &dyn CatalogService,
    args: &ListingArgs,
    performer: Option<&str>,
    uniform: Option<&str>,
) -> anyhow::Result<()> {
    let query = ListingQuery {
        performer: performer.map(RecordId::new),
        uniform_category: uniform.map(RecordId::new),
        ..args.to_query()
    };
    print_json(&service.list_contents(&query).await)
}

pub async fn cmd_person(service: &dyn CatalogService, slug: &str) -> anyhow::Result<()> {
    print_json(&service.person_by_slug(slug).await?)
}

pub async fn cmd_content(service: &dyn CatalogService, id: &str) -> anyhow::Result<()> {
    print_json(&service.content(&RecordId::new(id)).await?)
}

pub async fn cmd_genres(service: &dyn CatalogService) -> anyhow::Result<()> {
    print_json(&service.genres().await)
}

pub async fn cmd_uniforms(service: &dyn CatalogService) -> anyhow::Result<()> {
    print_json(&service.uniform_categories().await)
}

pub async fn cmd_categories(service: &dyn CatalogService) -> anyhow::Result<()> {
    print_json(&service.categories().await)
}

pub async fn cmd_rankings(service: &dyn CatalogService) -> anyhow::Result<()> {
    print_json(&service.rankings().await)
}

pub async fn cmd_ranking(service: &dyn CatalogService, slug: &str) -> anyhow::Result<()> {
    print_json(&service.ranking_by_slug(slug).await?)
}

pub async fn cmd_affiliates(service: &dyn CatalogService, placement: &str) -> anyhow::Result<()> {
    print_json(&service.affiliate_widgets(placement).await)
}
