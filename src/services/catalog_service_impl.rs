//! Notion-backed implementation of the `CatalogService` trait.
//!
//! Every view is assembled per request from independent upstream queries;
//! nothing is cached between calls.

use crate::clients::notion::HttpTransport;
use crate::clients::pager::Pager;
use crate::clients::record::{PropertyValue, RawRecord, RecordPatch};
use crate::clients::transport::{RetryPolicy, UpstreamClient, UpstreamError};
use crate::config::{CatalogConfig, Config, TablesConfig};
use crate::domain::{RecordId, TableId};
use crate::models::schema::{self, TableSchema, affiliate, content, person, ranking_detail};
use crate::models::{
    AffiliateWidget, Content, Genre, Listable, Person, RankingArticle, RankingDetail,
    UniformCategory,
};
use crate::normalizer::{self, FromRecord};
use crate::query::{Filter, QueryBuilder, QueryDef, Sort, SortField};
use crate::services::catalog_service::{
    CatalogError, CatalogService, ContentDetail, PersonDetail, RankingEntry, RankingView,
    ViewCounter,
};
use crate::services::listing::{
    Listing, ListingQuery, listing_query, matches_client_filters, sort_items, window,
};
use crate::services::related::sample;
use crate::services::resolver::RelationResolver;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

pub struct NotionCatalogService {
    pager: Pager,
    resolver: RelationResolver,
    tables: TablesConfig,
    catalog: CatalogConfig,
    page_size: usize,
    rng: Mutex<StdRng>,
}

impl NotionCatalogService {
    #[must_use]
    pub fn new(client: UpstreamClient, config: &Config) -> Self {
        Self {
            pager: Pager::new(client.clone()),
            resolver: RelationResolver::new(client, config.upstream.max_concurrent_lookups),
            tables: config.tables.clone(),
            catalog: config.catalog.clone(),
            page_size: config.upstream.page_size,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Service talking to the hosted API with the configured credentials.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(
            &config.upstream.base_url,
            &config.upstream.api_key,
            &config.upstream.api_version,
        )?;
        let retry = RetryPolicy {
            max_attempts: config.upstream.max_attempts,
            initial_backoff: config.upstream.initial_backoff(),
        };
        let client = UpstreamClient::new(
            Arc::new(transport),
            retry,
            config.upstream.request_timeout(),
        );
        Ok(Self::new(client, config))
    }

    /// Replaces the shuffle source, e.g. with a seeded one.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    fn degraded(view: &'static str, err: &UpstreamError) {
        warn!(view, error = %err, "Upstream query failed, serving an empty result");
        metrics::counter!("catalog_degraded_total", "view" => view).increment(1);
    }

    fn published<T: FromRecord>(records: &[RawRecord]) -> Vec<T> {
        records
            .iter()
            .map(T::from_record)
            .filter(FromRecord::is_published)
            .collect()
    }

    fn published_query(&self, table: TableId, schema: &TableSchema) -> QueryBuilder {
        QueryBuilder::for_published(table, schema).page_size(self.page_size)
    }

    /// Runs a scoped query; when it yields `fallback_threshold` results or
    /// fewer, runs the publish-only version of it instead. At most `wanted`
    /// records are returned either way.
    async fn fetch_with_fallback(
        &self,
        query: &QueryDef,
        wanted: usize,
    ) -> Result<Vec<RawRecord>, UpstreamError> {
        let threshold = self.catalog.fallback_threshold;
        let cap = wanted.max(threshold + 1);

        let mut records = self.pager.fetch_up_to(query, cap).await?;
        if records.len() <= threshold {
            debug!(
                table = %query.table,
                matched = records.len(),
                threshold,
                "Too few scoped results, widening to all published"
            );
            records = self.pager.fetch_up_to(&query.widened(), cap).await?;
        }
        records.truncate(wanted);
        Ok(records)
    }

    async fn all_published<T: FromRecord>(
        &self,
        view: &'static str,
        query: &QueryDef,
    ) -> Vec<T> {
        if query.table.is_empty() {
            return Vec::new();
        }
        match self.pager.fetch_all(query).await {
            Ok(records) => Self::published(&records),
            Err(err) => {
                Self::degraded(view, &err);
                Vec::new()
            }
        }
    }

    async fn primary<T: FromRecord>(&self, id: &RecordId) -> Result<T, CatalogError> {
        let record = self
            .pager
            .client()
            .retrieve(id)
            .await
            .map_err(|err| CatalogError::from_upstream(T::KIND, id.as_str(), err))?;
        let value = T::from_record(&record);
        if value.is_published() {
            Ok(value)
        } else {
            Err(CatalogError::not_found(T::KIND, id.as_str()))
        }
    }

    /// Scans the published rows of a table for a slug.
    async fn find_by_slug<T, F>(
        &self,
        table: TableId,
        schema: &TableSchema,
        slug: &str,
        slug_of: F,
    ) -> Result<T, CatalogError>
    where
        T: FromRecord,
        F: Fn(&T) -> &str,
    {
        let wanted = slug.trim().to_lowercase();
        if table.is_empty() || wanted.is_empty() {
            return Err(CatalogError::not_found(T::KIND, slug));
        }
        let query = self.published_query(table, schema).build();
        let records = self
            .pager
            .fetch_all(&query)
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;

        records
            .iter()
            .map(T::from_record)
            .filter(FromRecord::is_published)
            .find(|item| slug_of(item).to_lowercase() == wanted)
            .ok_or_else(|| CatalogError::not_found(T::KIND, slug))
    }

    async fn list<T: Listable>(
        &self,
        view: &'static str,
        table: TableId,
        query: &ListingQuery,
        scope: Vec<Filter>,
    ) -> Listing<T> {
        let limit = query.limit.unwrap_or(self.catalog.default_page_limit);
        if table.is_empty() || limit == 0 {
            return Listing::empty(query.offset);
        }

        let def = listing_query::<T>(table, query, scope, self.page_size);
        let fetched = if query.needs_full_scan() {
            self.pager.fetch_all(&def).await
        } else {
            let wanted = query.offset.saturating_add(limit).saturating_add(1);
            self.pager.fetch_up_to(&def, wanted).await
        };

        let records = match fetched {
            Ok(records) => records,
            Err(err) => {
                Self::degraded(view, &err);
                return Listing::empty(query.offset);
            }
        };

        let mut items: Vec<T> = records
            .iter()
            .map(T::from_record)
            .filter(|item| item.is_published() && matches_client_filters(item, query))
            .collect();
        sort_items(&mut items, query.sort);
        window(items, query.offset, limit)
    }

    async fn own_contents(&self, person: &Person) -> Vec<Content> {
        let query = self
            .published_query(self.tables.contents(), &schema::CONTENT)
            .and(Filter::relation_contains(content::PERFORMERS, &person.id))
            .sort_by(SortField::Recency, &schema::CONTENT)
            .build();
        let mut contents: Vec<Content> = self.all_published("person_contents", &query).await;
        sort_items(&mut contents, SortField::Recency);
        contents
    }

    async fn ranking_details(&self, article: &RankingArticle) -> Vec<RankingDetail> {
        let table = self.tables.ranking_details();
        if table.is_empty() {
            return Vec::new();
        }
        let query = QueryBuilder::new(table)
            .and(Filter::relation_contains(ranking_detail::ARTICLE, &article.id))
            .sort(Sort::ascending(ranking_detail::RANK))
            .page_size(self.page_size)
            .build();
        let mut details: Vec<RankingDetail> = self.all_published("ranking_details", &query).await;
        details.sort_by_key(|d| d.rank);
        details
    }

    async fn entries_from_details(&self, details: &[RankingDetail]) -> Vec<RankingEntry> {
        let ids: Vec<RecordId> = details.iter().filter_map(|d| d.person_id().cloned()).collect();
        let people = self.resolver.lookup_map::<Person>(&ids).await;

        details
            .iter()
            .filter_map(|detail| {
                let id = detail.person_id()?;
                let joined = people.get(id).cloned();
                Some((detail, id, joined))
            })
            .enumerate()
            .map(|(index, (detail, id, joined))| RankingEntry {
                rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
                person: joined.map_or_else(|| Person::placeholder(id.clone()), |j| j.into_person()),
                blurb: Some(detail.blurb.clone()).filter(|b| !b.is_empty()),
            })
            .collect()
    }

    async fn entries_from_targets(&self, article: &RankingArticle) -> Vec<RankingEntry> {
        let limit = article.limit.unwrap_or(self.catalog.default_ranking_limit);
        let targets: Vec<Filter> = article
            .target_tags
            .iter()
            .map(|tag| Filter::tag_contains(person::GENRES, tag))
            .chain(
                article
                    .target_categories
                    .iter()
                    .map(|category| Filter::tag_contains(person::CATEGORIES, category)),
            )
            .collect();
        let query = self
            .published_query(self.tables.people(), &schema::PERSON)
            .any_of(targets)
            .sort_by(article.sort, &schema::PERSON)
            .build();

        let records = match self.fetch_with_fallback(&query, limit).await {
            Ok(records) => records,
            Err(err) => {
                Self::degraded("ranking", &err);
                return Vec::new();
            }
        };

        Self::published::<Person>(&records)
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, person)| RankingEntry {
                rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
                person,
                blurb: None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogService for NotionCatalogService {
    async fn list_people(&self, query: &ListingQuery) -> Listing<Person> {
        self.list("people", self.tables.people(), query, Vec::new())
            .await
    }

    async fn list_contents(&self, query: &ListingQuery) -> Listing<Content> {
        let mut scope = Vec::new();
        if let Some(performer) = &query.performer {
            scope.push(Filter::relation_contains(content::PERFORMERS, performer));
        }
        if let Some(uniform) = &query.uniform_category {
            scope.push(Filter::relation_contains(content::UNIFORM_CATEGORIES, uniform));
        }
        self.list("contents", self.tables.contents(), query, scope)
            .await
    }

    async fn person(&self, id: &RecordId) -> Result<Person, CatalogError> {
        self.primary(id).await
    }

    async fn person_by_slug(&self, slug: &str) -> Result<PersonDetail, CatalogError> {
        let person: Person = if uuid::Uuid::parse_str(slug.trim()).is_ok() {
            self.primary(&RecordId::new(slug)).await?
        } else {
            self.find_by_slug(self.tables.people(), &schema::PERSON, slug, |p: &Person| {
                p.slug.as_str()
            })
            .await?
        };

        let (contents, related) = tokio::join!(
            self.own_contents(&person),
            self.related_contents(&person, self.catalog.related_limit)
        );

        Ok(PersonDetail {
            person,
            contents,
            related,
        })
    }

    async fn content(&self, id: &RecordId) -> Result<ContentDetail, CatalogError> {
        let content: Content = self.primary(id).await?;
        let performers = self
            .resolver
            .resolve::<Person>(&content.performer_ids)
            .await
            .into_iter()
            .map(|joined| joined.into_person())
            .collect();
        Ok(ContentDetail {
            content,
            performers,
        })
    }

    async fn related_contents(&self, person: &Person, limit: usize) -> Vec<Content> {
        if limit == 0 {
            return Vec::new();
        }
        let scope: Vec<Filter> = std::iter::once(Filter::relation_contains(
            content::PERFORMERS,
            &person.id,
        ))
        .chain(
            person
                .categories
                .iter()
                .map(|category| Filter::tag_contains(content::CATEGORIES, category)),
        )
        .collect();
        let query = self
            .published_query(self.tables.contents(), &schema::CONTENT)
            .any_of(scope)
            .sort_by(SortField::Views, &schema::CONTENT)
            .build();

        let wanted = limit.saturating_mul(self.catalog.candidate_multiplier.max(1));
        let candidates: Vec<Content> = match self.fetch_with_fallback(&query, wanted).await {
            Ok(records) => Self::published(&records),
            Err(err) => {
                Self::degraded("related_contents", &err);
                return Vec::new();
            }
        };

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        sample(candidates, limit, &mut *rng)
    }

    async fn genres(&self) -> Vec<Genre> {
        let query = self
            .published_query(self.tables.genres(), &schema::GENRE)
            .build();
        let mut genres: Vec<Genre> = self.all_published("genres", &query).await;
        genres.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        genres
    }

    async fn genre_by_slug(&self, slug: &str) -> Result<Genre, CatalogError> {
        self.find_by_slug(self.tables.genres(), &schema::GENRE, slug, |g: &Genre| {
            g.slug.as_str()
        })
        .await
    }

    async fn uniform_categories(&self) -> Vec<UniformCategory> {
        let query = self
            .published_query(self.tables.uniform_categories(), &schema::UNIFORM_CATEGORY)
            .build();
        let mut categories: Vec<UniformCategory> =
            self.all_published("uniform_categories", &query).await;
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        categories
    }

    async fn uniform_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<UniformCategory, CatalogError> {
        self.find_by_slug(
            self.tables.uniform_categories(),
            &schema::UNIFORM_CATEGORY,
            slug,
            |u: &UniformCategory| u.slug.as_str(),
        )
        .await
    }

    async fn categories(&self) -> Vec<String> {
        let people_query = self
            .published_query(self.tables.people(), &schema::PERSON)
            .build();
        let contents_query = self
            .published_query(self.tables.contents(), &schema::CONTENT)
            .build();

        let (people, contents) = tokio::join!(
            self.all_published::<Person>("categories", &people_query),
            self.all_published::<Content>("categories", &contents_query)
        );

        let union: BTreeSet<String> = people
            .into_iter()
            .flat_map(|p| p.categories)
            .chain(contents.into_iter().flat_map(|c| c.categories))
            .collect();
        union.into_iter().collect()
    }

    async fn rankings(&self) -> Vec<RankingArticle> {
        let query = self
            .published_query(self.tables.rankings(), &schema::RANKING)
            .sort_by(SortField::Recency, &schema::RANKING)
            .build();
        let mut articles: Vec<RankingArticle> = self.all_published("rankings", &query).await;
        articles.sort_by(|a, b| b.published_date.cmp(&a.published_date));
        articles
    }

    async fn ranking_by_slug(&self, slug: &str) -> Result<RankingView, CatalogError> {
        let article: RankingArticle = self
            .find_by_slug(self.tables.rankings(), &schema::RANKING, slug, |r: &RankingArticle| {
                r.slug.as_str()
            })
            .await?;

        let details = self.ranking_details(&article).await;
        let entries = if details.is_empty() {
            self.entries_from_targets(&article).await
        } else {
            self.entries_from_details(&details).await
        };

        Ok(RankingView { article, entries })
    }

    #[allow(clippy::cast_precision_loss)]
    async fn increment_views(
        &self,
        counter: ViewCounter,
        id: &RecordId,
    ) -> Result<u64, CatalogError> {
        let client = self.pager.client();
        let record = client
            .retrieve(id)
            .await
            .map_err(|err| CatalogError::from_upstream(counter.kind(), id.as_str(), err))?;

        let next = normalizer::count(&record, counter.property()).saturating_add(1);
        let patch = RecordPatch::default().set(counter.property(), PropertyValue::number(next as f64));
        client
            .update(id, patch)
            .await
            .map_err(|err| CatalogError::from_upstream(counter.kind(), id.as_str(), err))?;

        debug!(kind = %counter.kind(), id = %id, views = next, "View counter incremented");
        Ok(next)
    }

    async fn affiliate_widgets(&self, placement: &str) -> Vec<AffiliateWidget> {
        let placement = placement.trim();
        let query = self
            .published_query(self.tables.affiliates(), &schema::AFFILIATE)
            .and(Filter::text_equals(affiliate::PLACEMENT, placement))
            .build();
        let widgets: Vec<AffiliateWidget> = self.all_published("affiliate_widgets", &query).await;
        widgets
            .into_iter()
            .filter(|w| w.placement == placement)
            .collect()
    }
}

impl std::fmt::Debug for NotionCatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionCatalogService")
            .field("tables", &self.tables)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}
