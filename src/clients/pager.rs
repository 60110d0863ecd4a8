use crate::clients::record::{QueryPage, RawRecord};
use crate::clients::transport::{UpstreamClient, UpstreamError};
use crate::query::QueryDef;
use futures::Stream;
use futures::stream;
use tracing::debug;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Walks a query's cursor chain. Every call starts a fresh walk.
#[derive(Clone)]
pub struct Pager {
    client: UpstreamClient,
}

impl Pager {
    #[must_use]
    pub const fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub const fn client(&self) -> &UpstreamClient {
        &self.client
    }

    /// Every record the query matches, in upstream order.
    ///
    /// # Errors
    ///
    /// Fails on the first page that fails after retries.
    pub async fn fetch_all(&self, query: &QueryDef) -> Result<Vec<RawRecord>, UpstreamError> {
        self.collect(query, None).await
    }

    /// At most `limit` records; stops requesting pages once it has them.
    ///
    /// # Errors
    ///
    /// Fails on the first page that fails after retries.
    pub async fn fetch_up_to(
        &self,
        query: &QueryDef,
        limit: usize,
    ) -> Result<Vec<RawRecord>, UpstreamError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.collect(query, Some(limit)).await
    }

    async fn collect(
        &self,
        query: &QueryDef,
        cap: Option<usize>,
    ) -> Result<Vec<RawRecord>, UpstreamError> {
        let mut records = Vec::new();
        let mut cursor = None;
        let mut pages = 0usize;

        loop {
            let page_size = cap.map_or(query.page_size, |cap| {
                cap.saturating_sub(records.len()).min(query.page_size)
            });
            let page = self
                .client
                .query(&query.clone().with_page_size(page_size), cursor)
                .await?;
            pages += 1;
            records.extend(page.results);

            if let Some(cap) = cap {
                if records.len() >= cap {
                    records.truncate(cap);
                    break;
                }
            }
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        debug!(table = %query.table, pages, records = records.len(), "Query walked");
        Ok(records)
    }

    /// Lazily yields pages in cursor order.
    pub fn pages(
        &self,
        query: QueryDef,
    ) -> impl Stream<Item = Result<QueryPage, UpstreamError>> + Send + 'static {
        let client = self.client.clone();
        stream::try_unfold(Cursor::Start, move |cursor| {
            let client = client.clone();
            let query = query.clone();
            async move {
                let cursor = match cursor {
                    Cursor::Start => None,
                    Cursor::Next(next) => Some(next),
                    Cursor::Done => return Ok(None),
                };
                let page = client.query(&query, cursor).await?;
                let next = match &page.next_cursor {
                    Some(next) if page.has_more => Cursor::Next(next.clone()),
                    _ => Cursor::Done,
                };
                Ok::<_, UpstreamError>(Some((page, next)))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::memory::MemoryTransport;
    use crate::clients::record::PropertyValue;
    use crate::clients::transport::RetryPolicy;
    use crate::domain::TableId;
    use crate::query::QueryBuilder;
    use futures::TryStreamExt;
    use std::sync::Arc;
    use std::time::Duration;

    fn pager_over(rows: usize) -> (Pager, Arc<MemoryTransport>, QueryDef) {
        let store = Arc::new(MemoryTransport::new());
        let table = TableId::new("contents");
        for i in 0..rows {
            store.insert(
                &table,
                RawRecord::new(format!("r{i}")).with("N", PropertyValue::number(i as f64)),
            );
        }
        let client = UpstreamClient::new(
            store.clone(),
            RetryPolicy::default(),
            Duration::from_secs(5),
        );
        let query = QueryBuilder::new(table).page_size(10).build();
        (Pager::new(client), store, query)
    }

    #[tokio::test]
    async fn cap_shrinks_the_last_page() {
        let (pager, store, query) = pager_over(35);
        let rows = pager.fetch_up_to(&query, 15).await.unwrap();
        assert_eq!(rows.len(), 15);
        let sizes: Vec<_> = store.calls().iter().map(|c| c.page_size).collect();
        assert_eq!(sizes, vec![Some(10), Some(5)]);
    }

    #[tokio::test]
    async fn stream_yields_pages_in_order() {
        let (pager, _, query) = pager_over(25);
        let pages: Vec<QueryPage> = pager.pages(query).try_collect().await.unwrap();
        assert_eq!(
            pages.iter().map(|p| p.results.len()).collect::<Vec<_>>(),
            vec![10, 10, 5]
        );
        assert_eq!(pages[1].results[0].id.as_str(), "r10");
    }

    #[tokio::test]
    async fn stream_stops_at_a_failed_page() {
        let (pager, store, query) = pager_over(25);
        let mut pages = Box::pin(pager.pages(query));

        assert_eq!(pages.try_next().await.unwrap().unwrap().results.len(), 10);
        store.fail_next(1, &UpstreamError::NotFound);
        assert!(matches!(pages.try_next().await, Err(UpstreamError::NotFound)));
    }

    #[tokio::test]
    async fn zero_cap_makes_no_calls() {
        let (pager, store, query) = pager_over(3);
        assert!(pager.fetch_up_to(&query, 0).await.unwrap().is_empty());
        assert!(store.calls().is_empty());
    }
}
