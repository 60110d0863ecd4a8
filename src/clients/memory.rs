//! In-process table store speaking the same request/response protocol as the
//! hosted API. Filters, sorts and cursors behave like the upstream; failures
//! and latency can be injected per call or per record.

use crate::clients::record::{QueryPage, RawRecord};
use crate::clients::transport::{Transport, UpstreamError, UpstreamRequest, UpstreamResponse};
use crate::domain::{RecordId, TableId};
use crate::query::{MAX_PAGE_SIZE, QueryDef};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// One call as seen by the transport.
#[derive(Debug, Clone)]
pub struct CallRecord {
    pub operation: &'static str,
    pub at: Instant,
    pub target: String,
    pub cursor: Option<String>,
    pub page_size: Option<usize>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<TableId, Vec<RecordId>>,
    records: HashMap<RecordId, RawRecord>,
    fail_next: VecDeque<UpstreamError>,
    failing_ids: HashMap<RecordId, UpstreamError>,
    latency: Option<Duration>,
    calls: Vec<CallRecord>,
}

#[derive(Default)]
pub struct MemoryTransport {
    state: Mutex<MemoryState>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a record in `table`. A record without an id gets a fresh one.
    pub fn insert(&self, table: &TableId, mut record: RawRecord) -> RecordId {
        if record.id.is_empty() {
            record.id = RecordId::new(uuid::Uuid::new_v4().to_string());
        }
        let id = record.id.clone();
        let mut state = self.state();
        let rows = state.tables.entry(table.clone()).or_default();
        if !rows.contains(&id) {
            rows.push(id.clone());
        }
        state.records.insert(id.clone(), record);
        id
    }

    #[must_use]
    pub fn record(&self, id: &RecordId) -> Option<RawRecord> {
        self.state().records.get(id).cloned()
    }

    /// The next `times` calls fail with `error`, whatever they are.
    pub fn fail_next(&self, times: usize, error: &UpstreamError) {
        let mut state = self.state();
        state
            .fail_next
            .extend(std::iter::repeat_n(error.clone(), times));
    }

    /// Every retrieve of `id` fails with `error`.
    pub fn fail_record(&self, id: &RecordId, error: UpstreamError) {
        self.state().failing_ids.insert(id.clone(), error);
    }

    /// Every call sleeps this long before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<CallRecord> {
        self.state().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn run_query(
        state: &MemoryState,
        query: &QueryDef,
        cursor: Option<&str>,
    ) -> Result<QueryPage, UpstreamError> {
        let ids = state.tables.get(&query.table).ok_or(UpstreamError::NotFound)?;

        let mut rows: Vec<&RawRecord> = ids
            .iter()
            .filter_map(|id| state.records.get(id))
            .filter(|r| query.filter.as_ref().is_none_or(|f| f.matches(r)))
            .collect();

        rows.sort_by(|a, b| {
            query
                .sorts
                .iter()
                .map(|s| s.compare(a, b))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let start = match cursor {
            None => 0,
            Some(c) => c.parse::<usize>().map_err(|_| UpstreamError::Rejected {
                status: 400,
                code: "validation_error".to_string(),
                message: format!("invalid start_cursor: {c}"),
            })?,
        };
        let size = query.page_size.clamp(1, MAX_PAGE_SIZE);
        let end = start.saturating_add(size).min(rows.len());
        let has_more = end < rows.len();

        Ok(QueryPage {
            results: rows
                .get(start..end)
                .unwrap_or_default()
                .iter()
                .map(|r| (*r).clone())
                .collect(),
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }

    fn answer(
        state: &mut MemoryState,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        if let Some(err) = state.fail_next.pop_front() {
            return Err(err);
        }

        match request {
            UpstreamRequest::Query { query, cursor } => {
                Self::run_query(state, query, cursor.as_deref()).map(UpstreamResponse::Page)
            }
            UpstreamRequest::Retrieve { id } => {
                if let Some(err) = state.failing_ids.get(id) {
                    return Err(err.clone());
                }
                state
                    .records
                    .get(id)
                    .cloned()
                    .map(UpstreamResponse::Record)
                    .ok_or(UpstreamError::NotFound)
            }
            UpstreamRequest::Update { id, patch } => {
                let record = state.records.get_mut(id).ok_or(UpstreamError::NotFound)?;
                for (name, value) in &patch.properties {
                    record.properties.insert(name.clone(), value.clone());
                }
                Ok(UpstreamResponse::Record(record.clone()))
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let latency = {
            let mut state = self.state();
            let (target, cursor, page_size) = match request {
                UpstreamRequest::Query { query, cursor } => (
                    query.table.to_string(),
                    cursor.clone(),
                    Some(query.page_size),
                ),
                UpstreamRequest::Retrieve { id } | UpstreamRequest::Update { id, .. } => {
                    (id.to_string(), None, None)
                }
            };
            state.calls.push(CallRecord {
                operation: request.operation(),
                at: Instant::now(),
                target,
                cursor,
                page_size,
            });
            state.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        Self::answer(&mut self.state(), request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::record::{PropertyValue, RecordPatch};
    use crate::query::{Filter, QueryBuilder, Sort};

    fn seeded() -> (MemoryTransport, TableId) {
        let store = MemoryTransport::new();
        let table = TableId::new("people");
        for (i, public) in [(1.0, true), (3.0, false), (2.0, true)] {
            store.insert(
                &table,
                RawRecord::new(String::new())
                    .with("Views", PropertyValue::number(i))
                    .with("Public", PropertyValue::checkbox(public)),
            );
        }
        (store, table)
    }

    #[tokio::test]
    async fn query_filters_sorts_and_pages() {
        let (store, table) = seeded();
        let query = QueryBuilder::new(table)
            .and(Filter::published("Public"))
            .sort(Sort::descending("Views"))
            .page_size(1)
            .build();

        let first = store
            .send(&UpstreamRequest::Query {
                query: query.clone(),
                cursor: None,
            })
            .await
            .unwrap();
        let UpstreamResponse::Page(first) = first else {
            panic!("expected a page");
        };
        assert_eq!(first.results.len(), 1);
        assert!(first.has_more);
        assert_eq!(
            first.results[0].property("Views"),
            Some(&PropertyValue::number(2.0))
        );

        let UpstreamResponse::Page(second) = store
            .send(&UpstreamRequest::Query {
                query,
                cursor: first.next_cursor,
            })
            .await
            .unwrap()
        else {
            panic!("expected a page");
        };
        assert!(!second.has_more);
        assert_eq!(second.next_cursor, None);
    }

    #[tokio::test]
    async fn update_merges_properties_and_unknown_ids_are_not_found() {
        let store = MemoryTransport::new();
        let id = store.insert(&TableId::new("t"), RawRecord::new("r1"));
        let patch = RecordPatch::default().set("Views", PropertyValue::number(1.0));
        store
            .send(&UpstreamRequest::Update {
                id: id.clone(),
                patch,
            })
            .await
            .unwrap();
        assert_eq!(
            store.record(&id).unwrap().property("Views"),
            Some(&PropertyValue::number(1.0))
        );

        let missing = store
            .send(&UpstreamRequest::Retrieve {
                id: RecordId::new("nope"),
            })
            .await;
        assert!(matches!(missing, Err(UpstreamError::NotFound)));
    }

    #[tokio::test]
    async fn cursor_past_the_end_yields_an_empty_last_page() {
        let (store, table) = seeded();
        let query = QueryBuilder::new(table).build();
        let response = store
            .send(&UpstreamRequest::Query {
                query,
                cursor: Some(usize::MAX.to_string()),
            })
            .await
            .unwrap();
        let UpstreamResponse::Page(page) = response else {
            panic!("expected a page");
        };
        assert!(page.results.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let store = MemoryTransport::new();
        let id = store.insert(&TableId::new("t"), RawRecord::new("r1"));
        store.fail_next(1, &UpstreamError::Transient { status: 503 });
        let request = UpstreamRequest::Retrieve { id };
        assert!(store.send(&request).await.is_err());
        assert!(store.send(&request).await.is_ok());
        assert_eq!(store.call_count("retrieve"), 2);
    }
}
