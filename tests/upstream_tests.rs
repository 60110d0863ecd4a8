//! Transport retry behavior and pager completeness against the in-memory store.

use navi::clients::record::{PropertyValue, RawRecord};
use navi::clients::{
    MemoryTransport, Pager, RetryPolicy, UpstreamClient, UpstreamError, UpstreamRequest,
};
use navi::domain::{RecordId, TableId};
use navi::query::{QueryBuilder, QueryDef};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const BACKOFF: Duration = Duration::from_millis(1000);

fn client_over(store: &Arc<MemoryTransport>, timeout: Duration) -> UpstreamClient {
    UpstreamClient::new(
        store.clone(),
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: BACKOFF,
        },
        timeout,
    )
}

fn assert_delay(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(5),
        "waited {actual:?}, expected {expected:?}"
    );
}

fn table_with(rows: usize) -> (Arc<MemoryTransport>, QueryDef) {
    let store = Arc::new(MemoryTransport::new());
    let table = TableId::new("contents");
    for i in 0..rows {
        store.insert(
            &table,
            RawRecord::new(format!("row-{i:04}"))
                .with("Views", PropertyValue::number(i as f64)),
        );
    }
    (store, QueryBuilder::new(table).build())
}

#[tokio::test]
async fn fetch_all_returns_every_record_exactly_once() {
    for rows in [0, 1, 99, 100, 101, 250] {
        let (store, query) = table_with(rows);
        let pager = Pager::new(client_over(&store, Duration::from_secs(5)));

        let records = pager.fetch_all(&query).await.unwrap();

        assert_eq!(records.len(), rows, "rows = {rows}");
        let unique: HashSet<&RecordId> = records.iter().map(|r| &r.id).collect();
        assert_eq!(unique.len(), rows);
        let ordered: Vec<String> = (0..rows).map(|i| format!("row-{i:04}")).collect();
        assert_eq!(
            records.iter().map(|r| r.id.to_string()).collect::<Vec<_>>(),
            ordered
        );
        assert_eq!(store.call_count("query"), rows.div_ceil(100).max(1));
    }
}

#[tokio::test]
async fn each_walk_starts_from_a_fresh_cursor() {
    let (store, query) = table_with(150);
    let pager = Pager::new(client_over(&store, Duration::from_secs(5)));

    pager.fetch_all(&query).await.unwrap();
    pager.fetch_all(&query).await.unwrap();

    let cursors: Vec<Option<String>> = store.calls().into_iter().map(|c| c.cursor).collect();
    assert_eq!(cursors[0], None);
    assert_eq!(cursors[2], None);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_with_doubling_backoff() {
    let store = Arc::new(MemoryTransport::new());
    let id = store.insert(&TableId::new("people"), RawRecord::new("p1"));
    store.fail_next(2, &UpstreamError::Transient { status: 503 });
    let client = client_over(&store, Duration::from_secs(30));

    let record = client.retrieve(&id).await.unwrap();

    assert_eq!(record.id, id);
    let calls = store.calls();
    assert_eq!(calls.len(), 3);
    assert_delay(calls[1].at - calls[0].at, BACKOFF);
    assert_delay(calls[2].at - calls[1].at, BACKOFF * 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_report_unavailable() {
    let store = Arc::new(MemoryTransport::new());
    let id = store.insert(&TableId::new("people"), RawRecord::new("p1"));
    store.fail_next(5, &UpstreamError::Transient { status: 502 });
    let client = client_over(&store, Duration::from_secs(30));

    let err = client.retrieve(&id).await.unwrap_err();

    assert!(matches!(
        err,
        UpstreamError::Unavailable { attempts: 3, ref last }
            if matches!(**last, UpstreamError::Transient { status: 502 })
    ));
    assert_eq!(store.call_count("retrieve"), 3);
}

#[tokio::test(start_paused = true)]
async fn slow_attempts_time_out_and_count_as_transient() {
    let store = Arc::new(MemoryTransport::new());
    let id = store.insert(&TableId::new("people"), RawRecord::new("p1"));
    store.set_latency(Duration::from_secs(60));
    let client = client_over(&store, Duration::from_secs(2));

    let err = client.retrieve(&id).await.unwrap_err();

    assert!(matches!(
        err,
        UpstreamError::Unavailable { attempts: 3, ref last } if matches!(**last, UpstreamError::Timeout)
    ));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let store = Arc::new(MemoryTransport::new());
    store.fail_next(
        1,
        &UpstreamError::Rejected {
            status: 400,
            code: "validation_error".to_string(),
            message: "bad filter".to_string(),
        },
    );
    let client = client_over(&store, Duration::from_secs(5));

    let err = client
        .execute(&UpstreamRequest::Retrieve {
            id: RecordId::new("p1"),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::Rejected { status: 400, .. }));
    assert_eq!(store.calls().len(), 1);

    let missing = client.retrieve(&RecordId::new("nope")).await.unwrap_err();
    assert!(missing.is_not_found());
    assert_eq!(store.calls().len(), 2);
}
