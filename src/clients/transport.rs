//! Upstream transport: a single-attempt [`Transport`] seam and the
//! [`UpstreamClient`] that adds per-attempt timeouts and retry with
//! exponential backoff on top of it.

use crate::clients::record::{QueryPage, RawRecord, RecordPatch};
use crate::constants::upstream as defaults;
use crate::domain::RecordId;
use crate::query::QueryDef;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// One logical call against the table store.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamRequest {
    Query {
        query: QueryDef,
        cursor: Option<String>,
    },
    Retrieve {
        id: RecordId,
    },
    Update {
        id: RecordId,
        patch: RecordPatch,
    },
}

impl UpstreamRequest {
    /// Metric/log label of the request kind.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Query { .. } => "query",
            Self::Retrieve { .. } => "retrieve",
            Self::Update { .. } => "update",
        }
    }
}

#[derive(Debug, Clone)]
pub enum UpstreamResponse {
    Page(QueryPage),
    Record(RawRecord),
}

#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream temporarily failed: HTTP {status}")]
    Transient { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Record not found")]
    NotFound,

    #[error("Upstream rejected the credentials")]
    Unauthorized,

    #[error("Upstream API error: {status} {code} - {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Malformed upstream response: {0}")]
    Decode(String),

    #[error("Upstream unavailable after {attempts} attempts: {last}")]
    Unavailable {
        attempts: u32,
        last: Box<UpstreamError>,
    },
}

impl UpstreamError {
    /// Whether another attempt of the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Transient { .. } | Self::Network(_))
    }

    /// Maps an HTTP error status onto the taxonomy.
    #[must_use]
    pub fn from_status(status: u16, code: String, message: String) -> Self {
        match status {
            429 | 502 | 503 | 504 => Self::Transient { status },
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            _ => Self::Rejected {
                status,
                code,
                message,
            },
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Sends exactly one attempt of a request. Retrying is the caller's job.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns the classified failure of this single attempt.
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_MAX_ATTEMPTS,
            initial_backoff: defaults::DEFAULT_INITIAL_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): `d`, `2d`, `4d`, ...
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

/// Shared handle to the upstream. Cheap to clone.
#[derive(Clone)]
pub struct UpstreamClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl UpstreamClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            transport,
            retry,
            timeout,
        }
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Runs a request, retrying transient failures with exponential backoff.
    ///
    /// # Errors
    ///
    /// Non-transient failures are returned as-is after the first attempt;
    /// transient ones become [`UpstreamError::Unavailable`] once the attempt
    /// budget is spent.
    pub async fn execute(
        &self,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let operation = request.operation();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(operation, attempt, "Sending upstream request");

            let result = match tokio::time::timeout(self.timeout, self.transport.send(request)).await
            {
                Ok(result) => result,
                Err(_) => Err(UpstreamError::Timeout),
            };

            let err = match result {
                Ok(response) => {
                    metrics::counter!(
                        "upstream_requests_total",
                        "operation" => operation,
                        "outcome" => "success"
                    )
                    .increment(1);
                    return Ok(response);
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                metrics::counter!(
                    "upstream_requests_total",
                    "operation" => operation,
                    "outcome" => "error"
                )
                .increment(1);
                return Err(err);
            }

            if attempt >= max_attempts {
                metrics::counter!(
                    "upstream_requests_total",
                    "operation" => operation,
                    "outcome" => "unavailable"
                )
                .increment(1);
                warn!(operation, attempts = attempt, error = %err, "Upstream retries exhausted");
                return Err(UpstreamError::Unavailable {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                operation,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "Transient upstream failure, retrying"
            );
            metrics::counter!("upstream_retries_total", "operation" => operation).increment(1);
            tokio::time::sleep(delay).await;
        }
    }

    /// Fetches one page of a query.
    ///
    /// # Errors
    ///
    /// See [`UpstreamClient::execute`].
    pub async fn query(
        &self,
        query: &QueryDef,
        cursor: Option<String>,
    ) -> Result<QueryPage, UpstreamError> {
        let request = UpstreamRequest::Query {
            query: query.clone(),
            cursor,
        };
        match self.execute(&request).await? {
            UpstreamResponse::Page(page) => Ok(page),
            UpstreamResponse::Record(_) => Err(UpstreamError::Decode(
                "expected a page, got a single record".to_string(),
            )),
        }
    }

    /// # Errors
    ///
    /// See [`UpstreamClient::execute`].
    pub async fn retrieve(&self, id: &RecordId) -> Result<RawRecord, UpstreamError> {
        let request = UpstreamRequest::Retrieve { id: id.clone() };
        expect_record(self.execute(&request).await?)
    }

    /// # Errors
    ///
    /// See [`UpstreamClient::execute`].
    pub async fn update(
        &self,
        id: &RecordId,
        patch: RecordPatch,
    ) -> Result<RawRecord, UpstreamError> {
        let request = UpstreamRequest::Update {
            id: id.clone(),
            patch,
        };
        expect_record(self.execute(&request).await?)
    }
}

fn expect_record(response: UpstreamResponse) -> Result<RawRecord, UpstreamError> {
    match response {
        UpstreamResponse::Record(record) => Ok(record),
        UpstreamResponse::Page(_) => Err(UpstreamError::Decode(
            "expected a record, got a page".to_string(),
        )),
    }
}
