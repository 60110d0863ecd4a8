use crate::clients::record::{QueryPage, RawRecord};
use crate::clients::transport::{Transport, UpstreamError, UpstreamRequest, UpstreamResponse};
use crate::constants::upstream::{API_VERSION, DEFAULT_BASE_URL, USER_AGENT};
use crate::domain::RecordId;
use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// [`Transport`] over the hosted Notion REST API.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_key: String,
    api_version: String,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Fails when `base_url` is not an absolute URL.
    pub fn new(base_url: &str, api_key: &str, api_version: &str) -> Result<Self> {
        let base = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim()
        };
        let base_url = Url::parse(base).with_context(|| format!("Invalid upstream URL: {base}"))?;
        let api_version = if api_version.trim().is_empty() {
            API_VERSION
        } else {
            api_version.trim()
        };

        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            api_key: api_key.to_string(),
            api_version: api_version.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base_url
            .join(path)
            .map_err(|e| UpstreamError::Decode(format!("bad endpoint {path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.api_version)
    }

    fn page_path(id: &RecordId) -> String {
        format!("v1/pages/{}", id.as_str())
    }
}

fn classify_send_error(err: &reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Network(err.to_string())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body: ErrorBody = response.json().await.unwrap_or_default();
        debug!(status = status.as_u16(), code = %body.code, "Upstream returned an error");
        return Err(UpstreamError::from_status(
            status.as_u16(),
            body.code,
            body.message,
        ));
    }
    response
        .json()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let builder = match request {
            UpstreamRequest::Query { query, cursor } => {
                let url = self.endpoint(&format!("v1/databases/{}/query", query.table))?;
                self.request(Method::POST, url)
                    .json(&query.to_body(cursor.as_deref(), query.page_size))
            }
            UpstreamRequest::Retrieve { id } => {
                self.request(Method::GET, self.endpoint(&Self::page_path(id))?)
            }
            UpstreamRequest::Update { id, patch } => self
                .request(Method::PATCH, self.endpoint(&Self::page_path(id))?)
                .json(&patch.to_json()),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| classify_send_error(&e))?;

        match request {
            UpstreamRequest::Query { .. } => decode::<QueryPage>(response)
                .await
                .map(UpstreamResponse::Page),
            UpstreamRequest::Retrieve { .. } | UpstreamRequest::Update { .. } => {
                decode::<RawRecord>(response)
                    .await
                    .map(UpstreamResponse::Record)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_settings_fall_back_to_defaults() {
        let transport = HttpTransport::new("", "secret", "").unwrap();
        assert_eq!(transport.base_url.as_str(), "https://api.notion.com/");
        assert_eq!(transport.api_version, API_VERSION);
    }

    #[test]
    fn endpoints_join_onto_base() {
        let transport = HttpTransport::new("http://localhost:9000", "k", "v").unwrap();
        let url = transport
            .endpoint(&HttpTransport::page_path(&RecordId::new("abc")))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/v1/pages/abc");
        assert!(HttpTransport::new("not a url", "k", "v").is_err());
    }
}
