use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;

use crate::contract::{PostQueryBody, RawSearchResponse, SearchRequest};

const NOMETADATA_JSON: &str = "application/json;odata=nometadata";
const POSTQUERY_PATH: &str = "_api/search/postquery";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// The remote search service. Implementations are shared, stateless handles;
/// failures are returned as-is with no retry.
pub trait SearchClient {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<RawSearchResponse, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct RestSearchClient {
    http: reqwest::Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl RestSearchClient {
    pub fn new(
        site_url: &str,
        bearer_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let site = site_url.trim().trim_end_matches('/');
        if site.is_empty() {
            return Err(ClientError::Config("site url is empty".to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: postquery_endpoint(site),
            bearer_token: bearer_token.filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub fn postquery_endpoint(site_url: &str) -> String {
    format!("{}/{POSTQUERY_PATH}", site_url.trim_end_matches('/'))
}

pub fn postquery_body(request: &SearchRequest) -> Result<String, ClientError> {
    Ok(serde_json::to_string(&PostQueryBody { request })?)
}

impl SearchClient for RestSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<RawSearchResponse, ClientError> {
        let body = postquery_body(request)?;

        let mut builder = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, NOMETADATA_JSON)
            .header(CONTENT_TYPE, NOMETADATA_JSON)
            .body(body);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            start_row = request.start_row,
            "issuing search request"
        );
        let response = builder.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
