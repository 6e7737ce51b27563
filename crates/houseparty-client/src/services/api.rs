use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// HTTP access to the ticketing backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

/// Why a non-success response failed, as far as the client can tell.
#[derive(Debug, PartialEq)]
pub(crate) enum Failure {
    /// The body was an HTML page rather than the backend's error text.
    Html,
    /// Raw error text from the backend, possibly empty.
    Message(String),
}

impl ApiClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let mut builder = Client::builder().user_agent("houseparty-client/0.1");
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}{path}", self.base_url))
            .header("Accept", "application/json")
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base_url))
            .header("Accept", "application/json")
    }

    /// Send a request; transport failures mean the backend is unreachable.
    pub(crate) async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        request.send().await.map_err(|e| self.unreachable(e.to_string()))
    }

    /// Parse a success body, treating anything that is not the expected JSON
    /// as a sign that something other than the backend answered.
    pub(crate) async fn parse<T: DeserializeOwned>(&self, resp: Response) -> ClientResult<T> {
        let text = resp
            .text()
            .await
            .map_err(|e| self.unreachable(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| self.unreachable(e.to_string()))
    }

    /// Map a failure to an error, using `fallback` when the server sent no
    /// text and turning HTML bodies into [`ClientError::BackendUnreachable`].
    pub(crate) async fn fail<F>(&self, resp: Response, fallback: &str, wrap: F) -> ClientError
    where
        F: FnOnce(String) -> ClientError,
    {
        let status = resp.status();
        match read_failure(resp).await {
            Failure::Html => self.unreachable(format!("HTML error page (status {status})")),
            Failure::Message(text) => {
                tracing::warn!("Backend returned {status}: {text}");
                if text.trim().is_empty() {
                    wrap(fallback.to_string())
                } else {
                    wrap(text)
                }
            }
        }
    }

    fn unreachable(&self, detail: String) -> ClientError {
        tracing::error!("Backend at {} unusable: {detail}", self.base_url);
        ClientError::BackendUnreachable {
            base_url: self.base_url.clone(),
            detail,
        }
    }
}

pub(crate) async fn read_failure(resp: Response) -> Failure {
    let is_html = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"));
    let text = resp.text().await.unwrap_or_default();

    if is_html {
        Failure::Html
    } else {
        Failure::Message(text)
    }
}
