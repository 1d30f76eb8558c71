//! HTTP client for the FAQ backend: ask, snapshot, categories, suggestions, health.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ApiSection;
use crate::messages::{AskRequest, AskResponse, FaqEntry, ServiceStatus};

/// Client error. Every variant is a "query failed" outcome for the stores.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error: {status}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Connected HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Build a client for the API rooted at `base_url` (e.g. `http://localhost:3000/api`).
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(api: &ApiSection) -> Result<Self, ClientError> {
        Self::new(api.base_url(), api.request_timeout(), api.connect_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /ask` with `{"question": ...}`.
    pub async fn ask(&self, question: &str) -> Result<AskResponse, ClientError> {
        tracing::debug!(question, "POST /ask");
        let response = self
            .http
            .post(self.url("/ask"))
            .json(&AskRequest::new(question))
            .send()
            .await?;
        read_json(response).await
    }

    /// `GET /all`: the whole FAQ corpus in one response.
    pub async fn all_entries(&self) -> Result<Vec<FaqEntry>, ClientError> {
        tracing::debug!("GET /all");
        let response = self.http.get(self.url("/all")).send().await?;
        read_json(response).await
    }

    /// `GET /categories`: sorted category names.
    pub async fn categories(&self) -> Result<Vec<String>, ClientError> {
        let response = self.http.get(self.url("/categories")).send().await?;
        read_json(response).await
    }

    /// `GET /suggestions?n=`: a random sample of questions.
    pub async fn suggestions(&self, n: usize) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(self.url("/suggestions"))
            .query(&[("n", n)])
            .send()
            .await?;
        read_json(response).await
    }

    /// `GET /` health probe.
    pub async fn status(&self) -> Result<ServiceStatus, ClientError> {
        let response = self.http.get(self.url("/")).send().await?;
        read_json(response).await
    }
}

/// Non-2xx is an error; otherwise the body must parse as `T`.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status { status, body });
    }
    Ok(serde_json::from_str(&body)?)
}
