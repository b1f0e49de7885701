//! Backend HTTP client
//!
//! Talks to the test-execution service:
//! - `GET  {base}/results`   -> JSON array of test results
//! - `POST {base}/run-tests` -> triggers a run, body ignored

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;

use crate::model::{decode_results, TestResult};
use crate::utils::Config;

/// Errors talking to the backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, DNS or timeout failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("backend responded with {0}")]
    Status(StatusCode),

    /// The body was not JSON at all
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// The two operations the dashboard needs from the backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch the current result list (non-array payloads decode as empty)
    async fn fetch_results(&self) -> BackendResult<Vec<TestResult>>;

    /// Trigger a test run
    async fn run_tests(&self) -> BackendResult<()>;
}

/// reqwest-backed [`Backend`]
pub struct HttpBackend {
    /// Base URL (e.g., "http://localhost:5001")
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &Config) -> BackendResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_results(&self) -> BackendResult<Vec<TestResult>> {
        let url = self.endpoint("results");
        log::debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let body = resp.bytes().await?;
        let payload: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(decode_results(payload))
    }

    async fn run_tests(&self) -> BackendResult<()> {
        let url = self.endpoint("run-tests");
        log::debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        Ok(())
    }
}
