use crate::{ClientError, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Other(String),
}

/// Raw HTTP response: status plus undecoded body
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        TransportResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Capability to POST a JSON body to a path under the queue service root.
///
/// Each call is independent; implementations keep no session state.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
    root: Url,
}

impl ReqwestTransport {
    /// Create a transport for the service at `root` (e.g. `http://127.0.0.1:8383/`)
    pub fn new(root: &str) -> Result<Self> {
        let mut root = root.trim().to_string();
        if !root.ends_with('/') {
            root.push('/');
        }

        let root = Url::parse(&root).map_err(|e| ClientError::InvalidApiRoot(format!("{root}: {e}")))?;
        if !matches!(root.scheme(), "http" | "https") {
            return Err(ClientError::InvalidApiRoot(format!(
                "{root}: scheme must be http or https"
            )));
        }

        Ok(ReqwestTransport {
            client: reqwest::Client::new(),
            root,
        })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, TransportError> {
        self.root
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Other(format!("invalid endpoint {path}: {e}")))
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else if error.is_connect() {
        TransportError::Connection(error.to_string())
    } else if error.is_body() || error.is_decode() {
        TransportError::Body(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| classify(e, timeout))?;

        Ok(TransportResponse::new(status, bytes.to_vec()))
    }
}
