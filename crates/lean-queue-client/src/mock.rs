//! Scripted in-memory transport for tests.

use crate::{HttpTransport, TransportError, TransportResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

type Scripted = std::result::Result<TransportResponse, TransportError>;

/// A request captured by [`ScriptedTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub path: String,
    pub body: serde_json::Value,
    pub timeout: Duration,
}

/// Replays queued responses per path and records every request.
///
/// Once a path's queue is drained the fallback for that path is used; with
/// no fallback the call fails with a connection error.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    fallbacks: Mutex<HashMap<String, TransportResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response for `path`
    pub fn respond(&self, path: &str, status: u16, body: serde_json::Value) -> &Self {
        self.push(path, Ok(TransportResponse::new(status, body.to_string())));
        self
    }

    /// Queue a raw (possibly non-JSON) response for `path`
    pub fn respond_raw(&self, path: &str, status: u16, body: &str) -> &Self {
        self.push(path, Ok(TransportResponse::new(status, body)));
        self
    }

    /// Queue a transport failure for `path`
    pub fn fail(&self, path: &str, error: TransportError) -> &Self {
        self.push(path, Err(error));
        self
    }

    /// Response used for `path` once its queue is empty
    pub fn fallback(&self, path: &str, status: u16, body: serde_json::Value) -> &Self {
        self.fallbacks
            .lock()
            .insert(path.to_string(), TransportResponse::new(status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Bodies sent to `path`, in order
    pub fn bodies(&self, path: &str) -> Vec<serde_json::Value> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.body.clone())
            .collect()
    }

    fn push(&self, path: &str, response: Scripted) {
        self.scripts
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.requests.lock().push(RecordedRequest {
            path: path.to_string(),
            body: body.clone(),
            timeout,
        });

        if let Some(next) = self
            .scripts
            .lock()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
        {
            return next;
        }

        self.fallbacks
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| TransportError::Connection(format!("no scripted response for {path}")))
    }
}
