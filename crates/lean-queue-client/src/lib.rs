mod fetcher;
mod reporter;
mod retry;
mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use fetcher::{FetchOutcome, TaskFetcher};
pub use reporter::Reporter;
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};

use lean_queue_protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Server rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid API root: {0}")]
    InvalidApiRoot(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
