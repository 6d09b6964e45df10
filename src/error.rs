use thiserror::Error;

/// Errors raised outside the engines: talking to the backend, decoding its
/// payloads, and screening samples before they reach the smoother.
#[derive(Debug, Error)]
pub enum Error {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("backend returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("rejected sample for {entity_id}: {reason}")]
    InvalidSample { entity_id: String, reason: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
