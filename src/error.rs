//! Error types for the ragdiff crate

use thiserror::Error;

/// Result type for ragdiff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ragdiff operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response (non-2xx, non-429) — never retried
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Remote endpoint signalled throttling (HTTP 429). Absorbed internally
    /// by the retry loop; callers only ever see `RetriesExhausted`.
    #[error("rate limited by remote endpoint")]
    Throttled {
        /// Server-suggested wait in seconds, when a parseable `Retry-After`
        /// header was present
        retry_after_secs: Option<u64>,
    },

    /// Sustained throttling outlasted the attempt ceiling
    #[error("rate limited after {attempts} attempts; last suggested wait was {last_wait_secs}s")]
    RetriesExhausted {
        /// Number of dispatch attempts made
        attempts: u32,
        /// Backoff that would have applied to one more attempt
        last_wait_secs: u64,
    },

    /// Unexpected response body shape — never retried
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Retrieval engine error (LightRAG server or GraphRAG CLI)
    #[error("Engine error: {0}")]
    Engine(String),

    /// Graph database error
    #[error("Database error: {0}")]
    Database(#[from] neo4rs::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
