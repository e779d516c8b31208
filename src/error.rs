//! Engine error types.
//!
//! Most engine operations cannot fail: invalid user input degrades to a no-op
//! (an empty keyword, an out-of-range page). Errors exist for the edges where
//! text crosses into typed values (category names, search types, sort
//! directions), for backend payloads, and for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error raised by the query-state engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A descriptor category name that is not one of the five known tables.
    #[error("unknown descriptor category '{0}'")]
    UnknownCategory(String),

    /// A coin side other than obverse/reverse.
    #[error("unknown coin side '{0}'")]
    UnknownSide(String),

    /// A search type the backend does not understand.
    #[error("unknown search type '{0}'")]
    UnknownSearchType(String),

    /// A sort direction other than ascending/descending.
    #[error("unknown sort direction '{0}'")]
    UnknownSortDirection(String),

    /// The backend answered with `success: false` or without a result.
    #[error("backend request '{action}' failed: {message}")]
    Backend { action: &'static str, message: String },

    /// A payload could not be encoded or decoded.
    #[error("failed to process JSON payload")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// The configuration file could not be read.
    #[error("failed to read config file: {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// More coins than a relation inspection will materialize.
    #[error("cannot inspect against {requested} coins (at most {max})")]
    TooManyCoins { requested: usize, max: usize },

    /// The configuration was readable but semantically invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
