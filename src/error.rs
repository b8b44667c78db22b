//! Error types
//!
//! Domain errors are typed so the session loop can tell which stage of a
//! submission failed. The binary edge wraps everything in `anyhow`.

use reqwest::StatusCode;
use thiserror::Error;

/// Startup configuration failure. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set (export it or add it to .env)")]
    Missing(&'static str),

    #[error("invalid config file {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A single request to the article service failed.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Connection, timeout or body decoding failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("remote rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

impl RequestError {
    /// HTTP status of a rejected request, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Transport(e) => e.status(),
            RequestError::Rejected { status, .. } => Some(*status),
        }
    }
}

/// Failure of one find-or-create-then-append run, tagged by stage.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("failed to look up {full_name}: {source}")]
    Lookup {
        full_name: String,
        #[source]
        source: RequestError,
    },

    #[error("failed to create {full_name} from template: {source}")]
    Create {
        full_name: String,
        #[source]
        source: RequestError,
    },

    #[error("{full_name} not found after creating it ({attempts} lookups)")]
    ArticleNotFoundAfterCreate {
        full_name: String,
        attempts: u32,
        #[source]
        last_error: Option<RequestError>,
    },

    #[error("failed to append to {full_name}: {source}")]
    Append {
        full_name: String,
        #[source]
        source: RequestError,
    },
}
