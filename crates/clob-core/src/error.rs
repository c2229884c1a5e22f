//! Error types for CLOB authentication and order signing.

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("Signing error: {message}")]
    Signing { message: String },

    #[error("Order error: {message}")]
    Order { message: String },

    /// An error from a credential derivation that several callers awaited.
    #[error(transparent)]
    Shared(Arc<Error>),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub(crate) fn signing(message: impl Into<String>) -> Self {
        Error::Signing {
            message: message.into(),
        }
    }

    pub(crate) fn order(message: impl Into<String>) -> Self {
        Error::Order {
            message: message.into(),
        }
    }

    /// The underlying error, looking through [`Error::Shared`].
    pub fn root(&self) -> &Error {
        match self {
            Error::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// Signer or configuration is unusable. Never worth retrying.
    pub fn is_config(&self) -> bool {
        matches!(self.root(), Error::Config { .. } | Error::ConfigFile(_))
    }

    /// The remote service refused to hand out credentials, or none are set.
    pub fn is_auth(&self) -> bool {
        matches!(self.root(), Error::Auth { .. })
    }

    /// The request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self.root(), Error::Http(_) | Error::Transport { .. })
    }

    /// The remote service answered with a non-success status.
    pub fn is_api(&self) -> bool {
        matches!(self.root(), Error::Api { .. })
    }

    /// HTTP status attached to an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Error::Api { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
