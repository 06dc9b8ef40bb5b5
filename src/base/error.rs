//! Pipeline-level errors.
//!
//! Two classes exist. [`Error::Connect`] is terminal: no later step can
//! produce anything once the transport failed to open a connection, and the
//! caller must report it and stop. Every other variant is an ordinary,
//! recoverable result carrying its original cause.

use crate::base::neterror::NetError;
use thiserror::Error;

/// The outbound request could not be constructed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unable to create request {method} {url}: {cause}")]
pub struct BuildError {
    pub method: String,
    pub url: String,
    pub cause: String,
}

impl BuildError {
    pub fn new(method: impl Into<String>, url: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            cause: cause.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The network connection could not be established.
    #[error("unable to connect to host {addr}: {source}")]
    Connect { addr: String, source: NetError },

    /// The round trip failed after (or without) a connection.
    #[error("failed to read response from {url}: {source}")]
    Exec { url: String, source: NetError },
}

impl Error {
    /// True for the one failure class the caller must treat as terminal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Connect { .. })
    }

    /// Underlying network code, if the failure came from the network.
    pub fn net_error(&self) -> Option<NetError> {
        match self {
            Error::Build(_) => None,
            Error::Connect { source, .. } | Error::Exec { source, .. } => Some(*source),
        }
    }
}
