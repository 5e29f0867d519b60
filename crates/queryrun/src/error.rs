//! # Error Definitions
//!
//! Every way running a query can fail. The variants keep three outcomes
//! apart: the server rejected the query (`Validation`), the server could not
//! be reached (`Transport`), or the answer did not have the expected number
//! of items (`Cardinality`). An empty result is not an error.

use querywire::ValidationFail;

use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The server answered with a rejection.
    #[error("query rejected: {0}")]
    Validation(ValidationFail),
    /// A request or response that does not fit the wire model.
    #[error("codec error: {0}")]
    Codec(#[from] querywire::Error),
    /// A well-formed response of the wrong kind.
    #[error("protocol violation: {0}")]
    Protocol(String),
    #[error("expected {expected} item(s), got {found}")]
    Cardinality { expected: &'static str, found: usize },
    #[error("signing failed: {0}")]
    Signer(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<scalepack::Error> for Error {
    fn from(e: scalepack::Error) -> Self {
        Self::Codec(querywire::Error::Codec(e))
    }
}

impl Error {
    /// The rejection reason, if the server refused the query.
    pub fn validation(&self) -> Option<&ValidationFail> {
        match self {
            Self::Validation(fail) => Some(fail),
            _ => None,
        }
    }
}

/// A specialized Result type for queryrun operations.
pub type Result<T> = std::result::Result<T, Error>;
