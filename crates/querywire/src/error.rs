//! # Error Definitions
//!
//! Failures raised while constructing wire values from user input or while
//! interpreting decoded output.

/// Failures produced by querywire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] scalepack::Error),
    /// A name that is empty or contains a reserved character.
    #[error("invalid name {input:?}: {reason}")]
    InvalidName { input: String, reason: &'static str },
    /// An identifier whose text form does not parse.
    #[error("invalid {kind} {input:?}: {reason}")]
    InvalidId { kind: &'static str, input: String, reason: String },
    /// A public key multihash that does not parse.
    #[error("invalid public key {input:?}: {reason}")]
    InvalidPublicKey { input: String, reason: String },
    /// A string that is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    /// A numeric literal that does not parse.
    #[error("invalid numeric {0:?}")]
    InvalidNumeric(String),
    /// Output batches that do not match what the query selected.
    #[error("unexpected output shape: {0}")]
    OutputShape(String),
}

/// A specialized Result type for querywire operations.
pub type Result<T> = std::result::Result<T, Error>;
