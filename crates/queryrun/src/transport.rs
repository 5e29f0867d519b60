//! # Transport Abstraction
//!
//! A minimal, async interface for submitting an encoded query and getting
//! back the HTTP-style status and body.
//!
//! ## Philosophy
//!
//! - **Byte-Oriented**: the transport knows nothing about queries or
//!   signatures. It moves opaque buffers and reports a status code.
//! - **No Retries**: a failure is reported once, to the caller.

/// Errors that occur at the network/transport layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The peer is unreachable or the connection was dropped.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
    /// The operation timed out before a response was received.
    #[error("request timed out")]
    Timeout,
    /// The server answered with a status that is neither success nor a
    /// client-side rejection.
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
    /// Generic I/O error or internal transport failure.
    #[error("i/o error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// What came back for one submitted body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Vec<u8>) -> Self {
        Self::new(200, body)
    }
}

/// A mechanism to submit a query body and receive the reply.
///
/// Object-safe, so clients hold it as `Arc<dyn Transport>`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Submits one encoded `SignedQuery` and waits for the response.
    ///
    /// # invariants
    /// - Must return `Ok` with whatever status the server sent.
    /// - Must return `Err` only if no response was received.
    async fn submit(&self, body: &[u8]) -> Result<Response>;
}
