//! Mock transports and signers for testing.
//!
//! Used by the unit and integration suites; not meant for production use.

use std::collections::VecDeque;

use querywire::QueryOutput;
use querywire::QueryResponse;
use querywire::Signature;
use querywire::SignedQuery;
use querywire::ValidationFail;
use scalepack::Encode;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::signer::Signer;
use crate::transport;
use crate::transport::Response;
use crate::transport::Transport;
use crate::transport::TransportError;

/// Replays a fixed script of responses in order and records every request.
///
/// Once the script runs out, every further request fails with
/// `TransportError::ConnectionLost`.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<transport::Result<Response>>>,
    requests: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = transport::Result<Response>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Raw bodies of every request submitted so far.
    pub async fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().await.clone()
    }

    /// Every request submitted so far, decoded.
    pub async fn signed_requests(&self) -> Result<Vec<SignedQuery>> {
        let requests = self.requests.lock().await;
        let mut decoded = Vec::with_capacity(requests.len());
        for body in requests.iter() {
            decoded.push(scalepack::decode_all::<SignedQuery>(body)?);
        }
        Ok(decoded)
    }

    /// Responses not yet handed out.
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn submit(&self, body: &[u8]) -> transport::Result<Response> {
        self.requests.lock().await.push(body.to_vec());
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::ConnectionLost("script exhausted".into())))
    }
}

/// A 200 response carrying one page of iterable output.
pub fn iterable(output: QueryOutput) -> transport::Result<Response> {
    Ok(Response::ok(QueryResponse::Iterable(output).encode()))
}

/// A rejection with the given 4xx status.
pub fn rejected(status: u16, fail: ValidationFail) -> transport::Result<Response> {
    Ok(Response::new(status, fail.encode()))
}

/// Signs by echoing the digest back, so tests can check what was signed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoSigner;

impl Signer for EchoSigner {
    fn sign(&self, message: &[u8]) -> Result<Signature> {
        Ok(Signature::new(message.to_vec()))
    }
}
