//! # Query Client
//!
//! Signs requests on behalf of one authority and moves them over a
//! transport. Every request goes through `Client::send`, which maps the
//! response status to either a decoded `QueryResponse` or an error.
//!
//! | status   | outcome                                   |
//! |----------|-------------------------------------------|
//! | 200      | body decoded as `QueryResponse`           |
//! | 400..499 | body decoded as `ValidationFail`, raised  |
//! | other    | `TransportError::UnexpectedStatus`        |

use std::num::NonZeroU64;
use std::sync::Arc;

use querywire::AccountId;
use querywire::IterableQuery;
use querywire::QueryBuilder;
use querywire::QueryRequest;
use querywire::QueryResponse;
use querywire::ValidationFail;
use querywire::frame::QueryRequestWithAuthority;
use scalepack::Encode;
use tracing::debug;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::error::Result;
use crate::signer::Hasher;
use crate::signer::Sha256Hasher;
use crate::signer::Signer;
use crate::transport::Transport;
use crate::transport::TransportError;

/// A handle for running queries as one authority.
///
/// Cheap to clone; clones share the transport and signer.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    signer: Arc<dyn Signer>,
    hasher: Arc<dyn Hasher>,
    authority: AccountId,
    default_fetch_size: Option<NonZeroU64>,
}

impl Client {
    pub fn new(
        transport: Arc<dyn Transport>,
        signer: Arc<dyn Signer>,
        authority: AccountId,
    ) -> Self {
        Self {
            transport,
            signer,
            hasher: Arc::new(Sha256Hasher),
            authority,
            default_fetch_size: None,
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        Self::new(transport, signer, config.authority.clone())
            .with_default_fetch_size(config.default_fetch_size)
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_default_fetch_size(mut self, fetch_size: Option<NonZeroU64>) -> Self {
        self.default_fetch_size = fetch_size;
        self
    }

    pub fn authority(&self) -> &AccountId {
        &self.authority
    }

    /// Starts a query builder carrying this client's default fetch size.
    pub fn query<Q: IterableQuery>(&self, query: Q) -> QueryBuilder<Q> {
        QueryBuilder::new(query).fetch_size_or(self.default_fetch_size)
    }

    /// Signs and submits one request, then interprets the response status.
    pub async fn send(&self, request: QueryRequest) -> Result<QueryResponse> {
        let kind = request.tag();
        let signed = QueryRequestWithAuthority::new(self.authority.clone(), request).sign_with(
            |bytes: &[u8]| self.hasher.hash(bytes),
            |digest: &[u8]| self.signer.sign(digest),
        )?;
        let body = signed.encode();
        debug!(kind, bytes = body.len(), "sending query request");

        let response = self.transport.submit(&body).await?;
        match response.status {
            200 => Ok(scalepack::decode_all::<QueryResponse>(&response.body)?),
            400..=499 => {
                let fail = scalepack::decode_all::<ValidationFail>(&response.body)?;
                warn!(kind, status = response.status, reason = %fail, "query rejected");
                Err(Error::Validation(fail))
            }
            status => Err(TransportError::UnexpectedStatus(status).into()),
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("authority", &self.authority)
            .field("default_fetch_size", &self.default_fetch_size)
            .finish_non_exhaustive()
    }
}
