//! # Frames
//!
//! The envelopes exchanged with the query endpoint. Every request is a
//! `SignedQuery`; every successful response is a `QueryResponse`.
//!
//! ```text
//! client                                   server
//!   | SignedQuery(Start(QueryWithParams))     |
//!   | --------------------------------------> |
//!   |            Iterable(QueryOutput+cursor) |
//!   | <-------------------------------------- |
//!   | SignedQuery(Continue(cursor))           |
//!   | --------------------------------------> |
//!   |              Iterable(QueryOutput, end) |
//!   | <-------------------------------------- |
//! ```
//!
//! ## Invariants
//! - **Signed payload**: the signature covers the hash of the encoded
//!   `QueryRequestWithAuthority`, nothing more and nothing less.

use scalepack::Encode;

use crate::ids::AccountId;
use crate::ids::Hash;
use crate::ids::Signature;
use crate::output::ForwardCursor;
use crate::output::QueryOutput;
use crate::query::QueryWithParams;
use crate::query::SingularQueryBox;
use crate::query::SingularQueryOutputBox;

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum QueryRequest {
        Singular(SingularQueryBox) = 0,
        Start(QueryWithParams) = 1,
        Continue(ForwardCursor) = 2,
    }
}

scalepack::scale_struct! {
    /// A request and the account it is made on behalf of.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct QueryRequestWithAuthority {
        pub authority: AccountId,
        pub request: QueryRequest,
    }
}

impl QueryRequestWithAuthority {
    pub fn new(authority: AccountId, request: QueryRequest) -> Self {
        Self { authority, request }
    }

    /// Signs `hash(encode(self))` and wraps the result for sending.
    pub fn sign_with<E>(
        self,
        hash: impl FnOnce(&[u8]) -> Hash,
        sign: impl FnOnce(&[u8]) -> Result<Signature, E>,
    ) -> Result<SignedQuery, E> {
        let digest = hash(&self.encode());
        let signature = sign(digest.as_bytes())?;
        Ok(SignedQuery::V1(SignedQueryV1 { signature, payload: self }))
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SignedQueryV1 {
        pub signature: Signature,
        pub payload: QueryRequestWithAuthority,
    }
}

scalepack::scale_enum! {
    /// Versioned wrapper around a signed request.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SignedQuery {
        V1(SignedQueryV1) = 1,
    }
}

impl SignedQuery {
    pub fn payload(&self) -> &QueryRequestWithAuthority {
        match self {
            Self::V1(query) => &query.payload,
        }
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum QueryResponse {
        Singular(SingularQueryOutputBox) = 0,
        Iterable(QueryOutput) = 1,
    }
}
