//! Reasons the server gives for rejecting a query.
//!
//! These arrive as the body of a 4xx response.

use crate::entity::PeerId;
use crate::entity::Permission;
use crate::ids::AccountId;
use crate::ids::AssetDefinitionId;
use crate::ids::AssetId;
use crate::ids::DomainId;
use crate::ids::Hash;
use crate::ids::Name;
use crate::ids::PublicKey;
use crate::ids::RoleId;
use crate::ids::TriggerId;

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ValidationFail {
        /// The authority may not run this query.
        NotPermitted(String) = 0,
        QueryFailed(QueryExecutionFail) = 2,
        TooComplex = 3,
        InternalError = 4,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum QueryExecutionFail {
        Find(FindError) = 0,
        Conversion(String) = 1,
        NotFound = 2,
        /// The cursor names a different query than the one it continues.
        CursorMismatch = 3,
        /// The query behind the cursor has already been drained.
        CursorDone = 4,
        FetchSizeTooBig = 5,
        InvalidSingularParameters = 6,
        /// The server holds too many live queries.
        CapacityLimit = 7,
    }
}

scalepack::scale_enum! {
    /// The entity a lookup could not find.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum FindError {
        Asset(AssetId) = 0,
        AssetDefinition(AssetDefinitionId) = 1,
        Account(AccountId) = 2,
        Domain(DomainId) = 3,
        MetadataKey(Name) = 4,
        Block(Hash) = 5,
        Transaction(Hash) = 6,
        Peer(PeerId) = 7,
        Trigger(TriggerId) = 8,
        Role(RoleId) = 9,
        Permission(Permission) = 10,
        PublicKey(PublicKey) = 11,
    }
}

impl std::fmt::Display for ValidationFail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPermitted(reason) => write!(f, "not permitted: {}", reason),
            Self::QueryFailed(fail) => write!(f, "query failed: {}", fail),
            Self::TooComplex => f.write_str("query too complex"),
            Self::InternalError => f.write_str("internal server error"),
        }
    }
}

impl std::fmt::Display for QueryExecutionFail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Find(err) => write!(f, "{}", err),
            Self::Conversion(reason) => write!(f, "conversion failed: {}", reason),
            Self::NotFound => f.write_str("not found"),
            Self::CursorMismatch => f.write_str("cursor does not match the query"),
            Self::CursorDone => f.write_str("cursor already exhausted"),
            Self::FetchSizeTooBig => f.write_str("fetch size too big"),
            Self::InvalidSingularParameters => f.write_str("invalid singular query parameters"),
            Self::CapacityLimit => f.write_str("live query capacity reached"),
        }
    }
}

impl std::fmt::Display for FindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asset(id) => write!(f, "asset `{}` not found", id),
            Self::AssetDefinition(id) => write!(f, "asset definition `{}` not found", id),
            Self::Account(id) => write!(f, "account `{}` not found", id),
            Self::Domain(id) => write!(f, "domain `{}` not found", id),
            Self::MetadataKey(key) => write!(f, "metadata key `{}` not found", key),
            Self::Block(hash) => write!(f, "block `{}` not found", hash),
            Self::Transaction(hash) => write!(f, "transaction `{}` not found", hash),
            Self::Peer(peer) => write!(f, "peer `{}` not found", peer.public_key),
            Self::Trigger(id) => write!(f, "trigger `{}` not found", id),
            Self::Role(id) => write!(f, "role `{}` not found", id),
            Self::Permission(permission) => write!(f, "permission `{}` not found", permission.name),
            Self::PublicKey(key) => write!(f, "public key `{}` not found", key),
        }
    }
}

impl std::error::Error for ValidationFail {}
