mod macros;

pub mod error;
pub mod ids;
pub mod value;
pub mod entity;
pub mod predicate;
pub mod selector;
pub mod query;
pub mod output;
pub mod builder;
pub mod frame;
pub mod failure;
pub mod schema;

pub use error::Result;
pub use error::Error;

pub use ids::Name;
pub use ids::DomainId;
pub use ids::AccountId;
pub use ids::AssetDefinitionId;
pub use ids::AssetId;
pub use ids::PublicKey;
pub use ids::Hash;
pub use ids::Signature;

pub use value::Json;
pub use value::Metadata;
pub use value::Numeric;

pub use predicate::CompoundPredicate;

pub use query::IterableQuery;
pub use query::SingularQuery;
pub use query::QueryBox;
pub use query::QueryWithParams;

pub use output::QueryOutput;
pub use output::QueryOutputBatchBox;
pub use output::ForwardCursor;
pub use output::Selected;

pub use builder::QueryBuilder;
pub use builder::QueryDescriptor;

pub use frame::QueryRequest;
pub use frame::QueryResponse;
pub use frame::SignedQuery;

pub use failure::ValidationFail;

#[cfg(test)]
mod tests;
