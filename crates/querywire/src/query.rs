//! # Queries
//!
//! Iterable queries stream entities in batches; singular queries return one
//! value in one round trip.
//!
//! Each iterable query kind fixes, through `IterableQuery`, which predicate
//! may filter it, which selector may shape its output and what item type it
//! yields. Pairing a kind with the wrong predicate does not compile.
//!
//! ## Invariants
//! - **Closed set**: `QueryBox` lists every kind with its wire discriminant;
//!   a kind that is not in the box cannot be sent.

use std::num::NonZeroU64;

use scalepack::Cursor;
use scalepack::Decode;
use scalepack::Encode;

use crate::entity::Account;
use crate::entity::AssetDefinition;
use crate::entity::Asset;
use crate::entity::Domain;
use crate::entity::PeerId;
use crate::entity::Permission;
use crate::entity::Role;
use crate::ids::AccountId;
use crate::ids::AssetDefinitionId;
use crate::ids::AssetId;
use crate::ids::DomainId;
use crate::ids::Name;
use crate::ids::RoleId;
use crate::ids::TriggerId;
use crate::output::Selected;
use crate::predicate::AccountPredicate;
use crate::predicate::AssetDefinitionPredicate;
use crate::predicate::AssetPredicate;
use crate::predicate::CompoundPredicate;
use crate::predicate::DomainPredicate;
use crate::predicate::PeerIdPredicate;
use crate::predicate::PermissionPredicate;
use crate::predicate::RoleIdPredicate;
use crate::predicate::RolePredicate;
use crate::predicate::TriggerIdPredicate;
use crate::selector::AccountSelector;
use crate::selector::AssetDefinitionSelector;
use crate::selector::AssetSelector;
use crate::selector::AtomSelector;
use crate::selector::DomainSelector;
use crate::selector::PeerIdSelector;
use crate::selector::PermissionSelector;
use crate::selector::RoleIdSelector;
use crate::selector::RoleSelector;
use crate::selector::TriggerIdSelector;
use crate::value::Json;
use crate::value::Numeric;

// ==== ITERABLE ====

/// Query kinds with no parameters; they encode to nothing.
macro_rules! unit_query {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl Encode for $name {
                fn encode_to(&self, _out: &mut Vec<u8>) {}
            }

            impl Decode for $name {
                fn decode(_cur: &mut Cursor<'_>) -> scalepack::Result<Self> {
                    Ok(Self)
                }
            }
        )+
    };
}

unit_query! {
    FindDomains,
    FindAccounts,
    FindAssets,
    FindAssetsDefinitions,
    FindRoles,
    FindRoleIds,
    FindPeers,
    /// Ids of triggers that have not yet been exhausted.
    FindActiveTriggerIds,
}

scalepack::scale_struct! {
    /// Permissions granted directly to an account.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FindPermissionsByAccountId {
        pub id: AccountId,
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FindRolesByAccountId {
        pub id: AccountId,
    }
}

scalepack::scale_struct! {
    /// Accounts holding an asset of the given definition.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FindAccountsWithAsset {
        pub asset_definition: AssetDefinitionId,
    }
}

/// A query kind together with its filter and output shape.
///
/// Wire order is `query`, `predicate`, `selector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWithFilter<Q, P, S> {
    pub query: Q,
    pub predicate: CompoundPredicate<P>,
    pub selector: Vec<S>,
}

impl<Q, P, S> QueryWithFilter<Q, P, S> {
    pub fn new(query: Q, predicate: CompoundPredicate<P>, selector: Vec<S>) -> Self {
        Self { query, predicate, selector }
    }
}

impl<Q: Encode, P: Encode, S: Encode> Encode for QueryWithFilter<Q, P, S> {
    fn encode_to(&self, out: &mut Vec<u8>) {
        self.query.encode_to(out);
        self.predicate.encode_to(out);
        self.selector.encode_to(out);
    }
}

impl<Q: Decode, P: Decode, S: Decode> Decode for QueryWithFilter<Q, P, S> {
    fn decode(cur: &mut Cursor<'_>) -> scalepack::Result<Self> {
        let query = Q::decode(cur)?;
        let predicate = CompoundPredicate::decode(cur)?;
        let selector = Vec::decode(cur)?;
        Ok(Self { query, predicate, selector })
    }
}

/// Binds an iterable query kind to its filter, output shape and item type.
pub trait IterableQuery: Encode + Sized {
    type Predicate: Encode;
    type Selector: AtomSelector + Encode;
    /// What one `Atom` selection of this query yields.
    type Item: Selected;

    fn into_box(query: QueryWithFilter<Self, Self::Predicate, Self::Selector>) -> QueryBox;
}

macro_rules! iterable_queries {
    ($($kind:ident => ($pred:ty, $sel:ty, $item:ty) = $disc:literal),+ $(,)?) => {
        scalepack::scale_enum! {
            /// Every iterable query kind, filtered and shaped.
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub enum QueryBox {
                $( $kind(QueryWithFilter<$kind, $pred, $sel>) = $disc ),+
            }
        }

        $(
            impl IterableQuery for $kind {
                type Predicate = $pred;
                type Selector = $sel;
                type Item = $item;

                fn into_box(query: QueryWithFilter<Self, $pred, $sel>) -> QueryBox {
                    QueryBox::$kind(query)
                }
            }
        )+
    };
}

iterable_queries! {
    FindDomains => (DomainPredicate, DomainSelector, Domain) = 0,
    FindAccounts => (AccountPredicate, AccountSelector, Account) = 1,
    FindAssets => (AssetPredicate, AssetSelector, Asset) = 2,
    FindAssetsDefinitions => (AssetDefinitionPredicate, AssetDefinitionSelector, AssetDefinition) = 3,
    FindRoles => (RolePredicate, RoleSelector, Role) = 4,
    FindRoleIds => (RoleIdPredicate, RoleIdSelector, RoleId) = 5,
    FindPermissionsByAccountId => (PermissionPredicate, PermissionSelector, Permission) = 6,
    FindRolesByAccountId => (RoleIdPredicate, RoleIdSelector, RoleId) = 7,
    FindAccountsWithAsset => (AccountPredicate, AccountSelector, Account) = 8,
    FindPeers => (PeerIdPredicate, PeerIdSelector, PeerId) = 9,
    FindActiveTriggerIds => (TriggerIdPredicate, TriggerIdSelector, TriggerId) = 10,
}

// ==== PARAMETERS ====

scalepack::scale_struct! {
    /// Skip `offset` matches, then return at most `limit`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pagination {
        pub limit: Option<NonZeroU64>,
        pub offset: u64,
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Sorting {
        pub sort_by_metadata_key: Option<Name>,
    }
}

scalepack::scale_struct! {
    /// How the server pages through the results of one query.
    ///
    /// `fetch_size` caps the number of items per batch; the server picks a
    /// default when it is absent.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct QueryParams {
        pub pagination: Pagination,
        pub sorting: Sorting,
        pub fetch_size: Option<NonZeroU64>,
    }
}

scalepack::scale_struct! {
    /// The payload of a `Start` request.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct QueryWithParams {
        pub query: QueryBox,
        pub params: QueryParams,
    }
}

// ==== SINGULAR ====

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FindAssetQuantityById {
        pub id: AssetId,
    }
}

/// Metadata lookups: one entity id and one key.
macro_rules! metadata_query {
    ($($name:ident($id:ty)),+ $(,)?) => {
        $(
            scalepack::scale_struct! {
                #[derive(Debug, Clone, PartialEq, Eq)]
                pub struct $name {
                    pub id: $id,
                    pub key: Name,
                }
            }

            impl SingularQuery for $name {
                type Output = Json;

                fn into_box(self) -> SingularQueryBox {
                    SingularQueryBox::$name(self)
                }

                fn extract(output: SingularQueryOutputBox) -> Option<Json> {
                    match output {
                        SingularQueryOutputBox::Json(json) => Some(json),
                        _ => None,
                    }
                }
            }
        )+
    };
}

metadata_query! {
    FindDomainMetadata(DomainId),
    FindAccountMetadata(AccountId),
    FindAssetMetadata(AssetId),
    FindAssetDefinitionMetadata(AssetDefinitionId),
    FindTriggerMetadata(TriggerId),
}

scalepack::scale_enum! {
    /// Every singular query kind.
    ///
    /// Discriminants 1 and 2 are kinds this client does not send.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SingularQueryBox {
        FindAssetQuantityById(FindAssetQuantityById) = 0,
        FindDomainMetadata(FindDomainMetadata) = 3,
        FindAccountMetadata(FindAccountMetadata) = 4,
        FindAssetMetadata(FindAssetMetadata) = 5,
        FindAssetDefinitionMetadata(FindAssetDefinitionMetadata) = 6,
        FindTriggerMetadata(FindTriggerMetadata) = 7,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SingularQueryOutputBox {
        Numeric(Numeric) = 0,
        Json(Json) = 2,
    }
}

/// Binds a singular query kind to the output it expects.
pub trait SingularQuery: Sized {
    type Output;

    fn into_box(self) -> SingularQueryBox;

    /// Pulls the expected output out of the box, or `None` on a mismatch.
    fn extract(output: SingularQueryOutputBox) -> Option<Self::Output>;
}

impl SingularQuery for FindAssetQuantityById {
    type Output = Numeric;

    fn into_box(self) -> SingularQueryBox {
        SingularQueryBox::FindAssetQuantityById(self)
    }

    fn extract(output: SingularQueryOutputBox) -> Option<Numeric> {
        match output {
            SingularQueryOutputBox::Numeric(numeric) => Some(numeric),
            _ => None,
        }
    }
}
