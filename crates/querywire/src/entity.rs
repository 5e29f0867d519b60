//! Ledger entities as they appear in query output.

use crate::ids::AccountId;
use crate::ids::AssetDefinitionId;
use crate::ids::AssetId;
use crate::ids::DomainId;
use crate::ids::PublicKey;
use crate::ids::RoleId;
use crate::value::IpfsPath;
use crate::value::Json;
use crate::value::Metadata;
use crate::value::Numeric;
use crate::value::NumericSpec;

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Domain {
        pub id: DomainId,
        pub logo: Option<IpfsPath>,
        pub metadata: Metadata,
        pub owned_by: AccountId,
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Account {
        pub id: AccountId,
        pub metadata: Metadata,
    }
}

scalepack::scale_enum! {
    /// What an asset holds: a quantity, or a key-value store.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetValue {
        Numeric(Numeric) = 0,
        Store(Metadata) = 1,
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Asset {
        pub id: AssetId,
        pub value: AssetValue,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum AssetType {
        Numeric(NumericSpec) = 0,
        Store = 1,
    }
}

scalepack::scale_enum! {
    /// Whether more of an asset may be minted after registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Mintable {
        Infinitely = 0,
        Once = 1,
        Not = 2,
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AssetDefinition {
        pub id: AssetDefinitionId,
        pub r#type: AssetType,
        pub mintable: Mintable,
        pub logo: Option<IpfsPath>,
        pub metadata: Metadata,
        pub owned_by: AccountId,
        pub total_quantity: Numeric,
    }
}

scalepack::scale_struct! {
    /// A named capability with an executor-defined JSON payload.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct Permission {
        pub name: String,
        pub payload: Json,
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Role {
        pub id: RoleId,
        pub permissions: Vec<Permission>,
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct PeerId {
        pub public_key: PublicKey,
    }
}
