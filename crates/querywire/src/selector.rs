//! # Selectors
//!
//! A selector picks which part of each matching entity comes back. Selectors
//! mirror the predicate projections: `Atom` takes the value at the current
//! position whole, the other variants descend into a field.
//!
//! A query carries a list of selectors; each one yields its own output batch,
//! so a two-element list produces pairs.

use crate::ids::Name;

/// Selectors that can stop at the current position.
pub trait AtomSelector: Sized {
    fn atom() -> Self;
}

macro_rules! atom_selector {
    ($($name:ident),+ $(,)?) => {
        $(
            impl AtomSelector for $name {
                fn atom() -> Self {
                    Self::Atom
                }
            }
        )+
    };
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum NameSelector {
        Atom = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DomainIdSelector {
        Atom = 0,
        Name(NameSelector) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PublicKeySelector {
        Atom = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AccountIdSelector {
        Atom = 0,
        Domain(DomainIdSelector) = 1,
        Signatory(PublicKeySelector) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetDefinitionIdSelector {
        Atom = 0,
        Domain(DomainIdSelector) = 1,
        Name(NameSelector) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetIdSelector {
        Atom = 0,
        Account(AccountIdSelector) = 1,
        Definition(AssetDefinitionIdSelector) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum JsonSelector {
        Atom = 0,
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MetadataKeySelector {
        pub key: Name,
        pub projection: JsonSelector,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MetadataSelector {
        Atom = 0,
        Key(MetadataKeySelector) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum NumericSelector {
        Atom = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetValueSelector {
        Atom = 0,
        Numeric(NumericSelector) = 1,
        Store(MetadataSelector) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DomainSelector {
        Atom = 0,
        Id(DomainIdSelector) = 1,
        Metadata(MetadataSelector) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AccountSelector {
        Atom = 0,
        Id(AccountIdSelector) = 1,
        Metadata(MetadataSelector) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetSelector {
        Atom = 0,
        Id(AssetIdSelector) = 1,
        Value(AssetValueSelector) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetDefinitionSelector {
        Atom = 0,
        Id(AssetDefinitionIdSelector) = 1,
        Metadata(MetadataSelector) = 2,
        OwnedBy(AccountIdSelector) = 3,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RoleIdSelector {
        Atom = 0,
        Name(NameSelector) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RoleSelector {
        Atom = 0,
        Id(RoleIdSelector) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PermissionSelector {
        Atom = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PeerIdSelector {
        Atom = 0,
        PublicKey(PublicKeySelector) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TriggerIdSelector {
        Atom = 0,
        Name(NameSelector) = 1,
    }
}

atom_selector!(
    NameSelector,
    DomainIdSelector,
    PublicKeySelector,
    AccountIdSelector,
    AssetDefinitionIdSelector,
    AssetIdSelector,
    JsonSelector,
    MetadataSelector,
    NumericSelector,
    AssetValueSelector,
    DomainSelector,
    AccountSelector,
    AssetSelector,
    AssetDefinitionSelector,
    RoleIdSelector,
    RoleSelector,
    PermissionSelector,
    PeerIdSelector,
    TriggerIdSelector,
);

impl DomainSelector {
    pub fn id() -> Self {
        Self::Id(DomainIdSelector::Atom)
    }

    pub fn metadata_key(key: Name) -> Self {
        let projection = JsonSelector::Atom;
        Self::Metadata(MetadataSelector::Key(MetadataKeySelector { key, projection }))
    }
}

impl AccountSelector {
    pub fn id() -> Self {
        Self::Id(AccountIdSelector::Atom)
    }

    pub fn metadata_key(key: Name) -> Self {
        let projection = JsonSelector::Atom;
        Self::Metadata(MetadataSelector::Key(MetadataKeySelector { key, projection }))
    }
}

impl AssetSelector {
    pub fn id() -> Self {
        Self::Id(AssetIdSelector::Atom)
    }

    pub fn value() -> Self {
        Self::Value(AssetValueSelector::Atom)
    }
}
