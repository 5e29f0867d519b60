//! # Predicates
//!
//! A query filter is a `CompoundPredicate` over a projection type. A
//! projection either compares the current value directly (`Atom`) or descends
//! into one of its fields; the field's own projection continues from there.
//!
//! ```text
//! DomainPredicate::Id(DomainIdPredicate::Name(NamePredicate::Atom(StringAtom::StartsWith("w"))))
//! ```
//!
//! ## Invariants
//! - **Atom first**: variant 0 of every projection is `Atom`; field
//!   projections follow in field order.
//! - **Neutral elements**: `And([])` always matches (`PASS`) and `Or([])`
//!   never matches (`FAIL`).

use scalepack::Cursor;
use scalepack::Decode;
use scalepack::Encode;

use crate::ids::AccountId;
use crate::ids::AssetDefinitionId;
use crate::ids::AssetId;
use crate::ids::DomainId;
use crate::ids::Name;
use crate::ids::PublicKey;
use crate::ids::RoleId;
use crate::ids::TriggerId;
use crate::macros::empty_atom;
use crate::value::Json;

/// Boolean combination of predicates over `A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompoundPredicate<A> {
    Atom(A),
    Not(Box<CompoundPredicate<A>>),
    And(Vec<CompoundPredicate<A>>),
    Or(Vec<CompoundPredicate<A>>),
}

impl<A> CompoundPredicate<A> {
    /// Matches everything.
    pub const PASS: Self = Self::And(Vec::new());
    /// Matches nothing.
    pub const FAIL: Self = Self::Or(Vec::new());

    pub fn atom(atom: A) -> Self {
        Self::Atom(atom)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Conjunction, flattening nested `And`s.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }

    /// Disjunction, flattening nested `Or`s.
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (this, other) => Self::Or(vec![this, other]),
        }
    }
}

impl<A> Default for CompoundPredicate<A> {
    fn default() -> Self {
        Self::PASS
    }
}

impl<A: Encode> Encode for CompoundPredicate<A> {
    fn encode_to(&self, out: &mut Vec<u8>) {
        match self {
            Self::Atom(atom) => {
                out.push(0);
                atom.encode_to(out);
            }
            Self::Not(inner) => {
                out.push(1);
                inner.encode_to(out);
            }
            Self::And(items) => {
                out.push(2);
                items.encode_to(out);
            }
            Self::Or(items) => {
                out.push(3);
                items.encode_to(out);
            }
        }
    }
}

impl<A: Decode> Decode for CompoundPredicate<A> {
    fn decode(cur: &mut Cursor<'_>) -> scalepack::Result<Self> {
        match cur.read_byte()? {
            0 => A::decode(cur).map(Self::Atom),
            1 => Box::decode(cur).map(Self::Not),
            2 => Vec::decode(cur).map(Self::And),
            3 => Vec::decode(cur).map(Self::Or),
            other => Err(scalepack::Error::UnknownDiscriminant {
                ty: "CompoundPredicate".into(),
                discriminant: other,
            }),
        }
    }
}

// ==== ATOMS ====

scalepack::scale_enum! {
    /// Comparisons on a string value.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum StringAtom {
        Equals(String) = 0,
        Contains(String) = 1,
        StartsWith(String) = 2,
        EndsWith(String) = 3,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DomainIdAtom {
        Equals(DomainId) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PublicKeyAtom {
        Equals(PublicKey) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AccountIdAtom {
        Equals(AccountId) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetDefinitionIdAtom {
        Equals(AssetDefinitionId) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetIdAtom {
        Equals(AssetId) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum JsonAtom {
        Equals(Json) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetValueAtom {
        IsNumeric = 0,
        IsStore = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RoleIdAtom {
        Equals(RoleId) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TriggerIdAtom {
        Equals(TriggerId) = 0,
    }
}

empty_atom! {
    MetadataAtom,
    NumericAtom,
    DomainAtom,
    AccountAtom,
    AssetAtom,
    AssetDefinitionAtom,
    RoleAtom,
    PermissionAtom,
    PeerIdAtom,
}

// ==== PROJECTIONS ====

scalepack::scale_enum! {
    /// Predicate over a `Name` or plain string.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum NamePredicate {
        Atom(StringAtom) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DomainIdPredicate {
        Atom(DomainIdAtom) = 0,
        Name(NamePredicate) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PublicKeyPredicate {
        Atom(PublicKeyAtom) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AccountIdPredicate {
        Atom(AccountIdAtom) = 0,
        Domain(DomainIdPredicate) = 1,
        Signatory(PublicKeyPredicate) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetDefinitionIdPredicate {
        Atom(AssetDefinitionIdAtom) = 0,
        Domain(DomainIdPredicate) = 1,
        Name(NamePredicate) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetIdPredicate {
        Atom(AssetIdAtom) = 0,
        Account(AccountIdPredicate) = 1,
        Definition(AssetDefinitionIdPredicate) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum JsonPredicate {
        Atom(JsonAtom) = 0,
    }
}

scalepack::scale_struct! {
    /// Descends into the metadata entry stored under `key`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MetadataKeyPredicate {
        pub key: Name,
        pub projection: JsonPredicate,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MetadataPredicate {
        Atom(MetadataAtom) = 0,
        Key(MetadataKeyPredicate) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum NumericPredicate {
        Atom(NumericAtom) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetValuePredicate {
        Atom(AssetValueAtom) = 0,
        Numeric(NumericPredicate) = 1,
        Store(MetadataPredicate) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DomainPredicate {
        Atom(DomainAtom) = 0,
        Id(DomainIdPredicate) = 1,
        Metadata(MetadataPredicate) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AccountPredicate {
        Atom(AccountAtom) = 0,
        Id(AccountIdPredicate) = 1,
        Metadata(MetadataPredicate) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetPredicate {
        Atom(AssetAtom) = 0,
        Id(AssetIdPredicate) = 1,
        Value(AssetValuePredicate) = 2,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AssetDefinitionPredicate {
        Atom(AssetDefinitionAtom) = 0,
        Id(AssetDefinitionIdPredicate) = 1,
        Metadata(MetadataPredicate) = 2,
        OwnedBy(AccountIdPredicate) = 3,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RoleIdPredicate {
        Atom(RoleIdAtom) = 0,
        Name(NamePredicate) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RolePredicate {
        Atom(RoleAtom) = 0,
        Id(RoleIdPredicate) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PermissionPredicate {
        Atom(PermissionAtom) = 0,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PeerIdPredicate {
        Atom(PeerIdAtom) = 0,
        PublicKey(PublicKeyPredicate) = 1,
    }
}

scalepack::scale_enum! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TriggerIdPredicate {
        Atom(TriggerIdAtom) = 0,
        Name(NamePredicate) = 1,
    }
}

// ==== SHORTHANDS ====

impl NamePredicate {
    pub fn equals(value: impl Into<String>) -> Self {
        Self::Atom(StringAtom::Equals(value.into()))
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self::Atom(StringAtom::Contains(value.into()))
    }

    pub fn starts_with(value: impl Into<String>) -> Self {
        Self::Atom(StringAtom::StartsWith(value.into()))
    }

    pub fn ends_with(value: impl Into<String>) -> Self {
        Self::Atom(StringAtom::EndsWith(value.into()))
    }
}

impl DomainPredicate {
    pub fn id_equals(id: DomainId) -> Self {
        Self::Id(DomainIdPredicate::Atom(DomainIdAtom::Equals(id)))
    }
}

impl AccountPredicate {
    pub fn id_equals(id: AccountId) -> Self {
        Self::Id(AccountIdPredicate::Atom(AccountIdAtom::Equals(id)))
    }

    pub fn in_domain(domain: DomainId) -> Self {
        Self::Id(AccountIdPredicate::Domain(DomainIdPredicate::Atom(DomainIdAtom::Equals(domain))))
    }
}

impl AssetPredicate {
    pub fn id_equals(id: AssetId) -> Self {
        Self::Id(AssetIdPredicate::Atom(AssetIdAtom::Equals(id)))
    }
}

impl MetadataPredicate {
    pub fn key_equals(key: Name, value: Json) -> Self {
        let projection = JsonPredicate::Atom(JsonAtom::Equals(value));
        Self::Key(MetadataKeyPredicate { key, projection })
    }
}
