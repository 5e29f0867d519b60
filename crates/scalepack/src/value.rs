//! # Dynamic Values
//!
//! `Value` is the data model of the dynamic codec layer: what a registry
//! codec encodes from and decodes into when the Rust type is not known at
//! compile time.
//!
//! ## Invariants
//! - **Tag-only is structural**: a payload-less union variant is `Value::Tag`,
//!   never `Value::Variant` with a placeholder. Code can tell the two apart
//!   without inspecting the payload.
//! - **Records are unordered**: `Value::Record` is keyed by field name; the
//!   codec, not the value, decides the wire order of the fields.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Unit,
    Bool(bool),
    /// Any unsigned integer, including compact ones.
    UInt(u128),
    SInt(i128),
    Bytes(Vec<u8>),
    Str(String),
    Option(Option<Box<Value>>),
    /// Lists and fixed arrays.
    List(Vec<Value>),
    Set(BTreeSet<Value>),
    Map(BTreeMap<Value, Value>),
    Tuple(Vec<Value>),
    Record(BTreeMap<String, Value>),
    /// A union variant without payload.
    Tag(String),
    /// A union variant with its payload.
    Variant(String, Box<Value>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool(_) => "bool",
            Self::UInt(_) => "unsigned integer",
            Self::SInt(_) => "signed integer",
            Self::Bytes(_) => "bytes",
            Self::Str(_) => "string",
            Self::Option(_) => "option",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Tuple(_) => "tuple",
            Self::Record(_) => "record",
            Self::Tag(_) => "tag",
            Self::Variant(_, _) => "variant",
        }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn some(value: Value) -> Self {
        Self::Option(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Self::Option(None)
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    pub fn variant(tag: impl Into<String>, payload: Value) -> Self {
        Self::Variant(tag.into(), Box::new(payload))
    }

    /// Builds a record from fields given in any order.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The variant name of a `Tag` or `Variant`.
    pub fn variant_tag(&self) -> Option<&str> {
        match self {
            Self::Tag(tag) | Self::Variant(tag, _) => Some(tag),
            _ => None,
        }
    }

    /// The payload of a `Variant`; `None` for a `Tag` or any other value.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Variant(_, payload) => Some(payload),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

macro_rules! impl_from_uint {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::UInt(u128::from(value))
            }
        })+
    };
}

macro_rules! impl_from_sint {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::SInt(i128::from(value))
            }
        })+
    };
}

impl_from_uint!(u8, u16, u32, u64, u128);
impl_from_sint!(i8, i16, i32, i64, i128);
