//! # Identifiers
//!
//! Names, keys and the composite ids built from them. Every id has a
//! canonical text form (`Display`/`FromStr`) in addition to its wire form.
//!
//! | id                  | text form                                   |
//! |---------------------|---------------------------------------------|
//! | `AccountId`         | `<multihash>@<domain>`                      |
//! | `AssetDefinitionId` | `<name>#<domain>`                           |
//! | `AssetId`           | `<name>#<domain>#<account>`, or `<name>##<account>` when both domains match |
//!
//! ## Invariants
//! - **Valid names**: a `Name` is never empty and never contains whitespace,
//!   `@` or `#`. This holds for names built in code and names decoded off the
//!   wire alike.

use std::fmt;
use std::str::FromStr;

use scalepack::Cursor;
use scalepack::Decode;
use scalepack::Encode;

use crate::error::Error;
use crate::error::Result;

/// A validated identifier segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        match check_name(&value) {
            Ok(()) => Ok(Self(value)),
            Err(reason) => Err(Error::InvalidName { input: value, reason }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub(crate) fn check_name(value: &str) -> std::result::Result<(), &'static str> {
    if value.is_empty() {
        return Err("name is empty");
    }
    if value.chars().any(char::is_whitespace) {
        return Err("name contains whitespace");
    }
    if value.contains(['@', '#']) {
        return Err("`@` and `#` are reserved for composite ids");
    }
    Ok(())
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Encode for Name {
    fn encode_to(&self, out: &mut Vec<u8>) {
        self.0.encode_to(out);
    }
}

impl Decode for Name {
    fn decode(cur: &mut Cursor<'_>) -> scalepack::Result<Self> {
        let value = String::decode(cur)?;
        match check_name(&value) {
            Ok(()) => Ok(Self(value)),
            Err(reason) => {
                Err(scalepack::Error::InvalidValue(format!("name {:?}: {}", value, reason)))
            }
        }
    }
}

/// Ids that are a bare `Name` on the wire.
macro_rules! name_id {
    ($(#[$meta:meta])* $name:ident) => {
        scalepack::scale_struct! {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(pub Name);
        }

        impl $name {
            pub fn new(name: Name) -> Self {
                Self(name)
            }

            pub fn name(&self) -> &Name {
                &self.0
            }
        }

        impl From<Name> for $name {
            fn from(name: Name) -> Self {
                Self(name)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Name::new(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

name_id!(DomainId);
name_id!(RoleId);
name_id!(TriggerId);

scalepack::scale_enum! {
    /// Signature algorithms a public key can belong to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Algorithm {
        Ed25519 = 0,
        Secp256k1 = 1,
        BlsNormal = 2,
        BlsSmall = 3,
    }
}

impl Algorithm {
    /// The multicodec code used in multihash text forms.
    pub fn multihash_code(self) -> u64 {
        match self {
            Self::Ed25519 => 0xed,
            Self::Secp256k1 => 0xe7,
            Self::BlsNormal => 0xea,
            Self::BlsSmall => 0xeb,
        }
    }

    pub fn from_multihash_code(code: u64) -> Option<Self> {
        match code {
            0xed => Some(Self::Ed25519),
            0xe7 => Some(Self::Secp256k1),
            0xea => Some(Self::BlsNormal),
            0xeb => Some(Self::BlsSmall),
            _ => None,
        }
    }
}

scalepack::scale_struct! {
    /// A public key: its algorithm and raw key bytes.
    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct PublicKey {
        algorithm: Algorithm,
        payload: Vec<u8>,
    }
}

impl PublicKey {
    pub fn new(algorithm: Algorithm, payload: Vec<u8>) -> Self {
        Self { algorithm, payload }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Hex multihash: varint code and varint length in lower case, then the
    /// payload in upper case.
    pub fn to_multihash(&self) -> String {
        let mut prefix = Vec::with_capacity(4);
        write_varint(self.algorithm.multihash_code(), &mut prefix);
        write_varint(self.payload.len() as u64, &mut prefix);
        format!("{}{}", hex::encode(prefix), hex::encode_upper(&self.payload))
    }

    pub fn from_multihash(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPublicKey {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };
        let bytes = hex::decode(input).map_err(|e| invalid(&e.to_string()))?;
        let mut rest = bytes.as_slice();
        let code = read_varint(&mut rest).ok_or_else(|| invalid("truncated algorithm code"))?;
        let algorithm = Algorithm::from_multihash_code(code)
            .ok_or_else(|| invalid(&format!("unknown algorithm code 0x{:x}", code)))?;
        let len = read_varint(&mut rest).ok_or_else(|| invalid("truncated payload length"))?;
        if rest.len() as u64 != len {
            return Err(invalid(&format!(
                "payload length {} does not match {} bytes",
                len,
                rest.len()
            )));
        }
        Ok(Self::new(algorithm, rest.to_vec()))
    }
}

fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn read_varint(input: &mut &[u8]) -> Option<u64> {
    let mut value = 0u64;
    for (i, &byte) in input.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            *input = &input[i + 1..];
            return Some(value);
        }
    }
    None
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_multihash())
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_multihash(s)
    }
}

scalepack::scale_struct! {
    /// An account: a signatory within a domain.
    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct AccountId {
        pub domain: DomainId,
        pub signatory: PublicKey,
    }
}

impl AccountId {
    pub fn new(signatory: PublicKey, domain: DomainId) -> Self {
        Self { domain, signatory }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.signatory, self.domain)
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            |reason: String| Error::InvalidId { kind: "account id", input: s.to_owned(), reason };
        let mut parts = s.split('@');
        let (Some(signatory), Some(domain), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected `<signatory>@<domain>`".to_owned()));
        };
        let signatory = signatory.parse().map_err(|e: Error| invalid(e.to_string()))?;
        let domain = domain.parse().map_err(|e: Error| invalid(e.to_string()))?;
        Ok(Self::new(signatory, domain))
    }
}

scalepack::scale_struct! {
    /// An asset definition: a named asset kind within a domain.
    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct AssetDefinitionId {
        pub domain: DomainId,
        pub name: Name,
    }
}

impl AssetDefinitionId {
    pub fn new(name: Name, domain: DomainId) -> Self {
        Self { domain, name }
    }
}

impl fmt::Display for AssetDefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.domain)
    }
}

impl FromStr for AssetDefinitionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidId {
            kind: "asset definition id",
            input: s.to_owned(),
            reason,
        };
        let mut parts = s.split('#');
        let (Some(name), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid("expected `<name>#<domain>`".to_owned()));
        };
        let name = name.parse().map_err(|e: Error| invalid(e.to_string()))?;
        let domain = domain.parse().map_err(|e: Error| invalid(e.to_string()))?;
        Ok(Self::new(name, domain))
    }
}

scalepack::scale_struct! {
    /// Holdings of one asset definition by one account.
    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct AssetId {
        pub account: AccountId,
        pub definition: AssetDefinitionId,
    }
}

impl AssetId {
    pub fn new(definition: AssetDefinitionId, account: AccountId) -> Self {
        Self { account, definition }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.definition.domain == self.account.domain {
            write!(f, "{}##{}", self.definition.name, self.account)
        } else {
            write!(f, "{}#{}", self.definition, self.account)
        }
    }
}

impl FromStr for AssetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            |reason: String| Error::InvalidId { kind: "asset id", input: s.to_owned(), reason };
        let mut parts = s.splitn(3, '#');
        let (Some(name), Some(domain), Some(account)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid(
                "expected `<name>#<domain>#<account>` or `<name>##<account>`".to_owned(),
            ));
        };
        let account: AccountId = account.parse().map_err(|e: Error| invalid(e.to_string()))?;
        let domain = match domain {
            "" => account.domain.clone(),
            domain => domain.parse().map_err(|e: Error| invalid(e.to_string()))?,
        };
        let name = name.parse().map_err(|e: Error| invalid(e.to_string()))?;
        Ok(Self::new(AssetDefinitionId::new(name, domain), account))
    }
}

scalepack::scale_struct! {
    /// A 32-byte digest, carried raw without a length prefix.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Hash([u8; 32]);
}

impl Hash {
    pub const LEN: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            |reason: String| Error::InvalidId { kind: "hash", input: s.to_owned(), reason };
        let bytes = hex::decode(s).map_err(|e| invalid(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| invalid(format!("expected 32 bytes, got {}", b.len())))?;
        Ok(Self(bytes))
    }
}

scalepack::scale_struct! {
    /// Raw signature bytes.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct Signature(Vec<u8>);
}

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}
