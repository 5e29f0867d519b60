//! Scalar values carried inside entities: JSON, metadata, numerics and time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use scalepack::Compact;
use scalepack::Cursor;
use scalepack::Decode;
use scalepack::Encode;

use crate::error::Error;
use crate::error::Result;
use crate::ids::Name;

/// A JSON document, carried on the wire as its string form.
///
/// The string always parses as JSON; decoding rejects one that does not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Json(String);

impl Json {
    pub fn new(value: &serde_json::Value) -> Self {
        Self(value.to_string())
    }

    /// Serializes any serde value.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self> {
        serde_json::to_string(value)
            .map(Self)
            .map_err(|e| Error::InvalidJson(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> Result<serde_json::Value> {
        self.deserialize()
    }

    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.0).map_err(|e| Error::InvalidJson(e.to_string()))
    }
}

impl FromStr for Json {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str::<serde_json::Value>(s)
            .map_err(|e| Error::InvalidJson(e.to_string()))?;
        Ok(Self(s.to_owned()))
    }
}

impl From<serde_json::Value> for Json {
    fn from(value: serde_json::Value) -> Self {
        Self::new(&value)
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Encode for Json {
    fn encode_to(&self, out: &mut Vec<u8>) {
        self.0.encode_to(out);
    }
}

impl Decode for Json {
    fn decode(cur: &mut Cursor<'_>) -> scalepack::Result<Self> {
        let text = String::decode(cur)?;
        if let Err(e) = serde_json::from_str::<serde_json::Value>(&text) {
            return Err(scalepack::Error::InvalidValue(format!("json: {}", e)));
        }
        Ok(Self(text))
    }
}

scalepack::scale_struct! {
    /// Key-value annotations attached to an entity, ordered by key.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
    pub struct Metadata(BTreeMap<Name, Json>);
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Name, value: Json) -> Option<Json> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: &Name) -> Option<&Json> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &Name) -> Option<Json> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Json)> {
        self.0.iter()
    }
}

impl FromIterator<(Name, Json)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (Name, Json)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A decimal number: `mantissa * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Numeric {
    pub mantissa: u128,
    pub scale: u32,
}

impl Numeric {
    pub const ZERO: Self = Self { mantissa: 0, scale: 0 };

    pub fn new(mantissa: u128, scale: u32) -> Self {
        Self { mantissa, scale }
    }
}

impl Encode for Numeric {
    fn encode_to(&self, out: &mut Vec<u8>) {
        Compact(self.mantissa).encode_to(out);
        Compact(self.scale).encode_to(out);
    }
}

impl Decode for Numeric {
    fn decode(cur: &mut Cursor<'_>) -> scalepack::Result<Self> {
        let Compact(mantissa) = Compact::<u128>::decode(cur)?;
        let Compact(scale) = Compact::<u32>::decode(cur)?;
        Ok(Self { mantissa, scale })
    }
}

impl From<u32> for Numeric {
    fn from(value: u32) -> Self {
        Self::new(u128::from(value), 0)
    }
}

impl From<u64> for Numeric {
    fn from(value: u64) -> Self {
        Self::new(u128::from(value), 0)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}.{}", int, frac)
        } else {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl FromStr for Numeric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidNumeric(s.to_owned());
        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        if int.is_empty() || !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.ends_with('.') {
            return Err(invalid());
        }
        let scale = u32::try_from(frac.len()).map_err(|_| invalid())?;
        let mantissa = format!("{}{}", int, frac).parse::<u128>().map_err(|_| invalid())?;
        Ok(Self { mantissa, scale })
    }
}

scalepack::scale_struct! {
    /// Constraints on the numeric values an asset may hold.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct NumericSpec {
        pub scale: Option<u32>,
    }
}

scalepack::scale_struct! {
    /// Milliseconds since the Unix epoch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Timestamp(u64);
}

impl Timestamp {
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self(ms)
    }
}

scalepack::scale_struct! {
    /// A span of milliseconds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Duration(u64);
}

impl Duration {
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Self(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}

scalepack::scale_struct! {
    /// When a time trigger fires: once at `start`, then every `period` if set.
    ///
    /// The period is a plain duration, so a zero period is representable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Schedule {
        pub start: Timestamp,
        pub period: Option<Duration>,
    }
}

impl Schedule {
    pub fn starting_at(start: Timestamp) -> Self {
        Self { start, period: None }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }
}

scalepack::scale_struct! {
    /// A content path on IPFS, carried as a plain string.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct IpfsPath(String);
}

impl IpfsPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
