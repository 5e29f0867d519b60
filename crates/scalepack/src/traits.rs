//! # Typed Codecs
//!
//! `Encode` and `Decode` are the compile-time rendering of a codec: the type
//! system picks the codec, so a mismatch between the value and its wire shape
//! cannot happen at runtime.
//!
//! ## Philosophy
//!
//! - **Infallible Encode**: every value of a Rust type is encodable. Types that
//!   refuse some values (names, non-zero integers) refuse them at construction.
//! - **Strict Decode**: every byte sequence that a conforming encoder could not
//!   have produced is rejected, never coerced.
//! - **Combinators are Impls**: `Option<T>`, `Vec<T>`, `[T; N]`, `BTreeSet<T>`,
//!   `BTreeMap<K, V>` and tuples build their codec from their parameters' codecs.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::num::NonZeroU32;
use std::num::NonZeroU64;

use crate::compact;
use crate::cursor::Cursor;
use crate::error::Error;
use crate::error::Result;
use crate::macros::for_each_fixed;

/// Writes a value in its wire form.
pub trait Encode {
    fn encode_to(&self, out: &mut Vec<u8>);

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }
}

/// Reads a value from its wire form, advancing the cursor past it.
pub trait Decode: Sized {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self>;
}

/// Decodes exactly one value spanning all of `bytes`.
pub fn decode_all<T: Decode>(bytes: &[u8]) -> Result<T> {
    let mut cur = Cursor::new(bytes);
    let value = T::decode(&mut cur)?;
    cur.finish()?;
    Ok(value)
}

macro_rules! impl_fixed {
    ($ty:ty, $size:literal) => {
        impl Encode for $ty {
            #[inline]
            fn encode_to(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }

        impl Decode for $ty {
            #[inline]
            fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
                Ok(<$ty>::from_le_bytes(cur.read_array::<$size>()?))
            }
        }
    };
}

for_each_fixed!(impl_fixed);

impl Encode for bool {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }
}

impl Decode for bool {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        match cur.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::InvalidBool(other)),
        }
    }
}

impl Encode for () {
    fn encode_to(&self, _out: &mut Vec<u8>) {}
}

impl Decode for () {
    fn decode(_cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(())
    }
}

impl Encode for str {
    fn encode_to(&self, out: &mut Vec<u8>) {
        compact::encode(self.len() as u128, out);
        out.extend_from_slice(self.as_bytes());
    }
}

impl Encode for String {
    fn encode_to(&self, out: &mut Vec<u8>) {
        self.as_str().encode_to(out);
    }
}

impl Decode for String {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let len = compact::decode_len(cur)?;
        let bytes = cur.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| Error::InvalidUtf8)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode_to(&self, out: &mut Vec<u8>) {
        (**self).encode_to(out);
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode_to(&self, out: &mut Vec<u8>) {
        (**self).encode_to(out);
    }
}

// recursive types go through boxes or vectors, so that is where depth is counted
impl<T: Decode> Decode for Box<T> {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        cur.nested(|cur| T::decode(cur).map(Box::new))
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode_to(&self, out: &mut Vec<u8>) {
        match self {
            None => out.push(0),
            Some(value) => {
                out.push(1);
                value.encode_to(out);
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        match cur.read_byte()? {
            0 => Ok(None),
            1 => T::decode(cur).map(Some),
            other => Err(Error::InvalidOption(other)),
        }
    }
}

impl<T: Encode> Encode for [T] {
    fn encode_to(&self, out: &mut Vec<u8>) {
        compact::encode(self.len() as u128, out);
        for item in self {
            item.encode_to(out);
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode_to(&self, out: &mut Vec<u8>) {
        self.as_slice().encode_to(out);
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let count = compact::decode_len(cur)?;
        // never trust the prefix for the allocation size
        let mut items = Vec::with_capacity(count.min(cur.remaining()));
        cur.nested(|cur| {
            for _ in 0..count {
                items.push(T::decode(cur)?);
            }
            Ok(())
        })?;
        Ok(items)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode_to(&self, out: &mut Vec<u8>) {
        for item in self {
            item.encode_to(out);
        }
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::decode(cur)?);
        }
        items
            .try_into()
            .map_err(|items: Vec<T>| Error::ArityMismatch { expected: N, found: items.len() })
    }
}

impl<T: Encode> Encode for BTreeSet<T> {
    fn encode_to(&self, out: &mut Vec<u8>) {
        compact::encode(self.len() as u128, out);
        for item in self {
            item.encode_to(out);
        }
    }
}

impl<T: Decode + Ord> Decode for BTreeSet<T> {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let count = compact::decode_len(cur)?;
        let mut set = BTreeSet::new();
        for _ in 0..count {
            let item = T::decode(cur)?;
            check_ascending(set.last(), &item)?;
            set.insert(item);
        }
        Ok(set)
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode_to(&self, out: &mut Vec<u8>) {
        compact::encode(self.len() as u128, out);
        for (key, value) in self {
            key.encode_to(out);
            value.encode_to(out);
        }
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let count = compact::decode_len(cur)?;
        let mut map = BTreeMap::new();
        for _ in 0..count {
            let key = K::decode(cur)?;
            check_ascending(map.last_key_value().map(|(k, _)| k), &key)?;
            let value = V::decode(cur)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// Ordered collections must arrive strictly ascending.
pub(crate) fn check_ascending<T: Ord>(last: Option<&T>, next: &T) -> Result<()> {
    match last.map(|last| last.cmp(next)) {
        None | Some(std::cmp::Ordering::Less) => Ok(()),
        Some(std::cmp::Ordering::Equal) => Err(Error::DuplicateEntry),
        Some(std::cmp::Ordering::Greater) => Err(Error::UnorderedEntry),
    }
}

macro_rules! impl_non_zero {
    ($nz:ty, $int:ty) => {
        impl Encode for $nz {
            fn encode_to(&self, out: &mut Vec<u8>) {
                self.get().encode_to(out);
            }
        }

        impl Decode for $nz {
            fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
                <$nz>::new(<$int>::decode(cur)?).ok_or(Error::ZeroNonZero)
            }
        }
    };
}

impl_non_zero!(NonZeroU32, u32);
impl_non_zero!(NonZeroU64, u64);

macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encode_to(&self, out: &mut Vec<u8>) {
                let ($($name,)+) = self;
                $($name.encode_to(out);)+
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
                Ok(($($name::decode(cur)?,)+))
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);
impl_tuple!(A, B, C, D, E, F);
