//! # Compact Integers
//!
//! Variable-width unsigned integers. The low two bits of the first byte
//! select the mode:
//!
//! | mode   | bytes | range          |
//! |--------|-------|----------------|
//! | `0b00` | 1     | `< 2^6`        |
//! | `0b01` | 2     | `< 2^14`       |
//! | `0b10` | 4     | `< 2^30`       |
//! | `0b11` | 1 + n | `n = (first >> 2) + 4` little-endian bytes |
//!
//! ## Invariants
//! - **Canonical**: every value has exactly one encoding. Decoding rejects a
//!   value written in a wider mode than necessary, and a big-mode value with
//!   a zero most-significant byte.

use crate::cursor::Cursor;
use crate::error::Error;
use crate::error::Result;
use crate::traits::Decode;
use crate::traits::Encode;

const SINGLE_MAX: u128 = 1 << 6;
const TWO_MAX: u128 = 1 << 14;
const FOUR_MAX: u128 = 1 << 30;

/// Appends the canonical compact encoding of `value`.
pub fn encode(value: u128, out: &mut Vec<u8>) {
    if value < SINGLE_MAX {
        out.push((value as u8) << 2);
    } else if value < TWO_MAX {
        out.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes());
    } else if value < FOUR_MAX {
        out.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes());
    } else {
        let len = encoded_payload_len(value);
        out.push((((len - 4) as u8) << 2) | 0b11);
        out.extend_from_slice(&value.to_le_bytes()[..len]);
    }
}

/// Number of bytes `encode` writes for `value`.
pub fn encoded_len(value: u128) -> usize {
    if value < SINGLE_MAX {
        1
    } else if value < TWO_MAX {
        2
    } else if value < FOUR_MAX {
        4
    } else {
        1 + encoded_payload_len(value)
    }
}

fn encoded_payload_len(value: u128) -> usize {
    let bits = 128 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(4)
}

/// Reads one compact integer, rejecting non-canonical encodings.
pub fn decode(cur: &mut Cursor<'_>) -> Result<u128> {
    let first = cur.read_byte()?;
    match first & 0b11 {
        0b00 => Ok(u128::from(first >> 2)),
        0b01 => {
            let second = cur.read_byte()?;
            let value = u128::from(u16::from_le_bytes([first, second]) >> 2);
            if value < SINGLE_MAX {
                return Err(Error::NonCanonicalCompact);
            }
            Ok(value)
        }
        0b10 => {
            let [b1, b2, b3] = cur.read_array::<3>()?;
            let value = u128::from(u32::from_le_bytes([first, b1, b2, b3]) >> 2);
            if value < TWO_MAX {
                return Err(Error::NonCanonicalCompact);
            }
            Ok(value)
        }
        _ => {
            let len = usize::from(first >> 2) + 4;
            if len > 16 {
                return Err(Error::CompactOverflow("u128"));
            }
            let bytes = cur.read_bytes(len)?;
            let mut buf = [0u8; 16];
            buf[..len].copy_from_slice(bytes);
            let value = u128::from_le_bytes(buf);
            if bytes[len - 1] == 0 || value < FOUR_MAX {
                return Err(Error::NonCanonicalCompact);
            }
            Ok(value)
        }
    }
}

/// Reads a compact length prefix as a `usize`.
pub fn decode_len(cur: &mut Cursor<'_>) -> Result<usize> {
    let len = decode(cur)?;
    usize::try_from(len).map_err(|_| Error::LengthOverflow(len))
}

/// Unsigned integers that can travel in compact form.
pub trait CompactInt: Copy + Into<u128> + TryFrom<u128> {
    const NAME: &'static str;
}

impl CompactInt for u8 { const NAME: &'static str = "u8"; }
impl CompactInt for u16 { const NAME: &'static str = "u16"; }
impl CompactInt for u32 { const NAME: &'static str = "u32"; }
impl CompactInt for u64 { const NAME: &'static str = "u64"; }
impl CompactInt for u128 { const NAME: &'static str = "u128"; }

/// Marks an integer as compact-encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Compact<T>(pub T);

impl<T: CompactInt> Encode for Compact<T> {
    fn encode_to(&self, out: &mut Vec<u8>) {
        encode(self.0.into(), out);
    }
}

impl<T: CompactInt> Decode for Compact<T> {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let wide = decode(cur)?;
        T::try_from(wide)
            .map(Compact)
            .map_err(|_| Error::CompactOverflow(T::NAME))
    }
}

impl<T> From<T> for Compact<T> {
    fn from(value: T) -> Self {
        Compact(value)
    }
}
