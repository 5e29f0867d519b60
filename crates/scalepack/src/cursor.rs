use crate::error::Error;
use crate::error::Result;

/// Maximum nesting of recursive values before decoding gives up.
pub const MAX_DEPTH: usize = 128;

/// A cursor tracks position within a borrowed input slice.
///
/// Every decoder reads through a cursor, advancing it by exactly the bytes
/// it consumed. The cursor also tracks nesting depth so that recursive types
/// cannot exhaust the stack on hostile input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    slice: &'a [u8],
    pos: usize,
    depth: usize,
    limit: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        Self::with_depth_limit(slice, MAX_DEPTH)
    }

    /// A cursor that gives up after `limit` nesting levels instead of
    /// `MAX_DEPTH`.
    pub fn with_depth_limit(slice: &'a [u8], limit: usize) -> Self {
        Self {
            slice,
            pos: 0,
            depth: 0,
            limit,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.slice.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn as_slice(&self) -> &'a [u8] {
        &self.slice[self.pos..]
    }

    #[inline]
    fn need(&self, n: usize) -> Result<()> {
        let remaining = self.remaining();
        if n > remaining {
            Err(Error::UnexpectedEnd { needed: n - remaining })
        } else {
            Ok(())
        }
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.need(1)?;
        let byte = self.slice[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.need(len)?;
        let slice = &self.slice[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Runs `f` one nesting level deeper, failing once the depth limit is
    /// reached.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.limit {
            return Err(Error::RecursionLimit);
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Fails unless the whole input has been consumed.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(Error::TrailingBytes(n)),
        }
    }
}
