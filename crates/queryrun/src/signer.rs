//! Signing and hashing of outgoing requests.

use querywire::Hash;
use querywire::Signature;
use sha2::Digest;
use sha2::Sha256;

use crate::error::Result;

/// Produces the signature attached to every request.
///
/// `message` is the digest of the encoded request, not the request itself.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Signature>;
}

/// Digests an encoded request before it is signed.
pub trait Hasher: Send + Sync {
    fn hash(&self, bytes: &[u8]) -> Hash;
}

/// SHA-256, the default request digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash(&self, bytes: &[u8]) -> Hash {
        Hash::new(Sha256::digest(bytes).into())
    }
}
