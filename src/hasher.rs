use std::fmt::{self, Debug, Display};

use sha2::Digest as _;

use crate::{Error, Result};

/// Output of a one-way hash function. The length is fixed per hasher, but the tree itself
/// does not care which one.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashDigest(Vec<u8>);

impl HashDigest {
  pub fn new(bytes: Vec<u8>) -> Self {
    HashDigest(bytes)
  }

  /// Parse a digest from hex, with or without a leading `0x`.
  pub fn from_hex(s: &str) -> Result<Self> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map(HashDigest).map_err(|e| Error::InvalidInput(format!("malformed hex digest {s:?}: {e}")))
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn to_hex(&self) -> String {
    hex::encode(&self.0)
  }
}

impl From<Vec<u8>> for HashDigest {
  fn from(bytes: Vec<u8>) -> Self {
    HashDigest(bytes)
  }
}

impl<const N: usize> From<[u8; N]> for HashDigest {
  fn from(bytes: [u8; N]) -> Self {
    HashDigest(bytes.to_vec())
  }
}

impl AsRef<[u8]> for HashDigest {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Display for HashDigest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_hex())
  }
}

impl Debug for HashDigest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "HashDigest({})", self.to_hex())
  }
}

/// One-way hash function used both for leaves and for internal nodes.
pub trait Hasher {
  fn hash(&self, data: &[u8]) -> HashDigest;

  /// Digest of an internal node: `hash(left || right)`.
  fn hash_pair(&self, left: &HashDigest, right: &HashDigest) -> HashDigest {
    let mut buffer = Vec::with_capacity(left.len() + right.len());
    buffer.extend_from_slice(left.as_bytes());
    buffer.extend_from_slice(right.as_bytes());
    self.hash(&buffer)
  }
}

impl<H: Hasher + ?Sized> Hasher for &H {
  fn hash(&self, data: &[u8]) -> HashDigest {
    (**self).hash(data)
  }

  fn hash_pair(&self, left: &HashDigest, right: &HashDigest) -> HashDigest {
    (**self).hash_pair(left, right)
  }
}

/// SHA-256, 32-byte digests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256;

impl Hasher for Sha256 {
  fn hash(&self, data: &[u8]) -> HashDigest {
    HashDigest(sha2::Sha256::digest(data).to_vec())
  }

  fn hash_pair(&self, left: &HashDigest, right: &HashDigest) -> HashDigest {
    let mut hasher = sha2::Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    HashDigest(hasher.finalize().to_vec())
  }
}

/// BLAKE3, 32-byte digests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3;

impl Hasher for Blake3 {
  fn hash(&self, data: &[u8]) -> HashDigest {
    HashDigest(blake3::hash(data).as_bytes().to_vec())
  }

  fn hash_pair(&self, left: &HashDigest, right: &HashDigest) -> HashDigest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    HashDigest(hasher.finalize().as_bytes().to_vec())
  }
}

/// Adapts a plain function or closure into a [`Hasher`].
#[derive(Clone, Copy)]
pub struct FnHasher<F>(pub F);

impl<F> Hasher for FnHasher<F>
where
  F: Fn(&[u8]) -> Vec<u8>,
{
  fn hash(&self, data: &[u8]) -> HashDigest {
    HashDigest((self.0)(data))
  }
}

impl<F> Debug for FnHasher<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("FnHasher")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sha256_known_vector() {
    let digest = Sha256.hash(b"abc");
    assert_eq!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad", digest.to_hex());
  }

  #[test]
  fn pair_hash_is_concatenation() {
    let (a, b) = (Sha256.hash(b"a"), Sha256.hash(b"b"));
    let concat = [a.as_bytes(), b.as_bytes()].concat();
    assert_eq!(Sha256.hash(&concat), Sha256.hash_pair(&a, &b));
    assert_ne!(Sha256.hash_pair(&a, &b), Sha256.hash_pair(&b, &a));

    let (a, b) = (Blake3.hash(b"a"), Blake3.hash(b"b"));
    let concat = [a.as_bytes(), b.as_bytes()].concat();
    assert_eq!(Blake3.hash(&concat), Blake3.hash_pair(&a, &b));
  }

  #[test]
  fn fn_hasher_uses_default_pairing() {
    let xor = FnHasher(|data: &[u8]| vec![data.iter().fold(0u8, |acc, b| acc ^ b)]);
    let (a, b) = (HashDigest::from([0x0f]), HashDigest::from([0xf0]));
    assert_eq!(HashDigest::from([0xff]), xor.hash_pair(&a, &b));
  }

  #[test]
  fn hex_parsing() {
    let digest = Sha256.hash(b"e");
    assert_eq!(digest, HashDigest::from_hex(&digest.to_hex()).unwrap());
    assert_eq!(digest, HashDigest::from_hex(&format!("0x{digest}")).unwrap());
    assert!(matches!(HashDigest::from_hex("xyz"), Err(Error::InvalidInput(_))));
  }
}
