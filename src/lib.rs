//! Merkle-tree whitelist: commit to a set of identities and prove membership with a
//! logarithmic-size path of sibling digests.
//!
//! ```
//! use merkle_whitelist::{Hasher, MerkleTree, Sha256};
//!
//! let tree = MerkleTree::new(Sha256, ["alice@safe.global", "bob@safe.global"]).unwrap();
//! let leaf = Sha256.hash(b"alice@safe.global");
//! let proof = tree.proof(&leaf).unwrap();
//! assert!(tree.verify(&proof, &leaf, tree.root()));
//! ```
use thiserror::Error;

pub mod hasher;
pub mod hashtree;

pub use hasher::{Blake3, FnHasher, HashDigest, Hasher, Sha256};
pub use hashtree::merkle::MerkleTree;
pub use hashtree::{HashTree, Position, Proof, ProofStep, verify};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("leaf not found: {0}")]
  LeafNotFound(HashDigest),

  #[error("leaf index {index} out of range for {size} leaves")]
  IndexOutOfRange { index: usize, size: usize },
}
