use std::fmt::{self, Display};

use crate::hasher::{HashDigest, Hasher};

pub mod merkle;

/// Core hash tree abstraction
pub trait HashTree {
  type Error;

  /// Append a new leaf digest and return its index
  fn append(&mut self, leaf: HashDigest) -> Result<u64, Self::Error>;

  /// Get the current size (number of leaf nodes)
  fn size(&self) -> u64;

  /// Get the root hash
  fn root_hash(&self) -> &HashDigest;

  /// Verify a path from leaf to root
  fn verify_path(&self, leaf: &HashDigest, proof: &Proof, root: &HashDigest) -> bool;

  /// Generate proof path for given index
  fn generate_proof(&self, index: u64) -> Result<Proof, Self::Error>;
}

/// Side on which a sibling digest is concatenated with the running hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
  Left,
  Right,
}

impl Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Position::Left => "left",
      Position::Right => "right",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProofStep {
  pub hash: HashDigest,
  pub position: Position,
}

/// Sibling digests ordered from the leaf level up to just below the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Proof(Vec<ProofStep>);

impl Proof {
  pub fn new(steps: Vec<ProofStep>) -> Self {
    Proof(steps)
  }

  pub fn steps(&self) -> &[ProofStep] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, ProofStep> {
    self.0.iter()
  }
}

impl From<Vec<ProofStep>> for Proof {
  fn from(steps: Vec<ProofStep>) -> Self {
    Proof(steps)
  }
}

impl<'a> IntoIterator for &'a Proof {
  type Item = &'a ProofStep;
  type IntoIter = std::slice::Iter<'a, ProofStep>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

impl Display for Proof {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.is_empty() {
      return f.write_str("[]");
    }
    for (i, step) in self.0.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "{}:{}", step.position, step.hash)?;
    }
    Ok(())
  }
}

/// Recompute the root from `leaf` along `proof` and compare it with `root`.
///
/// A proof taken from an older state of the tree legitimately fails against a newer root;
/// this is a plain `false`, never an error.
pub fn verify<H: Hasher + ?Sized>(hasher: &H, proof: &Proof, leaf: &HashDigest, root: &HashDigest) -> bool {
  let mut current = leaf.clone();
  for step in proof {
    current = match step.position {
      Position::Left => hasher.hash_pair(&step.hash, &current),
      Position::Right => hasher.hash_pair(&current, &step.hash),
    };
  }
  &current == root
}
