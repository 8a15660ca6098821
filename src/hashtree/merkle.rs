use std::fmt::{self, Display};

use log::{debug, trace};

use crate::hasher::{HashDigest, Hasher, Sha256};
use crate::hashtree::{HashTree, Position, Proof, ProofStep, verify};
use crate::{Error, Result};


/// In-memory binary Merkle tree over an ordered list of leaf digests.
///
/// All layers are materialized: `layers[0]` holds the leaves in insertion order and the last
/// layer holds the single root. Within each layer nodes are paired `(0,1), (2,3), ...`; when a
/// layer has an odd length its last node is paired with itself, so the parent of a lone node
/// `x` is `hash(x || x)`. A tree of one leaf has that leaf as its root.
///
/// Every mutation regenerates all layers from the leaves. Roots and proofs handed out
/// earlier stay valid against the root of that moment, but not necessarily against the
/// current one.
///
/// Mutation takes `&mut self`; to share a tree between threads wrap it in a lock such as
/// `RwLock`, which lets proof generation run concurrently while appends are exclusive.
#[derive(Debug, Clone)]
pub struct MerkleTree<H: Hasher = Sha256> {
  hasher: H,
  layers: Vec<Vec<HashDigest>>,
}

impl<H: Hasher> MerkleTree<H> {
  /// Hash every input with `hasher` and build the tree over the resulting leaves.
  pub fn new<I, T>(hasher: H, inputs: I) -> Result<Self>
  where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
  {
    let leaves = inputs.into_iter().map(|input| hasher.hash(input.as_ref())).collect();
    Self::from_leaves(hasher, leaves)
  }

  /// Build the tree over already hashed leaves. Duplicate digests are allowed.
  pub fn from_leaves(hasher: H, leaves: Vec<HashDigest>) -> Result<Self> {
    let width = match leaves.first() {
      None => return Err(Error::InvalidInput("cannot build a merkle tree without leaves".to_string())),
      Some(leaf) if leaf.is_empty() => return Err(Error::InvalidInput("leaf digest is empty".to_string())),
      Some(leaf) => leaf.len(),
    };
    if let Some(i) = leaves.iter().position(|leaf| leaf.len() != width) {
      return Err(Error::InvalidInput(format!("leaf {i} has {} bytes, expected {width}", leaves[i].len())));
    }
    let layers = build_layers(&hasher, leaves);
    Ok(MerkleTree { hasher, layers })
  }

  pub fn hasher(&self) -> &H {
    &self.hasher
  }

  pub fn root(&self) -> &HashDigest {
    &self.layers[self.layers.len() - 1][0]
  }

  pub fn leaves(&self) -> &[HashDigest] {
    &self.layers[0]
  }

  pub fn layers(&self) -> &[Vec<HashDigest>] {
    &self.layers
  }

  pub fn leaf_count(&self) -> usize {
    self.layers[0].len()
  }

  /// Number of hashing rounds between the leaves and the root.
  pub fn depth(&self) -> usize {
    self.layers.len() - 1
  }

  /// Position of the first leaf equal to `leaf`.
  pub fn leaf_index(&self, leaf: &HashDigest) -> Option<usize> {
    self.layers[0].iter().position(|l| l == leaf)
  }

  pub fn contains(&self, leaf: &HashDigest) -> bool {
    self.leaf_index(leaf).is_some()
  }

  /// Inclusion proof for the first occurrence of `leaf`.
  ///
  /// When the same digest appears more than once the proof describes the path of the first
  /// one; use [`proof_at`](Self::proof_at) to select a specific position.
  pub fn proof(&self, leaf: &HashDigest) -> Result<Proof> {
    match self.leaf_index(leaf) {
      Some(index) => self.proof_at(index),
      None => {
        debug!("no leaf {leaf} among {} leaves", self.leaf_count());
        Err(Error::LeafNotFound(leaf.clone()))
      }
    }
  }

  /// Inclusion proof for the leaf at `index`.
  pub fn proof_at(&self, index: usize) -> Result<Proof> {
    let size = self.leaf_count();
    if index >= size {
      return Err(Error::IndexOutOfRange { index, size });
    }

    let mut steps = Vec::with_capacity(self.depth());
    let mut i = index;
    for layer in &self.layers[..self.layers.len() - 1] {
      let step = if i % 2 == 0 {
        // the last node of an odd layer is its own right sibling
        let hash = layer.get(i + 1).unwrap_or(&layer[i]).clone();
        ProofStep { hash, position: Position::Right }
      } else {
        ProofStep { hash: layer[i - 1].clone(), position: Position::Left }
      };
      steps.push(step);
      i /= 2;
    }
    trace!("proof for leaf #{index}: {} steps", steps.len());
    Ok(Proof::new(steps))
  }

  /// Check `proof` for `leaf` against `root` using this tree's hasher. `root` need not be the
  /// current root of this tree.
  pub fn verify(&self, proof: &Proof, leaf: &HashDigest, root: &HashDigest) -> bool {
    verify(&self.hasher, proof, leaf, root)
  }

  /// Append a leaf and rebuild every layer, returning the new leaf's index.
  ///
  /// The root changes, so roots previously captured by other parties no longer describe this
  /// tree, and proofs taken before the call may not verify against the new root.
  pub fn add_leaf(&mut self, leaf: HashDigest) -> Result<usize> {
    check_width(self.leaf_width(), &leaf)?;
    let index = self.leaf_count();
    self.rebuild_with(vec![leaf]);
    Ok(index)
  }

  /// Append several leaves with a single rebuild.
  pub fn add_leaves<I>(&mut self, leaves: I) -> Result<()>
  where
    I: IntoIterator<Item = HashDigest>,
  {
    let width = self.leaf_width();
    let leaves = leaves.into_iter().collect::<Vec<_>>();
    for leaf in &leaves {
      check_width(width, leaf)?;
    }
    if !leaves.is_empty() {
      self.rebuild_with(leaves);
    }
    Ok(())
  }

  fn leaf_width(&self) -> usize {
    self.layers[0][0].len()
  }

  fn rebuild_with(&mut self, appended: Vec<HashDigest>) {
    let mut leaves = std::mem::take(&mut self.layers).swap_remove(0);
    leaves.extend(appended);
    self.layers = build_layers(&self.hasher, leaves);
  }

  fn fmt_node(&self, f: &mut fmt::Formatter<'_>, level: usize, index: usize, prefix: &str, last: bool) -> fmt::Result {
    let branch = if last { "└─ " } else { "├─ " };
    writeln!(f, "{prefix}{branch}{}", self.layers[level][index])?;
    if level == 0 {
      return Ok(());
    }
    let children = &self.layers[level - 1];
    let first = index * 2;
    let end = (first + 2).min(children.len());
    let prefix = format!("{prefix}{}", if last { "   " } else { "│  " });
    for child in first..end {
      self.fmt_node(f, level - 1, child, &prefix, child + 1 == end)?;
    }
    Ok(())
  }
}

impl<H: Hasher> Display for MerkleTree<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.fmt_node(f, self.layers.len() - 1, 0, "", true)
  }
}

impl<H: Hasher> HashTree for MerkleTree<H> {
  type Error = Error;

  fn append(&mut self, leaf: HashDigest) -> Result<u64> {
    self.add_leaf(leaf).map(|i| i as u64)
  }

  fn size(&self) -> u64 {
    self.leaf_count() as u64
  }

  fn root_hash(&self) -> &HashDigest {
    self.root()
  }

  fn verify_path(&self, leaf: &HashDigest, proof: &Proof, root: &HashDigest) -> bool {
    self.verify(proof, leaf, root)
  }

  fn generate_proof(&self, index: u64) -> Result<Proof> {
    let size = self.leaf_count();
    let index = usize::try_from(index).map_err(|_| Error::IndexOutOfRange { index: usize::MAX, size })?;
    self.proof_at(index)
  }
}

fn check_width(width: usize, leaf: &HashDigest) -> Result<()> {
  if leaf.len() != width {
    return Err(Error::InvalidInput(format!("digest of {} bytes, expected {width}", leaf.len())));
  }
  Ok(())
}

/// Hash `leaves` up to a single root. `leaves` must not be empty.
fn build_layers<H: Hasher>(hasher: &H, leaves: Vec<HashDigest>) -> Vec<Vec<HashDigest>> {
  debug_assert!(!leaves.is_empty());
  let mut layers = vec![leaves];
  loop {
    let layer = &layers[layers.len() - 1];
    if layer.len() <= 1 {
      break;
    }
    let next = layer
      .chunks(2)
      .map(|pair| {
        let left = &pair[0];
        let right = pair.get(1).unwrap_or(left);
        hasher.hash_pair(left, right)
      })
      .collect::<Vec<_>>();
    layers.push(next);
  }
  debug!("merkle tree built: {} leaves, depth {}, root {}", layers[0].len(), layers.len() - 1, layers[layers.len() - 1][0]);
  layers
}
