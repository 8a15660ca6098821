use merkle_whitelist::{Error, HashDigest, Hasher, MerkleTree, Proof, Sha256, verify};

const ALICE: &str = "alice@safe.global";
const BOB: &str = "bob@safe.global";
const CHARLIE: &str = "charlie@safe.global";

fn whitelist() -> MerkleTree<Sha256> {
  MerkleTree::new(Sha256, ["a", "b", "c", ALICE, BOB, "d", "e", "e"]).unwrap()
}

fn leaf(member: &str) -> HashDigest {
  Sha256.hash(member.as_bytes())
}

#[test]
fn alice_is_whitelisted() {
  let tree = whitelist();
  let root = tree.root().clone();
  let alice = leaf(ALICE);
  let proof = tree.proof(&alice).unwrap();
  assert_eq!(3, proof.len());
  assert!(verify(&Sha256, &proof, &alice, &root));
}

#[test]
fn charlie_is_rejected_until_added() {
  let mut tree = whitelist();
  let root = tree.root().clone();
  let charlie = leaf(CHARLIE);

  // no proof exists, and the empty proof does not reach the root either
  assert_eq!(Err(Error::LeafNotFound(charlie.clone())), tree.proof(&charlie));
  let proof = tree.proof(&charlie).unwrap_or_default();
  assert!(!verify(&Sha256, &proof, &charlie, &root));

  assert_eq!(8, tree.add_leaf(charlie.clone()).unwrap());
  let proof = tree.proof(&charlie).unwrap();
  assert!(!verify(&Sha256, &proof, &charlie, &root));
  assert!(verify(&Sha256, &proof, &charlie, tree.root()));

  // existing members now need proofs from the new tree
  let alice = leaf(ALICE);
  assert!(verify(&Sha256, &tree.proof(&alice).unwrap(), &alice, tree.root()));
}

#[test]
fn repeated_member_has_two_paths() {
  let tree = whitelist();
  let e = leaf("e");
  assert_eq!(Some(6), tree.leaf_index(&e));
  let first = tree.proof(&e).unwrap();
  let second = tree.proof_at(7).unwrap();
  assert_ne!(first, second);
  assert!(tree.verify(&first, &e, tree.root()));
  assert!(tree.verify(&second, &e, tree.root()));
}

#[test]
fn root_is_portable_as_hex() {
  let tree = whitelist();
  let root = HashDigest::from_hex(&tree.root().to_hex()).unwrap();
  let bob = leaf(BOB);
  let proof: Proof = tree.proof(&bob).unwrap();
  assert!(verify(&Sha256, &proof, &bob, &root));
  assert_eq!(32, root.len());
}
