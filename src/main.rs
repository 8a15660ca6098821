use clap::{Parser, ValueEnum};
use log::{debug, info};
use merkle_whitelist::{Blake3, Error, HashDigest, Hasher, MerkleTree, Result, Sha256};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HashKind {
  Sha256,
  Blake3,
}

#[derive(Parser)]
#[command(name = "merkle-whitelist")]
#[command(about = "Commit a whitelist to a Merkle root and check membership proofs against it")]
struct Args {
  /// Whitelist members, e.g. e-mail addresses
  #[arg(required = true)]
  members: Vec<String>,

  /// Candidates to check against the root
  #[arg(short, long)]
  check: Vec<String>,

  /// Members appended after the first round of checks
  #[arg(short, long)]
  add: Vec<String>,

  /// Hash function for leaves and internal nodes
  #[arg(long, value_enum, default_value_t = HashKind::Sha256)]
  hash: HashKind,

  /// Default log filter, overridden by RUST_LOG
  #[arg(long, default_value = "info")]
  log_level: String,
}

fn main() -> Result<()> {
  let args = Args::parse();
  env_logger::init_from_env(env_logger::Env::default().default_filter_or(args.log_level.as_str()));

  match args.hash {
    HashKind::Sha256 => run(Sha256, &args),
    HashKind::Blake3 => run(Blake3, &args),
  }
}

fn run<H: Hasher>(hasher: H, args: &Args) -> Result<()> {
  let mut tree = MerkleTree::new(hasher, &args.members)?;
  println!("A visual representation of the tree\n{tree}");

  let root = tree.root().clone();
  println!("The root is: {root}");

  for candidate in &args.check {
    report(&tree, candidate, &root)?;
  }

  if args.add.is_empty() {
    return Ok(());
  }
  let leaves = args.add.iter().map(|m| tree.hasher().hash(m.as_bytes())).collect::<Vec<_>>();
  tree.add_leaves(leaves)?;
  info!("added {} members, root {root} -> {}", args.add.len(), tree.root());

  for candidate in args.check.iter().chain(&args.add) {
    let before = is_member(&tree, candidate, &root)?;
    let after = is_member(&tree, candidate, tree.root())?;
    println!("{candidate}: previous root {before}, current root {after}");
  }
  Ok(())
}

fn report<H: Hasher>(tree: &MerkleTree<H>, candidate: &str, root: &HashDigest) -> Result<()> {
  let leaf = tree.hasher().hash(candidate.as_bytes());
  match tree.proof(&leaf) {
    Ok(proof) if tree.verify(&proof, &leaf, root) => {
      println!("The address {candidate} is in the whitelist");
      println!("The provided proof\n{proof}\n");
    }
    Ok(_) | Err(Error::LeafNotFound(_)) => println!("Forbidden: the address {candidate} is not in the whitelist\n"),
    Err(e) => return Err(e),
  }
  Ok(())
}

/// A missing proof counts as a negative answer, same as a proof that fails to verify.
fn is_member<H: Hasher>(tree: &MerkleTree<H>, candidate: &str, root: &HashDigest) -> Result<bool> {
  let leaf = tree.hasher().hash(candidate.as_bytes());
  match tree.proof(&leaf) {
    Ok(proof) => Ok(tree.verify(&proof, &leaf, root)),
    Err(Error::LeafNotFound(_)) => {
      debug!("{candidate} has no leaf");
      Ok(false)
    }
    Err(e) => Err(e),
  }
}
