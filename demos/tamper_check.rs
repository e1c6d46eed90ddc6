//! Builds a tree over `count` integer leaves, commits its root, then checks
//! one leaf untouched and tampered, once through an inclusion proof and once
//! by rebuilding the whole tree.
//!
//! ```text
//! RUST_LOG=info cargo run --release --example tamper_check -- [count] [index]
//! ```

use std::env;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use log::info;
use merkle_audit::merkle::MerkleTree;
use merkle_audit::node::Node;

const DEFAULT_COUNT: u64 = 999_999;
const DEFAULT_INDEX: usize = 833_555;
const TAMPERED: u64 = u64::MAX;

fn arg<T: std::str::FromStr>(position: usize, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::args().nth(position) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid argument {}: {:?}", position, raw)),
        None => Ok(default),
    }
}

fn rebuild_matches(data: &[u64], index: usize, value: u64, root: &Node) -> Result<bool> {
    let mut copy = data.to_vec();
    copy[index] = value;
    let tree: MerkleTree = MerkleTree::new(&copy)?;
    Ok(tree.root() == Some(root))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let count: u64 = arg(1, DEFAULT_COUNT)?;
    let index: usize = arg(2, DEFAULT_INDEX)?;
    ensure!(
        (index as u64) < count,
        "index {} is out of range for {} leaves",
        index,
        count
    );

    let data: Vec<u64> = (0..count).collect();

    let started = Instant::now();
    let tree: MerkleTree = MerkleTree::new(&data)?;
    let commitment = tree.commitment().context("tree has no root")?;
    let root = commitment.root().clone();
    info!(
        "built tree: {} leaves, height {}, root {} in {:?}",
        commitment.leafs(),
        tree.height(),
        root,
        started.elapsed()
    );

    let started = Instant::now();
    let proof = tree.gen_proof(index)?;
    info!("proof for leaf {}: {} siblings in {:?}", index, proof.len(), started.elapsed());

    for (label, value) in [("untouched", data[index]), ("tampered", TAMPERED)] {
        let started = Instant::now();
        let intact = proof.verify_committed(&value, index, &commitment)?;
        info!("{} leaf, proof check: intact = {} in {:?}", label, intact, started.elapsed());

        let started = Instant::now();
        let intact = rebuild_matches(&data, index, value, &root)?;
        info!("{} leaf, full rebuild: intact = {} in {:?}", label, intact, started.elapsed());
    }

    Ok(())
}
