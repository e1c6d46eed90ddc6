#![cfg(test)]

use std::fmt;
use std::hash::Hasher;

use rand::prelude::*;

use crate::config::BuildConfig;
use crate::hash::*;
use crate::merkle::{get_merkle_tree_len, layer_widths, tree_height, MerkleTree};
use crate::node::Node;

const SIZE: usize = 0x10;

/// Toy 128 bit algorithm, only good for exercising tree mechanics.
#[derive(Debug, Copy, Clone, Default)]
struct XOR128 {
    data: [u8; SIZE],
    i: usize,
}

impl XOR128 {
    fn new() -> XOR128 {
        XOR128 {
            data: [0; SIZE],
            i: 0,
        }
    }
}

impl Hasher for XOR128 {
    fn write(&mut self, bytes: &[u8]) {
        for x in bytes {
            self.data[self.i & (SIZE - 1)] ^= *x;
            self.i += 1;
        }
    }

    fn finish(&self) -> u64 {
        let mut h: u64 = 0;
        let mut off: u64 = 0;
        for i in 0..8 {
            h |= (self.data[i] as u64) << off;
            off += 8;
        }
        h
    }
}

impl Algorithm for XOR128 {
    #[inline]
    fn hash(&mut self) -> Node {
        let h = Node::from(&self.data[..]);
        self.reset();
        h
    }

    #[inline]
    fn reset(&mut self) {
        *self = XOR128::new();
    }
}

impl fmt::UpperHex for XOR128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        for b in self.data.as_ref() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

fn leaves(count: usize) -> Vec<u64> {
    (0..count as u64).map(|x| x * 93).collect()
}

#[test]
fn test_hasher_light() {
    let mut h = XOR128::new();
    "1234567812345678".hash(&mut h);
    assert_eq!(format!("{:#X}", h), "0x31323334353637383132333435363738");
    String::from("1234567812345678").hash(&mut h);
    assert_eq!(format!("{:#X}", h), "0x00000000000000000000000000000000");
    String::from("1234567812345678").hash(&mut h);
    assert_eq!(format!("{:#X}", h), "0x31323334353637383132333435363738");
}

#[test]
fn test_custom_algorithm_tree() {
    let mt: MerkleTree<XOR128> = MerkleTree::new(leaves(5)).unwrap();
    assert_eq!(mt.leafs(), 5);
    assert_eq!(mt.height(), 3);
    assert_eq!(mt.len(), get_merkle_tree_len(5));

    // Leaves keep their canonical width, interior nodes are 16 bytes.
    assert!(mt.layer(0).unwrap().iter().all(|n| n.len() == 8));
    for level in 1..=mt.height() {
        assert!(mt.layer(level).unwrap().iter().all(|n| n.len() == SIZE));
    }

    let root = mt.root().unwrap().clone();
    for (i, leaf) in leaves(5).iter().enumerate() {
        let p = mt.gen_proof(i).unwrap();
        assert!(p.verify(leaf, i, &root).unwrap());
    }
}

#[test]
fn test_layer_shapes() {
    for count in 1..70 {
        let mt: MerkleTree<XOR128> = MerkleTree::new(leaves(count)).unwrap();
        let widths: Vec<usize> = mt.layers().iter().map(Vec::len).collect();
        assert_eq!(widths, layer_widths(count));
        assert_eq!(mt.height(), tree_height(count));
        assert_eq!(mt.root(), mt.layers().last().unwrap().first());
    }
}

#[test]
fn test_odd_layers_duplicate_last() {
    for count in [3usize, 5, 7, 11, 13] {
        let mt: MerkleTree<XOR128> = MerkleTree::new(leaves(count)).unwrap();
        for level in 0..mt.height() {
            let layer = mt.layer(level).unwrap();
            let parent = mt.layer(level + 1).unwrap();
            if layer.len() & 1 == 1 {
                let last = layer.last().unwrap();
                let mut a = XOR128::new();
                assert_eq!(parent.last().unwrap(), &a.node(last, last));
            }
        }
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let sequential = BuildConfig::sequential();
    let parallel = BuildConfig::default()
        .with_parallel_threshold(2)
        .with_chunk_nodes(6);

    for count in [1usize, 2, 3, 7, 8, 9, 31, 64, 65, 127, 1000, 1025] {
        let seq: MerkleTree<XOR128> = MerkleTree::with_config(leaves(count), &sequential).unwrap();
        let par: MerkleTree<XOR128> = MerkleTree::with_config(leaves(count), &parallel).unwrap();
        assert_eq!(seq, par, "{} leaves", count);
    }
}

#[test]
fn test_large_tree() {
    let _ = env_logger::builder().is_test(true).try_init();

    let count = 4 * crate::config::SMALL_TREE_BUILD + 3;
    let mt: MerkleTree<XOR128> = MerkleTree::new(leaves(count)).unwrap();
    let root = mt.root().unwrap().clone();
    let mut rng = thread_rng();

    for _ in 0..64 {
        let i = rng.gen_range(0..count);
        let p = mt.gen_proof(i).unwrap();
        assert_eq!(p.len(), mt.height());
        assert!(p.verify(&(i as u64 * 93), i, &root).unwrap());
        assert!(!p.verify(&(i as u64 * 93 + 1), i, &root).unwrap());
    }
}

#[test]
fn test_tree_determinism() {
    let a: MerkleTree<XOR128> = MerkleTree::new(leaves(37)).unwrap();
    let b: MerkleTree<XOR128> = MerkleTree::new(leaves(37)).unwrap();
    assert_eq!(a.root(), b.root());
    assert_eq!(a, b);
}
