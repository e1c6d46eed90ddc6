//! Binary _Merkle Tree_ with side-tagged inclusion proofs.
//!
//! A tree is built once over an ordered snapshot of leaves. Its root is the
//! commitment a caller stores or transmits. Later, a leaf together with its
//! authentication path (a [`Proof`](proof::Proof)) is checked against that
//! root in `O(log n)` time, which tells whether the leaf was altered since the
//! commitment, without re-hashing the dataset.
//!
//! Link: [](https://en.wikipedia.org/wiki/Merkle_tree)
//!
//! # Construction
//!
//! ```text
//! layer 0 = canonical(leaf_0) .. canonical(leaf_n-1)
//! layer k+1[i] = H(layer k[2i], layer k[2i+1])
//! ```
//!
//! When a layer has an odd number of nodes its last node is paired with
//! itself. Construction stops at the layer with a single node, the root. A
//! tree of one leaf has that leaf's canonical form as its root, a tree of no
//! leaves has no root.
//!
//! Interior nodes are hashed as
//! `ALG(0x01 || u64_le(len(left)) || left || u64_le(len(right)) || right)`,
//! see [`hash`]. Leaves keep their canonical form, so a node's bytes do not
//! say whether it is a leaf or an interior digest. Proofs from untrusted
//! sources are checked against a [`Commitment`](proof::Commitment), which
//! pins the leaf count and with it the proof length.
//!
//! # Implementation choices
//!
//! The standard way in Rust to hash objects is a `std::hash::Hasher`, and that
//! is the reason behind the choice of the abstractions:
//!
//! `Object : Hashable<H> -> Hasher + Algorithm <- Merkle Tree`
//!
//! [`Hashable`](hash::Hashable) gives each leaf type a canonical byte form.
//! [`Algorithm`](hash::Algorithm) complements [`Hasher`](std::hash::Hasher) to
//! be reusable, returning a full length digest and resetting its state.
//! SHA-256 is the default algorithm; with the `ring` feature the same digest
//! is also available through `ring`.
//!
//! Wide layers are combined on the rayon thread pool, one layer at a time.
//!
//! # Interface
//!
//! ```text
//! - MerkleTree::new (leaves) -> tree
//! - MerkleTree::root -> hash
//! - MerkleTree::gen_proof (index) -> proof
//! - Proof::verify (leaf, index, root) -> bool
//! - MerkleTree::commitment -> (root, leafs)
//! - Proof::verify_committed (leaf, index, commitment) -> bool
//! ```
//!
//! # Quick start
//!
//! ```
//! use merkle_audit::merkle::MerkleTree;
//!
//! let log = vec!["boot", "login alice", "login bob", "logout alice", "halt"];
//! let tree: MerkleTree = MerkleTree::new(&log).unwrap();
//! let root = tree.root().unwrap().clone();
//!
//! let proof = tree.gen_proof(3).unwrap();
//! assert!(proof.verify("logout alice", 3, &root).unwrap());
//! assert!(!proof.verify("logout mallory", 3, &root).unwrap());
//! ```

#![deny(
    missing_docs,
    missing_debug_implementations,
    unsafe_code,
    unstable_features,
    unused_import_braces
)]
#![warn(unused_qualifications, trivial_casts, trivial_numeric_casts)]

/// Tree build configuration.
pub mod config;

/// Error type of the crate.
pub mod error;

/// Hash infrastructure for items in Merkle tree.
pub mod hash;

/// Common implementations for [`Hashable`](hash::Hashable).
mod hash_impl;

/// Tree nodes.
pub mod node;

/// Merkle tree inclusion proof.
pub mod proof;

/// Merkle tree abstractions, implementation and algorithms.
pub mod merkle;

/// Tests XOR128.
#[cfg(test)]
mod test_xor128;

pub use error::{MerkleError, Result};
pub use merkle::MerkleTree;
pub use node::Node;
pub use proof::{verify_committed, verify_proof, Commitment, Proof, ProofNode, Side};
