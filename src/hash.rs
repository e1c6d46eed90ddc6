//! Hash infrastructure for items in the Merkle tree.
//!
//! Leaves are first turned into their canonical byte form through
//! [`Hashable`], interior nodes are produced by an [`Algorithm`]. The byte
//! layout hashed for an interior node is:
//!
//! ```text
//! 0x01 || u64_le(len(left)) || left || u64_le(len(right)) || right
//! ```
//!
//! Leaves are not hashed, so nothing in the byte form of a node tells a
//! canonical leaf apart from an interior digest. A proof is only bound to a
//! tree shape through the leaf count it is checked against, see
//! [`Commitment`](crate::proof::Commitment).

use std::fmt;
use std::hash::Hasher;

use sha2::{Digest, Sha256};

use crate::node::Node;

/// A hashable type.
///
/// Types implementing `Hashable` feed their canonical byte form into a
/// [`Hasher`]. The form must be total and unambiguous: every value maps to
/// exactly one byte string, and two different values of the same type never
/// share one.
///
/// ```text
/// k1 == k2 <-> canonical(k1) == canonical(k2)
/// ```
///
/// Implementations for the common std types live next to this trait. A leaf
/// type of your own can delegate to them:
///
/// ```
/// use std::hash::Hasher;
/// use merkle_audit::hash::Hashable;
///
/// struct Entry {
///     seq: u64,
///     payload: String,
/// }
///
/// impl<H: Hasher> Hashable<H> for Entry {
///     fn hash(&self, state: &mut H) {
///         self.seq.hash(state);
///         self.payload.hash(state);
///     }
/// }
/// ```
///
/// Only the last field may be of variable length in such an impl; otherwise
/// wrap the fields in a tuple, whose components are length-prefixed.
pub trait Hashable<H: Hasher> {
    /// Feeds this value into the given [`Hasher`].
    fn hash(&self, state: &mut H);
}

/// Hashing algorithm type.
///
/// Algorithm conforms standard [`Hasher`] trait and provides methods to return
/// full length hash and reset current state.
pub trait Algorithm: Hasher + Default + Clone + Send + Sync + fmt::Debug {
    /// Interior node hash prefix.
    const INTERIOR: u8 = 0x01;

    /// Returns the hash value for the data stream written so far and resets
    /// the state.
    fn hash(&mut self) -> Node;

    /// Reset Hasher state.
    fn reset(&mut self);

    /// Writes a node as `u64_le(len) || bytes`.
    fn write_node(&mut self, node: &Node) {
        self.write(&(node.len() as u64).to_le_bytes());
        self.write(node.as_bytes());
    }

    /// Returns the hash value for an interior node with children `left` and
    /// `right`, in that order.
    fn node(&mut self, left: &Node, right: &Node) -> Node {
        self.reset();
        self.write(&[Self::INTERIOR]);
        self.write_node(left);
        self.write_node(right);
        self.hash()
    }
}

/// Combines two nodes into their parent with a fresh `A`.
pub fn combine<A: Algorithm>(left: &Node, right: &Node) -> Node {
    A::default().node(left, right)
}

/// Byte sink collecting the canonical form of a [`Hashable`] value.
#[derive(Debug, Clone, Default)]
pub struct Canonical(Vec<u8>);

impl Canonical {
    /// Creates an empty sink.
    pub fn new() -> Canonical {
        Canonical::default()
    }

    /// Consumes the sink, returning the collected bytes as a node.
    pub fn into_node(self) -> Node {
        Node::new(self.0)
    }
}

impl Hasher for Canonical {
    fn write(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    // Not a digest. Only the collected bytes are meaningful.
    fn finish(&self) -> u64 {
        self.0.len() as u64
    }
}

/// Returns the canonical byte form of `value`, the representation a leaf has
/// in layer 0 of a tree.
pub fn canonical<T: Hashable<Canonical> + ?Sized>(value: &T) -> Node {
    let mut sink = Canonical::new();
    value.hash(&mut sink);
    sink.into_node()
}

fn first_u64(digest: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(buf)
}

/// SHA-256 algorithm backed by the `sha2` crate. Default algorithm of
/// [`MerkleTree`](crate::merkle::MerkleTree).
#[derive(Clone, Default)]
pub struct Sha256Algorithm(Sha256);

impl Sha256Algorithm {
    /// Creates an algorithm with fresh state.
    pub fn new() -> Sha256Algorithm {
        Sha256Algorithm::default()
    }
}

impl fmt::Debug for Sha256Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Sha256Algorithm")
    }
}

impl Hasher for Sha256Algorithm {
    #[inline]
    fn write(&mut self, msg: &[u8]) {
        Digest::update(&mut self.0, msg)
    }

    #[inline]
    fn finish(&self) -> u64 {
        first_u64(&self.0.clone().finalize())
    }
}

impl Algorithm for Sha256Algorithm {
    #[inline]
    fn hash(&mut self) -> Node {
        Node::new(self.0.finalize_reset().to_vec())
    }

    #[inline]
    fn reset(&mut self) {
        Digest::reset(&mut self.0);
    }
}

/// SHA-256 algorithm backed by `ring`.
///
/// Produces the same digests as [`Sha256Algorithm`].
#[cfg(feature = "ring")]
#[derive(Clone)]
pub struct RingSha256Algorithm(ring::digest::Context);

#[cfg(feature = "ring")]
impl RingSha256Algorithm {
    /// Creates an algorithm with fresh state.
    pub fn new() -> RingSha256Algorithm {
        RingSha256Algorithm(ring::digest::Context::new(&ring::digest::SHA256))
    }
}

#[cfg(feature = "ring")]
impl Default for RingSha256Algorithm {
    fn default() -> RingSha256Algorithm {
        RingSha256Algorithm::new()
    }
}

#[cfg(feature = "ring")]
impl fmt::Debug for RingSha256Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("RingSha256Algorithm")
    }
}

#[cfg(feature = "ring")]
impl Hasher for RingSha256Algorithm {
    #[inline]
    fn write(&mut self, msg: &[u8]) {
        self.0.update(msg)
    }

    #[inline]
    fn finish(&self) -> u64 {
        first_u64(self.0.clone().finish().as_ref())
    }
}

#[cfg(feature = "ring")]
impl Algorithm for RingSha256Algorithm {
    #[inline]
    fn hash(&mut self) -> Node {
        let ctx = std::mem::replace(self, RingSha256Algorithm::new()).0;
        Node::from(ctx.finish().as_ref())
    }

    #[inline]
    fn reset(&mut self) {
        *self = RingSha256Algorithm::new();
    }
}
