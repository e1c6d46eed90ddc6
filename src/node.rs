use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MerkleError;

/// A single node of the tree.
///
/// Nodes of layer 0 hold the canonical bytes of a leaf, nodes of every layer
/// above hold the digest produced by an [`Algorithm`](crate::hash::Algorithm).
/// A node prints, and parses back, as lowercase hex.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "String", try_from = "String")
)]
pub struct Node(Vec<u8>);

impl Node {
    /// Wraps already canonical bytes.
    pub fn new(bytes: Vec<u8>) -> Node {
        Node(bytes)
    }

    /// Decodes a node from its hex form.
    pub fn from_hex<S: AsRef<[u8]>>(hex: S) -> Result<Node, MerkleError> {
        Ok(Node(hex::decode(hex)?))
    }

    /// Returns the lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the node and returns its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Byte length of the node.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a node without bytes (the canonical form of an
    /// empty string, for instance).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Node {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Node {
    fn from(bytes: Vec<u8>) -> Self {
        Node(bytes)
    }
}

impl From<&[u8]> for Node {
    fn from(bytes: &[u8]) -> Self {
        Node(bytes.to_vec())
    }
}

impl From<Node> for String {
    fn from(node: Node) -> Self {
        node.to_hex()
    }
}

impl TryFrom<String> for Node {
    type Error = MerkleError;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        Node::from_hex(hex)
    }
}

impl FromStr for Node {
    type Err = MerkleError;

    fn from_str(hex: &str) -> Result<Self, Self::Err> {
        Node::from_hex(hex)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Node(0x{})", self)
    }
}
