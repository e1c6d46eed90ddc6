use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MerkleError>;

/// Structural failures of tree construction, proof generation and proof
/// verification.
///
/// A proof that simply does not reproduce the committed root is not an error:
/// verification reports it as `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MerkleError {
    /// Proof requested or verified against a tree built from zero leaves.
    #[error("tree has no leaves, there is no root to prove against")]
    InvalidTreeState,

    /// Leaf index outside `[0, leafs)`.
    #[error("leaf index {index} is out of range for a tree of {leafs} leaves")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of leaves the tree was built upon.
        leafs: usize,
    },

    /// Proof shape does not match the tree it claims to belong to.
    #[error("malformed proof: {reason}")]
    MalformedProof {
        /// What is wrong with the proof.
        reason: &'static str,
    },

    /// Leaf count above [`BuildConfig::max_leafs`](crate::config::BuildConfig::max_leafs).
    #[error("{leafs} leaves exceed the configured limit of {max}")]
    TooManyLeaves {
        /// Number of leaves supplied.
        leafs: usize,
        /// Configured bound.
        max: usize,
    },

    /// A node could not be decoded from its hex form.
    #[error("invalid node encoding: {0}")]
    InvalidNode(#[from] hex::FromHexError),
}
