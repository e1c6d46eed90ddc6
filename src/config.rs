//! Tree build configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Layer width (number of nodes) used as threshold to decide how a layer is
/// combined. Narrower layers are hashed on the calling thread, wider ones are
/// split across the rayon pool.
pub const SMALL_TREE_BUILD: usize = 1024;

/// Number of nodes handed to a single rayon task while combining a wide layer.
pub const BUILD_CHUNK_NODES: usize = 1024;

/// Default bound on the number of leaves a tree may be built upon. All layers
/// are retained for the lifetime of the tree, so this caps its memory.
pub const MAX_LEAFS: usize = 1 << 28;

// FIXME: Hand-picked constants, some proper benchmarks should be done
// to choose more appropriate values and document the decision.

/// Knobs for [`MerkleTree::with_config`](crate::merkle::MerkleTree::with_config).
///
/// ```
/// use merkle_audit::config::BuildConfig;
///
/// let config = BuildConfig::default()
///     .with_parallel_threshold(4096)
///     .with_max_leafs(1_000_000);
/// assert_eq!(config.parallel_threshold(), 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuildConfig {
    parallel_threshold: usize,
    chunk_nodes: usize,
    max_leafs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            parallel_threshold: SMALL_TREE_BUILD,
            chunk_nodes: BUILD_CHUNK_NODES,
            max_leafs: MAX_LEAFS,
        }
    }
}

impl BuildConfig {
    /// Configuration that never leaves the calling thread.
    pub fn sequential() -> Self {
        BuildConfig::default().with_parallel_threshold(usize::MAX)
    }

    /// Layers with at least `threshold` nodes are combined in parallel.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(2);
        self
    }

    /// Nodes per parallel task, rounded down to an even count (at least 2) so
    /// a chunk never splits a pair.
    pub fn with_chunk_nodes(mut self, nodes: usize) -> Self {
        let nodes = nodes.max(2);
        self.chunk_nodes = nodes - (nodes & 1);
        self
    }

    /// Upper bound on the number of leaves.
    pub fn with_max_leafs(mut self, max: usize) -> Self {
        self.max_leafs = max;
        self
    }

    /// Returns the parallel threshold.
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Returns the number of nodes per parallel task.
    pub fn chunk_nodes(&self) -> usize {
        self.chunk_nodes
    }

    /// Returns the leaf count bound.
    pub fn max_leafs(&self) -> usize {
        self.max_leafs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let config = BuildConfig::default();
        assert_eq!(config.parallel_threshold(), SMALL_TREE_BUILD);
        assert_eq!(config.chunk_nodes(), BUILD_CHUNK_NODES);
        assert_eq!(config.max_leafs(), MAX_LEAFS);
    }

    #[test]
    fn test_chunk_nodes_stay_even() {
        assert_eq!(BuildConfig::default().with_chunk_nodes(7).chunk_nodes(), 6);
        assert_eq!(BuildConfig::default().with_chunk_nodes(0).chunk_nodes(), 2);
        assert_eq!(BuildConfig::default().with_chunk_nodes(1).chunk_nodes(), 2);
        assert_eq!(BuildConfig::default().with_chunk_nodes(64).chunk_nodes(), 64);
    }

    #[test]
    fn test_sequential_never_reaches_threshold() {
        assert_eq!(BuildConfig::sequential().parallel_threshold(), usize::MAX);
    }
}
