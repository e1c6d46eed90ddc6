use std::marker::PhantomData;

use log::{debug, trace};
use rayon::prelude::*;

use crate::config::BuildConfig;
use crate::error::{MerkleError, Result};
use crate::hash::{canonical, combine, Algorithm, Canonical, Hashable, Sha256Algorithm};
use crate::node::Node;
use crate::proof::{Commitment, Proof, ProofNode, Side};

/// Merkle Tree.
///
/// Every layer is kept as its own vec, from the canonical leaves (layer 0) up
/// to the single-element root layer, so proofs can be cut from the tree at
/// any time without rebuilding it.
///
/// A merkle tree is a tree in which every non-leaf node is the hash of its
/// children nodes. A diagram depicting how it works:
///
/// ```text
///          root = h(h12, h34)
///         /                  \
///   h12 = h(l1, l2)      h34 = h(l3, l4)
///    /        \            /        \
///  l1         l2         l3         l4
/// ```
///
/// In memory layout:
///
/// ```text
///     [[l1 l2 l3 l4] [h12 h34] [root]]
/// ```
///
/// The number of inputs is not always a power of two. When a layer has an odd
/// number of nodes, its last node is paired with itself:
///
/// ```text
///     [[l1 l2 l3] [h(l1, l2) h(l3, l3)] [root]]
/// ```
///
/// A tree built from no leaves has no layers and no root.
#[derive(Debug, Clone)]
pub struct MerkleTree<A: Algorithm = Sha256Algorithm> {
    layers: Vec<Vec<Node>>,
    leafs: usize,
    _a: PhantomData<A>,
}

impl<A: Algorithm> PartialEq for MerkleTree<A> {
    fn eq(&self, other: &Self) -> bool {
        self.leafs == other.leafs && self.layers == other.layers
    }
}

impl<A: Algorithm> Eq for MerkleTree<A> {}

impl<A: Algorithm> MerkleTree<A> {
    /// Creates new merkle tree from a list of hashable objects.
    pub fn new<L, I>(leaves: I) -> Result<MerkleTree<A>>
    where
        L: Hashable<Canonical>,
        I: IntoIterator<Item = L>,
    {
        Self::with_config(leaves, &BuildConfig::default())
    }

    /// Creates new merkle tree from a list of hashable objects with explicit
    /// build settings.
    pub fn with_config<L, I>(leaves: I, config: &BuildConfig) -> Result<MerkleTree<A>>
    where
        L: Hashable<Canonical>,
        I: IntoIterator<Item = L>,
    {
        let iter = leaves.into_iter();
        let hint = iter.size_hint().0;
        if hint > config.max_leafs() {
            return Err(MerkleError::TooManyLeaves {
                leafs: hint,
                max: config.max_leafs(),
            });
        }

        let nodes: Vec<Node> = iter.map(|leaf| canonical(&leaf)).collect();
        Self::from_nodes(nodes, config)
    }

    /// Creates new merkle tree from leaves already in canonical form.
    pub fn from_nodes(leaves: Vec<Node>, config: &BuildConfig) -> Result<MerkleTree<A>> {
        let leafs = leaves.len();
        if leafs > config.max_leafs() {
            return Err(MerkleError::TooManyLeaves {
                leafs,
                max: config.max_leafs(),
            });
        }

        if leafs == 0 {
            debug!("no leaves, tree has no root");
            return Ok(MerkleTree {
                layers: Vec::new(),
                leafs: 0,
                _a: PhantomData,
            });
        }

        let height = tree_height(leafs);
        debug!(
            "building tree: leafs {}, total size {}, height {}",
            leafs,
            get_merkle_tree_len(leafs),
            height
        );

        let mut layers: Vec<Vec<Node>> = Vec::with_capacity(height + 1);
        layers.push(leaves);

        // Each layer must be complete before the next one is started.
        loop {
            let next = match layers.last() {
                Some(current) if current.len() > 1 => {
                    build_layer::<A>(current, layers.len() - 1, config)
                }
                _ => break,
            };
            layers.push(next);
        }

        debug_assert_eq!(layers.len(), height + 1);

        Ok(MerkleTree {
            layers,
            leafs,
            _a: PhantomData,
        })
    }

    /// Generate merkle tree inclusion proof for leaf `i`.
    pub fn gen_proof(&self, i: usize) -> Result<Proof<A>> {
        if self.is_empty() {
            return Err(MerkleError::InvalidTreeState);
        }
        if i >= self.leafs {
            return Err(MerkleError::IndexOutOfRange {
                index: i,
                leafs: self.leafs,
            });
        }

        let mut path = Vec::with_capacity(self.height());
        let mut j = i;

        // The root layer never contributes a sibling.
        for layer in &self.layers[..self.layers.len() - 1] {
            let side = Side::of_sibling(j);
            let sibling = match side {
                // j is left, its sibling may be itself at the end of an odd layer
                Side::Right => (j + 1).min(layer.len() - 1),
                // j is right
                Side::Left => j - 1,
            };
            path.push(ProofNode::new(layer[sibling].clone(), side));
            j >>= 1;
        }

        trace!("proof for leaf {} of {}: {} siblings", i, self.leafs, path.len());
        Proof::new(self.leafs, path)
    }

    /// Generate inclusion proofs for several leaves, stopping at the first
    /// invalid index.
    pub fn gen_proofs<I: IntoIterator<Item = usize>>(&self, indices: I) -> Result<Vec<Proof<A>>> {
        indices.into_iter().map(|i| self.gen_proof(i)).collect()
    }

    /// Returns merkle root, `None` for a tree without leaves.
    pub fn root(&self) -> Option<&Node> {
        self.layers.last().and_then(|layer| layer.first())
    }

    /// Returns the root together with the leaf count, `None` for a tree
    /// without leaves.
    pub fn commitment(&self) -> Option<Commitment> {
        self.root().map(|root| Commitment::new(root.clone(), self.leafs))
    }

    /// Returns the canonical form of leaf `i`.
    pub fn leaf(&self, i: usize) -> Option<&Node> {
        self.layers.first().and_then(|layer| layer.get(i))
    }

    /// Returns layer `level`, where layer 0 holds the leaves.
    pub fn layer(&self, level: usize) -> Option<&[Node]> {
        self.layers.get(level).map(Vec::as_slice)
    }

    /// Returns all layers, leaves first and root last.
    pub fn layers(&self) -> &[Vec<Node>] {
        &self.layers
    }

    /// Returns number of nodes in the tree, all layers included.
    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the tree was built from no leaves.
    pub fn is_empty(&self) -> bool {
        self.leafs == 0
    }

    /// Returns height of the tree, the number of layers below the root. This
    /// is also the length of every proof.
    pub fn height(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// Returns original number of elements the tree was built upon.
    pub fn leafs(&self) -> usize {
        self.leafs
    }
}

fn build_layer<A: Algorithm>(current: &[Node], level: usize, config: &BuildConfig) -> Vec<Node> {
    if current.len() >= config.parallel_threshold() {
        debug!(
            "layer {}: combining {} nodes in parallel, {} per task",
            level,
            current.len(),
            config.chunk_nodes()
        );
        // Chunks hold an even number of nodes, so only the very last chunk of
        // an odd layer ends with an unpaired node.
        current
            .par_chunks(config.chunk_nodes())
            .flat_map_iter(|chunk| chunk.chunks(2).map(combine_pair::<A>))
            .collect()
    } else {
        trace!("layer {}: combining {} nodes", level, current.len());
        current.chunks(2).map(combine_pair::<A>).collect()
    }
}

// Duplicate-last: an unpaired node is combined with itself.
fn combine_pair<A: Algorithm>(pair: &[Node]) -> Node {
    let left = &pair[0];
    let right = pair.get(1).unwrap_or(left);
    combine::<A>(left, right)
}

/// Number of layers below the root of a tree with `leafs` leaves, that is
/// `ceil(log2(leafs))`, and 0 for zero or one leaf.
pub fn tree_height(leafs: usize) -> usize {
    if leafs <= 1 {
        0
    } else {
        (usize::BITS - (leafs - 1).leading_zeros()) as usize
    }
}

/// Width of every layer of a tree with `leafs` leaves, leaves first.
pub fn layer_widths(leafs: usize) -> Vec<usize> {
    let mut widths = Vec::with_capacity(tree_height(leafs) + 1);
    if leafs == 0 {
        return widths;
    }

    let mut width = leafs;
    widths.push(width);
    while width > 1 {
        width = (width + 1) / 2;
        widths.push(width);
    }
    widths
}

/// Total number of nodes of a tree with `leafs` leaves.
pub fn get_merkle_tree_len(leafs: usize) -> usize {
    layer_widths(leafs).into_iter().sum()
}
