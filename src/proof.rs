use std::marker::PhantomData;

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MerkleError, Result};
use crate::hash::{canonical, Algorithm, Canonical, Hashable, Sha256Algorithm};
use crate::merkle::tree_height;
use crate::node::Node;

/// Position of a sibling relative to the running hash it is combined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// The sibling comes first: `h(sibling, running)`.
    Left,
    /// The sibling comes second: `h(running, sibling)`.
    Right,
}

impl Side {
    /// Side of the sibling of the node at `position` within its layer.
    pub fn of_sibling(position: usize) -> Side {
        if position & 1 == 0 {
            Side::Right
        } else {
            Side::Left
        }
    }
}

/// One step of an authentication path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProofNode {
    sibling: Node,
    side: Side,
}

impl ProofNode {
    /// Creates a path step.
    pub fn new(sibling: Node, side: Side) -> ProofNode {
        ProofNode { sibling, side }
    }

    /// Returns the sibling node.
    pub fn sibling(&self) -> &Node {
        &self.sibling
    }

    /// Returns where the sibling goes when combined.
    pub fn side(&self) -> Side {
        self.side
    }
}

/// What a caller stores after building a tree: its root and its leaf count.
///
/// The leaf count fixes the shape every proof must have. A bare root does
/// not, since a proof cut for a smaller tree can present an interior digest
/// as a leaf and still reach the same root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Commitment {
    root: Node,
    leafs: usize,
}

impl Commitment {
    /// Creates a commitment to a tree of `leafs` leaves with root `root`.
    pub fn new(root: Node, leafs: usize) -> Commitment {
        Commitment { root, leafs }
    }

    /// Returns the committed root.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns the committed number of leaves.
    pub fn leafs(&self) -> usize {
        self.leafs
    }
}

/// Merkle tree inclusion proof for one leaf.
///
/// Path layout, one step per layer below the root:
///
/// ```text
/// [ (s0, side0) (s1, side1) ... (sN-1, sideN-1) ]
/// ```
///
/// The proof also records how many leaves the tree had, which fixes the
/// expected path length. Neither the leaf nor the root is part of the proof:
/// the verifier supplies the leaf it wants to check and the root it committed
/// to earlier.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(bound = ""))]
pub struct Proof<A: Algorithm = Sha256Algorithm> {
    leafs: usize,
    path: Vec<ProofNode>,
    #[cfg_attr(feature = "serde", serde(skip))]
    _a: PhantomData<A>,
}

impl<A: Algorithm> PartialEq for Proof<A> {
    fn eq(&self, other: &Self) -> bool {
        self.leafs == other.leafs && self.path == other.path
    }
}

impl<A: Algorithm> Eq for Proof<A> {}

impl<A: Algorithm> Proof<A> {
    /// Creates new MT inclusion proof.
    pub fn new(leafs: usize, path: Vec<ProofNode>) -> Result<Proof<A>> {
        let proof = Proof {
            leafs,
            path,
            _a: PhantomData,
        };
        proof.check_shape()?;
        Ok(proof)
    }

    /// Returns the number of leaves of the tree the proof was cut from.
    pub fn leafs(&self) -> usize {
        self.leafs
    }

    /// Returns the authentication path.
    pub fn path(&self) -> &[ProofNode] {
        &self.path
    }

    /// Returns the number of path steps, the height of the tree.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Returns `true` for the proof of a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    fn check_shape(&self) -> Result<()> {
        if self.leafs == 0 {
            return Err(MerkleError::InvalidTreeState);
        }
        if self.path.len() != tree_height(self.leafs) {
            return Err(MerkleError::MalformedProof {
                reason: "path length does not match tree height",
            });
        }
        Ok(())
    }

    /// Recomputes the root from the canonical leaf `node` at `index`.
    ///
    /// Runs in `O(height)`; no layer is rebuilt.
    pub fn compute_root(&self, node: &Node, index: usize) -> Result<Node> {
        self.check_shape()?;
        if index >= self.leafs {
            return Err(MerkleError::IndexOutOfRange {
                index,
                leafs: self.leafs,
            });
        }

        let mut a = A::default();
        let mut h = node.clone();
        let mut j = index;

        for step in &self.path {
            if step.side != Side::of_sibling(j) {
                return Err(MerkleError::MalformedProof {
                    reason: "sibling side does not match leaf position",
                });
            }
            h = match step.side {
                Side::Left => a.node(&step.sibling, &h),
                Side::Right => a.node(&h, &step.sibling),
            };
            j >>= 1;
        }

        Ok(h)
    }

    /// Verifies that the canonical leaf `node` at `index` reproduces `root`.
    pub fn verify_node(&self, node: &Node, index: usize, root: &Node) -> Result<bool> {
        let computed = self.compute_root(node, index)?;
        let ok = computed == *root;
        trace!("leaf {} of {}: proof {}", index, self.leafs, if ok { "holds" } else { "rejected" });
        Ok(ok)
    }

    /// Verifies that `leaf` at `index` reproduces `root`.
    ///
    /// `Ok(false)` means the leaf, or a sibling along the path, differs from
    /// the data the root was committed over. Errors are reserved for proofs
    /// that do not fit the index or the tree shape.
    ///
    /// The shape is taken from the proof's own leaf count. Use
    /// [`verify_committed`](Proof::verify_committed) when the proof comes
    /// from an untrusted party.
    pub fn verify<L>(&self, leaf: &L, index: usize, root: &Node) -> Result<bool>
    where
        L: Hashable<Canonical> + ?Sized,
    {
        self.verify_node(&canonical(leaf), index, root)
    }

    /// Checks that the proof was cut from a tree of `leafs` leaves.
    pub fn check_leafs(&self, leafs: usize) -> Result<()> {
        if leafs == 0 {
            return Err(MerkleError::InvalidTreeState);
        }
        if self.leafs != leafs {
            return Err(MerkleError::MalformedProof {
                reason: "leaf count does not match the commitment",
            });
        }
        Ok(())
    }

    /// Verifies the canonical leaf `node` at `index` against `commitment`.
    pub fn verify_node_committed(
        &self,
        node: &Node,
        index: usize,
        commitment: &Commitment,
    ) -> Result<bool> {
        self.check_leafs(commitment.leafs())?;
        self.verify_node(node, index, commitment.root())
    }

    /// Verifies `leaf` at `index` against `commitment`, rejecting proofs
    /// shaped for a different number of leaves.
    pub fn verify_committed<L>(&self, leaf: &L, index: usize, commitment: &Commitment) -> Result<bool>
    where
        L: Hashable<Canonical> + ?Sized,
    {
        self.verify_node_committed(&canonical(leaf), index, commitment)
    }
}

/// Verifies that `leaf` at `index`, together with `proof`, reproduces `root`.
///
/// ```
/// use merkle_audit::merkle::MerkleTree;
/// use merkle_audit::proof::verify_proof;
///
/// let tree: MerkleTree = MerkleTree::new(["a", "b", "c", "d"]).unwrap();
/// let root = tree.root().unwrap().clone();
/// let proof = tree.gen_proof(0).unwrap();
///
/// assert!(verify_proof("a", 0, &proof, &root).unwrap());
/// assert!(!verify_proof("z", 0, &proof, &root).unwrap());
/// ```
pub fn verify_proof<A, L>(leaf: &L, index: usize, proof: &Proof<A>, root: &Node) -> Result<bool>
where
    A: Algorithm,
    L: Hashable<Canonical> + ?Sized,
{
    proof.verify(leaf, index, root)
}

/// Verifies that `leaf` at `index`, together with `proof`, reproduces the
/// committed tree.
pub fn verify_committed<A, L>(
    leaf: &L,
    index: usize,
    proof: &Proof<A>,
    commitment: &Commitment,
) -> Result<bool>
where
    A: Algorithm,
    L: Hashable<Canonical> + ?Sized,
{
    proof.verify_committed(leaf, index, commitment)
}

#[cfg(test)]
use crate::merkle::MerkleTree;

#[cfg(test)]
// Break one sibling inside the proof.
fn modify_proof<A: Algorithm>(proof: &mut Proof<A>) {
    use rand::prelude::*;
    use std::hash::Hasher;

    let i = random::<usize>() % proof.path.len();
    let k = random::<u64>();

    let mut a = A::default();
    a.write_node(&proof.path[i].sibling);
    a.write(&k.to_le_bytes());
    proof.path[i].sibling = a.hash();
}

#[test]
fn test_proofs() {
    let leafs = 1037;
    let tree: MerkleTree = MerkleTree::new(0..leafs as u64).unwrap();
    let root = tree.root().unwrap().clone();

    for i in 0..tree.leafs() {
        let mut p = tree.gen_proof(i).unwrap();
        assert_eq!(p.len(), tree.height());
        assert!(p.verify(&(i as u64), i, &root).unwrap());

        // Break the proof here and assert negative validation.
        modify_proof(&mut p);
        assert!(!p.verify(&(i as u64), i, &root).unwrap());
    }
}

#[test]
fn test_tampered_leaf_rejected() {
    let tree: MerkleTree = MerkleTree::new(["a", "b", "c", "d", "e"]).unwrap();
    let root = tree.root().unwrap().clone();

    for (i, leaf) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        let p = tree.gen_proof(i).unwrap();
        assert!(p.verify(leaf, i, &root).unwrap());
        assert!(!p.verify("tampered", i, &root).unwrap());
    }
}

#[test]
fn test_wrong_root_rejected() {
    let tree: MerkleTree = MerkleTree::new(["a", "b", "c"]).unwrap();
    let other: MerkleTree = MerkleTree::new(["a", "b", "x"]).unwrap();
    let p = tree.gen_proof(0).unwrap();
    assert!(!p.verify("a", 0, other.root().unwrap()).unwrap());
}

#[test]
fn test_single_leaf_proof() {
    let tree: MerkleTree = MerkleTree::new(["only"]).unwrap();
    let root = tree.root().unwrap().clone();
    let p = tree.gen_proof(0).unwrap();
    assert!(p.verify("only", 0, &root).unwrap());
    assert!(!p.verify("other", 0, &root).unwrap());
    assert_eq!(
        p.verify("only", 1, &root),
        Err(MerkleError::IndexOutOfRange { index: 1, leafs: 1 })
    );
}

#[test]
fn test_index_out_of_range() {
    let tree: MerkleTree = MerkleTree::new(["a", "b", "c", "d"]).unwrap();
    let root = tree.root().unwrap().clone();
    let p = tree.gen_proof(1).unwrap();
    assert_eq!(
        p.verify("b", 4, &root),
        Err(MerkleError::IndexOutOfRange { index: 4, leafs: 4 })
    );
}

#[test]
fn test_malformed_path_length() {
    let tree: MerkleTree = MerkleTree::new(["a", "b", "c", "d"]).unwrap();
    let p = tree.gen_proof(0).unwrap();

    let mut short = p.path().to_vec();
    short.pop();
    assert!(matches!(
        Proof::<Sha256Algorithm>::new(4, short),
        Err(MerkleError::MalformedProof { .. })
    ));

    let mut long = p.path().to_vec();
    long.push(long[0].clone());
    assert!(matches!(
        Proof::<Sha256Algorithm>::new(4, long),
        Err(MerkleError::MalformedProof { .. })
    ));

    assert_eq!(
        Proof::<Sha256Algorithm>::new(0, Vec::new()),
        Err(MerkleError::InvalidTreeState)
    );
}

#[test]
fn test_forged_side_rejected() {
    let tree: MerkleTree = MerkleTree::new(["a", "b", "c", "d"]).unwrap();
    let root = tree.root().unwrap().clone();
    let p = tree.gen_proof(0).unwrap();

    let mut path = p.path().to_vec();
    path[0] = ProofNode::new(path[0].sibling().clone(), Side::Left);
    let forged = Proof::<Sha256Algorithm>::new(4, path).unwrap();
    assert!(matches!(
        forged.verify("a", 0, &root),
        Err(MerkleError::MalformedProof { .. })
    ));

    // A valid proof replayed at another index disagrees on sides as well.
    assert!(matches!(
        p.verify("a", 1, &root),
        Err(MerkleError::MalformedProof { .. })
    ));
}

#[test]
fn test_compute_root_matches_tree() {
    let tree: MerkleTree = MerkleTree::new(0u32..13).unwrap();
    for i in 0..13 {
        let p = tree.gen_proof(i).unwrap();
        assert_eq!(
            p.compute_root(tree.leaf(i).unwrap(), i).unwrap(),
            *tree.root().unwrap()
        );
    }
}

#[test]
fn test_interior_node_posing_as_leaf() {
    let tree: MerkleTree = MerkleTree::new(["a", "b", "c", "d"]).unwrap();
    let commitment = tree.commitment().unwrap();
    let ab = tree.layer(1).unwrap()[0].clone();
    let cd = tree.layer(1).unwrap()[1].clone();

    // A height 1 proof lifts layer 1 to the root of the 4 leaf tree.
    let short = Proof::<Sha256Algorithm>::new(2, vec![ProofNode::new(cd, Side::Right)]).unwrap();
    assert!(short.verify_node(&ab, 0, commitment.root()).unwrap());

    assert!(matches!(
        short.verify_node_committed(&ab, 0, &commitment),
        Err(MerkleError::MalformedProof { .. })
    ));
    assert!(matches!(
        verify_committed(&ab, 0, &short, &commitment),
        Err(MerkleError::MalformedProof { .. })
    ));
}

#[test]
fn test_verify_committed() {
    let leaves = ["a", "b", "c", "d", "e"];
    let tree: MerkleTree = MerkleTree::new(leaves).unwrap();
    let commitment = tree.commitment().unwrap();
    assert_eq!(commitment.leafs(), 5);
    assert_eq!(commitment.root(), tree.root().unwrap());

    for (i, leaf) in leaves.iter().enumerate() {
        let p = tree.gen_proof(i).unwrap();
        assert!(p.verify_committed(leaf, i, &commitment).unwrap());
        assert!(!p.verify_committed("tampered", i, &commitment).unwrap());
    }

    let empty = Commitment::new(commitment.root().clone(), 0);
    assert_eq!(
        tree.gen_proof(0).unwrap().verify_committed("a", 0, &empty),
        Err(MerkleError::InvalidTreeState)
    );
}
