use merkle_audit::config::BuildConfig;
use merkle_audit::hash::canonical;
use merkle_audit::merkle::MerkleTree;
use merkle_audit::proof::verify_proof;
use proptest::prelude::*;

fn leaves_strategy(min: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..24), min..48)
}

proptest! {
    #[test]
    fn root_is_deterministic(leaves in leaves_strategy(1)) {
        let a: MerkleTree = MerkleTree::new(&leaves).unwrap();
        let b: MerkleTree = MerkleTree::new(&leaves).unwrap();
        prop_assert_eq!(a.root(), b.root());
    }

    #[test]
    fn parallel_build_matches_sequential(leaves in leaves_strategy(1)) {
        let parallel = BuildConfig::default().with_parallel_threshold(2).with_chunk_nodes(4);
        let a: MerkleTree = MerkleTree::with_config(&leaves, &BuildConfig::sequential()).unwrap();
        let b: MerkleTree = MerkleTree::with_config(&leaves, &parallel).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn single_leaf_is_identity(leaf in proptest::collection::vec(any::<u8>(), 0..64)) {
        let tree: MerkleTree = MerkleTree::new([&leaf]).unwrap();
        prop_assert_eq!(tree.root(), Some(&canonical(&leaf)));
    }

    #[test]
    fn proof_round_trip(leaves in leaves_strategy(1), index in any::<prop::sample::Index>()) {
        let tree: MerkleTree = MerkleTree::new(&leaves).unwrap();
        let i = index.index(leaves.len());
        let proof = tree.gen_proof(i).unwrap();
        prop_assert_eq!(proof.len(), tree.height());
        prop_assert!(verify_proof(&leaves[i], i, &proof, tree.root().unwrap()).unwrap());
    }

    #[test]
    fn proof_rejects_tampered_leaf(
        leaves in leaves_strategy(1),
        index in any::<prop::sample::Index>(),
        replacement in proptest::collection::vec(any::<u8>(), 0..24),
    ) {
        let i = index.index(leaves.len());
        prop_assume!(replacement != leaves[i]);

        let tree: MerkleTree = MerkleTree::new(&leaves).unwrap();
        let proof = tree.gen_proof(i).unwrap();
        prop_assert!(!verify_proof(&replacement, i, &proof, tree.root().unwrap()).unwrap());
    }

    #[test]
    fn tampering_changes_root(
        leaves in leaves_strategy(2),
        index in any::<prop::sample::Index>(),
        replacement in proptest::collection::vec(any::<u8>(), 0..24),
    ) {
        let i = index.index(leaves.len());
        prop_assume!(replacement != leaves[i]);

        let mut tampered = leaves.clone();
        tampered[i] = replacement;

        let a: MerkleTree = MerkleTree::new(&leaves).unwrap();
        let b: MerkleTree = MerkleTree::new(&tampered).unwrap();
        prop_assert_ne!(a.root(), b.root());
    }
}
