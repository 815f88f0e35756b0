use std::collections::HashMap;

use crate::error::MerkleError;
use crate::hashing::hash_pair;
use crate::types::{DistributionLeaf, H256};

/// A sorted-pair keccak Merkle tree over distribution leaves.
///
/// Levels are kept bottom-up: `layers[0]` holds the leaf hashes in input
/// order and the last layer holds the root. A level with an odd count carries
/// its last node up unchanged.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    layers: Vec<Vec<H256>>,
    // First position of every leaf hash in `layers[0]`.
    positions: HashMap<H256, usize>,
}

impl MerkleTree {
    /// Hash every leaf and build the tree.
    pub fn build(leaves: &[DistributionLeaf]) -> Result<Self, MerkleError> {
        let hashes = leaves.iter().map(DistributionLeaf::hash).collect();
        Self::from_leaf_hashes(hashes)
    }

    /// Build from already-hashed leaves.
    pub fn from_leaf_hashes(hashes: Vec<H256>) -> Result<Self, MerkleError> {
        if hashes.is_empty() {
            return Err(MerkleError::EmptyDistribution);
        }

        let mut positions = HashMap::with_capacity(hashes.len());
        for (position, hash) in hashes.iter().enumerate() {
            positions.entry(*hash).or_insert(position);
        }

        let mut layers = vec![hashes];
        while let Some(level) = layers.last().filter(|level| level.len() > 1) {
            let next_level = level
                .chunks(2)
                .map(|chunk| match chunk {
                    [left, right] => hash_pair(left, right),
                    _ => chunk[0],
                })
                .collect();
            layers.push(next_level);
        }

        tracing::debug!(
            leaves = layers[0].len(),
            depth = layers.len() - 1,
            "built merkle tree"
        );

        Ok(Self { layers, positions })
    }

    /// Root hash of the tree.
    pub fn root(&self) -> H256 {
        // Construction guarantees a non-empty top layer.
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn leaves(&self) -> &[H256] {
        &self.layers[0]
    }

    /// Sibling path for `leaf`, ordered from the leaf up to the root.
    pub fn proof(&self, leaf: &DistributionLeaf) -> Result<Vec<H256>, MerkleError> {
        self.proof_for_hash(&leaf.hash())
            .ok_or_else(|| MerkleError::LeafNotFound {
                index: leaf.index,
                recipient: leaf.recipient.to_string(),
            })
    }

    /// Sibling path for a leaf hash, or `None` if the hash is not a leaf.
    pub fn proof_for_hash(&self, hash: &H256) -> Option<Vec<H256>> {
        let position = *self.positions.get(hash)?;
        Some(self.path(position))
    }

    /// Sibling path for the leaf at `position` in the original input order.
    pub fn proof_at(&self, position: usize) -> Result<Vec<H256>, MerkleError> {
        if position >= self.leaf_count() {
            return Err(MerkleError::PositionOutOfBounds {
                position,
                leaves: self.leaf_count(),
            });
        }
        Ok(self.path(position))
    }

    fn path(&self, mut position: usize) -> Vec<H256> {
        let mut proof = Vec::with_capacity(self.depth());
        for level in &self.layers[..self.layers.len() - 1] {
            let sibling = position ^ 1;
            // The odd node out of a level has no sibling at that height.
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            position /= 2;
        }
        proof
    }
}

/// Build a tree over `leaves` and return its root.
pub fn get_root(leaves: &[DistributionLeaf]) -> Result<H256, MerkleError> {
    MerkleTree::build(leaves).map(|tree| tree.root())
}

/// Verify that `leaf` belongs to `root` through `proof`.
///
/// Returns `false` on any mismatch; never errors.
pub fn verify_proof(leaf: &DistributionLeaf, proof: &[H256], root: &H256) -> bool {
    verify_hash(&leaf.hash(), proof, root)
}

/// Fold `proof` over an already-hashed leaf and compare with `root`.
pub fn verify_hash(leaf_hash: &H256, proof: &[H256], root: &H256) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf_hash, |node, sibling| hash_pair(&node, sibling));
    computed == *root
}
