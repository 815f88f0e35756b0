use alloy_primitives::B256;
use alloy_sol_types::SolCall;

use crate::error::MerkleError;
use crate::merkle::MerkleTree;
use crate::types::{ClaimProof, DistributionBatch, DistributionLeaf};
use crate::{batchDistributeCall, claimCall};

/// Batch size used by the push-airdrop distribution flow.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Split `leaves` into submission batches.
///
/// The tree is built once over the whole distribution and every proof in
/// every batch is taken from it.
pub fn batch_distribution(
    leaves: &[DistributionLeaf],
    batch_size: usize,
) -> Result<Vec<DistributionBatch>, MerkleError> {
    if batch_size == 0 {
        return Err(MerkleError::InvalidBatchSize);
    }

    let tree = MerkleTree::build(leaves)?;
    let mut batches = Vec::with_capacity(leaves.len().div_ceil(batch_size));

    for (batch_number, chunk) in leaves.chunks(batch_size).enumerate() {
        let offset = batch_number * batch_size;
        let mut batch = DistributionBatch {
            recipients: Vec::with_capacity(chunk.len()),
            amounts: Vec::with_capacity(chunk.len()),
            proofs: Vec::with_capacity(chunk.len()),
        };

        for (i, leaf) in chunk.iter().enumerate() {
            batch.recipients.push(leaf.recipient);
            batch.amounts.push(leaf.amount_exact);
            batch.proofs.push(tree.proof_at(offset + i)?);
        }

        tracing::debug!(batch = batch_number, size = batch.len(), "packaged distribution batch");
        batches.push(batch);
    }

    Ok(batches)
}

/// Proof bundle for a single claimant.
pub fn claim_proof(tree: &MerkleTree, leaf: &DistributionLeaf) -> Result<ClaimProof, MerkleError> {
    Ok(ClaimProof {
        index: leaf.index,
        recipient: leaf.recipient,
        amount_exact: leaf.amount_exact,
        proof: tree.proof(leaf)?,
        root: tree.root(),
    })
}

impl DistributionBatch {
    /// ABI-encoded `batchDistribute(address[],uint256[],bytes32[][])` call.
    pub fn calldata(&self) -> Vec<u8> {
        batchDistributeCall {
            recipients: self.recipients.clone(),
            amounts: self.amounts.clone(),
            merkleProofs: self
                .proofs
                .iter()
                .map(|proof| proof.iter().copied().map(B256::from).collect())
                .collect(),
        }
        .abi_encode()
    }
}

impl ClaimProof {
    /// ABI-encoded `claim(uint256,uint256,bytes32[])` call.
    pub fn calldata(&self) -> Vec<u8> {
        claimCall {
            index: alloy_primitives::U256::from(self.index),
            totalAmount: self.amount_exact,
            merkleProof: self.proof.iter().copied().map(B256::from).collect(),
        }
        .abi_encode()
    }
}
