//! Airdrop distribution trees and claim-signature coercion.
//!
//! Two independent pieces live here: a sorted-pair keccak Merkle tree over
//! `(index, recipient, amountExact)` leaves, and a codec that parses
//! Solidity-style parameter lists and coerces loose claim data into typed,
//! ABI-encodable values.

use alloy_sol_types::sol;

pub mod abi;
pub mod distribution;
pub mod error;
pub mod hashing;
pub mod merkle;
pub mod signature;
pub mod types;
pub mod value;

pub use abi::*;
pub use distribution::*;
pub use error::*;
pub use hashing::*;
pub use merkle::*;
pub use signature::*;
pub use types::*;
pub use value::*;

sol! {
    /// Push-airdrop entry point, one call per distribution batch.
    function batchDistribute(address[] recipients, uint256[] amounts, bytes32[][] merkleProofs);

    /// Pull-airdrop entry point for a single claimant.
    function claim(uint256 index, uint256 totalAmount, bytes32[] merkleProof);
}
