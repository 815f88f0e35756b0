use alloy_primitives::{Address, U256};
use alloy_sol_types::SolValue;
use sha3::{Digest, Keccak256};

use crate::types::H256;

/// Compute Keccak256 hash
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash two nodes in ascending byte order, so verification never needs to
/// know which side a sibling sits on.
pub fn hash_pair(a: &H256, b: &H256) -> H256 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(low)
        .chain_update(high)
        .finalize()
        .into()
}

/// Leaf hash: `keccak256(keccak256(abi.encode(index, recipient, amountExact)))`.
pub fn hash_leaf(index: u64, recipient: Address, amount_exact: U256) -> H256 {
    let encoded = (U256::from(index), recipient, amount_exact).abi_encode_params();
    keccak256(&keccak256(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_keccak256_empty() {
        // Well-known digest of the empty string.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hash_pair_is_commutative() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn test_hash_pair_sorts_before_hashing() {
        let a = [9u8; 32];
        let b = [3u8; 32];
        let mut concat = Vec::with_capacity(64);
        concat.extend_from_slice(&b);
        concat.extend_from_slice(&a);
        assert_eq!(hash_pair(&a, &b), keccak256(&concat));
    }

    #[test]
    fn test_hash_leaf_layout() {
        let recipient = address!("00000000000000000000000000000000000000aa");
        let mut encoded = [0u8; 96];
        encoded[31] = 7;
        encoded[44..64].copy_from_slice(recipient.as_slice());
        encoded[95] = 100;

        let expected = keccak256(&keccak256(&encoded));
        assert_eq!(hash_leaf(7, recipient, U256::from(100u64)), expected);
    }

    #[test]
    fn test_hash_leaf_is_double_hashed() {
        let recipient = address!("00000000000000000000000000000000000000aa");
        let single = keccak256(&(U256::from(1u64), recipient, U256::from(5u64)).abi_encode_params());
        assert_ne!(hash_leaf(1, recipient, U256::from(5u64)), single);
    }
}
