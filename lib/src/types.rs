use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::hashing::hash_leaf;

/// 32-byte hash type
pub type H256 = [u8; 32];

/// One entry of an airdrop distribution list.
///
/// Only `index`, `recipient` and `amount_exact` are hashed. `amount` is the
/// display value and is carried along for reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionLeaf {
    pub index: u64,
    pub recipient: Address,
    #[serde(default)]
    pub amount: String,
    #[serde(with = "decimal_u256")]
    pub amount_exact: U256,
}

impl DistributionLeaf {
    pub fn new(index: u64, recipient: Address, amount_exact: U256) -> Self {
        Self {
            index,
            recipient,
            amount: amount_exact.to_string(),
            amount_exact,
        }
    }

    /// Attach a display amount derived from `decimals`.
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.amount = format_amount(self.amount_exact, decimals);
        self
    }

    /// Double-keccak leaf hash of this entry.
    pub fn hash(&self) -> H256 {
        hash_leaf(self.index, self.recipient, self.amount_exact)
    }
}

/// Proof that a single leaf belongs to a distribution root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimProof {
    pub index: u64,
    pub recipient: Address,
    pub amount_exact: U256,
    pub proof: Vec<H256>,
    pub root: H256,
}

/// One push-distribution batch, ready for submission.
///
/// Proofs are computed against the tree of the whole distribution, so the
/// three vectors are parallel and independent of batch boundaries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionBatch {
    pub recipients: Vec<Address>,
    pub amounts: Vec<U256>,
    pub proofs: Vec<Vec<H256>>,
}

impl DistributionBatch {
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// A typed parameter from a Solidity-style signature, e.g. `uint256 amount`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl SolParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    pub fn is_array(&self) -> bool {
        self.ty.ends_with("[]")
    }

    /// Type with a single `[]` suffix removed.
    pub fn base_type(&self) -> &str {
        self.ty.strip_suffix("[]").unwrap_or(&self.ty)
    }
}

/// Render a base-unit amount as a decimal string with `decimals` places,
/// trimming trailing zeros in the fraction.
pub fn format_amount(amount_exact: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount_exact.to_string();
    }

    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount_exact / scale;
    let fraction = amount_exact % scale;

    if fraction.is_zero() {
        return whole.to_string();
    }

    let padded = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

/// Base-unit amounts travel as decimal strings; plain JSON integers and
/// `0x` hex strings are accepted on input.
mod decimal_u256 {
    use std::str::FromStr;

    use alloy_primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(u64),
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => U256::from_str(text.trim())
                .map_err(|e| de::Error::custom(format!("invalid amount {text:?}: {e}"))),
            Raw::Integer(n) => Ok(U256::from(n)),
        }
    }
}
