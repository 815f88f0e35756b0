//! Airdrop distribution and claim-data tool.
//!
//! You can run this script using the following command:
//! ```shell
//! RUST_LOG=info cargo run --release -- root --input distribution.json
//! ```
//! or
//! ```shell
//! RUST_LOG=info cargo run --release -- encode-claim \
//!     --signature "uint256 amount, string currency" --values '["1000", "EUR"]'
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atk_lib::{
    batch_distribution, claim_proof, encode_claim_data, verify_proof, DistributionLeaf,
    InputValue, MerkleTree, SignatureCodec, DEFAULT_BATCH_SIZE, DEFAULT_CACHE_CAPACITY, H256,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::filter::EnvFilter;

/// The arguments for the command.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of parsed signatures kept before the cache resets.
    #[arg(long, env = "ATK_SIGNATURE_CACHE_CAPACITY", default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the merkle root of a distribution file.
    Root {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print the claim proof for the leaf with the given index.
    Proof {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        index: u64,
    },
    /// Check a proof for the leaf with the given index against a root.
    Verify {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        index: u64,
        /// Comma-separated 0x-prefixed sibling hashes.
        #[arg(long, value_delimiter = ',')]
        proof: Vec<String>,
        #[arg(long)]
        root: String,
    },
    /// Split a distribution into push batches with full-tree proofs.
    Batches {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, env = "ATK_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// Include `batchDistribute` calldata for each batch.
        #[arg(long)]
        calldata: bool,
    },
    /// Parse a parameter signature such as "uint256 amount, string currency".
    ParseSignature { signature: String },
    /// ABI-encode claim values against a parameter signature.
    EncodeClaim {
        #[arg(long)]
        signature: String,
        /// JSON array with one value per parameter.
        #[arg(long)]
        values: String,
    },
}

fn main() -> Result<()> {
    // Setup the logger.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    dotenv::dotenv().ok();

    // Parse the command line arguments.
    let args = Args::parse();
    let codec = SignatureCodec::with_capacity(args.cache_capacity);

    let output = match args.command {
        Command::Root { input } => {
            let leaves = load_distribution(&input)?;
            let tree = MerkleTree::build(&leaves)?;
            tracing::info!(leaves = tree.leaf_count(), "computed distribution root");
            json!({
                "root": hex32(&tree.root()),
                "leaves": tree.leaf_count(),
                "depth": tree.depth(),
            })
        }
        Command::Proof { input, index } => {
            let leaves = load_distribution(&input)?;
            let leaf = find_leaf(&leaves, index)?;
            let tree = MerkleTree::build(&leaves)?;
            let claim = claim_proof(&tree, leaf)?;
            json!({
                "index": claim.index,
                "recipient": claim.recipient.to_string(),
                "amount": leaf.amount,
                "amountExact": claim.amount_exact.to_string(),
                "proof": claim.proof.iter().map(hex32).collect::<Vec<_>>(),
                "root": hex32(&claim.root),
                "calldata": format!("0x{}", hex::encode(claim.calldata())),
            })
        }
        Command::Verify {
            input,
            index,
            proof,
            root,
        } => {
            let leaves = load_distribution(&input)?;
            let leaf = find_leaf(&leaves, index)?;
            let proof = proof
                .iter()
                .map(|hash| parse_hash(hash))
                .collect::<Result<Vec<_>>>()?;
            let root = parse_hash(&root)?;
            let valid = verify_proof(leaf, &proof, &root);
            tracing::info!(index, valid, "verified claim proof");
            json!({ "index": index, "valid": valid })
        }
        Command::Batches {
            input,
            batch_size,
            calldata,
        } => {
            let leaves = load_distribution(&input)?;
            let batches = batch_distribution(&leaves, batch_size)?;
            tracing::info!(
                leaves = leaves.len(),
                batches = batches.len(),
                batch_size,
                "packaged distribution"
            );
            let rendered: Vec<_> = batches
                .iter()
                .map(|batch| {
                    let mut entry = json!({
                        "recipients": batch.recipients.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        "amounts": batch.amounts.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        "proofs": batch
                            .proofs
                            .iter()
                            .map(|proof| proof.iter().map(hex32).collect::<Vec<_>>())
                            .collect::<Vec<_>>(),
                    });
                    if calldata {
                        entry["calldata"] = json!(format!("0x{}", hex::encode(batch.calldata())));
                    }
                    entry
                })
                .collect();
            json!(rendered)
        }
        Command::ParseSignature { signature } => {
            let params = codec.parse(&signature)?;
            serde_json::to_value(&*params)?
        }
        Command::EncodeClaim { signature, values } => {
            let raw: serde_json::Value =
                serde_json::from_str(&values).context("Failed to parse values JSON")?;
            let values = match InputValue::try_from(raw)? {
                InputValue::List(values) => values,
                other => anyhow::bail!("values must be a JSON array, got {}", other.kind()),
            };
            let encoded = encode_claim_data(&codec, &signature, &values)?;
            json!({ "data": format!("0x{}", hex::encode(encoded)) })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_distribution(path: &Path) -> Result<Vec<DistributionLeaf>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read distribution file {:?}", path))?;
    let leaves: Vec<DistributionLeaf> =
        serde_json::from_str(&content).context("Failed to parse distribution JSON")?;
    tracing::debug!(leaves = leaves.len(), ?path, "loaded distribution");
    Ok(leaves)
}

fn find_leaf(leaves: &[DistributionLeaf], index: u64) -> Result<&DistributionLeaf> {
    leaves
        .iter()
        .find(|leaf| leaf.index == index)
        .with_context(|| format!("No leaf with index {} in distribution", index))
}

fn hex32(hash: &H256) -> String {
    format!("0x{}", hex::encode(hash))
}

fn parse_hash(value: &str) -> Result<H256> {
    let cleaned = value.trim().strip_prefix("0x").unwrap_or(value.trim());
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash)
        .with_context(|| format!("Invalid 32-byte hex value: {}", value))?;
    Ok(hash)
}
