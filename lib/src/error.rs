use thiserror::Error;

/// Errors raised while building trees or extracting proofs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("cannot build a merkle tree from an empty distribution")]
    EmptyDistribution,

    #[error("leaf {index} for recipient {recipient} is not part of the tree")]
    LeafNotFound { index: u64, recipient: String },

    #[error("leaf position {position} is out of bounds for tree with {leaves} leaves")]
    PositionOutOfBounds { position: usize, leaves: usize },

    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
}

/// Errors raised while parsing a parameter signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid parameter format: \"{0}\". Expected \"<type> <name>\"")]
    InvalidParameterFormat(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
}

/// Errors raised while coercing an input value into a parameter type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Cannot convert \"{value}\" to BigInt for type {ty}")]
    InvalidBigInt { value: String, ty: String },

    #[error("Cannot convert \"{value}\" to number for type {ty}")]
    InvalidNumber { value: String, ty: String },

    #[error("Value {value} cannot be negative for unsigned type {ty}")]
    NegativeUnsigned { value: String, ty: String },

    #[error("Value {value} is out of range for type {ty}")]
    OutOfRange { value: String, ty: String },

    #[error("Invalid boolean value: \"{value}\" for type {ty}")]
    InvalidBoolean { value: String, ty: String },

    #[error("Expected array for type {ty}, got {actual}")]
    ExpectedArray { ty: String, actual: &'static str },

    #[error("Unsupported input value: {0}")]
    UnsupportedInput(String),
}

/// Errors raised while ABI-encoding claim data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("signature declares {expected} parameters but {actual} values were supplied")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("invalid {ty} value \"{value}\": {reason}")]
    InvalidValue {
        value: String,
        ty: String,
        reason: String,
    },

    #[error("type {0} cannot be ABI-encoded")]
    Unencodable(String),
}
