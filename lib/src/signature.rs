use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::error::SignatureError;
use crate::types::SolParam;

/// Number of parsed signatures a codec keeps before resetting its cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

static DEFAULT_CODEC: Lazy<SignatureCodec> = Lazy::new(SignatureCodec::new);

/// Base types a signature may reference, after stripping one `[]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Uint(usize),
    Int(usize),
    Bool,
    Address,
    String,
    Bytes,
    FixedBytes(usize),
}

impl ParamKind {
    /// Classify a base type string. Returns `None` for anything outside the
    /// supported vocabulary.
    pub fn parse(base: &str) -> Option<Self> {
        match base {
            "uint" => return Some(Self::Uint(256)),
            "int" => return Some(Self::Int(256)),
            "bool" => return Some(Self::Bool),
            "address" => return Some(Self::Address),
            "string" => return Some(Self::String),
            "bytes" => return Some(Self::Bytes),
            _ => {}
        }

        if let Some(bits) = base.strip_prefix("uint") {
            return int_width(bits).map(Self::Uint);
        }
        if let Some(bits) = base.strip_prefix("int") {
            return int_width(bits).map(Self::Int);
        }
        if let Some(size) = base.strip_prefix("bytes") {
            return canonical_number(size)
                .filter(|n| (1..=32).contains(n))
                .map(Self::FixedBytes);
        }
        None
    }
}

fn int_width(bits: &str) -> Option<usize> {
    canonical_number(bits).filter(|n| (8..=256).contains(n) && n % 8 == 0)
}

// Rejects leading zeros and signs so `uint08` is not an alias of `uint8`.
fn canonical_number(digits: &str) -> Option<usize> {
    let n: usize = digits.parse().ok()?;
    (n.to_string() == digits).then_some(n)
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse one `"<type> <name>"` segment.
fn parse_segment(segment: &str) -> Result<SolParam, SignatureError> {
    let invalid = || SignatureError::InvalidParameterFormat(segment.to_string());

    let mut tokens = segment.split_whitespace();
    let (ty, name) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(ty), Some(name), None) => (ty, name),
        _ => return Err(invalid()),
    };

    let base = ty.strip_suffix("[]").unwrap_or(ty);
    if !is_identifier(base) || !is_identifier(name) {
        return Err(invalid());
    }

    if ParamKind::parse(base).is_none() {
        return Err(SignatureError::UnsupportedType(base.to_string()));
    }

    Ok(SolParam::new(name, ty))
}

/// Parse a full parameter list without touching any cache.
pub fn parse_params(signature: &str) -> Result<Vec<SolParam>, SignatureError> {
    if signature.trim().is_empty() {
        return Ok(Vec::new());
    }
    signature
        .split(',')
        .map(|segment| parse_segment(segment.trim()))
        .collect()
}

/// Memoizing signature parser.
///
/// The cache is keyed by the exact input string. When inserting would exceed
/// the capacity the whole cache is cleared first.
#[derive(Debug)]
pub struct SignatureCodec {
    capacity: usize,
    cache: Mutex<HashMap<String, Arc<Vec<SolParam>>>>,
}

impl SignatureCodec {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            cache: Mutex::new(HashMap::with_capacity(capacity.max(1))),
        }
    }

    /// Process-wide codec used by the free functions.
    pub fn global() -> &'static SignatureCodec {
        &DEFAULT_CODEC
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Parse `signature`, returning the cached list on repeat calls.
    pub fn parse(&self, signature: &str) -> Result<Arc<Vec<SolParam>>, SignatureError> {
        if let Some(params) = self.lock().get(signature) {
            return Ok(Arc::clone(params));
        }

        let params = Arc::new(parse_params(signature)?);

        let mut cache = self.lock();
        if cache.len() >= self.capacity && !cache.contains_key(signature) {
            tracing::debug!(capacity = self.capacity, "signature cache full, clearing");
            cache.clear();
        }
        // Another caller may have parsed the same string meanwhile; keep theirs.
        let entry = cache
            .entry(signature.to_string())
            .or_insert_with(|| Arc::clone(&params));
        Ok(Arc::clone(entry))
    }

    pub fn cache_len(&self) -> usize {
        self.lock().len()
    }

    pub fn clear_cache(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Vec<SolParam>>>> {
        // Entries are immutable once inserted, so a poisoned map is still valid.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SignatureCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `signature` through the process-wide codec.
pub fn parse_signature(signature: &str) -> Result<Arc<Vec<SolParam>>, SignatureError> {
    SignatureCodec::global().parse(signature)
}
