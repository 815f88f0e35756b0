use std::str::FromStr;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, I256, U256};

use crate::error::EncodeError;
use crate::signature::{ParamKind, SignatureCodec};
use crate::value::{convert_value, ConvertedValue, InputValue};

/// ABI-encode `values` as the parameters described by `signature`.
///
/// Each value is converted with [`convert_value`] first, so loosely typed
/// claim data (decimal strings, `"true"`, numbers) is accepted.
pub fn encode_claim_data(
    codec: &SignatureCodec,
    signature: &str,
    values: &[InputValue],
) -> Result<Vec<u8>, EncodeError> {
    let params = codec.parse(signature)?;
    if params.len() != values.len() {
        return Err(EncodeError::ArityMismatch {
            expected: params.len(),
            actual: values.len(),
        });
    }

    let tokens = params
        .iter()
        .zip(values)
        .map(|(param, value)| {
            let converted = convert_value(value, &param.ty)?;
            to_dyn_value(&converted, &param.ty)
        })
        .collect::<Result<Vec<_>, EncodeError>>()?;

    Ok(DynSolValue::Tuple(tokens).abi_encode_params())
}

/// Map a converted value onto the dynamic ABI value for `ty`.
pub fn to_dyn_value(value: &ConvertedValue, ty: &str) -> Result<DynSolValue, EncodeError> {
    if let Some(element_ty) = ty.strip_suffix("[]") {
        return match value {
            ConvertedValue::List(items) => items
                .iter()
                .map(|item| to_dyn_value(item, element_ty))
                .collect::<Result<_, _>>()
                .map(DynSolValue::Array),
            other => Err(mismatch(other, ty)),
        };
    }

    let kind = ParamKind::parse(ty).ok_or_else(|| EncodeError::Unencodable(ty.to_string()))?;
    match (kind, value) {
        (ParamKind::Uint(bits), ConvertedValue::Uint(u)) => Ok(DynSolValue::Uint(*u, bits)),
        (ParamKind::Uint(bits), ConvertedValue::Number(n)) => {
            let n = u64::try_from(*n).map_err(|_| mismatch(value, ty))?;
            Ok(DynSolValue::Uint(U256::from(n), bits))
        }
        (ParamKind::Int(bits), ConvertedValue::Int(i)) => Ok(DynSolValue::Int(*i, bits)),
        (ParamKind::Int(bits), ConvertedValue::Number(n)) => {
            let i = I256::try_from(*n).map_err(|_| mismatch(value, ty))?;
            Ok(DynSolValue::Int(i, bits))
        }
        (ParamKind::Bool, ConvertedValue::Bool(b)) => Ok(DynSolValue::Bool(*b)),
        (ParamKind::String, ConvertedValue::String(s)) => Ok(DynSolValue::String(s.clone())),
        (ParamKind::Address, ConvertedValue::String(s)) => Address::from_str(s.trim())
            .map(DynSolValue::Address)
            .map_err(|e| invalid(s, ty, e.to_string())),
        (ParamKind::Bytes, ConvertedValue::String(s)) => decode_hex(s, ty).map(DynSolValue::Bytes),
        (ParamKind::FixedBytes(size), ConvertedValue::String(s)) => {
            let bytes = decode_hex(s, ty)?;
            if bytes.len() > size {
                return Err(invalid(s, ty, format!("expected at most {size} bytes, got {}", bytes.len())));
            }
            let mut word = B256::ZERO;
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(word, size))
        }
        (_, other) => Err(mismatch(other, ty)),
    }
}

fn decode_hex(s: &str, ty: &str) -> Result<Vec<u8>, EncodeError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| invalid(s, ty, e.to_string()))
}

fn invalid(value: &str, ty: &str, reason: String) -> EncodeError {
    EncodeError::InvalidValue {
        value: value.to_string(),
        ty: ty.to_string(),
        reason,
    }
}

fn mismatch(value: &ConvertedValue, ty: &str) -> EncodeError {
    invalid(&format!("{value:?}"), ty, "value does not match type".to_string())
}
