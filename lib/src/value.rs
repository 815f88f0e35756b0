use std::fmt;

use alloy_primitives::{Sign, I256, U256};

use crate::error::ConversionError;
use crate::signature::ParamKind;

/// Largest integer a double represents exactly.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Loosely typed input as it arrives from claim data.
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Null,
    Bool(bool),
    Number(f64),
    Uint(U256),
    Int(I256),
    String(String),
    List(Vec<InputValue>),
}

impl InputValue {
    /// Runtime kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Uint(_) | Self::Int(_) => "bigint",
            Self::String(_) => "string",
            Self::List(_) => "array",
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.is_nan() => write!(f, "NaN"),
            Self::Number(n) if n.is_infinite() => {
                write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
            }
            Self::Number(n) if *n == 0.0 => write!(f, "0"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s}"),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    // Nested nulls render empty, matching array joins.
                    if *item != Self::Null {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<U256> for InputValue {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<I256> for InputValue {
    fn from(value: I256) -> Self {
        Self::Int(value)
    }
}

impl<T: Into<InputValue>> From<Vec<T>> for InputValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<serde_json::Value> for InputValue {
    type Error = ConversionError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    if u <= MAX_SAFE_INTEGER {
                        Self::Number(u as f64)
                    } else {
                        Self::Uint(U256::from(u))
                    }
                } else if let Some(i) = n.as_i64() {
                    if i.unsigned_abs() <= MAX_SAFE_INTEGER {
                        Self::Number(i as f64)
                    } else {
                        Self::Int(I256::try_from(i).map_err(|_| {
                            ConversionError::UnsupportedInput(i.to_string())
                        })?)
                    }
                } else {
                    Self::Number(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(_) => return Err(ConversionError::UnsupportedInput(value.to_string())),
        })
    }
}

/// A value coerced to the shape its parameter type requires.
#[derive(Clone, Debug, PartialEq)]
pub enum ConvertedValue {
    Uint(U256),
    Int(I256),
    Number(i64),
    Bool(bool),
    String(String),
    List(Vec<ConvertedValue>),
    /// Input for an unrecognised type, passed through untouched.
    Raw(InputValue),
}

/// True when `ty` (ignoring one `[]`) needs more precision than a double.
pub fn should_convert_to_bigint(ty: &str) -> bool {
    let base = ty.strip_suffix("[]").unwrap_or(ty);
    matches!(
        base,
        "uint64" | "uint128" | "uint256" | "int64" | "int128" | "int256" | "uint" | "int"
    )
}

/// Coerce `value` into the representation `ty` requires.
///
/// Unrecognised types pass the value through with a warning rather than
/// failing.
pub fn convert_value(value: &InputValue, ty: &str) -> Result<ConvertedValue, ConversionError> {
    if let Some(element_ty) = ty.strip_suffix("[]") {
        return match value {
            InputValue::List(items) => items
                .iter()
                .map(|item| convert_value(item, element_ty))
                .collect::<Result<_, _>>()
                .map(ConvertedValue::List),
            other => Err(ConversionError::ExpectedArray {
                ty: ty.to_string(),
                actual: other.kind(),
            }),
        };
    }

    match ParamKind::parse(ty) {
        Some(ParamKind::Uint(bits)) if should_convert_to_bigint(ty) || bits > 32 => {
            to_big_uint(value, ty, bits).map(ConvertedValue::Uint)
        }
        Some(ParamKind::Int(bits)) if should_convert_to_bigint(ty) || bits > 32 => {
            to_big_int(value, ty, bits).map(ConvertedValue::Int)
        }
        Some(ParamKind::Uint(bits)) => to_small_int(value, ty, bits, false).map(ConvertedValue::Number),
        Some(ParamKind::Int(bits)) => to_small_int(value, ty, bits, true).map(ConvertedValue::Number),
        Some(ParamKind::Bool) => to_bool(value, ty).map(ConvertedValue::Bool),
        Some(
            ParamKind::String | ParamKind::Address | ParamKind::Bytes | ParamKind::FixedBytes(_),
        ) => Ok(ConvertedValue::String(value.to_string())),
        None => {
            tracing::warn!(ty, "unsupported parameter type, passing value through");
            Ok(ConvertedValue::Raw(value.clone()))
        }
    }
}

/// Sign and magnitude of an integer-like input, following `BigInt(value)`.
fn integer_parts(value: &InputValue, ty: &str) -> Result<(bool, U256), ConversionError> {
    let invalid = || ConversionError::InvalidBigInt {
        value: value.to_string(),
        ty: ty.to_string(),
    };

    match value {
        InputValue::Bool(b) => Ok((false, U256::from(*b as u8))),
        InputValue::Uint(u) => Ok((false, *u)),
        InputValue::Int(i) => Ok((i.is_negative(), i.unsigned_abs())),
        InputValue::Number(n) => {
            if !n.is_finite() || n.fract() != 0.0 {
                return Err(invalid());
            }
            // Integral doubles print without exponent or fraction.
            let digits = format!("{:.0}", n.abs());
            let magnitude = U256::from_str_radix(&digits, 10).map_err(|_| invalid())?;
            Ok((*n < 0.0, magnitude))
        }
        InputValue::String(s) => {
            let s = s.trim();
            let (negative, unsigned) = match s.as_bytes().first() {
                Some(b'-') => (true, &s[1..]),
                Some(b'+') => (false, &s[1..]),
                _ => (false, s),
            };
            let magnitude = match unsigned
                .strip_prefix("0x")
                .or_else(|| unsigned.strip_prefix("0X"))
            {
                // Hex literals are unsigned only.
                Some(hex) if !negative && is_hex_digits(hex) => U256::from_str_radix(hex, 16),
                Some(_) => return Err(invalid()),
                None if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) => {
                    U256::from_str_radix(unsigned, 10)
                }
                None => return Err(invalid()),
            }
            .map_err(|_| invalid())?;
            Ok((negative, magnitude))
        }
        InputValue::Null | InputValue::List(_) => Err(invalid()),
    }
}

fn to_big_uint(value: &InputValue, ty: &str, bits: usize) -> Result<U256, ConversionError> {
    let (negative, magnitude) = integer_parts(value, ty)?;
    if negative && !magnitude.is_zero() {
        return Err(ConversionError::NegativeUnsigned {
            value: value.to_string(),
            ty: ty.to_string(),
        });
    }
    if magnitude.bit_len() > bits {
        return Err(ConversionError::OutOfRange {
            value: value.to_string(),
            ty: ty.to_string(),
        });
    }
    Ok(magnitude)
}

fn to_big_int(value: &InputValue, ty: &str, bits: usize) -> Result<I256, ConversionError> {
    let (negative, magnitude) = integer_parts(value, ty)?;
    let out_of_range = || ConversionError::OutOfRange {
        value: value.to_string(),
        ty: ty.to_string(),
    };

    // intN spans [-2^(N-1), 2^(N-1) - 1].
    let bound = U256::from(1u8) << (bits - 1);
    if magnitude > bound || (!negative && magnitude == bound) {
        return Err(out_of_range());
    }

    let sign = if negative { Sign::Negative } else { Sign::Positive };
    I256::checked_from_sign_and_abs(sign, magnitude).ok_or_else(out_of_range)
}

/// `Number(value)` coercion for widths that fit in a double.
fn to_small_int(
    value: &InputValue,
    ty: &str,
    bits: usize,
    signed: bool,
) -> Result<i64, ConversionError> {
    let invalid = || ConversionError::InvalidNumber {
        value: value.to_string(),
        ty: ty.to_string(),
    };

    let number = match value {
        InputValue::Number(n) => *n,
        InputValue::Bool(b) => f64::from(*b as u8),
        InputValue::Uint(u) => u.to_string().parse().map_err(|_| invalid())?,
        InputValue::Int(i) => i.to_string().parse().map_err(|_| invalid())?,
        InputValue::String(s) => parse_number(s.trim()).ok_or_else(invalid)?,
        InputValue::Null | InputValue::List(_) => return Err(invalid()),
    };

    if number.is_nan() {
        return Err(invalid());
    }
    if !signed && number < 0.0 {
        return Err(ConversionError::NegativeUnsigned {
            value: value.to_string(),
            ty: ty.to_string(),
        });
    }
    if !number.is_finite() || number.fract() != 0.0 {
        return Err(invalid());
    }

    let (min, max) = if signed {
        (-(2f64.powi(bits as i32 - 1)), 2f64.powi(bits as i32 - 1) - 1.0)
    } else {
        (0.0, 2f64.powi(bits as i32) - 1.0)
    };
    if number < min || number > max {
        return Err(ConversionError::OutOfRange {
            value: value.to_string(),
            ty: ty.to_string(),
        });
    }

    Ok(number as i64)
}

// `from_str_radix` tolerates `_` separators and a leading sign; claim data
// must be plain hex digits.
fn is_hex_digits(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if !is_hex_digits(hex) {
            return None;
        }
        return u64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    // Rust also accepts "inf"/"nan" spellings; those are not numeric claim data.
    if s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }
    s.parse().ok()
}

fn to_bool(value: &InputValue, ty: &str) -> Result<bool, ConversionError> {
    let invalid = || ConversionError::InvalidBoolean {
        value: value.to_string(),
        ty: ty.to_string(),
    };

    match value {
        InputValue::Bool(b) => Ok(*b),
        InputValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(invalid()),
        },
        // NaN is false, as `Boolean(NaN)` is.
        InputValue::Number(n) => Ok(*n != 0.0 && !n.is_nan()),
        InputValue::Uint(u) => Ok(!u.is_zero()),
        InputValue::Int(i) => Ok(!i.is_zero()),
        InputValue::Null | InputValue::List(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_should_convert_to_bigint() {
        assert!(should_convert_to_bigint("uint256"));
        assert!(should_convert_to_bigint("int64"));
        assert!(should_convert_to_bigint("uint"));
        assert!(should_convert_to_bigint("uint256[]"));
        assert!(!should_convert_to_bigint("uint32"));
        assert!(!should_convert_to_bigint("int8"));
        assert!(!should_convert_to_bigint("bool"));
        assert!(!should_convert_to_bigint("address"));
        assert!(!should_convert_to_bigint("bytes32"));
        assert!(!should_convert_to_bigint("mystery"));
    }

    #[test]
    fn test_convert_large_uint_string() {
        let converted =
            convert_value(&"123456789012345678901234567890".into(), "uint256").unwrap();
        assert_eq!(
            converted,
            ConvertedValue::Uint(U256::from_str("123456789012345678901234567890").unwrap())
        );
    }

    #[test]
    fn test_convert_hex_uint_string() {
        let converted = convert_value(&"0xff".into(), "uint256").unwrap();
        assert_eq!(converted, ConvertedValue::Uint(U256::from(255u64)));
    }

    #[test]
    fn test_convert_negative_int256() {
        let converted = convert_value(&"-42".into(), "int256").unwrap();
        assert_eq!(converted, ConvertedValue::Int(I256::try_from(-42i64).unwrap()));
    }

    #[test]
    fn test_convert_bigint_failure_names_value() {
        let err = convert_value(&"abc".into(), "uint256").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidBigInt { .. }));
        let message = err.to_string();
        assert!(message.contains("abc"));
        assert!(message.contains("uint256"));
    }

    #[test]
    fn test_convert_rejects_malformed_hex() {
        for raw in ["0x_", "0xff_ff", "0x+ff", "0x", "0xg1"] {
            let err = convert_value(&raw.into(), "uint256").unwrap_err();
            assert!(
                matches!(err, ConversionError::InvalidBigInt { .. }),
                "{raw} should be rejected for uint256"
            );
            assert!(err.to_string().contains(raw));

            let err = convert_value(&raw.into(), "uint16").unwrap_err();
            assert!(
                matches!(err, ConversionError::InvalidNumber { .. }),
                "{raw} should be rejected for uint16"
            );
        }
        assert_eq!(
            convert_value(&"0xff".into(), "uint16").unwrap(),
            ConvertedValue::Number(255)
        );
    }

    #[test]
    fn test_convert_bigint_rejects_fraction() {
        let err = convert_value(&InputValue::Number(1.5), "uint128").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidBigInt { .. }));
    }

    #[test]
    fn test_convert_bigint_range() {
        let err = convert_value(&"18446744073709551616".into(), "uint64").unwrap_err();
        assert!(matches!(err, ConversionError::OutOfRange { .. }));

        assert!(convert_value(&"-128".into(), "int64").is_ok());
        let err = convert_value(&"-9223372036854775809".into(), "int64").unwrap_err();
        assert!(matches!(err, ConversionError::OutOfRange { .. }));
        let err = convert_value(&"9223372036854775808".into(), "int64").unwrap_err();
        assert!(matches!(err, ConversionError::OutOfRange { .. }));
    }

    #[test]
    fn test_convert_negative_unsigned() {
        let err = convert_value(&InputValue::Number(-5.0), "uint32").unwrap_err();
        assert!(matches!(err, ConversionError::NegativeUnsigned { .. }));
        assert!(err.to_string().contains("cannot be negative"));

        let err = convert_value(&"-1".into(), "uint256").unwrap_err();
        assert!(err.to_string().contains("cannot be negative"));
    }

    #[test]
    fn test_convert_small_int_failures() {
        let err = convert_value(&"twelve".into(), "uint8").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidNumber { .. }));

        let err = convert_value(&"256".into(), "uint8").unwrap_err();
        assert!(matches!(err, ConversionError::OutOfRange { .. }));

        assert_eq!(
            convert_value(&"-128".into(), "int8").unwrap(),
            ConvertedValue::Number(-128)
        );
        assert_eq!(
            convert_value(&InputValue::Bool(true), "uint16").unwrap(),
            ConvertedValue::Number(1)
        );
    }

    #[test]
    fn test_convert_bool() {
        assert_eq!(
            convert_value(&"TRUE".into(), "bool").unwrap(),
            ConvertedValue::Bool(true)
        );
        assert_eq!(convert_value(&"0".into(), "bool").unwrap(), ConvertedValue::Bool(false));
        assert_eq!(
            convert_value(&InputValue::Number(-3.0), "bool").unwrap(),
            ConvertedValue::Bool(true)
        );
        assert_eq!(
            convert_value(&InputValue::Number(0.0), "bool").unwrap(),
            ConvertedValue::Bool(false)
        );
        assert_eq!(
            convert_value(&InputValue::Bool(false), "bool").unwrap(),
            ConvertedValue::Bool(false)
        );
        assert_eq!(
            convert_value(&InputValue::Number(f64::NAN), "bool").unwrap(),
            ConvertedValue::Bool(false)
        );
        assert_eq!(
            convert_value(&InputValue::Number(f64::INFINITY), "bool").unwrap(),
            ConvertedValue::Bool(true)
        );
    }

    #[test]
    fn test_convert_invalid_bool() {
        let err = convert_value(&"maybe".into(), "bool").unwrap_err();
        assert!(err.to_string().contains("Invalid boolean value"));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_convert_small_int_array() {
        let converted = convert_value(&vec!["1", "2", "3"].into(), "uint32[]").unwrap();
        assert_eq!(
            converted,
            ConvertedValue::List(vec![
                ConvertedValue::Number(1),
                ConvertedValue::Number(2),
                ConvertedValue::Number(3),
            ])
        );
    }

    #[test]
    fn test_convert_array_expected() {
        let err = convert_value(&"1".into(), "uint256[]").unwrap_err();
        assert_eq!(
            err,
            ConversionError::ExpectedArray {
                ty: "uint256[]".to_string(),
                actual: "string",
            }
        );
    }

    #[test]
    fn test_convert_array_element_error_propagates() {
        let err = convert_value(&vec!["1", "x"].into(), "uint256[]").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidBigInt { .. }));
    }

    #[test]
    fn test_convert_stringlike_types() {
        assert_eq!(
            convert_value(&InputValue::Number(12.0), "string").unwrap(),
            ConvertedValue::String("12".to_string())
        );
        assert_eq!(
            convert_value(&"0xAbC".into(), "address").unwrap(),
            ConvertedValue::String("0xAbC".to_string())
        );
        assert_eq!(
            convert_value(&"0x1234".into(), "bytes4").unwrap(),
            ConvertedValue::String("0x1234".to_string())
        );
        assert_eq!(
            convert_value(&InputValue::Bool(true), "bytes").unwrap(),
            ConvertedValue::String("true".to_string())
        );
    }

    #[test]
    fn test_convert_unknown_type_passes_through() {
        let value = InputValue::Number(7.0);
        assert_eq!(
            convert_value(&value, "tuple").unwrap(),
            ConvertedValue::Raw(value)
        );
    }

    #[test]
    fn test_input_from_json() {
        let value = InputValue::try_from(json!([1, "two", true, null, 1.5])).unwrap();
        assert_eq!(
            value,
            InputValue::List(vec![
                InputValue::Number(1.0),
                InputValue::String("two".to_string()),
                InputValue::Bool(true),
                InputValue::Null,
                InputValue::Number(1.5),
            ])
        );

        let big = InputValue::try_from(json!(u64::MAX)).unwrap();
        assert_eq!(big, InputValue::Uint(U256::from(u64::MAX)));

        assert!(InputValue::try_from(json!({"a": 1})).is_err());
    }

    #[test]
    fn test_input_display() {
        assert_eq!(InputValue::Number(3.0).to_string(), "3");
        assert_eq!(InputValue::Number(-0.0).to_string(), "0");
        assert_eq!(InputValue::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(
            InputValue::List(vec![InputValue::Number(1.0), InputValue::Null, "x".into()])
                .to_string(),
            "1,,x"
        );
    }
}
