//! Claim amount normalization

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum AmountError {
    #[error("Claim amount '{0}' is not a number")]
    Unparseable(String),

    #[error("Claim amount '{0}' is not finite")]
    NonFinite(String),

    #[error("Claim amount has unsupported JSON type {0}")]
    UnsupportedType(&'static str),
}

/// Convert an extracted amount into a number
///
/// Accepts JSON numbers and strings such as `"$12,500.00"`: surrounding
/// whitespace is trimmed and every `$` and `,` removed before parsing.
pub fn normalize_claim_amount(amount: &Value) -> Result<f64, AmountError> {
    let parsed = match amount {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| AmountError::Unparseable(number.to_string()))?,
        Value::String(text) => {
            let cleaned: String = text
                .trim()
                .chars()
                .filter(|c| *c != '$' && *c != ',')
                .collect();
            cleaned
                .trim()
                .parse::<f64>()
                .map_err(|_| AmountError::Unparseable(text.clone()))?
        }
        Value::Bool(_) => return Err(AmountError::UnsupportedType("bool")),
        Value::Array(_) => return Err(AmountError::UnsupportedType("array")),
        Value::Object(_) => return Err(AmountError::UnsupportedType("object")),
        Value::Null => return Err(AmountError::UnsupportedType("null")),
    };

    if !parsed.is_finite() {
        return Err(AmountError::NonFinite(amount.to_string()));
    }
    Ok(parsed)
}
