// Defensive JSON decoding: a bad element is skipped, a bad body is an error.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::FetchError;

/// Decode a JSON array, dropping elements that do not fit `T` (logged at WARN).
/// A body that is not JSON, or not an array, is `Malformed`.
pub fn decode_list<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<Vec<T>, FetchError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::Malformed(format!("{what}: {e}")))?;
    let Value::Array(items) = value else {
        return Err(FetchError::Malformed(format!(
            "{what}: expected JSON array, got {}",
            kind(&value)
        )));
    };

    let total = items.len();
    let mut out = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(v) => out.push(v),
            Err(e) => {
                tracing::warn!(
                    operation = "decode_list",
                    what,
                    index,
                    error = %e,
                    "skipping malformed element"
                );
            }
        }
    }
    if out.len() < total {
        tracing::debug!(what, kept = out.len(), total, "decoded list with skipped elements");
    }
    Ok(out)
}

/// Decode a single JSON object.
pub fn decode_one<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Malformed(format!("{what}: {e}")))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
