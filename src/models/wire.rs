// Lenient field decoders for backend JSON.
// Producers send numbers as ints, floats or numeric strings, and timestamps in seconds or ms.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Epoch values below this are taken as seconds (year ~5138 in seconds, 1973 in ms).
pub const SECONDS_CUTOFF: i64 = 100_000_000_000;

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Numeric {
    fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Numeric::Int(i) => *i as f64,
            Numeric::Float(f) => *f,
            Numeric::Text(s) => s.trim().parse::<f64>().ok()?,
            Numeric::Other(_) => return None,
        };
        v.is_finite().then_some(v)
    }
}

/// Normalize a wire epoch (seconds or milliseconds) to milliseconds.
pub fn normalize_epoch_ms(value: f64) -> i64 {
    if value.abs() < SECONDS_CUTOFF as f64 {
        (value * 1000.0).round() as i64
    } else {
        value.round() as i64
    }
}

/// `Option<i64>` epoch milliseconds from seconds, milliseconds, or a numeric string.
/// Unparseable values become `None` rather than failing the record.
pub fn epoch_ms<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Numeric> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|n| n.as_f64()).map(normalize_epoch_ms))
}

/// `Option<f64>` from a number or numeric string.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Numeric> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|n| n.as_f64()))
}

/// `T::default()` for both a missing field and an explicit `null`.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
