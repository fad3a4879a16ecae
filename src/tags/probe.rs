//! ffprobe JSON report DTOs
//!
//! Shape of `ffprobe -show_error -show_format -show_streams -print_format json`.
//! ffprobe prints most numbers as strings ("44100", "181.200000") and a few
//! as integers, so numeric fields go through [`Numeric`].
//! DO NOT use these types outside the tags module.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Full probe report.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeReport {
    pub streams: Vec<ProbeStream>,
    pub format: ProbeFormat,
}

/// One stream entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeStream {
    /// "audio", "video", "data", ...
    pub codec_type: String,
    pub codec_name: Option<String>,
    pub sample_rate: Option<Numeric>,
    pub channels: Option<Numeric>,
    pub bits_per_raw_sample: Option<Numeric>,
    pub bits_per_sample: Option<Numeric>,
    #[serde(default)]
    pub tags: Map<String, Value>,
}

/// Container-level information.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeFormat {
    pub filename: String,
    pub format_name: String,
    pub duration: Option<Numeric>,
    pub bit_rate: Option<Numeric>,
    #[serde(default)]
    pub tags: Map<String, Value>,
}

/// Error block emitted by `-show_error`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeError {
    pub code: Option<i64>,
    pub string: Option<String>,
}

/// A number that may arrive as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        let value: Option<f64> = match self {
            Numeric::Int(v) => Some(*v as f64),
            Numeric::Float(v) => Some(*v),
            Numeric::Text(s) => s.trim().parse().ok(),
        };
        value.filter(|v| v.is_finite())
    }

    /// Integer value, truncating fractions ("181.2" -> 181).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Int(v) => Some(*v),
            Numeric::Text(s) if s.trim().parse::<i64>().is_ok() => s.trim().parse().ok(),
            _ => self.as_f64().map(|v| v.trunc() as i64),
        }
    }

    /// Positive integer value; zero and negatives count as absent.
    pub fn as_positive(&self) -> Option<u64> {
        self.as_i64().filter(|v| *v > 0).map(|v| v as u64)
    }
}

/// Extract the message from an `error` block, if the report has one.
pub fn reported_error(raw: &Value) -> Option<String> {
    let error = raw.get("error")?;
    let message = serde_json::from_value::<ProbeError>(error.clone())
        .ok()
        .and_then(|e| match (e.string, e.code) {
            (Some(s), _) => Some(s),
            (None, Some(code)) => Some(format!("error code {}", code)),
            (None, None) => None,
        })
        .unwrap_or_else(|| error.to_string());
    Some(message)
}

/// Render a tag value as text. ffprobe emits strings; anything else is
/// kept in its JSON form.
pub fn tag_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
