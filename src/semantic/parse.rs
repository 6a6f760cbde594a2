// Response parsing for generate-style detector endpoints.
//
// The endpoint either answers with one JSON envelope or streams
// newline-delimited chunks shaped `{response?, done?}`. The model's actual
// answer is the concatenation of every `response` fragment, and it may be
// wrapped in chatter, so the hits object is taken from the first `{` to the
// last `}` of that text.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::moderation::models::{Hit, HitSource};
use crate::words::{clamp_severity, MIN_SEVERITY};

#[derive(Deserialize)]
struct GenerateChunk {
    response: Option<String>,
    done: Option<bool>,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    hits: Vec<Value>,
}

/// A hit as the model reports it. Models are loose with types, so numbers
/// are read as f64 and validated afterwards.
#[derive(Deserialize)]
struct RawHit {
    term: Option<String>,
    start: Option<f64>,
    end: Option<f64>,
    severity: Option<f64>,
}

/// Parse a full response body into hits.
///
/// Errors mean "no usable answer"; callers treat them as zero hits.
pub fn parse_generate_response(body: &str) -> Result<Vec<Hit>> {
    let answer = reassemble(body);
    let object = extract_json_object(&answer).context("No JSON object in detector response")?;
    let envelope: HitsEnvelope =
        serde_json::from_str(object).context("Detector response has no valid hits array")?;

    Ok(envelope
        .hits
        .into_iter()
        .filter_map(|value| serde_json::from_value::<RawHit>(value).ok())
        .filter_map(into_hit)
        .collect())
}

/// Rebuild the model's answer from a single envelope or a chunk stream.
/// Bodies with no `response` fragments at all are returned unchanged.
pub fn reassemble(body: &str) -> String {
    if let Ok(GenerateChunk {
        response: Some(whole),
        ..
    }) = serde_json::from_str::<GenerateChunk>(body)
    {
        return whole;
    }

    let mut combined = String::new();
    let mut saw_fragment = false;
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        // Partial or garbage lines are skipped, not fatal.
        let Ok(chunk) = serde_json::from_str::<GenerateChunk>(line) else {
            continue;
        };
        if let Some(fragment) = chunk.response {
            combined.push_str(&fragment);
            saw_fragment = true;
        }
        if chunk.done.unwrap_or(false) {
            break;
        }
    }

    if saw_fragment {
        combined
    } else {
        body.to_string()
    }
}

/// The outermost JSON object: first `{` through last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn into_hit(raw: RawHit) -> Option<Hit> {
    let term = raw.term.unwrap_or_default().trim().to_string();

    let mut start = raw.start.and_then(offset);
    let mut end = raw.end.and_then(offset);
    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            start = None;
            end = None;
        }
    }

    if term.is_empty() && (start.is_none() || end.is_none()) {
        return None;
    }

    Some(Hit {
        term,
        start,
        end,
        severity: severity(raw.severity),
        source: HitSource::Semantic,
    })
}

fn offset(value: f64) -> Option<usize> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as usize)
}

/// Missing or zero severity means 1; anything else is clamped into 1..=3.
fn severity(value: Option<f64>) -> u8 {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 => clamp_severity(v.round().min(255.0) as u8),
        _ => MIN_SEVERITY,
    }
}
