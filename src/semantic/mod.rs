// Semantic detection: optional contextual detector behind a trait.
//
// Semantic hits are strictly additive. A slow, broken or unreachable
// detector degrades to "no semantic hits" and never aborts moderation.
// There is no retry: one bounded attempt per moderation call.

pub mod ollama;
pub mod parse;
pub mod traits;

use std::time::Duration;

use tracing::warn;

use crate::moderation::models::{Hit, HitSource};
use crate::words::clamp_severity;

pub use traits::{NoopDetector, SemanticDetector};

/// What came back from one bounded detector call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticOutcome {
    Hits(Vec<Hit>),
    /// The detector failed or timed out; the reason is for logs only.
    Unavailable(String),
}

impl SemanticOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, SemanticOutcome::Hits(_))
    }

    /// Hits to merge into the result (none when unavailable).
    pub fn into_hits(self) -> Vec<Hit> {
        match self {
            SemanticOutcome::Hits(hits) => hits,
            SemanticOutcome::Unavailable(_) => Vec::new(),
        }
    }
}

/// Run the detector with a hard deadline.
///
/// Every returned hit is tagged with the semantic source and its severity is
/// clamped into 1..=3, whatever the detector reported. Dropping the
/// returned future cancels the in-flight request.
pub async fn detect_with_timeout(
    detector: &dyn SemanticDetector,
    text: &str,
    timeout: Duration,
) -> SemanticOutcome {
    match tokio::time::timeout(timeout, detector.detect(text)).await {
        Ok(Ok(hits)) => SemanticOutcome::Hits(
            hits.into_iter()
                .map(|hit| Hit {
                    source: HitSource::Semantic,
                    severity: clamp_severity(hit.severity),
                    ..hit
                })
                .collect(),
        ),
        Ok(Err(e)) => {
            let reason = format!("{e:#}");
            warn!(detector = detector.name(), error = %reason, "Semantic detector failed");
            SemanticOutcome::Unavailable(reason)
        }
        Err(_) => {
            warn!(
                detector = detector.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Semantic detector timed out"
            );
            SemanticOutcome::Unavailable(format!("timed out after {timeout:?}"))
        }
    }
}
