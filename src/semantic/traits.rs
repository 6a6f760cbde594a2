// Semantic detector trait: the swap-ready seam for contextual detection.
//
// The default implementation talks to an Ollama-style generate endpoint, but
// anything that can turn text into candidate hits fits here. Implementations
// report failures as errors; the moderation engine decides what an error
// means (it means "no semantic hits").

use anyhow::Result;
use async_trait::async_trait;

use crate::moderation::models::Hit;

#[async_trait]
pub trait SemanticDetector: Send + Sync {
    /// Find offensive terms in the original (not normalized) text. Offsets on
    /// returned hits, when present, index into that same text.
    async fn detect(&self, text: &str) -> Result<Vec<Hit>>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "semantic"
    }
}

/// Detector that never finds anything. Used when semantic detection is
/// switched off but a detector is still required by the caller's types.
pub struct NoopDetector;

#[async_trait]
impl SemanticDetector for NoopDetector {
    async fn detect(&self, _text: &str) -> Result<Vec<Hit>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
