// Hit aggregation: merges rule and semantic hits into one result.
//
// Rule hits come first, semantic hits second, and nothing is deduplicated:
// when both sources flag the same term both hits are reported.

use super::models::{Hit, ModerationResult};

/// Combine both hit lists into a moderation result.
pub fn aggregate(rule_hits: Vec<Hit>, semantic_hits: Vec<Hit>, used_semantic: bool) -> ModerationResult {
    let mut hits = rule_hits;
    hits.extend(semantic_hits);

    let severity = hits.iter().map(|h| h.severity).max().unwrap_or(0);

    ModerationResult {
        contains_profanity: !hits.is_empty(),
        severity,
        hits,
        used_semantic,
    }
}
