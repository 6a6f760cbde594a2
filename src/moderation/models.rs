// Moderation data models: hits, results, options and the request shape.
//
// Hits from both detection sources share one type. Whether a hit can be
// censored by position is expressed by the presence of its offsets, not by a
// separate type.

use std::ops::Range;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Which detector produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitSource {
    Rules,
    /// Older audit logs call this source "llm"
    #[serde(alias = "llm")]
    Semantic,
}

impl HitSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitSource::Rules => "rules",
            HitSource::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for HitSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected term. `start`/`end` are half-open character offsets into the
/// original (not normalized) text; a hit without them can only be censored by
/// literal term substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    pub severity: u8,
    pub source: HitSource,
}

impl Hit {
    /// A whole-text rule hit (no offsets).
    pub fn rules(term: impl Into<String>, severity: u8) -> Self {
        Self {
            term: term.into(),
            start: None,
            end: None,
            severity,
            source: HitSource::Rules,
        }
    }

    /// Attach offsets to a hit.
    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.start = Some(span.start);
        self.end = Some(span.end);
        self
    }

    /// The usable span, if both offsets are present and non-empty.
    pub fn span(&self) -> Option<Range<usize>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start < end => Some(start..end),
            _ => None,
        }
    }
}

/// Outcome of one moderation call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResult {
    pub contains_profanity: bool,
    /// 0 when there are no hits, otherwise the highest hit severity
    pub severity: u8,
    pub hits: Vec<Hit>,
    /// Whether the semantic detector was invoked (not whether it found anything)
    pub used_semantic: bool,
}

/// Per-call moderation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModerateOptions {
    /// Also ask the semantic detector (if one is configured)
    pub use_semantic: bool,
    /// Report every rule-hit occurrence with original offsets instead of one
    /// whole-text hit per term
    pub locate_rule_spans: bool,
}

impl ModerateOptions {
    pub fn rules_only() -> Self {
        Self::default()
    }

    pub fn with_semantic() -> Self {
        Self {
            use_semantic: true,
            ..Self::default()
        }
    }
}

/// Request body accepted at the API boundary: `{text, useSemantic?}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRequest {
    pub text: String,
    #[serde(default, alias = "useLLM")]
    pub use_semantic: bool,
    #[serde(default)]
    pub locate_rule_spans: bool,
}

impl ModerationRequest {
    /// Parse a request body. A missing or mistyped `text` is a client error.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid moderation request")
    }

    pub fn options(&self) -> ModerateOptions {
        ModerateOptions {
            use_semantic: self.use_semantic,
            locate_rule_spans: self.locate_rule_spans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_requires_both_offsets() {
        let hit = Hit::rules("fuck", 2);
        assert_eq!(hit.span(), None);
        assert_eq!(hit.clone().with_span(3..7).span(), Some(3..7));
        let half = Hit {
            start: Some(3),
            ..hit.clone()
        };
        assert_eq!(half.span(), None);
        assert_eq!(hit.with_span(5..5).span(), None);
    }

    #[test]
    fn test_hit_serialization_omits_missing_offsets() {
        let json = serde_json::to_value(Hit::rules("fuck", 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"term": "fuck", "severity": 2, "source": "rules"})
        );
    }

    #[test]
    fn test_legacy_llm_source_deserializes() {
        let hit: Hit =
            serde_json::from_str(r#"{"term":"x","severity":1,"source":"llm"}"#).unwrap();
        assert_eq!(hit.source, HitSource::Semantic);
    }

    #[test]
    fn test_result_uses_camel_case() {
        let json = serde_json::to_value(ModerationResult::default()).unwrap();
        assert_eq!(json["containsProfanity"], false);
        assert_eq!(json["usedSemantic"], false);
        assert_eq!(json["severity"], 0);
    }

    #[test]
    fn test_request_parsing() {
        let req = ModerationRequest::parse(r#"{"text":"hi","useSemantic":true}"#).unwrap();
        assert_eq!(req.text, "hi");
        assert!(req.options().use_semantic);

        let legacy = ModerationRequest::parse(r#"{"text":"hi","useLLM":true}"#).unwrap();
        assert!(legacy.use_semantic);

        let bare = ModerationRequest::parse(r#"{"text":""}"#).unwrap();
        assert_eq!(bare.options(), ModerateOptions::rules_only());
    }

    #[test]
    fn test_request_without_text_is_rejected() {
        assert!(ModerationRequest::parse(r#"{"useSemantic":true}"#).is_err());
        assert!(ModerationRequest::parse(r#"{"text": 5}"#).is_err());
        assert!(ModerationRequest::parse("not json").is_err());
    }
}
