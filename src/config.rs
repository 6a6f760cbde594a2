use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::semantic::ollama::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::words::DefaultTerms;

/// Which baseline blacklist the rule matcher starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultTermsMode {
    /// The curated multilingual table (default)
    Builtin,
    /// No baseline; only terms from the word list file
    None,
}

impl DefaultTermsMode {
    pub fn terms(&self) -> DefaultTerms {
        match self {
            DefaultTermsMode::Builtin => DefaultTerms::builtin(),
            DefaultTermsMode::None => DefaultTerms::empty(),
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Everything
/// has a default; only the word list path is needed for word commands.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON word list (BLEEP_WORDS_PATH)
    pub words_path: Option<PathBuf>,
    /// Baseline blacklist (BLEEP_DEFAULT_TERMS = builtin | none)
    pub default_terms: DefaultTermsMode,
    /// Semantic detector base URL (BLEEP_SEMANTIC_URL)
    pub semantic_url: String,
    /// Semantic detector model name (BLEEP_SEMANTIC_MODEL)
    pub semantic_model: String,
    /// Hard deadline for one semantic call (BLEEP_SEMANTIC_TIMEOUT_SECS)
    pub semantic_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let default_terms = match env::var("BLEEP_DEFAULT_TERMS").as_deref() {
            Ok("none") | Ok("off") => DefaultTermsMode::None,
            // "builtin" or unset both use the built-in table
            _ => DefaultTermsMode::Builtin,
        };

        let semantic_timeout = match env::var("BLEEP_SEMANTIC_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: f64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("BLEEP_SEMANTIC_TIMEOUT_SECS is not a number: {raw}"))?;
                if !secs.is_finite() || secs <= 0.0 {
                    anyhow::bail!("BLEEP_SEMANTIC_TIMEOUT_SECS must be positive, got {raw}");
                }
                Duration::from_secs_f64(secs)
            }
            Err(_) => crate::moderation::DEFAULT_SEMANTIC_TIMEOUT,
        };

        Ok(Self {
            words_path: env::var("BLEEP_WORDS_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            default_terms,
            semantic_url: env::var("BLEEP_SEMANTIC_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            semantic_model: env::var("BLEEP_SEMANTIC_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            semantic_timeout,
        })
    }

    /// Check that a word list file is configured.
    /// Call this before any operation that reads or checks the word list file.
    pub fn require_words_path(&self) -> Result<&PathBuf> {
        self.words_path.as_ref().with_context(|| {
            "BLEEP_WORDS_PATH not set. Point it at a JSON word list, e.g.\n\
             [{\"term\": \"darn\", \"list\": \"BLACK\", \"severity\": 1}]"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_terms_mode() {
        assert!(DefaultTermsMode::None.terms().is_empty());
        assert!(!DefaultTermsMode::Builtin.terms().is_empty());
    }

    #[test]
    fn test_require_words_path() {
        let config = Config {
            words_path: None,
            default_terms: DefaultTermsMode::Builtin,
            semantic_url: DEFAULT_BASE_URL.to_string(),
            semantic_model: DEFAULT_MODEL.to_string(),
            semantic_timeout: Duration::from_secs(1),
        };
        assert!(config.require_words_path().is_err());

        let config = Config {
            words_path: Some(PathBuf::from("words.json")),
            ..config
        };
        assert_eq!(
            config.require_words_path().unwrap(),
            &PathBuf::from("words.json")
        );
    }
}
