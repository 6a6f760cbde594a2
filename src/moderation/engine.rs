// The moderation engine: wires the pipeline together.
//
//   text -> normalize -> rule matching -> [semantic detector] -> aggregate
//
// Normalization and rule matching are synchronous and pure. The semantic
// detector is the only await point and is bounded by a timeout. The word list
// is read once per call as a snapshot, so concurrent edits to the store are
// either fully visible to a call or not at all.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::aggregate::aggregate;
use super::models::{ModerateOptions, ModerationRequest, ModerationResult};
use crate::audit::{record_detached, AuditEntry, AuditSink};
use crate::normalize::{normalize, normalize_mapped};
use crate::output::truncate_chars;
use crate::rules::{split_lists, RuleMatcher};
use crate::semantic::{detect_with_timeout, SemanticDetector};
use crate::words::{DefaultTerms, Term, WordSource};

pub const DEFAULT_SEMANTIC_TIMEOUT: Duration = Duration::from_secs(10);

/// Moderation entry point. Cheap to share behind an `Arc`; every call is
/// independent of every other.
pub struct Moderator {
    matcher: RuleMatcher,
    words: Arc<dyn WordSource>,
    detector: Option<Arc<dyn SemanticDetector>>,
    semantic_timeout: Duration,
    audit: Option<Arc<dyn AuditSink>>,
    pending_audits: Mutex<Vec<JoinHandle<()>>>,
}

impl Moderator {
    pub fn builder() -> ModeratorBuilder {
        ModeratorBuilder::default()
    }

    /// Whether a semantic detector is configured at all.
    pub fn has_semantic(&self) -> bool {
        self.detector.is_some()
    }

    pub fn matcher(&self) -> &RuleMatcher {
        &self.matcher
    }

    /// Moderate one text. Never fails: a broken word source means "defaults
    /// only", a broken detector means "no semantic hits".
    pub async fn moderate(&self, text: &str, options: &ModerateOptions) -> ModerationResult {
        let terms = match self.words.list_terms().await {
            Ok(terms) => terms,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Word source unavailable, using default terms only");
                Vec::new()
            }
        };
        let (blacklist, whitelist) = split_lists(&terms);

        let rule_hits = if options.locate_rule_spans {
            let mapped = normalize_mapped(text);
            self.matcher.locate_terms(&mapped, &blacklist, &whitelist)
        } else {
            let normalized = normalize(text);
            self.matcher.match_terms(&normalized, &blacklist, &whitelist)
        };

        let (semantic_hits, used_semantic) = match (&self.detector, options.use_semantic) {
            (Some(detector), true) if !text.trim().is_empty() => {
                let outcome =
                    detect_with_timeout(detector.as_ref(), text, self.semantic_timeout).await;
                (outcome.into_hits(), true)
            }
            (None, true) => {
                debug!("Semantic detection requested but no detector is configured");
                (Vec::new(), false)
            }
            _ => (Vec::new(), false),
        };

        let result = aggregate(rule_hits, semantic_hits, used_semantic);

        debug!(
            contains_profanity = result.contains_profanity,
            severity = result.severity,
            hits = result.hits.len(),
            used_semantic = result.used_semantic,
            text_preview = %truncate_chars(text, 50),
            "Moderated text"
        );

        if let Some(sink) = &self.audit {
            let handle = record_detached(Arc::clone(sink), AuditEntry::new(text, &result));
            let mut pending = self.pending_audits();
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }

        result
    }

    /// Wait for every audit entry recorded so far to reach its sink.
    ///
    /// Moderation never waits on the audit sink. Short-lived callers (the CLI)
    /// call this before exiting so the runtime does not drop queued entries.
    pub async fn flush_audit(&self) {
        let handles: Vec<JoinHandle<()>> = self.pending_audits().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Audit task did not complete");
            }
        }
    }

    fn pending_audits(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending_audits.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Moderate an API-boundary request.
    pub async fn moderate_request(&self, request: &ModerationRequest) -> ModerationResult {
        self.moderate(&request.text, &request.options()).await
    }

    /// Moderate many texts with at most `concurrency` in flight. Results come
    /// back in input order.
    pub async fn moderate_batch(
        &self,
        texts: &[String],
        options: &ModerateOptions,
        concurrency: usize,
    ) -> Vec<ModerationResult> {
        stream::iter(texts)
            .map(|text| self.moderate(text, options))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

/// Builder for `Moderator`. Everything is optional: the bare build uses the
/// built-in default terms, an empty word list and no semantic detector.
pub struct ModeratorBuilder {
    defaults: DefaultTerms,
    words: Option<Arc<dyn WordSource>>,
    detector: Option<Arc<dyn SemanticDetector>>,
    semantic_timeout: Duration,
    audit: Option<Arc<dyn AuditSink>>,
}

impl Default for ModeratorBuilder {
    fn default() -> Self {
        Self {
            defaults: DefaultTerms::builtin(),
            words: None,
            detector: None,
            semantic_timeout: DEFAULT_SEMANTIC_TIMEOUT,
            audit: None,
        }
    }
}

impl ModeratorBuilder {
    pub fn default_terms(mut self, defaults: DefaultTerms) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn words(mut self, words: Arc<dyn WordSource>) -> Self {
        self.words = Some(words);
        self
    }

    pub fn detector(mut self, detector: Arc<dyn SemanticDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn semantic_timeout(mut self, timeout: Duration) -> Self {
        self.semantic_timeout = timeout;
        self
    }

    pub fn audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn build(self) -> Moderator {
        Moderator {
            matcher: RuleMatcher::new(self.defaults),
            words: self
                .words
                .unwrap_or_else(|| Arc::new(Vec::<Term>::new()) as Arc<dyn WordSource>),
            detector: self.detector,
            semantic_timeout: self.semantic_timeout,
            audit: self.audit,
            pending_audits: Mutex::new(Vec::new()),
        }
    }
}
