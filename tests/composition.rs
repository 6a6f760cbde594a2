// Composition tests: verifying that the pipeline stages chain together.
//
// These tests exercise the data flow between modules:
//   WordStore -> Normalizer -> RuleMatcher -> [SemanticDetector] -> Aggregate -> Censor
// using in-process word lists and fake detectors, without network access.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use bleep::audit::{AuditEntry, AuditSink};
use bleep::censor::censor_result;
use bleep::moderation::{
    Hit, HitSource, ModerateOptions, ModerationRequest, ModerationResult, Moderator,
};
use bleep::semantic::SemanticDetector;
use bleep::words::{DefaultTerms, ListKind, Term, WordStore};

/// Detector that returns a fixed list of hits.
struct Fixed(Vec<Hit>);

#[async_trait]
impl SemanticDetector for Fixed {
    async fn detect(&self, _text: &str) -> Result<Vec<Hit>> {
        Ok(self.0.clone())
    }
}

/// Detector that never answers in time.
struct Hanging;

#[async_trait]
impl SemanticDetector for Hanging {
    async fn detect(&self, _text: &str) -> Result<Vec<Hit>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }
}

/// Detector that fails immediately.
struct Refusing;

#[async_trait]
impl SemanticDetector for Refusing {
    async fn detect(&self, _text: &str) -> Result<Vec<Hit>> {
        anyhow::bail!("connection refused")
    }
}

/// Detector that panics if it is ever called.
struct MustNotCall;

#[async_trait]
impl SemanticDetector for MustNotCall {
    async fn detect(&self, text: &str) -> Result<Vec<Hit>> {
        panic!("detector called for {text:?}");
    }
}

fn semantic_hit(term: &str, start: usize, end: usize, severity: u8) -> Hit {
    Hit {
        term: term.to_string(),
        start: Some(start),
        end: Some(end),
        severity,
        source: HitSource::Semantic,
    }
}

fn store(terms: Vec<Term>) -> Arc<WordStore> {
    Arc::new(WordStore::with_terms(terms))
}

// ============================================================
// Chain: WordStore -> Normalizer -> RuleMatcher -> Aggregate
// ============================================================

#[tokio::test]
async fn blacklisted_term_inside_word_is_found() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .words(store(vec![Term::black("fuck", 2)]))
        .build();

    let result = moderator
        .moderate("this is fucking great", &ModerateOptions::rules_only())
        .await;

    assert_eq!(
        result,
        ModerationResult {
            contains_profanity: true,
            severity: 2,
            hits: vec![Hit::rules("fuck", 2)],
            used_semantic: false,
        }
    );
}

#[tokio::test]
async fn obfuscated_input_is_caught() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .words(store(vec![Term::black("shit", 2), Term::black("bitch", 3)]))
        .build();

    for text in ["sh!t", "SHIIIIT", "s.h.i.t", "b1+ch"] {
        let result = moderator.moderate(text, &ModerateOptions::rules_only()).await;
        assert!(result.contains_profanity, "missed {text:?}");
    }
}

#[tokio::test]
async fn whitelist_suppresses_blacklist_and_defaults() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::from_entries(&[("damn", 1)]))
        .words(store(vec![Term::black("shit", 2), Term::white("SHIT"), Term::white("damn")]))
        .build();

    let result = moderator
        .moderate("damn, that's some good shit", &ModerateOptions::rules_only())
        .await;
    assert!(!result.contains_profanity);
    assert_eq!(result.severity, 0);
    assert!(result.hits.is_empty());
}

#[tokio::test]
async fn empty_text_gives_clean_result() {
    let moderator = Moderator::builder().build();
    let result = moderator.moderate("", &ModerateOptions::rules_only()).await;
    assert_eq!(result, ModerationResult::default());
}

#[tokio::test]
async fn defaults_apply_with_empty_store() {
    let moderator = Moderator::builder().build();
    let result = moderator
        .moderate("¡Qué MIERDA!", &ModerateOptions::rules_only())
        .await;
    assert_eq!(result.hits, vec![Hit::rules("mierda", 2)]);
}

#[tokio::test]
async fn store_edits_are_seen_by_later_calls() {
    let words = store(vec![]);
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .words(words.clone())
        .build();

    let before = moderator.moderate("crap", &ModerateOptions::rules_only()).await;
    assert!(!before.contains_profanity);

    let term = words.add("crap", ListKind::Black, Some(1)).unwrap();
    let during = moderator.moderate("crap", &ModerateOptions::rules_only()).await;
    assert_eq!(during.hits, vec![Hit::rules("crap", 1)]);

    words.delete(term.id).unwrap();
    let after = moderator.moderate("crap", &ModerateOptions::rules_only()).await;
    assert!(!after.contains_profanity);
}

// ============================================================
// Chain: RuleMatcher + SemanticDetector -> Aggregate
// ============================================================

#[tokio::test]
async fn semantic_hits_are_appended_and_raise_severity() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::from_entries(&[("damn", 1)]))
        .detector(Arc::new(Fixed(vec![semantic_hit("idiot", 10, 15, 2)])))
        .build();

    let result = moderator
        .moderate("damn you, idiot", &ModerateOptions::with_semantic())
        .await;

    assert!(result.used_semantic);
    assert_eq!(result.severity, 2);
    assert_eq!(result.hits.len(), 2);
    assert_eq!(result.hits[0], Hit::rules("damn", 1));
    assert_eq!(result.hits[1].source, HitSource::Semantic);
}

#[tokio::test]
async fn duplicate_findings_from_both_sources_are_kept() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::from_entries(&[("shit", 2)]))
        .detector(Arc::new(Fixed(vec![semantic_hit("shit", 0, 4, 2)])))
        .build();

    let result = moderator.moderate("shit", &ModerateOptions::with_semantic()).await;
    assert_eq!(result.hits.len(), 2);
}

#[tokio::test]
async fn zero_severity_semantic_hit_still_counts() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .detector(Arc::new(Fixed(vec![semantic_hit("jerk", 4, 8, 0)])))
        .build();

    let result = moderator
        .moderate("you jerk", &ModerateOptions::with_semantic())
        .await;
    assert!(result.contains_profanity);
    assert_eq!(result.severity, 1);
    assert_eq!(result.hits[0].severity, 1);
}

#[tokio::test]
async fn semantic_timeout_degrades_to_rules() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .words(store(vec![Term::black("fuck", 2)]))
        .detector(Arc::new(Hanging))
        .semantic_timeout(Duration::from_millis(50))
        .build();

    let result = moderator
        .moderate("this is fucking great", &ModerateOptions::with_semantic())
        .await;

    assert!(result.used_semantic);
    assert_eq!(result.hits, vec![Hit::rules("fuck", 2)]);
    assert_eq!(result.severity, 2);
}

#[tokio::test]
async fn semantic_failure_on_clean_text() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .detector(Arc::new(Refusing))
        .build();

    let result = moderator
        .moderate("lovely weather", &ModerateOptions::with_semantic())
        .await;

    assert!(result.used_semantic);
    assert!(!result.contains_profanity);
    assert_eq!(result.severity, 0);
}

#[tokio::test]
async fn detector_is_skipped_unless_requested() {
    let moderator = Moderator::builder()
        .detector(Arc::new(MustNotCall))
        .build();

    let result = moderator
        .moderate("hello", &ModerateOptions::rules_only())
        .await;
    assert!(!result.used_semantic);

    let blank = moderator
        .moderate("   ", &ModerateOptions::with_semantic())
        .await;
    assert!(!blank.used_semantic);
}

#[tokio::test]
async fn request_body_drives_options() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .detector(Arc::new(Fixed(vec![semantic_hit("jerk", 4, 8, 1)])))
        .build();

    let request = ModerationRequest::parse(r#"{"text": "you jerk", "useLLM": true}"#).unwrap();
    let result = moderator.moderate_request(&request).await;
    assert!(result.used_semantic);
    assert_eq!(result.hits.len(), 1);
}

// ============================================================
// Chain: Moderate -> Censor
// ============================================================

#[tokio::test]
async fn located_rule_hits_censor_obfuscated_spelling() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .words(store(vec![Term::black("fuck", 2)]))
        .build();

    let text = "what the f*ck, F U C K";
    let options = ModerateOptions {
        locate_rule_spans: true,
        ..ModerateOptions::rules_only()
    };
    let result = moderator.moderate(text, &options).await;
    assert_eq!(result.hits.len(), 2);

    let censored = censor_result(text, &result);
    assert_eq!(censored, "what the ****, *******");
    assert_eq!(censored.chars().count(), text.chars().count());
}

#[tokio::test]
async fn whole_text_hits_censor_literal_occurrences() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::empty())
        .words(store(vec![Term::black("shit", 2)]))
        .build();

    let text = "Shit, this is shit";
    let result = moderator.moderate(text, &ModerateOptions::rules_only()).await;
    assert_eq!(censor_result(text, &result), "S**t, this is s**t");
}

#[tokio::test]
async fn semantic_spans_and_rule_terms_censor_together() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::from_entries(&[("damn", 1)]))
        .detector(Arc::new(Fixed(vec![semantic_hit("idiot", 10, 15, 2)])))
        .build();

    let text = "damn you, idiot";
    let result = moderator.moderate(text, &ModerateOptions::with_semantic()).await;
    assert_eq!(censor_result(text, &result), "d**n you, *****");
}

// ============================================================
// Audit and batch
// ============================================================

struct Collecting(Mutex<Vec<AuditEntry>>);

#[async_trait]
impl AuditSink for Collecting {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        self.0.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[tokio::test]
async fn every_call_is_audited() {
    let sink = Arc::new(Collecting(Mutex::new(Vec::new())));
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::from_entries(&[("damn", 1)]))
        .audit(sink.clone())
        .build();

    let result = moderator.moderate("damn", &ModerateOptions::rules_only()).await;
    moderator.flush_audit().await;

    let entries = sink.0.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "damn");
    assert_eq!(entries[0].hits, result.hits);
    assert_eq!(entries[0].severity, 1);
}

#[tokio::test]
async fn batch_results_match_single_calls() {
    let moderator = Moderator::builder()
        .default_terms(DefaultTerms::from_entries(&[("damn", 1), ("shit", 2)]))
        .build();

    let texts: Vec<String> = ["fine", "oh sh!t", "damn", "", "all good"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let batch = moderator
        .moderate_batch(&texts, &ModerateOptions::rules_only(), 3)
        .await;

    assert_eq!(batch.len(), texts.len());
    for (text, result) in texts.iter().zip(&batch) {
        let single = moderator.moderate(text, &ModerateOptions::rules_only()).await;
        assert_eq!(result, &single, "mismatch for {text:?}");
    }
}
