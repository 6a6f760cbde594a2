// In-memory word store with snapshot reads.
//
// Readers clone an Arc to the current term list and never hold the lock
// while matching. Writers copy the list, apply their change and swap the Arc
// in, so a moderation call sees either the old list or the new one, never a
// half-applied edit.

use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::traits::WordSource;
use super::{ListKind, Term, MIN_SEVERITY};

/// Partial update for an existing term. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TermUpdate {
    pub text: Option<String>,
    pub list: Option<ListKind>,
    pub severity: Option<u8>,
}

/// An entry in a JSON word-list file whose stored normalized form no longer
/// matches what the normalizer derives today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    pub term: String,
    pub stored: String,
    pub derived: String,
}

/// One row of a JSON word-list file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordFileEntry {
    term: String,
    list: ListKind,
    severity: Option<u8>,
    normalized_term: Option<String>,
}

struct StoreInner {
    terms: Arc<Vec<Term>>,
    next_id: u64,
}

/// Thread-safe, snapshot-consistent term list.
pub struct WordStore {
    inner: RwLock<StoreInner>,
}

impl Default for WordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WordStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                terms: Arc::new(Vec::new()),
                next_id: 1,
            }),
        }
    }

    /// Build a store from already-constructed terms, assigning fresh ids.
    pub fn with_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.write();
            let mut list = Vec::new();
            for mut term in terms {
                term.id = inner.next_id;
                inner.next_id += 1;
                list.push(term);
            }
            inner.terms = Arc::new(list);
        }
        store
    }

    /// Parse a JSON word-list (an array of `{term, list, severity?, normalizedTerm?}`).
    ///
    /// The normalized form is always re-derived; entries whose stored
    /// `normalizedTerm` disagrees are returned so callers can report them.
    pub fn from_json_str(json: &str) -> Result<(Self, Vec<StaleEntry>)> {
        let entries: Vec<WordFileEntry> =
            serde_json::from_str(json).context("Failed to parse word list JSON")?;

        let mut stale = Vec::new();
        let mut terms = Vec::with_capacity(entries.len());
        for entry in entries {
            let term = Term::new(
                entry.term,
                entry.list,
                entry.severity.unwrap_or(MIN_SEVERITY),
            );
            if let Some(stored) = entry.normalized_term {
                if stored != term.normalized() {
                    stale.push(StaleEntry {
                        term: term.text().to_string(),
                        stored,
                        derived: term.normalized().to_string(),
                    });
                }
            }
            terms.push(term);
        }

        Ok((Self::with_terms(terms), stale))
    }

    /// Load a JSON word-list file from disk.
    pub fn load_json(path: &Path) -> Result<(Self, Vec<StaleEntry>)> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read word list {}", path.display()))?;
        let (store, stale) = Self::from_json_str(&json)
            .with_context(|| format!("Invalid word list {}", path.display()))?;
        info!(
            path = %path.display(),
            terms = store.len(),
            stale = stale.len(),
            "Loaded word list"
        );
        Ok((store, stale))
    }

    /// The current list as an immutable snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Term>> {
        Arc::clone(&self.read().terms)
    }

    pub fn len(&self) -> usize {
        self.read().terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: u64) -> Option<Term> {
        self.read().terms.iter().find(|t| t.id == id).cloned()
    }

    pub fn blacklist(&self) -> Vec<Term> {
        self.snapshot().iter().filter(|t| t.is_black()).cloned().collect()
    }

    pub fn whitelist(&self) -> Vec<Term> {
        self.snapshot().iter().filter(|t| t.is_white()).cloned().collect()
    }

    /// Add a term and return it with its assigned id.
    pub fn add(&self, text: &str, list: ListKind, severity: Option<u8>) -> Result<Term> {
        if text.trim().is_empty() {
            anyhow::bail!("Term text must not be empty");
        }
        let mut inner = self.write();
        let mut term = Term::new(text, list, severity.unwrap_or(MIN_SEVERITY));
        term.id = inner.next_id;
        inner.next_id += 1;

        let mut list = inner.terms.as_ref().clone();
        list.push(term.clone());
        inner.terms = Arc::new(list);

        debug!(id = term.id, term = term.text(), list = %term.list, "Added term");
        Ok(term)
    }

    /// Apply a partial update. A changed text re-derives the normalized form.
    pub fn update(&self, id: u64, update: TermUpdate) -> Result<Term> {
        let mut inner = self.write();
        let mut list = inner.terms.as_ref().clone();
        let term = list
            .iter_mut()
            .find(|t| t.id == id)
            .with_context(|| format!("No term with id {id}"))?;

        if let Some(text) = update.text {
            if text.trim().is_empty() {
                anyhow::bail!("Term text must not be empty");
            }
            term.set_text(text);
        }
        if let Some(kind) = update.list {
            term.list = kind;
        }
        if let Some(severity) = update.severity {
            term.severity = super::clamp_severity(severity);
        }

        let updated = term.clone();
        inner.terms = Arc::new(list);
        debug!(id, term = updated.text(), "Updated term");
        Ok(updated)
    }

    /// Remove a term. Returns the removed term.
    pub fn delete(&self, id: u64) -> Result<Term> {
        let mut inner = self.write();
        let mut list = inner.terms.as_ref().clone();
        let position = list
            .iter()
            .position(|t| t.id == id)
            .with_context(|| format!("No term with id {id}"))?;
        let removed = list.remove(position);
        inner.terms = Arc::new(list);
        debug!(id, term = removed.text(), "Deleted term");
        Ok(removed)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreInner> {
        // A panic mid-write never leaves a half-built list behind (the Arc is
        // swapped last), so a poisoned lock still guards valid data.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WordSource for WordStore {
    async fn list_terms(&self) -> Result<Vec<Term>> {
        Ok(self.snapshot().as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_ids_and_normalizes() {
        let store = WordStore::new();
        let a = store.add("Sh1t", ListKind::Black, Some(2)).unwrap();
        let b = store.add("scunthorpe", ListKind::White, None).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.normalized(), "shit");
        assert_eq!(b.severity, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let store = WordStore::new();
        assert!(store.add("   ", ListKind::Black, None).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_rederives_normalized() {
        let store = WordStore::new();
        let term = store.add("damn", ListKind::Black, Some(1)).unwrap();
        let updated = store
            .update(
                term.id,
                TermUpdate {
                    text: Some("B!TCH".to_string()),
                    severity: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.normalized(), "bitch");
        assert_eq!(updated.severity, 3);
        assert_eq!(updated.list, ListKind::Black);
        assert_eq!(store.get(term.id).unwrap(), updated);
    }

    #[test]
    fn test_update_and_delete_unknown_id() {
        let store = WordStore::new();
        assert!(store.update(42, TermUpdate::default()).is_err());
        assert!(store.delete(42).is_err());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_writes() {
        let store = WordStore::new();
        store.add("shit", ListKind::Black, None).unwrap();
        let before = store.snapshot();
        store.add("fuck", ListKind::Black, None).unwrap();
        let id = before[0].id;
        store.delete(id).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].text(), "shit");
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].text(), "fuck");
    }

    #[test]
    fn test_list_filters() {
        let store = WordStore::with_terms(vec![
            Term::black("shit", 2),
            Term::white("shitake"),
            Term::black("damn", 1),
        ]);
        assert_eq!(store.blacklist().len(), 2);
        assert_eq!(store.whitelist().len(), 1);
    }

    #[test]
    fn test_from_json_reports_stale_entries() {
        let json = r#"[
            {"term": "f*ck", "list": "BLACK", "severity": 2, "normalizedTerm": "fack"},
            {"term": "shit", "list": "BLACK", "normalizedTerm": "shit"},
            {"term": "class", "list": "WHITE"}
        ]"#;
        let (store, stale) = WordStore::from_json_str(json).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(
            stale,
            vec![StaleEntry {
                term: "f*ck".to_string(),
                stored: "fack".to_string(),
                derived: "fuck".to_string(),
            }]
        );
        assert_eq!(store.snapshot()[1].severity, 1);
    }

    #[test]
    fn test_from_json_rejects_bad_list() {
        let json = r#"[{"term": "x", "list": "GREY"}]"#;
        assert!(WordStore::from_json_str(json).is_err());
    }

    #[tokio::test]
    async fn test_list_terms_returns_snapshot_copy() {
        let store = WordStore::with_terms(vec![Term::black("shit", 2)]);
        let terms = store.list_terms().await.unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].id, 1);
    }
}
