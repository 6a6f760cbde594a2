// Rule matching: blacklist terms against normalized text.
//
// Matching is plain substring containment on normalized forms, not word
// boundaries. A short blacklisted term inside a longer innocent word still
// counts ("assess" contains "ass"). That over-match is the known cost of
// catching terms glued together with punctuation or spacing stripped by the
// normalizer; the whitelist is the escape hatch.
//
// The matcher owns the baseline DefaultTerms and unions them with the
// caller's list on every call. Caller-supplied terms win over a default with
// the same normalized form, so no term is reported twice.

use std::collections::HashSet;

use crate::moderation::models::Hit;
use crate::normalize::NormalizedText;
use crate::words::{DefaultTerms, Term};

pub struct RuleMatcher {
    defaults: DefaultTerms,
}

impl Default for RuleMatcher {
    fn default() -> Self {
        Self::new(DefaultTerms::builtin())
    }
}

impl RuleMatcher {
    pub fn new(defaults: DefaultTerms) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &DefaultTerms {
        &self.defaults
    }

    /// One whole-text hit (no offsets) per blacklist term whose normalized
    /// form occurs in `normalized` and is not whitelisted.
    ///
    /// Hits follow the order of `blacklist`, then the default terms.
    pub fn match_terms(
        &self,
        normalized: &str,
        blacklist: &[Term],
        whitelist: &HashSet<String>,
    ) -> Vec<Hit> {
        self.candidates(blacklist, whitelist)
            .filter(|term| normalized.contains(term.normalized()))
            .map(|term| Hit::rules(term.text(), term.severity))
            .collect()
    }

    /// Like `match_terms`, but reports every occurrence with its span in the
    /// original text, mapped back through the normalizer's offset map.
    pub fn locate_terms(
        &self,
        normalized: &NormalizedText,
        blacklist: &[Term],
        whitelist: &HashSet<String>,
    ) -> Vec<Hit> {
        self.candidates(blacklist, whitelist)
            .flat_map(|term| {
                normalized
                    .find_all(term.normalized())
                    .into_iter()
                    .map(move |span| Hit::rules(term.text(), term.severity).with_span(span))
            })
            .collect()
    }

    /// Blacklist terms followed by default terms, minus empty keys, whitelisted
    /// keys and defaults already covered by the caller's list.
    fn candidates<'a>(
        &'a self,
        blacklist: &'a [Term],
        whitelist: &'a HashSet<String>,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        let supplied: HashSet<&str> = blacklist.iter().map(|t| t.normalized()).collect();
        let defaults = self
            .defaults
            .terms()
            .iter()
            .filter(move |t| !supplied.contains(t.normalized()));

        blacklist
            .iter()
            .chain(defaults)
            .filter(|t| t.is_black())
            .filter(|t| !t.normalized().is_empty())
            .filter(move |t| !whitelist.contains(t.normalized()))
    }
}

/// Split a term snapshot into (blacklist, normalized whitelist keys).
pub fn split_lists(terms: &[Term]) -> (Vec<Term>, HashSet<String>) {
    let blacklist = terms.iter().filter(|t| t.is_black()).cloned().collect();
    let whitelist = terms
        .iter()
        .filter(|t| t.is_white())
        .map(|t| t.normalized().to_string())
        .collect();
    (blacklist, whitelist)
}
