// Censoring: produce a redacted copy of the original text from a hit list.
//
// Hits with a span are masked by position. Spans are applied in descending
// start order so no replacement can shift the offsets of a span still to be
// applied; masks are exactly as wide as their span, so overlapping spans just
// mask the same characters twice.
//
// Hits without a span fall back to case-insensitive replacement of every
// literal occurrence of the term. Case folding is Unicode-aware, so "cabrón"
// also masks "CABRÓN". Terms are applied longest first (ties keep
// list order) so a long term is masked before a shorter term it contains can
// chew it up. Term masks keep the first and last character of each occurrence
// and are length-preserving, which keeps span masks and term masks from
// disturbing each other.
//
// All offsets are character (Unicode scalar) offsets, not bytes.

use std::collections::HashSet;
use std::ops::Range;

use regex::{Captures, Regex};

use crate::moderation::models::{Hit, ModerationResult};

pub const MASK_CHAR: char = '*';

/// Redact `text` according to `hits`. Never fails; an empty hit list returns
/// the text unchanged.
pub fn censor(text: &str, hits: &[Hit]) -> String {
    if hits.is_empty() {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();

    let mut spans: Vec<Range<usize>> = hits.iter().filter_map(Hit::span).collect();
    spans.sort_by(|a, b| b.start.cmp(&a.start));
    for span in spans {
        mask_span(&mut chars, span);
    }

    let mut censored: String = chars.into_iter().collect();

    let mut terms: Vec<&str> = hits
        .iter()
        .filter(|h| h.span().is_none())
        .map(|h| h.term.as_str())
        .filter(|t| !t.is_empty())
        .collect();
    terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let mut seen = HashSet::new();
    for term in terms {
        if seen.insert(term) {
            censored = mask_occurrences(&censored, term);
        }
    }

    censored
}

/// Censor the original text of a moderation result.
pub fn censor_result(text: &str, result: &ModerationResult) -> String {
    censor(text, &result.hits)
}

/// Replace a character range with mask characters. Out-of-range ends are
/// clamped; empty ranges do nothing.
fn mask_span(chars: &mut [char], span: Range<usize>) {
    let end = span.end.min(chars.len());
    if span.start >= end {
        return;
    }
    for c in &mut chars[span.start..end] {
        *c = MASK_CHAR;
    }
}

/// Mask every case-insensitive occurrence of `term` in `text`.
fn mask_occurrences(text: &str, term: &str) -> String {
    let pattern = format!("(?i){}", regex::escape(term));
    match Regex::new(&pattern) {
        Ok(matcher) => matcher
            .replace_all(text, |caps: &Captures<'_>| mask_word(&caps[0]))
            .into_owned(),
        // An escaped literal always compiles; exact-case replacement is the
        // last resort so censoring still produces something.
        Err(_) => text.replace(term, &mask_word(term)),
    }
}

/// Mask one occurrence, keeping its first and last character.
/// Two-character words keep only the first; single characters are fully masked.
pub fn mask_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => MASK_CHAR.to_string(),
        2 => format!("{}{}", chars[0], MASK_CHAR),
        n => {
            let mut masked = String::with_capacity(word.len());
            masked.push(chars[0]);
            masked.extend(std::iter::repeat(MASK_CHAR).take(n - 2));
            masked.push(chars[n - 1]);
            masked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_word_lengths() {
        assert_eq!(mask_word(""), "");
        assert_eq!(mask_word("a"), "*");
        assert_eq!(mask_word("ab"), "a*");
        assert_eq!(mask_word("abc"), "a*c");
        assert_eq!(mask_word("Fuck"), "F**k");
    }

    #[test]
    fn test_mask_span_clamps() {
        let mut chars: Vec<char> = "abc".chars().collect();
        mask_span(&mut chars, 1..10);
        assert_eq!(chars.iter().collect::<String>(), "a**");
        mask_span(&mut chars, 5..9);
        assert_eq!(chars.iter().collect::<String>(), "a**");
    }

    #[test]
    fn test_term_with_regex_metacharacters() {
        let hits = vec![Hit::rules("f.ck", 2)];
        assert_eq!(censor("what the f.ck, fuck", &hits), "what the f**k, fuck");
    }
}
