// Text normalization: canonicalizes free text so obfuscated spellings match
// the word list.
//
// The pipeline runs in a fixed order and every stage assumes the previous
// ones already ran:
//
//   1. lowercase, Unicode-decompose, drop combining marks
//   2. word folds (obfuscated spellings -> canonical term)
//   3. per-character substitutions (digits/symbols -> letters)
//   4. drop everything that is not [a-z0-9]
//   5. collapse runs of 3+ identical letters to one
//
// Stages 2-5 repeat until the output is stable, so normalizing canonical
// output is a no-op.
//
// Every output character remembers which span of the original text produced
// it, so callers that need positions (span-aware rule hits) can map a match
// in normalized space back to original character offsets. Callers that only
// need the string use `normalize()`, which runs the very same pipeline.

pub mod patterns;

use std::ops::Range;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex_lite::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use patterns::{substitute, WORD_FOLDS};

/// Upper bound on canonicalization passes. The built-in folds settle in two
/// or three.
const MAX_PASSES: usize = 8;

static STANDARD: LazyLock<Normalizer> = LazyLock::new(|| {
    // The built-in folds are constants exercised by the test suite.
    Normalizer::new(WORD_FOLDS).expect("built-in word folds must compile")
});

/// Normalize text with the built-in fold table.
///
/// Never fails: empty, whitespace-only and non-Latin input all come back as
/// an empty (or best-effort transliterated) string.
pub fn normalize(text: &str) -> String {
    STANDARD.normalize(text)
}

/// Normalize text with the built-in fold table, keeping the offset map.
pub fn normalize_mapped(text: &str) -> NormalizedText {
    STANDARD.normalize_mapped(text)
}

/// Half-open span of original character offsets that produced one output char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Origin {
    start: usize,
    end: usize,
}

impl Origin {
    fn merge(self, other: Origin) -> Origin {
        Origin {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MappedChar {
    ch: char,
    origin: Origin,
}

/// Normalized text plus a map back to the original text.
///
/// The normalized string only ever contains `[a-z0-9]`, so byte offsets and
/// character offsets into it coincide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    origins: Vec<Origin>,
}

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Map a range of normalized offsets to the original character span that
    /// produced it. Returns `None` for empty or out-of-range input.
    pub fn original_span(&self, range: Range<usize>) -> Option<Range<usize>> {
        if range.start >= range.end || range.end > self.origins.len() {
            return None;
        }
        let first = self.origins[range.start];
        let last = self.origins[range.end - 1];
        let merged = first.merge(last);
        Some(merged.start..merged.end)
    }

    /// Original character spans of every non-overlapping occurrence of
    /// `needle` (which must itself be normalized) in the normalized text.
    pub fn find_all(&self, needle: &str) -> Vec<Range<usize>> {
        if needle.is_empty() {
            return Vec::new();
        }
        self.text
            .match_indices(needle)
            .filter_map(|(at, m)| self.original_span(at..at + m.len()))
            .collect()
    }
}

/// A normalizer with a specific ordered fold table.
pub struct Normalizer {
    folds: Vec<(Regex, String)>,
}

impl Normalizer {
    /// Compile a normalizer from ordered `(pattern, canonical)` folds.
    pub fn new(folds: &[(&str, &str)]) -> Result<Self> {
        let folds = folds
            .iter()
            .map(|(pattern, canonical)| {
                let regex = Regex::new(pattern)
                    .with_context(|| format!("Invalid word fold pattern: {pattern}"))?;
                Ok((regex, canonical.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { folds })
    }

    /// The shared normalizer built from the built-in fold table.
    pub fn standard() -> &'static Normalizer {
        &STANDARD
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalize_mapped(text).into_string()
    }

    pub fn normalize_mapped(&self, text: &str) -> NormalizedText {
        let mut chars = decompose_lowercase(text);

        // Stripping separators can expose a new fold ("fu-k" -> "fuk"), so
        // stages 2-5 repeat until the text stops changing.
        for _ in 0..MAX_PASSES {
            let before: String = chars.iter().map(|m| m.ch).collect();
            chars = self.canonicalize(chars);
            if chars.iter().map(|m| m.ch).eq(before.chars()) {
                break;
            }
        }

        NormalizedText {
            text: chars.iter().map(|m| m.ch).collect(),
            origins: chars.iter().map(|m| m.origin).collect(),
        }
    }

    /// Stages 2-5: folds, substitutions, stripping, run collapsing.
    fn canonicalize(&self, mut chars: Vec<MappedChar>) -> Vec<MappedChar> {
        for (pattern, canonical) in &self.folds {
            chars = apply_fold(chars, pattern, canonical);
        }

        for mapped in &mut chars {
            mapped.ch = substitute(mapped.ch);
        }

        chars.retain(|m| m.ch.is_ascii_lowercase() || m.ch.is_ascii_digit());

        collapse_runs(chars)
    }
}

/// Stage 1: lowercase, canonical decomposition, combining marks removed.
fn decompose_lowercase(text: &str) -> Vec<MappedChar> {
    let mut out = Vec::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        let origin = Origin {
            start: index,
            end: index + 1,
        };
        for decomposed in c.to_lowercase().nfd() {
            if !is_combining_mark(decomposed) {
                out.push(MappedChar {
                    ch: decomposed,
                    origin,
                });
            }
        }
    }
    out
}

/// Stage 2 (one pattern): replace every match with the canonical spelling.
/// Each replacement character inherits the span of the whole match.
fn apply_fold(chars: Vec<MappedChar>, pattern: &Regex, canonical: &str) -> Vec<MappedChar> {
    let haystack: String = chars.iter().map(|m| m.ch).collect();
    if !pattern.is_match(&haystack) {
        return chars;
    }

    let byte_starts: Vec<usize> = haystack.char_indices().map(|(b, _)| b).collect();
    let char_index = |byte: usize| byte_starts.partition_point(|&b| b < byte);

    let mut out = Vec::with_capacity(chars.len());
    let mut cursor = 0;
    for m in pattern.find_iter(&haystack) {
        let start = char_index(m.start());
        let end = char_index(m.end());
        if start >= end {
            continue;
        }
        out.extend_from_slice(&chars[cursor..start]);
        let origin = chars[start].origin.merge(chars[end - 1].origin);
        out.extend(canonical.chars().map(|ch| MappedChar { ch, origin }));
        cursor = end;
    }
    out.extend_from_slice(&chars[cursor..]);
    out
}

/// Stage 5: runs of three or more identical letters become one letter.
/// Runs of exactly two are kept ("ass", "book").
fn collapse_runs(chars: Vec<MappedChar>) -> Vec<MappedChar> {
    let mut out: Vec<MappedChar> = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let current = chars[i];
        let mut j = i + 1;
        while j < chars.len() && chars[j].ch == current.ch {
            j += 1;
        }
        let run = j - i;
        if run >= 3 && current.ch.is_ascii_lowercase() {
            let origin = current.origin.merge(chars[j - 1].origin);
            out.push(MappedChar {
                ch: current.ch,
                origin,
            });
        } else {
            out.extend_from_slice(&chars[i..j]);
        }
        i = j;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_lowercase_and_strip() {
        assert_eq!(normalize("Hello, World!"), "helloworldi");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
    }

    #[test]
    fn test_accents_are_stripped() {
        assert_eq!(normalize("Cabrón"), "cabron");
        assert_eq!(normalize("coño"), "cono");
        assert_eq!(normalize("ÉLÈVE"), "eleve");
    }

    #[test]
    fn test_non_latin_falls_through_to_empty() {
        assert_eq!(normalize("привет"), "");
        assert_eq!(normalize("日本語"), "");
    }

    #[test]
    fn test_collapse_only_three_or_more() {
        assert_eq!(normalize("book"), "book");
        assert_eq!(normalize("boooook"), "bok");
    }

    #[test]
    fn test_mapping_tracks_original_offsets() {
        let mapped = normalize_mapped("oh f*ck!");
        assert_eq!(mapped.as_str(), "ohfucki");
        // "fuck" came from original chars 3..7 ("f*ck")
        assert_eq!(mapped.find_all("fuck"), vec![3..7]);
    }

    #[test]
    fn test_mapping_through_collapse() {
        let mapped = normalize_mapped("a shiiiit day");
        assert_eq!(mapped.as_str(), "ashitday");
        assert_eq!(mapped.find_all("shit"), vec![2..9]);
    }

    #[test]
    fn test_mapping_with_multibyte_prefix() {
        let mapped = normalize_mapped("¡Qué mierda!");
        assert_eq!(mapped.as_str(), "quemierdai");
        assert_eq!(mapped.find_all("mierda"), vec![5..11]);
    }

    #[test]
    fn test_original_span_rejects_bad_ranges() {
        let mapped = normalize_mapped("abc");
        assert_eq!(mapped.original_span(1..1), None);
        assert_eq!(mapped.original_span(0..9), None);
        assert_eq!(mapped.original_span(0..3), Some(0..3));
    }

    #[test]
    fn test_custom_fold_table() {
        let normalizer = Normalizer::new(&[(r"d+a+r+n+", "darn")]).unwrap();
        assert_eq!(normalizer.normalize("DAAARN it"), "darnit");
    }

    #[test]
    fn test_folds_rerun_after_separators_are_stripped() {
        assert_eq!(normalize("fu-k"), "fuck");
        assert_eq!(normalize("fuk"), "fuck");
        let mapped = normalize_mapped("oh f u k");
        assert_eq!(mapped.as_str(), "ohfuck");
        assert_eq!(mapped.find_all("fuck"), vec![3..8]);
    }

    #[test]
    fn test_invalid_fold_is_an_error() {
        assert!(Normalizer::new(&[("(unclosed", "x")]).is_err());
    }
}
