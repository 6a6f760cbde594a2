// Built-in baseline blacklist.
//
// The rule matcher unions these with whatever the word store supplies, so an
// empty store still catches the common cases. The table is an immutable value
// handed to the matcher at construction; tests pass `DefaultTerms::empty()` or
// a small custom table instead.

use super::Term;

/// Curated (term, severity) pairs. Severity: 1 mild, 2 strong, 3 slur/severe.
const BUILTIN_BLACKLIST: &[(&str, u8)] = &[
    // English
    ("fuck", 2),
    ("motherfucker", 3),
    ("shit", 2),
    ("bitch", 2),
    ("asshole", 2),
    ("bastard", 2),
    ("cunt", 3),
    ("dick", 2),
    ("cock", 2),
    ("pussy", 2),
    ("whore", 2),
    ("slut", 2),
    ("damn", 1),
    ("piss", 1),
    ("nigger", 3),
    ("nigga", 3),
    ("faggot", 3),
    ("retard", 3),
    // Spanish
    ("puta", 2),
    ("mierda", 2),
    ("pendejo", 2),
    ("cabrón", 2),
    ("joder", 2),
    ("gilipollas", 2),
    ("culero", 2),
    ("verga", 2),
    ("chingar", 2),
    ("hijueputa", 3),
    ("malparido", 3),
    ("maricón", 3),
    // Portuguese
    ("caralho", 2),
    ("merda", 2),
    ("porra", 1),
    // French
    ("merde", 2),
    ("putain", 2),
    ("connard", 2),
    ("salope", 3),
    ("enculé", 3),
    // German
    ("scheisse", 2),
    ("arschloch", 2),
    ("fotze", 3),
    ("hurensohn", 3),
    // Italian
    ("cazzo", 2),
    ("stronzo", 2),
    ("vaffanculo", 2),
];

/// Baseline blacklist injected into the rule matcher.
#[derive(Debug, Clone, Default)]
pub struct DefaultTerms {
    terms: Vec<Term>,
}

impl DefaultTerms {
    /// The curated multilingual table.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_BLACKLIST)
    }

    /// No baseline coverage at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from (term, severity) pairs. All entries are blacklist terms.
    pub fn from_entries(entries: &[(&str, u8)]) -> Self {
        Self {
            terms: entries
                .iter()
                .map(|(text, severity)| Term::black(*text, *severity))
                .collect(),
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_terms_normalize_to_themselves() {
        // Every built-in entry must survive normalization as a non-empty key,
        // otherwise it could never match anything.
        for term in DefaultTerms::builtin().terms() {
            assert!(!term.normalized().is_empty(), "{} normalized empty", term.text());
        }
    }

    #[test]
    fn test_builtin_has_no_duplicate_keys() {
        let defaults = DefaultTerms::builtin();
        let keys: HashSet<&str> = defaults.terms().iter().map(|t| t.normalized()).collect();
        assert_eq!(keys.len(), defaults.len());
    }

    #[test]
    fn test_accented_entries_are_folded() {
        let defaults = DefaultTerms::builtin();
        let keys: Vec<&str> = defaults.terms().iter().map(|t| t.normalized()).collect();
        assert!(keys.contains(&"cabron"));
        assert!(keys.contains(&"encule"));
    }

    #[test]
    fn test_empty_table() {
        assert!(DefaultTerms::empty().is_empty());
    }
}
