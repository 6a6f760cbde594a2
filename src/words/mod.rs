// Word list: blacklist/whitelist terms with severity.
//
// A Term's normalized form is always derived from its text through the
// normalizer; nothing outside this module can set it directly. The rule
// matcher only ever compares normalized forms.

pub mod defaults;
pub mod store;
pub mod traits;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

pub use defaults::DefaultTerms;
pub use store::{TermUpdate, WordStore};
pub use traits::WordSource;

/// Lowest and highest severity a term (or hit) can carry.
pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 3;

/// Clamp an arbitrary severity into 1..=3.
pub fn clamp_severity(severity: u8) -> u8 {
    severity.clamp(MIN_SEVERITY, MAX_SEVERITY)
}

/// Which list a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    #[serde(rename = "BLACK", alias = "black", alias = "Black")]
    Black,
    #[serde(rename = "WHITE", alias = "white", alias = "White")]
    White,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Black => "BLACK",
            ListKind::White => "WHITE",
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ListKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "black" | "blacklist" => Ok(ListKind::Black),
            "white" | "whitelist" => Ok(ListKind::White),
            other => anyhow::bail!("Unknown list '{other}' (expected black or white)"),
        }
    }
}

/// A single word-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    /// Store-assigned identifier (0 for terms that never went through a store)
    pub id: u64,
    #[serde(rename = "term")]
    text: String,
    #[serde(rename = "normalizedTerm")]
    normalized: String,
    pub list: ListKind,
    pub severity: u8,
}

impl Term {
    /// Build a term, deriving its normalized form and clamping severity.
    pub fn new(text: impl Into<String>, list: ListKind, severity: u8) -> Self {
        let text = text.into();
        let normalized = normalize(&text);
        Self {
            id: 0,
            text,
            normalized,
            list,
            severity: clamp_severity(severity),
        }
    }

    pub fn black(text: impl Into<String>, severity: u8) -> Self {
        Self::new(text, ListKind::Black, severity)
    }

    pub fn white(text: impl Into<String>) -> Self {
        Self::new(text, ListKind::White, MIN_SEVERITY)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Replace the text and re-derive the normalized form.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.normalized = normalize(&self.text);
    }

    pub fn is_black(&self) -> bool {
        self.list == ListKind::Black
    }

    pub fn is_white(&self) -> bool {
        self.list == ListKind::White
    }
}
