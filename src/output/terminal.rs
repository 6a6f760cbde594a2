// Colored terminal output for moderation results and word lists.
//
// main.rs delegates all human-readable formatting here; the --json paths
// bypass this module entirely.

use colored::Colorize;

use crate::moderation::models::{HitSource, ModerationResult};
use crate::words::store::StaleEntry;
use crate::words::Term;

/// Display a single moderation result, optionally with the censored text.
pub fn display_result(text: &str, result: &ModerationResult, censored: Option<&str>) {
    let verdict = if result.contains_profanity {
        "PROFANITY".red().bold()
    } else {
        "CLEAN".green().bold()
    };

    println!(
        "\n{} {}",
        verdict,
        format!("\"{}\"", super::truncate_chars(text, 80)).dimmed()
    );
    println!("  Severity: {}", colorize_severity(result.severity));
    if result.used_semantic {
        println!("  Semantic detector: {}", "consulted".cyan());
    }

    if !result.hits.is_empty() {
        println!("\n  {} hits:", result.hits.len());
        for (i, hit) in result.hits.iter().enumerate() {
            let span = match hit.span() {
                Some(span) => format!("[{}..{}]", span.start, span.end),
                None => "whole text".to_string(),
            };
            println!(
                "    {}. {:<20} {}  {:<9} {}",
                i + 1,
                hit.term,
                colorize_severity(hit.severity),
                colorize_source(hit.source),
                span.dimmed()
            );
        }
    }

    if let Some(censored) = censored {
        println!("\n  Censored: {}", censored);
    }
}

/// One line per text for batch runs.
pub fn display_batch_line(index: usize, text: &str, result: &ModerationResult) {
    let marker = if result.contains_profanity {
        "!!".red().bold()
    } else {
        "ok".green()
    };
    let terms: Vec<&str> = result.hits.iter().map(|h| h.term.as_str()).collect();
    println!(
        "  {:>4}. {} sev {}  {:<50} {}",
        index + 1,
        marker,
        colorize_severity(result.severity),
        super::truncate_chars(text, 50),
        terms.join(", ").dimmed()
    );
}

/// Display a word list table.
pub fn display_terms(terms: &[Term]) {
    if terms.is_empty() {
        println!("No terms loaded. Set BLEEP_WORDS_PATH to a JSON word list.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Word List ({} terms) ===", terms.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<24} {:<24} {:<6} {:>3}",
        "Id".dimmed(),
        "Term".dimmed(),
        "Normalized".dimmed(),
        "List".dimmed(),
        "Sev".dimmed(),
    );
    println!("  {}", "-".repeat(66).dimmed());

    for term in terms {
        println!(
            "  {:>4}  {:<24} {:<24} {:<6} {:>3}",
            term.id,
            term.text(),
            term.normalized(),
            term.list.as_str(),
            colorize_severity(term.severity),
        );
    }
    println!();
}

/// Report entries whose stored normalized form is out of date.
pub fn display_stale_entries(stale: &[StaleEntry]) {
    if stale.is_empty() {
        println!("{}", "All stored normalized terms are up to date.".green());
        return;
    }
    println!(
        "{} {} stored normalized terms are stale:",
        "!".bright_red(),
        stale.len()
    );
    for entry in stale {
        println!(
            "  {:<24} {} -> {}",
            entry.term,
            entry.stored.dimmed(),
            entry.derived.bold()
        );
    }
}

fn colorize_severity(severity: u8) -> colored::ColoredString {
    let label = severity.to_string();
    match severity {
        3 => label.red().bold(),
        2 => label.bright_red(),
        1 => label.yellow(),
        _ => label.green(),
    }
}

fn colorize_source(source: HitSource) -> colored::ColoredString {
    match source {
        HitSource::Rules => source.as_str().normal(),
        HitSource::Semantic => source.as_str().cyan(),
    }
}
