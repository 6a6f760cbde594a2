// Output formatting: terminal display of moderation results and word lists.

pub mod terminal;

/// Shorten a moderated text for log lines and terminal previews.
///
/// Keeps the first `max_chars` characters and marks the cut with "...".
/// Counting is per character, matching the offsets used in hits.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
