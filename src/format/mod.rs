//! Rendering search results and document listings for display.

use std::fmt::Write;

use serde::Serialize;

use crate::search::SearchResult;

/// Snippets shown per result in the text report.
pub const MAX_DISPLAYED_SNIPPETS: usize = 3;

const SEPARATOR: &str = "----------------------------------------";

/// Render results as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json<T: Serialize>(items: &[T]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(items)
}

/// Render results as a numbered, human-readable report.
#[must_use]
pub fn render_text(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No matches found for '{query}'\n");
    }

    let mut output = String::new();
    let _ = writeln!(output, "Found {} result(s) for '{query}':", results.len());

    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "{}. {} ({} match{})",
            rank + 1,
            result.file,
            result.match_count,
            if result.match_count == 1 { "" } else { "es" }
        );
        let _ = writeln!(output, "   Source: {}", result.source_url);
        let _ = writeln!(output, "   Fetched: {}", result.fetched_at);
        let _ = writeln!(output, "   {SEPARATOR}");

        let shown = result.contexts.len().min(MAX_DISPLAYED_SNIPPETS);
        for (index, snippet) in result.contexts.iter().take(shown).enumerate() {
            if index > 0 {
                let _ = writeln!(output, "   ...");
            }
            for line in snippet.lines() {
                let _ = writeln!(output, "   {line}");
            }
        }

        let hidden = result.contexts.len() - shown;
        if hidden > 0 {
            let _ = writeln!(output, "   ... ({hidden} more)");
        }
    }

    output
}
