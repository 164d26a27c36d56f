//! Context snippets around query hits.

use super::matcher::line_matches;

/// Lines of context shown on each side of a hit.
pub const DEFAULT_CONTEXT_LINES: usize = 2;

/// Prefix for lines that contain a hit.
pub const HIT_MARKER: &str = "> ";

/// Prefix for surrounding context lines.
pub const CONTEXT_MARKER: &str = "  ";

/// Build one snippet per cluster of nearby hit lines in `body`.
///
/// Hits closer than `2 * context_lines + 1` lines apart share a snippet,
/// since their windows would overlap or touch. Every cluster is returned;
/// callers decide how many to show.
#[must_use]
pub fn build_snippets(body: &str, tokens: &[String], context_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = body.lines().collect();

    let hits: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line_matches(line, tokens))
        .map(|(index, _)| index)
        .collect();

    cluster(&hits, context_lines)
        .into_iter()
        .map(|(first, last)| render(&lines, &hits, first, last, context_lines))
        .collect()
}

/// Group sorted hit indices into `(first, last)` clusters.
fn cluster(hits: &[usize], context_lines: usize) -> Vec<(usize, usize)> {
    let max_gap = 2 * context_lines + 1;
    let mut clusters: Vec<(usize, usize)> = Vec::new();

    for &hit in hits {
        match clusters.last_mut() {
            Some((_, last)) if hit - *last <= max_gap => *last = hit,
            _ => clusters.push((hit, hit)),
        }
    }

    clusters
}

fn render(lines: &[&str], hits: &[usize], first: usize, last: usize, context_lines: usize) -> String {
    let start = first.saturating_sub(context_lines);
    let end = (last + context_lines + 1).min(lines.len());

    (start..end)
        .map(|index| {
            let marker = if hits.binary_search(&index).is_ok() {
                HIT_MARKER
            } else {
                CONTEXT_MARKER
            };
            format!("{marker}{}", lines[index])
        })
        .collect::<Vec<_>>()
        .join("\n")
}
