//! Query tokenization and occurrence scoring.

/// Lowercase `query` and split it on whitespace runs.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Total number of token occurrences in `body`, case-insensitively.
///
/// Each token is counted independently. After a match the scan resumes at
/// the end of that match, so self-overlapping occurrences are not counted
/// twice: `"aa"` occurs once in `"aaa"`, not twice. Rankings depend on this.
#[must_use]
pub fn score(body: &str, tokens: &[String]) -> usize {
    if tokens.is_empty() {
        return 0;
    }

    let body = body.to_lowercase();
    tokens
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| body.matches(t.as_str()).count())
        .sum()
}

/// Whether `line` contains any token, case-insensitively.
#[must_use]
pub fn line_matches(line: &str, tokens: &[String]) -> bool {
    let line = line.to_lowercase();
    tokens.iter().any(|t| !t.is_empty() && line.contains(t.as_str()))
}
