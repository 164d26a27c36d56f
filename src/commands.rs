//! Command implementations shared by CLI and MCP server.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::search::{SearchEngine, SearchResult};

/// Per-invocation settings that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Corpus root directory.
    pub root: Option<PathBuf>,
    /// Lines of context around each hit.
    pub context_lines: Option<usize>,
    /// Extension filter; empty means "use the configured extensions".
    pub extensions: Vec<String>,
}

/// Build a search engine from config plus overrides.
#[must_use]
pub fn engine(config: &Config, overrides: &Overrides) -> SearchEngine {
    let root = overrides
        .root
        .clone()
        .unwrap_or_else(|| config.corpus_root());

    let extensions = if overrides.extensions.is_empty() {
        config.corpus.extensions.clone()
    } else {
        overrides.extensions.clone()
    };

    SearchEngine::new(root)
        .with_extensions(extensions)
        .with_context_lines(
            overrides
                .context_lines
                .unwrap_or(config.search.context_lines),
        )
        .with_decoder(config.search.metadata_format.decoder())
}

/// Search the corpus.
///
/// # Arguments
///
/// * `query` - Free-text query; whitespace separates keywords
/// * `limit` - Maximum number of results, or `None` for the configured default
///
/// # Returns
///
/// Matching documents, highest match count first.
///
/// # Errors
///
/// Returns an error if `limit` (or the configured default) is zero. A missing
/// corpus is logged and produces an empty result instead of an error.
pub fn search(
    config: &Config,
    overrides: &Overrides,
    query: &str,
    limit: Option<usize>,
) -> anyhow::Result<Vec<SearchResult>> {
    let limit = limit.unwrap_or(config.search.max_results);
    let results = engine(config, overrides).search(query, limit)?;
    Ok(results)
}

/// Summary of one document for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    /// Path relative to the corpus root.
    pub path: String,
    /// Title from metadata, falling back to the file stem.
    pub title: String,
    pub source_url: String,
    pub fetched_at: String,
}

/// List every document in the corpus, in walk order.
///
/// # Errors
///
/// Returns an error if the corpus root does not exist or is not a directory.
/// Unreadable documents are logged and left out.
pub fn list(config: &Config, overrides: &Overrides) -> anyhow::Result<Vec<DocumentInfo>> {
    let documents = engine(config, overrides).documents()?;

    Ok(documents
        .iter()
        .map(|doc| DocumentInfo {
            title: doc.title().map_or_else(
                || {
                    Path::new(&doc.path)
                        .file_stem()
                        .map_or_else(|| doc.path.clone(), |s| s.to_string_lossy().to_string())
                },
                ToString::to_string,
            ),
            path: doc.path.clone(),
            source_url: doc.source_url().to_string(),
            fetched_at: doc.fetched_at().to_string(),
        })
        .collect())
}

/// Get the contents of a document by its path.
///
/// # Arguments
///
/// * `doc_path` - Path relative to the corpus root (e.g., "guide/install.md")
///
/// # Errors
///
/// Returns an error if:
/// - The path is empty, absolute, or contains `..`
/// - The document does not exist or resolves outside the corpus root
/// - The document cannot be read
pub fn get(config: &Config, overrides: &Overrides, doc_path: &str) -> anyhow::Result<String> {
    engine(config, overrides).read_document(Path::new(doc_path))
}
