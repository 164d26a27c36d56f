//! Full-scan search over a documentation corpus.
//!
//! Every query re-walks the corpus, re-reads each document and scores its
//! body by raw keyword occurrence count. There is no index to build or keep
//! in sync.

pub mod context;
pub mod matcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::corpus::{Corpus, CorpusError, DocumentRecord};
use crate::diagnostics::{Diagnostic, Reporter, TracingReporter};
use crate::frontmatter::{MetadataDecoder, YamlDecoder};

use self::context::{DEFAULT_CONTEXT_LINES, build_snippets};
use self::matcher::{score, tokenize};

/// Default number of results returned by a search.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Extensions searched when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md"];

/// Errors returned to the caller before a scan starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("max results must be a positive integer, got {0}")]
    InvalidMaxResults(usize),
}

/// A matching document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Path relative to the corpus root.
    pub file: String,
    /// Total keyword occurrences in the body. Always at least 1.
    pub match_count: usize,
    /// Every context snippet, in document order.
    pub contexts: Vec<String>,
    pub source_url: String,
    pub fetched_at: String,
}

/// Search engine bound to one corpus root.
pub struct SearchEngine {
    root: PathBuf,
    extensions: Vec<String>,
    context_lines: usize,
    decoder: Box<dyn MetadataDecoder>,
    reporter: Arc<dyn Reporter>,
}

impl SearchEngine {
    /// Engine for `root` with default settings: `.md` files, two lines of
    /// context, YAML metadata and diagnostics sent to `tracing`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            context_lines: DEFAULT_CONTEXT_LINES,
            decoder: Box::new(YamlDecoder),
            reporter: Arc::new(TracingReporter),
        }
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    #[must_use]
    pub fn with_decoder(mut self, decoder: Box<dyn MetadataDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Search the corpus for `query`.
    ///
    /// Returns at most `max_results` documents ordered by match count,
    /// highest first. Documents with equal counts keep walk order. A missing
    /// corpus root is reported and yields no results.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidMaxResults` if `max_results` is zero.
    pub fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        if max_results == 0 {
            return Err(SearchError::InvalidMaxResults(max_results));
        }

        let Some(corpus) = self.open_corpus() else {
            return Ok(Vec::new());
        };

        let tokens = tokenize(query);
        if tokens.is_empty() {
            debug!("empty query, skipping scan");
            return Ok(Vec::new());
        }

        let mut scanned = 0usize;
        let mut matches = Vec::new();
        for path in corpus.walk(self.reporter.as_ref()) {
            scanned += 1;
            if let Some(result) = self.score_document(&corpus, &path, &tokens) {
                matches.push(result);
            }
        }

        info!(
            query,
            scanned,
            matched = matches.len(),
            "search complete"
        );

        Ok(rank(matches, max_results))
    }

    /// Load every document in the corpus, in walk order.
    ///
    /// # Errors
    ///
    /// Returns a `CorpusError` if the corpus root cannot be opened.
    pub fn documents(&self) -> Result<Vec<DocumentRecord>, CorpusError> {
        let corpus = Corpus::open(&self.root, &self.extensions)?;
        Ok(corpus
            .walk(self.reporter.as_ref())
            .filter_map(|path| {
                DocumentRecord::load(&corpus, &path, self.decoder.as_ref(), self.reporter.as_ref())
            })
            .collect())
    }

    /// Resolve and read one document by its corpus-relative path.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be opened, the path is invalid
    /// or escapes the root, or the file cannot be read.
    pub fn read_document(&self, relative: &Path) -> anyhow::Result<String> {
        let corpus = Corpus::open(&self.root, &self.extensions)?;
        let path = corpus.resolve_document_path(relative)?;
        std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", relative.display()))
    }

    fn open_corpus(&self) -> Option<Corpus> {
        match Corpus::open(&self.root, &self.extensions) {
            Ok(corpus) => Some(corpus),
            Err(e) => {
                self.reporter.report(Diagnostic::CorpusNotFound {
                    root: self.root.clone(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn score_document(&self, corpus: &Corpus, path: &Path, tokens: &[String]) -> Option<SearchResult> {
        let record = DocumentRecord::load(corpus, path, self.decoder.as_ref(), self.reporter.as_ref())?;

        let match_count = score(&record.body, tokens);
        debug!(file = %record.path, match_count, "scored document");
        if match_count == 0 {
            return None;
        }

        Some(SearchResult {
            contexts: build_snippets(&record.body, tokens, self.context_lines),
            source_url: record.source_url().to_string(),
            fetched_at: record.fetched_at().to_string(),
            file: record.path,
            match_count,
        })
    }
}

/// Order results by match count, highest first, and keep the top `max_results`.
///
/// The sort is stable, so ties keep their incoming order.
#[must_use]
pub fn rank(mut results: Vec<SearchResult>, max_results: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.match_count.cmp(&a.match_count));
    results.truncate(max_results);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::UNKNOWN;
    use crate::diagnostics::CollectingReporter;
    use crate::frontmatter::KeyValueDecoder;
    use std::fs;
    use tempfile::TempDir;

    fn result(file: &str, match_count: usize) -> SearchResult {
        SearchResult {
            file: file.to_string(),
            match_count,
            contexts: vec![],
            source_url: UNKNOWN.to_string(),
            fetched_at: UNKNOWN.to_string(),
        }
    }

    fn engine(temp_dir: &TempDir) -> (SearchEngine, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        let engine = SearchEngine::new(temp_dir.path()).with_reporter(reporter.clone());
        (engine, reporter)
    }

    mod rank_tests {
        use super::*;

        #[test]
        fn sorts_descending_and_keeps_ties_stable() {
            let ranked = rank(
                vec![result("a", 1), result("b", 3), result("c", 1), result("d", 3)],
                10,
            );
            let files: Vec<_> = ranked.iter().map(|r| r.file.as_str()).collect();
            assert_eq!(files, vec!["b", "d", "a", "c"]);
        }

        #[test]
        fn truncates() {
            let ranked = rank(vec![result("a", 1), result("b", 5), result("c", 2)], 2);
            assert_eq!(ranked.len(), 2);
            assert_eq!(ranked[0].file, "b");
            assert_eq!(ranked[1].file, "c");
        }
    }

    mod engine_tests {
        use super::*;

        #[test]
        fn zero_max_results_is_rejected() {
            let temp_dir = TempDir::new().unwrap();
            let (engine, _) = engine(&temp_dir);
            assert_eq!(
                engine.search("install", 0),
                Err(SearchError::InvalidMaxResults(0))
            );
        }

        #[test]
        fn missing_root_reports_and_returns_nothing() {
            let temp_dir = TempDir::new().unwrap();
            let reporter = Arc::new(CollectingReporter::new());
            let engine =
                SearchEngine::new(temp_dir.path().join("missing")).with_reporter(reporter.clone());

            assert!(engine.search("install", 10).unwrap().is_empty());

            let diagnostics = reporter.diagnostics();
            assert_eq!(diagnostics.len(), 1);
            assert!(matches!(diagnostics[0], Diagnostic::CorpusNotFound { .. }));
        }

        #[test]
        fn empty_query_returns_nothing() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("a.md"), "install").unwrap();
            let (engine, _) = engine(&temp_dir);
            assert!(engine.search("   ", 10).unwrap().is_empty());
        }

        #[test]
        fn empty_query_on_missing_root_is_reported() {
            let temp_dir = TempDir::new().unwrap();
            let reporter = Arc::new(CollectingReporter::new());
            let engine =
                SearchEngine::new(temp_dir.path().join("missing")).with_reporter(reporter.clone());

            assert!(engine.search("  ", 10).unwrap().is_empty());
            assert!(matches!(
                reporter.diagnostics().as_slice(),
                [Diagnostic::CorpusNotFound { .. }]
            ));
        }

        #[test]
        fn result_carries_metadata_and_snippets() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(
                temp_dir.path().join("install.md"),
                "---\nsource_url: https://x/y\nfetched_at: 2024-05-01\n---\n# Install\n\nRun install.sh\n",
            )
            .unwrap();
            let (engine, _) = engine(&temp_dir);

            let results = engine.search("install", 10).unwrap();
            assert_eq!(results.len(), 1);
            let hit = &results[0];
            assert_eq!(hit.file, "install.md");
            assert_eq!(hit.match_count, 2);
            assert_eq!(hit.source_url, "https://x/y");
            assert_eq!(hit.fetched_at, "2024-05-01");
            assert_eq!(hit.contexts, vec!["> # Install\n  \n> Run install.sh"]);
        }

        #[test]
        fn metadata_is_not_searched() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(
                temp_dir.path().join("a.md"),
                "---\ntitle: Install guide\n---\nNothing to see.\n",
            )
            .unwrap();
            let (engine, _) = engine(&temp_dir);
            assert!(engine.search("install", 10).unwrap().is_empty());
        }

        #[test]
        fn custom_decoder_is_used() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(
                temp_dir.path().join("a.md"),
                "---\nsource_url: https://x/y: extra\n---\ninstall\n",
            )
            .unwrap();
            let reporter = Arc::new(CollectingReporter::new());
            let engine = SearchEngine::new(temp_dir.path())
                .with_reporter(reporter.clone())
                .with_decoder(Box::new(KeyValueDecoder));

            let results = engine.search("install", 10).unwrap();
            assert_eq!(results[0].source_url, "https://x/y: extra");
            assert!(reporter.diagnostics().is_empty());
        }

        #[test]
        fn documents_lists_in_walk_order() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("b.md"), "---\ntitle: B\n---\n").unwrap();
            fs::write(temp_dir.path().join("a.md"), "no metadata").unwrap();
            let (engine, _) = engine(&temp_dir);

            let documents = engine.documents().unwrap();
            let paths: Vec<_> = documents.iter().map(|d| d.path.as_str()).collect();
            assert_eq!(paths, vec!["a.md", "b.md"]);
            assert_eq!(documents[1].title(), Some("B"));
        }

        #[test]
        fn read_document_rejects_traversal() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("a.md"), "hello").unwrap();
            let (engine, _) = engine(&temp_dir);

            assert_eq!(engine.read_document(Path::new("a.md")).unwrap(), "hello");
            assert!(engine.read_document(Path::new("../a.md")).is_err());
        }
    }
}
