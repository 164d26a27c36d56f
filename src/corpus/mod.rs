//! Corpus discovery and document loading.
//!
//! A corpus is a directory tree of generated reference documents. Every
//! file under the root that passes the extension filter is a document, and
//! the tree is re-walked on every call.

use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::diagnostics::{Diagnostic, Reporter};
use crate::frontmatter::{self, Metadata, MetadataDecoder};

/// Placeholder for metadata fields a document does not carry.
pub const UNKNOWN: &str = "Unknown";

/// Metadata key holding the page the document was converted from.
pub const SOURCE_URL_KEY: &str = "source_url";

/// Metadata key holding when the page was fetched.
pub const FETCHED_AT_KEY: &str = "fetched_at";

/// Metadata key holding the document title.
pub const TITLE_KEY: &str = "title";

/// Errors that can occur when opening a corpus or resolving a path in it.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Corpus root not found at {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corpus root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(PathBuf),

    #[error("Path escapes corpus root: {0}")]
    PathEscapesRoot(PathBuf),
}

/// An opened corpus: a canonical root plus an extension filter.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    extensions: Vec<String>,
}

impl Corpus {
    /// Open the corpus rooted at `root`.
    ///
    /// `extensions` restricts which files are documents; `.md` and `md` are
    /// equivalent and comparison ignores ASCII case. An empty list accepts
    /// every regular file.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::NotFound` if the root cannot be resolved and
    /// `CorpusError::NotADirectory` if it is not a directory.
    pub fn open(root: &Path, extensions: &[String]) -> Result<Self, CorpusError> {
        let canonical = root.canonicalize().map_err(|source| CorpusError::NotFound {
            path: root.to_path_buf(),
            source,
        })?;

        if !canonical.is_dir() {
            return Err(CorpusError::NotADirectory(root.to_path_buf()));
        }

        Ok(Self {
            root: canonical,
            extensions: extensions
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect(),
        })
    }

    /// Canonical corpus root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the corpus, yielding document paths in a stable order.
    ///
    /// Each call starts a fresh walk. Problems along the way are sent to
    /// `reporter` and the walk carries on.
    pub fn walk<'a>(&'a self, reporter: &'a dyn Reporter) -> Walk<'a> {
        let entries = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        Walk {
            corpus: self,
            entries,
            reporter,
        }
    }

    /// Path of `path` relative to the root, with `/` separators.
    #[must_use]
    pub fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Resolve a corpus-relative document path to an existing file.
    ///
    /// # Errors
    ///
    /// Rejects empty, absolute and `..`-containing paths, paths that do not
    /// exist, and paths whose resolved location leaves the root.
    pub fn resolve_document_path(&self, relative: &Path) -> Result<PathBuf, CorpusError> {
        if relative.as_os_str().is_empty() {
            return Err(CorpusError::InvalidPath("cannot be empty".to_string()));
        }

        if relative.is_absolute() {
            return Err(CorpusError::InvalidPath("must be relative".to_string()));
        }

        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(CorpusError::InvalidPath(
                "contains '..' component".to_string(),
            ));
        }

        let full_path = self.root.join(relative);
        let canonical = full_path
            .canonicalize()
            .map_err(|_| CorpusError::DocumentNotFound(relative.to_path_buf()))?;

        if !canonical.starts_with(&self.root) {
            return Err(CorpusError::PathEscapesRoot(relative.to_path_buf()));
        }

        if !canonical.is_file() {
            return Err(CorpusError::DocumentNotFound(relative.to_path_buf()));
        }

        Ok(canonical)
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| {
                let e = e.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == e)
            })
    }
}

/// Strip a leading dot and lowercase an extension filter value.
#[must_use]
pub fn normalize_extension(extension: &str) -> String {
    extension
        .trim()
        .trim_start_matches('.')
        .to_ascii_lowercase()
}

/// Lazy iterator over the documents of a [`Corpus`].
pub struct Walk<'a> {
    corpus: &'a Corpus,
    entries: walkdir::IntoIter,
    reporter: &'a dyn Reporter,
}

impl Iterator for Walk<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.reporter.report(Diagnostic::WalkFailure {
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.corpus.accepts_extension(entry.path()) {
                continue;
            }

            match entry.path().canonicalize() {
                Ok(resolved) if resolved.starts_with(&self.corpus.root) => {
                    return Some(entry.into_path());
                }
                Ok(_) => self.reporter.report(Diagnostic::PathOutsideRoot {
                    path: entry.into_path(),
                }),
                Err(e) => self.reporter.report(Diagnostic::WalkFailure {
                    reason: format!("{}: {e}", entry.path().display()),
                }),
            }
        }
    }
}

/// One document as read from disk for a single query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Path relative to the corpus root (e.g., "guide/install.md").
    pub path: String,
    /// Decoded metadata block, empty if absent or malformed.
    pub metadata: Metadata,
    /// Document text without the metadata block.
    pub body: String,
}

impl DocumentRecord {
    /// Read and parse the document at `path`.
    ///
    /// Returns `None` if the file cannot be read. Invalid UTF-8 is replaced
    /// with U+FFFD rather than dropping the document. A malformed metadata
    /// block is reported but still yields a record with empty metadata.
    pub fn load(
        corpus: &Corpus,
        path: &Path,
        decoder: &dyn MetadataDecoder,
        reporter: &dyn Reporter,
    ) -> Option<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                reporter.report(Diagnostic::FileReadFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                return None;
            }
        };

        let raw = String::from_utf8_lossy(&bytes);
        let parsed = frontmatter::parse(&raw, decoder);
        if let Some(err) = parsed.decode_error {
            reporter.report(Diagnostic::MetadataDecodeFailure {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
        }

        Some(Self {
            path: corpus.relative_path(path),
            metadata: parsed.metadata,
            body: parsed.body.to_string(),
        })
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.metadata.get(TITLE_KEY).map(String::as_str)
    }

    /// Source URL, or [`UNKNOWN`].
    #[must_use]
    pub fn source_url(&self) -> &str {
        self.metadata
            .get(SOURCE_URL_KEY)
            .map_or(UNKNOWN, String::as_str)
    }

    /// Fetch timestamp, or [`UNKNOWN`].
    #[must_use]
    pub fn fetched_at(&self) -> &str {
        self.metadata
            .get(FETCHED_AT_KEY)
            .map_or(UNKNOWN, String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingReporter;
    use crate::frontmatter::YamlDecoder;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn md() -> Vec<String> {
        vec!["md".to_string()]
    }

    mod open_tests {
        use super::*;

        #[test]
        fn missing_root() {
            let temp_dir = TempDir::new().unwrap();
            let result = Corpus::open(&temp_dir.path().join("nope"), &md());
            assert!(matches!(result, Err(CorpusError::NotFound { .. })));
        }

        #[test]
        fn root_is_a_file() {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "file.md", "x");
            let result = Corpus::open(&temp_dir.path().join("file.md"), &md());
            assert!(matches!(result, Err(CorpusError::NotADirectory(_))));
        }

        #[test]
        fn normalizes_extensions() {
            assert_eq!(normalize_extension(".MD"), "md");
            assert_eq!(normalize_extension("md"), "md");
            assert_eq!(normalize_extension(" .txt "), "txt");
        }
    }

    mod walk_tests {
        use super::*;

        fn relative_walk(corpus: &Corpus, reporter: &CollectingReporter) -> Vec<String> {
            corpus
                .walk(reporter)
                .map(|p| corpus.relative_path(&p))
                .collect()
        }

        #[test]
        fn sorted_recursive_walk() {
            let temp_dir = TempDir::new().unwrap();
            let root = temp_dir.path();
            write(root, "b.md", "");
            write(root, "a/z.md", "");
            write(root, "a/m.md", "");
            write(root, "c.md", "");

            let corpus = Corpus::open(root, &md()).unwrap();
            let reporter = CollectingReporter::new();
            assert_eq!(
                relative_walk(&corpus, &reporter),
                vec!["a/m.md", "a/z.md", "b.md", "c.md"]
            );
            assert!(reporter.diagnostics().is_empty());
        }

        #[test]
        fn walk_is_restartable() {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "one.md", "");
            write(temp_dir.path(), "two/three.md", "");

            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            let reporter = CollectingReporter::new();
            let first = relative_walk(&corpus, &reporter);
            let second = relative_walk(&corpus, &reporter);
            assert_eq!(first, second);
            assert_eq!(first.len(), 2);
        }

        #[test]
        fn dotted_and_undotted_filters_match() {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "doc.md", "");
            write(temp_dir.path(), "notes.txt", "");
            write(temp_dir.path(), "image.png", "");

            let reporter = CollectingReporter::new();
            let dotted = Corpus::open(temp_dir.path(), &[".md".to_string(), ".txt".to_string()])
                .unwrap();
            let undotted =
                Corpus::open(temp_dir.path(), &["md".to_string(), "txt".to_string()]).unwrap();

            assert_eq!(relative_walk(&dotted, &reporter), vec!["doc.md", "notes.txt"]);
            assert_eq!(
                relative_walk(&undotted, &reporter),
                relative_walk(&dotted, &reporter)
            );
        }

        #[test]
        fn empty_filter_accepts_everything() {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "doc.md", "");
            write(temp_dir.path(), "README", "");

            let corpus = Corpus::open(temp_dir.path(), &[]).unwrap();
            let reporter = CollectingReporter::new();
            assert_eq!(relative_walk(&corpus, &reporter), vec!["README", "doc.md"]);
        }

        #[cfg(unix)]
        #[test]
        fn symlink_outside_root_is_skipped() {
            let outside = TempDir::new().unwrap();
            write(outside.path(), "secret.md", "install");

            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "inside.md", "install");
            std::os::unix::fs::symlink(
                outside.path().join("secret.md"),
                temp_dir.path().join("link.md"),
            )
            .unwrap();

            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            let reporter = CollectingReporter::new();
            assert_eq!(relative_walk(&corpus, &reporter), vec!["inside.md"]);

            let diagnostics = reporter.diagnostics();
            assert_eq!(diagnostics.len(), 1);
            assert!(matches!(diagnostics[0], Diagnostic::PathOutsideRoot { .. }));
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn resolves_existing_document() {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "guide/install.md", "x");
            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();

            let path = corpus
                .resolve_document_path(Path::new("guide/install.md"))
                .unwrap();
            assert!(path.ends_with("guide/install.md"));
        }

        #[test]
        fn rejects_parent_components() {
            let temp_dir = TempDir::new().unwrap();
            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            let result = corpus.resolve_document_path(Path::new("../etc/passwd"));
            assert!(matches!(result, Err(CorpusError::InvalidPath(_))));
        }

        #[test]
        fn rejects_absolute_and_empty() {
            let temp_dir = TempDir::new().unwrap();
            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            assert!(matches!(
                corpus.resolve_document_path(Path::new("/etc/passwd")),
                Err(CorpusError::InvalidPath(_))
            ));
            assert!(matches!(
                corpus.resolve_document_path(Path::new("")),
                Err(CorpusError::InvalidPath(_))
            ));
        }

        #[test]
        fn missing_document() {
            let temp_dir = TempDir::new().unwrap();
            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            let result = corpus.resolve_document_path(Path::new("nope.md"));
            assert!(matches!(result, Err(CorpusError::DocumentNotFound(_))));
        }
    }

    mod record_tests {
        use super::*;

        #[test]
        fn loads_metadata_and_body() {
            let temp_dir = TempDir::new().unwrap();
            write(
                temp_dir.path(),
                "guide/install.md",
                "---\ntitle: Install\nsource_url: https://x/y\n---\nRun the installer.\n",
            );
            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            let reporter = CollectingReporter::new();
            let path = corpus.root().join("guide/install.md");

            let record = DocumentRecord::load(&corpus, &path, &YamlDecoder, &reporter).unwrap();
            assert_eq!(record.path, "guide/install.md");
            assert_eq!(record.title(), Some("Install"));
            assert_eq!(record.source_url(), "https://x/y");
            assert_eq!(record.fetched_at(), UNKNOWN);
            assert_eq!(record.body, "Run the installer.\n");
        }

        #[test]
        fn unreadable_file_is_reported() {
            let temp_dir = TempDir::new().unwrap();
            fs::create_dir(temp_dir.path().join("folder.md")).unwrap();
            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            let reporter = CollectingReporter::new();

            let record = DocumentRecord::load(
                &corpus,
                &corpus.root().join("folder.md"),
                &YamlDecoder,
                &reporter,
            );
            assert!(record.is_none());
            assert!(matches!(
                reporter.diagnostics()[0],
                Diagnostic::FileReadFailure { .. }
            ));
        }

        #[test]
        fn invalid_utf8_is_decoded_lossily() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(
                temp_dir.path().join("latin1.md"),
                b"---\ntitle: Caf\xE9\n---\ncaf\xE9 menu\n",
            )
            .unwrap();
            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            let reporter = CollectingReporter::new();

            let record = DocumentRecord::load(
                &corpus,
                &corpus.root().join("latin1.md"),
                &YamlDecoder,
                &reporter,
            )
            .unwrap();
            assert_eq!(record.title(), Some("Caf\u{FFFD}"));
            assert_eq!(record.body, "caf\u{FFFD} menu\n");
            assert!(reporter.diagnostics().is_empty());
        }

        #[test]
        fn malformed_metadata_is_reported() {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "bad.md", "---\n: [\n---\nbody\n");
            let corpus = Corpus::open(temp_dir.path(), &md()).unwrap();
            let reporter = CollectingReporter::new();

            let record = DocumentRecord::load(
                &corpus,
                &corpus.root().join("bad.md"),
                &YamlDecoder,
                &reporter,
            )
            .unwrap();
            assert!(record.metadata.is_empty());
            assert_eq!(record.body, "body\n");
            assert!(matches!(
                reporter.diagnostics()[0],
                Diagnostic::MetadataDecodeFailure { .. }
            ));
        }
    }
}
