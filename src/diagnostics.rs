//! Non-fatal conditions raised while scanning a corpus.
//!
//! Components never log directly. They hand a [`Diagnostic`] to the
//! [`Reporter`] they were given, which lets the binary route everything
//! through `tracing` while tests collect the same diagnostics in memory.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// A recovered problem encountered during a search or walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The corpus root is missing or not a directory.
    CorpusNotFound { root: PathBuf, reason: String },
    /// A document could not be read and was left out of scoring.
    FileReadFailure { path: PathBuf, reason: String },
    /// A document's metadata block could not be decoded.
    MetadataDecodeFailure { path: PathBuf, reason: String },
    /// A walked path resolved to a location outside the corpus root.
    PathOutsideRoot { path: PathBuf },
    /// The directory walk itself hit an error (permissions, symlink loop).
    WalkFailure { reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorpusNotFound { root, reason } => {
                write!(f, "corpus not found at {}: {reason}", root.display())
            }
            Self::FileReadFailure { path, reason } => {
                write!(f, "could not read {}: {reason}", path.display())
            }
            Self::MetadataDecodeFailure { path, reason } => {
                write!(f, "invalid metadata in {}: {reason}", path.display())
            }
            Self::PathOutsideRoot { path } => {
                write!(f, "skipping {}: resolves outside corpus root", path.display())
            }
            Self::WalkFailure { reason } => write!(f, "walk error: {reason}"),
        }
    }
}

/// Sink for diagnostics.
pub trait Reporter: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::CorpusNotFound { root, reason } => {
                tracing::error!(root = %root.display(), %reason, "corpus not found");
            }
            Diagnostic::FileReadFailure { path, reason } => {
                tracing::warn!(path = %path.display(), %reason, "skipping unreadable document");
            }
            Diagnostic::MetadataDecodeFailure { path, reason } => {
                tracing::warn!(path = %path.display(), %reason, "ignoring malformed metadata");
            }
            Diagnostic::PathOutsideRoot { path } => {
                tracing::warn!(path = %path.display(), "skipping path outside corpus root");
            }
            Diagnostic::WalkFailure { reason } => {
                tracing::warn!(%reason, "directory walk error");
            }
        }
    }
}

/// Keeps every diagnostic in memory, in report order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
