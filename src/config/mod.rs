//! Configuration loading for docvault.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::frontmatter::MetadataFormat;
use crate::search::context::DEFAULT_CONTEXT_LINES;
use crate::search::{DEFAULT_EXTENSIONS, DEFAULT_MAX_RESULTS};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "DOCVAULT_CONFIG";

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Where the corpus lives and which files belong to it.
#[derive(Debug, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_root")]
    pub root: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Search defaults, overridable per invocation.
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
    #[serde(default)]
    pub metadata_format: MetadataFormat,
}

fn default_corpus_root() -> String {
    "./references".to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_context_lines() -> usize {
    DEFAULT_CONTEXT_LINES
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_corpus_root(),
            extensions: default_extensions(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            context_lines: default_context_lines(),
            metadata_format: MetadataFormat::default(),
        }
    }
}

impl Config {
    /// Load config from `$DOCVAULT_CONFIG`, then the platform config dir
    /// (e.g. ~/.config/docvault/config.toml), or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::from_file(&path);
        }

        Ok(Config::default())
    }

    /// Parse a specific config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))
    }

    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        ProjectDirs::from("", "", "docvault").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Corpus root with `~` expanded.
    #[must_use]
    pub fn corpus_root(&self) -> PathBuf {
        expand_tilde(&self.corpus.root)
    }
}

/// Expand ~ to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}
