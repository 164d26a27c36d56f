//! CLI interface for docvault.
//!
//! Provides command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Command-line interface for docvault.
#[derive(Parser)]
#[command(name = "docvault")]
#[command(author, version, about = "Search a local documentation corpus", long_about = None)]
pub struct Cli {
    /// Corpus root directory (overrides the config file).
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search the corpus for documents matching a query.
    Search {
        /// Free-text query; words are matched independently.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum number of results to return.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,

        /// Lines of context around each hit.
        #[arg(short = 'C', long = "context")]
        context_lines: Option<usize>,

        /// Only search files with this extension (repeatable, e.g. `-e md -e .txt`).
        #[arg(short, long = "ext")]
        extensions: Vec<String>,
    },

    /// List all documents in the corpus.
    List {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the full contents of a document by its path.
    Get {
        /// Document path relative to the corpus root (e.g., "guide/install.md").
        path: String,
    },

    /// Start the MCP server for AI editor integration.
    #[cfg(feature = "mcp")]
    Serve,
}

impl Commands {
    /// The query words joined back into a single string.
    #[must_use]
    pub fn query_text(query: &[String]) -> String {
        query.join(" ")
    }
}
