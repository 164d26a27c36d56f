//! docvault - local search over a crawled documentation corpus.
//!
//! A corpus is a directory of generated reference documents, each optionally
//! starting with a `---` metadata block (`title`, `source_url`,
//! `fetched_at`). Every search walks the whole corpus, scores each document
//! by keyword occurrence count and returns ranked results with context
//! snippets. Nothing is indexed or cached between calls.
//!
//! # Modules
//!
//! - [`search`] - Search engine, query matching, ranking and snippets
//! - [`corpus`] - Corpus walking and document loading
//! - [`frontmatter`] - Metadata block parsing and pluggable decoders
//! - [`diagnostics`] - Reporting of recovered, non-fatal problems
//! - [`format`] - Text and JSON rendering
//! - [`commands`] - High-level operations (search, list, get)
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cli;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod diagnostics;
pub mod format;
pub mod frontmatter;
pub mod search;

#[cfg(feature = "mcp")]
pub mod mcp;
