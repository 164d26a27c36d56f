//! Leading metadata blocks in generated reference documents.
//!
//! Documents produced by the conversion pipeline start with a block like:
//!
//! ```text
//! ---
//! title: Installation
//! source_url: https://docs.example.com/install
//! fetched_at: 2024-05-01T12:00:00Z
//! ---
//! # Installation
//! ```
//!
//! [`parse`] separates that block from the body. Decoding the block is
//! delegated to a [`MetadataDecoder`], and a decode failure never affects
//! the body: a broken block still yields the correct body text.

mod decoders;

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

pub use decoders::{FallbackDecoder, KeyValueDecoder, YamlDecoder};

/// Line that opens and closes a metadata block.
pub const DELIMITER: &str = "---";

/// Decoded metadata: string keys to scalar values rendered as text.
pub type Metadata = BTreeMap<String, String>;

/// Errors produced while decoding a metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("YAML syntax error: {0}")]
    Syntax(String),

    #[error("expected a mapping, found {0}")]
    NotAMapping(&'static str),

    #[error("unsupported key type: {0}")]
    UnsupportedKey(&'static str),

    #[error("line {line}: expected `key: value`")]
    MissingSeparator { line: usize },

    #[error("line {line}: empty key")]
    EmptyKey { line: usize },
}

/// Turns the raw text between the delimiters into a [`Metadata`] map.
pub trait MetadataDecoder: Send + Sync {
    /// Decode a metadata block (without its delimiter lines).
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the block is not valid for this format.
    fn decode(&self, block: &str) -> Result<Metadata, DecodeError>;
}

/// Metadata block format, as selected in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataFormat {
    /// Full YAML decoding.
    #[default]
    Yaml,
    /// One `key: value` pair per line.
    KeyValue,
    /// YAML first, then `key: value` lines if YAML rejects the block.
    Auto,
}

impl MetadataFormat {
    /// Build the decoder for this format.
    #[must_use]
    pub fn decoder(self) -> Box<dyn MetadataDecoder> {
        match self {
            Self::Yaml => Box::new(YamlDecoder),
            Self::KeyValue => Box::new(KeyValueDecoder),
            Self::Auto => Box::new(FallbackDecoder::new(YamlDecoder, KeyValueDecoder)),
        }
    }
}

/// A document split into metadata and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<'a> {
    /// Decoded metadata, empty when absent or undecodable.
    pub metadata: Metadata,
    /// Text after the closing delimiter, or the whole input when there is no block.
    pub body: &'a str,
    /// Why the block could not be decoded, if it could not.
    pub decode_error: Option<DecodeError>,
}

/// Split `raw` into its metadata block and body.
///
/// The block is only recognized when the very first line is a delimiter
/// and a later line closes it. Anything else is treated as body text.
#[must_use]
pub fn parse<'a>(raw: &'a str, decoder: &dyn MetadataDecoder) -> Parsed<'a> {
    let Some((block, body)) = split_block(raw) else {
        return Parsed {
            metadata: Metadata::new(),
            body: raw,
            decode_error: None,
        };
    };

    match decoder.decode(block) {
        Ok(metadata) => Parsed {
            metadata,
            body,
            decode_error: None,
        },
        Err(e) => Parsed {
            metadata: Metadata::new(),
            body,
            decode_error: Some(e),
        },
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Returns `(block, body)` when `raw` opens with a closed delimiter block.
fn split_block(raw: &str) -> Option<(&str, &str)> {
    let mut lines = raw.split_inclusive('\n');

    let opening = lines.next()?;
    if !is_delimiter(opening) {
        return None;
    }

    let block_start = opening.len();
    let mut offset = block_start;
    for line in lines {
        if is_delimiter(line) {
            return Some((&raw[block_start..offset], &raw[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}
