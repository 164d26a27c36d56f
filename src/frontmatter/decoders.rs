//! Metadata decoder implementations.

use serde_yaml::Value;

use super::{DecodeError, Metadata, MetadataDecoder};

/// Decodes the block as a YAML mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoder;

impl MetadataDecoder for YamlDecoder {
    fn decode(&self, block: &str) -> Result<Metadata, DecodeError> {
        if block.trim().is_empty() {
            return Ok(Metadata::new());
        }

        let value: Value =
            serde_yaml::from_str(block).map_err(|e| DecodeError::Syntax(e.to_string()))?;

        match value {
            Value::Null => Ok(Metadata::new()),
            Value::Mapping(mapping) => {
                let mut metadata = Metadata::new();
                for (key, value) in mapping {
                    let key = key_text(&key)?;
                    if let Some(text) = value_text(&value) {
                        metadata.insert(key, text);
                    }
                }
                Ok(metadata)
            }
            other => Err(DecodeError::NotAMapping(kind(&other))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn key_text(key: &Value) -> Result<String, DecodeError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(DecodeError::UnsupportedKey(kind(other))),
    }
}

/// Scalars become their text; nulls are dropped; nested values become JSON.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => value_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value).ok(),
    }
}

/// Decodes one `key: value` pair per line.
///
/// Blank lines and `#` comments are ignored. A value wrapped in matching
/// single or double quotes has the quotes removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueDecoder;

impl MetadataDecoder for KeyValueDecoder {
    fn decode(&self, block: &str) -> Result<Metadata, DecodeError> {
        let mut metadata = Metadata::new();

        for (index, line) in block.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(DecodeError::MissingSeparator { line: index + 1 });
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(DecodeError::EmptyKey { line: index + 1 });
            }

            metadata.insert(key.to_string(), unquote(value.trim()).to_string());
        }

        Ok(metadata)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Tries `primary`, then `secondary` if the primary decoder fails.
///
/// When both fail, the primary decoder's error is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDecoder<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackDecoder<P, S> {
    #[must_use]
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: MetadataDecoder, S: MetadataDecoder> MetadataDecoder for FallbackDecoder<P, S> {
    fn decode(&self, block: &str) -> Result<Metadata, DecodeError> {
        self.primary
            .decode(block)
            .or_else(|primary_err| self.secondary.decode(block).map_err(|_| primary_err))
    }
}
