//! Spec document format detection and generic decoding.
//!
//! Spec documents arrive either as JSON objects or YAML mappings. Content read
//! from disk is classified by file extension; raw bytes without a name are
//! sniffed from their first non-whitespace byte. Both paths decode into a
//! generic [`serde_json::Value`] tree so later stages never care which format
//! the author used.

use std::{fmt, path::Path};

use serde_json::Value;
use thiserror::Error;

/// Serialization format of a spec document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecFormat {
    Json,
    Yaml,
}

/// Errors raised while classifying or decoding spec content.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Zero-length input.
    #[error("nothing to decode: spec content is empty")]
    Empty,
    /// A spec file whose extension is not one of the recognised formats.
    #[error("unsupported spec file extension '{0}'")]
    UnsupportedExtension(String),
    /// Malformed JSON content.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed YAML content.
    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SpecFormat {
    /// File extensions recognised as spec documents.
    pub const EXTENSIONS: [&'static str; 3] = ["json", "yaml", "yml"];

    /// Classifies raw content: a leading `{` (after whitespace) is JSON,
    /// anything else is YAML.
    pub fn detect(content: &[u8]) -> Result<Self, FormatError> {
        if content.is_empty() {
            return Err(FormatError::Empty);
        }
        let first = content.iter().find(|byte| !byte.is_ascii_whitespace());
        Ok(match first {
            Some(b'{') => Self::Json,
            _ => Self::Yaml,
        })
    }

    /// Maps a file extension (without the dot, case-insensitive) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Resolves the format of a spec file from its path.
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| FormatError::UnsupportedExtension(extension.to_string()))
    }

    /// Decodes content into a generic value tree using this format.
    pub fn decode(self, content: &[u8]) -> Result<Value, FormatError> {
        if content.is_empty() {
            return Err(FormatError::Empty);
        }
        let value = match self {
            Self::Json => serde_json::from_slice(content)?,
            Self::Yaml => serde_yaml::from_slice(content)?,
        };
        Ok(value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sniffs the format of `content` and decodes it into a generic value tree.
pub fn decode_document(content: &[u8]) -> Result<(SpecFormat, Value), FormatError> {
    let format = SpecFormat::detect(content)?;
    let value = format.decode(content)?;
    Ok((format, value))
}
