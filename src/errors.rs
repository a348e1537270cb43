//! Shared error types for characterization runs.
//!
//! Only genuine faults are errors. A missing parser is not one: the pipeline
//! degrades to default detector values instead (see [`crate::pipeline`]), and
//! a language without an adapter silently uses the legacy complexity path.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::Language;

/// Main error type for codeprint operations
#[derive(Debug, Error)]
pub enum Error {
    /// The parser produced no tree for the given source
    #[error("Parse error ({language}): {message}")]
    Parse { language: Language, message: String },

    /// A tree violated the CST span or bounds invariants
    #[error("Malformed syntax tree: {0}")]
    MalformedTree(String),

    /// Internal analysis fault (unexpected node shapes, panics in a detector)
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        path: Option<PathBuf>,
    },

    /// No grammar is bundled for the language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(Language),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a parse error for a language
    pub fn parse(language: Language, message: impl Into<String>) -> Self {
        Self::Parse {
            language,
            message: message.into(),
        }
    }

    /// Create a configuration error with path context
    pub fn configuration(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Configuration {
            message: message.into(),
            path,
        }
    }

    /// Whether the caller should treat this as "no characterization available"
    pub fn is_analysis_fault(&self) -> bool {
        matches!(self, Self::Analysis(_) | Self::MalformedTree(_))
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse(Language::Python, "no tree");
        assert_eq!(err.to_string(), "Parse error (Python): no tree");
    }

    #[test]
    fn test_analysis_fault_classification() {
        assert!(Error::Analysis("boom".into()).is_analysis_fault());
        assert!(Error::MalformedTree("span".into()).is_analysis_fault());
        assert!(!Error::UnsupportedLanguage(Language::Php).is_analysis_fault());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
