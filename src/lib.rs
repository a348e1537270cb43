//! Characterize a source snippet without any file or project context.
//!
//! [`analyze_code_context`] detects the language, parses the text with
//! tree-sitter, runs the library, paradigm, code-type and complexity
//! detectors, and returns one versioned [`CodeCharacterization`].
//!
//! ```no_run
//! let record = codeprint::analyze_code_context("def f(xs):\n    return sorted(xs)\n")?;
//! if let Some(record) = record {
//!     println!("{} {}", record.language.language, record.complexity.time_complexity);
//! }
//! # Ok::<(), codeprint::Error>(())
//! ```

pub mod adapters;
pub mod characterization;
pub mod cli;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod core;
pub mod detection;
pub mod errors;
pub mod formatting;
pub mod ir;
pub mod observability;
pub mod pipeline;

// Re-export commonly used types
pub use crate::core::{CstNode, Language, ParserProvider, SyntaxTree, TreeSitterProvider};

pub use crate::adapters::{get_adapter, AdapterRegistry, LanguageAdapter};

pub use crate::characterization::{
    validate_translation, CodeCharacterization, TranslationValidation, CHARACTERIZATION_VERSION,
};

pub use crate::complexity::{analyze_complexity, ComplexityAnalysisResult, CostExpr};

pub use crate::config::{load_config, CodeprintConfig};

pub use crate::detection::{
    analyze_libraries, analyze_paradigm, classify_code_type, detect_language, CodeType, Paradigm,
};

pub use crate::errors::{Error, Result};

pub use crate::pipeline::{analyze_batch, analyze_code_context, AnalysisSession, Characterizer};
