//! Detectors that classify a snippet: language, libraries, frameworks,
//! paradigm and code type.
//!
//! Language detection works on raw text. The remaining detectors take a
//! parsed [`SyntaxTree`](crate::core::SyntaxTree) and fall back to text
//! heuristics only where the tree carries no signal.

pub mod code_type;
pub mod dialect;
pub mod execution;
pub mod frameworks;
pub mod language;
pub mod library;
pub mod paradigm;
pub mod signals;

pub use code_type::{classify_code_type, CodeType, CodeTypeResult, CodeTypeScore};
pub use execution::{ExecutionContext, ExecutionIntent};
pub use frameworks::{FrameworkInfo, FrameworkType};
pub use language::{detect_language, DetectionMethod, LanguageDetectionResult, LanguageDetector};
pub use library::{analyze_libraries, LibraryAnalysisResult, LibraryCategory, LibraryInfo};
pub use paradigm::{analyze_paradigm, Paradigm, ParadigmAnalysisResult};
pub use signals::{SignalHit, SignalKind};
