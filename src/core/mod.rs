pub mod cst;
pub mod parsing;

use serde::{Deserialize, Serialize};

pub use cst::{CstNode, NodeId, Position, Span, SyntaxTree, TreeBuilder, MAX_TREE_DEPTH};
pub use parsing::{ParserProvider, TreeSitterProvider};

/// Languages the detectors know about.
///
/// Only a subset has a bundled grammar (see [`parsing::TreeSitterProvider`]);
/// the rest can still be identified from raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Go,
    Java,
    Rust,
    C,
    Cpp,
    CSharp,
    Php,
    Ruby,
    Kotlin,
    Swift,
    Unknown,
}

impl Language {
    /// Every concrete language, in detector tie-break order.
    pub const ALL: [Language; 13] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Go,
        Language::Java,
        Language::Rust,
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Php,
        Language::Ruby,
        Language::Kotlin,
        Language::Swift,
    ];

    /// Stable lowercase identifier, used for config values and registry keys.
    pub fn id(&self) -> &'static str {
        static ID_STRINGS: &[(Language, &str)] = &[
            (Language::JavaScript, "javascript"),
            (Language::TypeScript, "typescript"),
            (Language::Python, "python"),
            (Language::Go, "go"),
            (Language::Java, "java"),
            (Language::Rust, "rust"),
            (Language::C, "c"),
            (Language::Cpp, "cpp"),
            (Language::CSharp, "csharp"),
            (Language::Php, "php"),
            (Language::Ruby, "ruby"),
            (Language::Kotlin, "kotlin"),
            (Language::Swift, "swift"),
            (Language::Unknown, "unknown"),
        ];

        ID_STRINGS
            .iter()
            .find(|(l, _)| l == self)
            .map(|(_, s)| *s)
            .unwrap_or("unknown")
    }

    pub fn from_id(id: &str) -> Self {
        let id = id.trim().to_ascii_lowercase();
        let alias = match id.as_str() {
            "js" | "node" => "javascript",
            "ts" => "typescript",
            "py" => "python",
            "golang" => "go",
            "rs" => "rust",
            "c++" => "cpp",
            "c#" | "cs" => "csharp",
            "rb" => "ruby",
            "kt" => "kotlin",
            other => other,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.id() == alias)
            .unwrap_or(Language::Unknown)
    }

    /// Whether `Language::Unknown`.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Language::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(Language, &str)] = &[
            (Language::JavaScript, "JavaScript"),
            (Language::TypeScript, "TypeScript"),
            (Language::Python, "Python"),
            (Language::Go, "Go"),
            (Language::Java, "Java"),
            (Language::Rust, "Rust"),
            (Language::C, "C"),
            (Language::Cpp, "C++"),
            (Language::CSharp, "C#"),
            (Language::Php, "PHP"),
            (Language::Ruby, "Ruby"),
            (Language::Kotlin, "Kotlin"),
            (Language::Swift, "Swift"),
            (Language::Unknown, "Unknown"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(l, _)| l == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// Clamp a score into the `[0, 1]` confidence range, mapping NaN to zero.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Round to two decimals for stable, readable output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Truncate to two decimals, never rounding up past a cap the value obeys.
pub fn floor2(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}
