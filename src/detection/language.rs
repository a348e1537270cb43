//! Raw-text language identification.
//!
//! Runs before parsing (its winner selects the grammar), so it never sees a
//! CST. Pass one looks for near-unambiguous "smoking gun" markers; pass two
//! scores weighted indicator patterns for every candidate language.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dialect::detect_dialect;
use crate::core::{clamp_unit, round2, Language};

/// Winner scores below this fall back to the default language.
pub const MIN_WINNING_SCORE: f64 = 0.5;
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Snippets shorter than this get each pattern's context multiplier.
const SHORT_SNIPPET_LINES: usize = 5;
const EXTRA_OCCURRENCE_BONUS: f64 = 0.25;
const MAX_EXTRA_OCCURRENCES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    SmokingGun,
    WeightedScoring,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDetectionResult {
    pub language: Language,
    pub dialect: Option<String>,
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub detection_method: DetectionMethod,
}

impl LanguageDetectionResult {
    fn fallback(language: Language) -> Self {
        Self {
            language,
            dialect: None,
            confidence: FALLBACK_CONFIDENCE,
            indicators: Vec::new(),
            detection_method: DetectionMethod::Fallback,
        }
    }

    /// Report for text that never got a syntax tree. The language is
    /// `unknown` at zero confidence; the raw-text guess survives only as the
    /// leading indicator.
    pub fn without_tree(self) -> Self {
        let mut indicators = Vec::with_capacity(self.indicators.len() + 1);
        if !self.language.is_unknown() {
            indicators.push(format!(
                "text-guess:{} ({:.2})",
                self.language.id(),
                self.confidence
            ));
        }
        indicators.extend(self.indicators);
        Self {
            language: Language::Unknown,
            dialect: None,
            confidence: 0.0,
            indicators,
            detection_method: DetectionMethod::Fallback,
        }
    }
}

struct SmokingGun {
    language: Language,
    confidence: f64,
    indicator: &'static str,
    pattern: Regex,
}

static SMOKING_GUN_SPECS: &[(Language, f64, &str, &str)] = &[
    (Language::Php, 0.98, "php open tag", r"<\?php"),
    (Language::Python, 0.97, "python shebang", r"\A#!.*\bpython[0-9.]*\b"),
    (Language::JavaScript, 0.97, "node shebang", r"\A#!.*\bnode\b"),
    (Language::Ruby, 0.97, "ruby shebang", r"\A#!.*\bruby\b"),
    (Language::Php, 0.97, "php shebang", r"\A#!.*\bphp\b"),
    (Language::Go, 0.95, "package main", r"(?m)^package\s+main\s*$"),
    (
        Language::Java,
        0.95,
        "java main method",
        r"public\s+static\s+void\s+main\s*\(\s*String",
    ),
    (
        Language::Python,
        0.95,
        "__main__ guard",
        r#"if\s+__name__\s*==\s*['"]__main__['"]"#,
    ),
    (Language::CSharp, 0.93, "using System", r"(?m)^\s*using\s+System\s*;"),
    (Language::Rust, 0.93, "fn main", r"\bfn\s+main\s*\(\s*\)"),
    (Language::Rust, 0.92, "println! macro", r"\bprintln!\s*\("),
    (Language::Cpp, 0.95, "iostream include", r"#include\s*<iostream>"),
    (Language::Cpp, 0.92, "std::cout", r"\bstd::cout\b"),
    (Language::Cpp, 0.93, "using namespace std", r"\busing\s+namespace\s+std\s*;"),
    (
        Language::C,
        0.9,
        "C standard header",
        r"#include\s*<(stdio|stdlib|string|math|stdbool|stdint|ctype)\.h>",
    ),
    (
        Language::Swift,
        0.9,
        "swift framework import",
        r"(?m)^\s*import\s+(SwiftUI|UIKit|Foundation)\s*$",
    ),
    (Language::Kotlin, 0.9, "fun main", r"\bfun\s+main\s*\("),
    (Language::Ruby, 0.88, "attr_accessor", r"\battr_accessor\s+:"),
];

static SMOKING_GUNS: Lazy<Vec<SmokingGun>> = Lazy::new(|| {
    SMOKING_GUN_SPECS
        .iter()
        .filter_map(|(language, confidence, indicator, pattern)| {
            Regex::new(pattern).ok().map(|pattern| SmokingGun {
                language: *language,
                confidence: *confidence,
                indicator,
                pattern,
            })
        })
        .collect()
});

/// `(indicator, pattern, weight, short-snippet multiplier)`
type PatternSpec = (&'static str, &'static str, f64, Option<f64>);

struct WeightedPattern {
    indicator: &'static str,
    pattern: Regex,
    weight: f64,
    context_multiplier: Option<f64>,
}

struct LanguageProfile {
    language: Language,
    positive: Vec<WeightedPattern>,
    negative: Vec<WeightedPattern>,
}

fn compile(specs: &[PatternSpec]) -> Vec<WeightedPattern> {
    specs
        .iter()
        .filter_map(|(indicator, pattern, weight, context_multiplier)| {
            Regex::new(pattern).ok().map(|pattern| WeightedPattern {
                indicator,
                pattern,
                weight: *weight,
                context_multiplier: *context_multiplier,
            })
        })
        .collect()
}

const JAVASCRIPT_PATTERNS: &[PatternSpec] = &[
    ("variable declaration", r"\b(const|let|var)\s+\w+\s*=", 1.0, None),
    ("arrow function", r"=>", 1.0, None),
    ("function keyword", r"\bfunction\s*\*?\s*\w*\s*\(", 1.5, Some(1.5)),
    ("console api", r"\bconsole\.(log|error|warn|info)\s*\(", 2.0, Some(1.5)),
    ("require call", r#"\brequire\s*\(\s*['"]"#, 2.0, None),
    ("commonjs export", r"\bmodule\.exports\b|\bexports\.\w+\s*=", 2.0, None),
    ("es import", r#"(?m)^\s*import\s+.*\bfrom\s+['"]"#, 1.5, None),
    ("browser globals", r"\bdocument\.\w+|\bwindow\.\w+", 1.5, None),
    ("strict equality", r"===|!==", 1.0, None),
    ("promise chain", r"\.then\s*\(|\basync\s+function\b", 0.5, None),
    ("undefined", r"\bundefined\b", 0.5, None),
];

const JAVASCRIPT_NEGATIVE: &[PatternSpec] = &[
    ("type annotation", r"[\w)]\s*:\s*(string|number|boolean|any|void)\b", 1.5, None),
    ("interface", r"\binterface\s+\w+\s*\{", 1.5, None),
    ("python def", r"(?m)^\s*def\s+\w+\s*\(.*\)\s*:", 2.0, None),
    ("rust fn", r"\bfn\s+\w+", 1.0, None),
];

const TYPESCRIPT_PATTERNS: &[PatternSpec] = &[
    (
        "type annotation",
        r"[\w)]\s*:\s*(string|number|boolean|any|void|unknown|never)\b",
        2.0,
        Some(1.5),
    ),
    ("interface", r"\binterface\s+\w+\s*(<[^>]*>)?\s*\{", 2.0, None),
    ("type alias", r"\btype\s+\w+\s*(<[^>]*>)?\s*=", 1.5, None),
    ("access modifier", r"\b(public|private|protected|readonly)\s+\w+\s*[:(]", 1.5, None),
    ("type assertion", r"\bas\s+(string|number|const|any|unknown)\b", 1.5, None),
    ("typed declaration", r"\b(const|let)\s+\w+\s*:\s*\w+", 1.5, None),
    ("es import", r#"(?m)^\s*import\s+.*\bfrom\s+['"]"#, 1.0, None),
    ("enum", r"\benum\s+\w+\s*\{", 1.0, None),
    ("arrow function", r"=>", 0.5, None),
];

const TYPESCRIPT_NEGATIVE: &[PatternSpec] = &[
    ("python def", r"(?m)^\s*def\s+\w+\s*\(", 2.0, None),
    ("go func", r"\bfunc\s+\w+\s*\(", 1.0, None),
];

const PYTHON_PATTERNS: &[PatternSpec] = &[
    (
        "def",
        r"(?m)^\s*(async\s+)?def\s+\w+\s*\(.*\)\s*(->\s*[^:]+)?:",
        2.0,
        Some(1.5),
    ),
    ("from import", r"(?m)^\s*from\s+[\w.]+\s+import\s+", 2.0, None),
    ("import", r"(?m)^\s*import\s+[\w.]+(\s+as\s+\w+)?\s*$", 1.0, None),
    ("print call", r"\bprint\s*\(", 1.0, Some(1.5)),
    ("self reference", r"\bself\.", 1.5, None),
    ("python keywords", r"(?m)^\s*(elif|except|finally)\b", 1.5, None),
    ("python constants", r"\b(None|True|False)\b", 1.0, None),
    ("block colon", r"(?m)^\s*(if|for|while|with|class|try|else)\b[^;{]*:\s*$", 1.0, None),
    ("lambda", r"\blambda\s+[\w, ]*:", 1.0, None),
    ("f-string", r#"\bf["'][^"']*\{"#, 1.0, None),
    ("dunder", r"__init__|__name__|__main__", 1.5, None),
];

const PYTHON_NEGATIVE: &[PatternSpec] = &[
    ("semicolon lines", r"(?m);\s*$", 0.5, None),
    ("js declaration", r"\b(const|let|var)\s+\w+\s*=", 1.0, None),
    ("braces", r"(?m)\{\s*$", 1.0, None),
];

const GO_PATTERNS: &[PatternSpec] = &[
    ("package clause", r"(?m)^package\s+\w+", 2.0, None),
    (
        "func",
        r"\bfunc\s+(\(\w+\s+\*?\w+\)\s*)?\w+\s*\(",
        2.0,
        Some(1.5),
    ),
    ("short declaration", r"\w\s*:=", 1.5, Some(1.5)),
    ("fmt call", r"\bfmt\.\w+\s*\(", 2.0, None),
    ("error check", r"\berr\s*!=\s*nil\b", 2.0, None),
    ("channels", r"\bgo\s+func\b|\bchan\b|<-", 1.0, None),
    ("defer", r"\bdefer\s", 1.5, None),
    ("import block", r"(?m)^import\s*\(", 1.5, None),
    ("struct type", r"\btype\s+\w+\s+struct\s*\{", 1.5, None),
];

const GO_NEGATIVE: &[PatternSpec] = &[
    ("python def", r"\bdef\s", 1.0, None),
    ("swift arrow", r"\bfunc\s+\w+\s*\(.*\)\s*->", 2.0, None),
];

const JAVA_PATTERNS: &[PatternSpec] = &[
    ("public class", r"\bpublic\s+(abstract\s+|final\s+)*class\s+\w+", 2.0, None),
    (
        "method signature",
        r"\b(public|private|protected)\s+(static\s+)?(final\s+)?[\w<>\[\], ]+\s+\w+\s*\(",
        1.5,
        None,
    ),
    ("System.out", r"\bSystem\.out\.print", 2.0, Some(1.5)),
    ("java import", r"(?m)^import\s+(static\s+)?java\w*\.", 2.0, None),
    ("annotations", r"@(Override|Test|Autowired|Entity|Inject)\b", 1.5, None),
    ("typed declaration", r"\b(String|int|long|double|boolean)(\[\])?\s+\w+\s*[=;]", 1.0, None),
    ("extends clause", r"\b(extends|implements)\s+\w+", 0.5, None),
    ("object creation", r"\bnew\s+[A-Z]\w*(<[^>]*>)?\s*\(", 0.5, None),
];

const JAVA_NEGATIVE: &[PatternSpec] = &[
    ("C# console", r"\bConsole\.Write", 2.0, None),
    ("namespace", r"\bnamespace\s", 1.5, None),
    ("using directive", r"\busing\s+System", 2.0, None),
    ("kotlin fun", r"\bfun\s+\w+", 1.0, None),
    ("kotlin val", r"\bval\s+\w+\s*=", 1.0, None),
];

const RUST_PATTERNS: &[PatternSpec] = &[
    ("fn item", r"\bfn\s+\w+\s*(<[^>]*>)?\s*\(", 2.0, Some(1.5)),
    ("let mut", r"\blet\s+mut\s", 2.0, None),
    ("impl block", r"\bimpl\b", 1.5, None),
    ("type items", r"\b(pub\s+)?(struct|enum|trait)\s+\w+", 1.0, None),
    ("borrows", r"&mut\s|&self\b", 1.5, None),
    ("macro call", r"\b\w+!\s*[\(\[]", 1.0, None),
    ("match", r"\bmatch\s+[\w.&]+\s*\{", 1.0, None),
    (
        "return type",
        r"->\s*(Result|Option|Self|Vec|String|bool|i32|i64|u8|u32|u64|usize)\b",
        1.5,
        None,
    ),
    ("use path", r"(?m)^\s*use\s+(std|crate|super|self)::", 2.0, None),
];

const RUST_NEGATIVE: &[PatternSpec] = &[("include", r"#include", 2.0, None)];

const C_PATTERNS: &[PatternSpec] = &[
    ("header include", r#"#include\s*[<"][\w/]+\.h[>"]"#, 2.0, Some(1.5)),
    (
        "c function",
        r"\b(int|void|char|float|double|long|unsigned)\s+\*?\w+\s*\(",
        1.5,
        None,
    ),
    ("printf", r"\bprintf\s*\(", 1.5, None),
    ("manual memory", r"\bmalloc\s*\(|\bfree\s*\(", 1.5, None),
    ("struct", r"\bstruct\s+\w+\s*\{", 1.0, None),
    ("arrow access", r"\w->\w", 0.5, None),
    ("NULL", r"\bNULL\b", 1.0, None),
];

const C_NEGATIVE: &[PatternSpec] = &[
    ("std namespace", r"\bstd::", 2.0, None),
    ("class", r"\bclass\s+\w+", 1.5, None),
    ("iostream", r"\bcout\b", 2.0, None),
    ("template", r"\btemplate\s*<", 2.0, None),
    ("namespace", r"\bnamespace\b", 1.5, None),
];

const CPP_PATTERNS: &[PatternSpec] = &[
    ("std namespace", r"\bstd::\w+", 2.0, Some(1.5)),
    (
        "stl include",
        r"#include\s*<(vector|string|map|memory|algorithm|iostream|unordered_map|set)>",
        2.0,
        None,
    ),
    (
        "class",
        r"\bclass\s+\w+\s*(:\s*(public|private|protected)\s+\w+)?\s*\{",
        1.5,
        None,
    ),
    ("template", r"\btemplate\s*<", 2.0, None),
    ("stream operators", r"\bcout\s*<<|\bcin\s*>>", 2.0, None),
    ("modern keywords", r"\bnullptr\b|\bauto\s+\w+\s*=", 1.5, None),
    ("namespace", r"\bnamespace\s+\w+", 1.0, None),
];

const CPP_NEGATIVE: &[PatternSpec] = &[
    ("python def", r"\bdef\s", 1.0, None),
    ("go func", r"\bfunc\s", 1.0, None),
];

const CSHARP_PATTERNS: &[PatternSpec] = &[
    ("using directive", r"\busing\s+System(\.\w+)*\s*;", 2.0, None),
    ("namespace", r"\bnamespace\s+[\w.]+", 1.5, None),
    ("Console", r"\bConsole\.(Write|WriteLine|ReadLine)\s*\(", 2.0, Some(1.5)),
    (
        "method signature",
        r"\b(public|private|internal)\s+(static\s+)?(async\s+)?(void|string|int|bool|Task)\s+\w+\s*\(",
        1.5,
        None,
    ),
    ("auto property", r"\{\s*get;\s*(set;)?\s*\}", 2.0, None),
    ("var new", r"\bvar\s+\w+\s*=\s*new\b", 1.0, None),
];

const CSHARP_NEGATIVE: &[PatternSpec] = &[
    ("System.out", r"\bSystem\.out", 2.0, None),
    ("java import", r"(?m)^import\s+java", 2.0, None),
];

const PHP_PATTERNS: &[PatternSpec] = &[
    ("variable sigil", r"\$\w+\s*=", 2.0, Some(1.5)),
    ("echo", r"\becho\s", 1.5, None),
    ("php function", r"\bfunction\s+\w+\s*\(\s*\$", 2.0, None),
    ("this arrow", r"\$this->", 2.0, None),
    ("array()", r"\barray\s*\(", 1.0, None),
];

const RUBY_PATTERNS: &[PatternSpec] = &[
    ("def without colon", r"(?m)^\s*def\s+[\w.]+[?!]?(\(.*\))?\s*$", 2.0, None),
    ("end keyword", r"(?m)^\s*end\s*$", 2.0, Some(1.5)),
    ("puts", r"\bputs\s", 2.0, None),
    ("require", r#"(?m)^\s*require\s+['"]"#, 1.5, None),
    ("block", r"\.each\s+do\s*\||\bdo\s*\|\w+\|", 2.0, None),
    ("instance variable", r"@\w+", 0.5, None),
    ("attr macros", r"\battr_(reader|writer|accessor)\b", 2.0, None),
    ("ruby keywords", r"\bunless\b|\belsif\b", 1.5, None),
];

const RUBY_NEGATIVE: &[PatternSpec] = &[("python block colon", r"(?m)\)\s*:\s*$", 1.0, None)];

const KOTLIN_PATTERNS: &[PatternSpec] = &[
    ("fun", r"\bfun\s+\w+\s*\(", 2.0, Some(1.5)),
    ("val", r"\bval\s+\w+(\s*:\s*\w+)?\s*=", 1.5, None),
    ("typed var", r"\bvar\s+\w+\s*:\s*\w+", 1.0, None),
    ("println", r"\bprintln\s*\(", 1.0, None),
    ("data class", r"\bdata\s+class\b", 2.0, None),
    ("when", r"\bwhen\s*(\(.*\))?\s*\{", 1.5, None),
    ("null safety", r"\?\.|\?:|!!", 1.0, None),
];

const KOTLIN_NEGATIVE: &[PatternSpec] = &[
    ("js function", r"\bfunction\b", 1.0, None),
    ("rust fn", r"\bfn\s", 1.0, None),
];

const SWIFT_PATTERNS: &[PatternSpec] = &[
    ("func with arrow", r"\bfunc\s+\w+\s*(<[^>]*>)?\(.*\)\s*->", 2.0, None),
    ("let binding", r"\blet\s+\w+\s*(:\s*\w+)?\s*=", 0.5, None),
    ("typed var", r"\bvar\s+\w+\s*:\s*[A-Z]\w*", 1.0, None),
    ("optional binding", r"\bguard\s+let\b|\bif\s+let\s+\w+\s*=", 2.0, None),
    ("property wrappers", r"@(State|Published|IBOutlet|IBAction|Binding)\b", 2.0, None),
    ("protocol conformance", r"\b(struct|class)\s+\w+\s*:\s*\w+", 1.0, None),
    ("print", r"\bprint\s*\(", 0.5, None),
];

const SWIFT_NEGATIVE: &[PatternSpec] = &[
    ("go short declaration", r":=", 2.0, None),
    ("package clause", r"(?m)^package\s", 2.0, None),
];

/// Candidate order doubles as the tie-break order.
static PROFILES: Lazy<Vec<LanguageProfile>> = Lazy::new(|| {
    let table: [(Language, &[PatternSpec], &[PatternSpec]); 13] = [
        (Language::JavaScript, JAVASCRIPT_PATTERNS, JAVASCRIPT_NEGATIVE),
        (Language::TypeScript, TYPESCRIPT_PATTERNS, TYPESCRIPT_NEGATIVE),
        (Language::Python, PYTHON_PATTERNS, PYTHON_NEGATIVE),
        (Language::Go, GO_PATTERNS, GO_NEGATIVE),
        (Language::Java, JAVA_PATTERNS, JAVA_NEGATIVE),
        (Language::Rust, RUST_PATTERNS, RUST_NEGATIVE),
        (Language::C, C_PATTERNS, C_NEGATIVE),
        (Language::Cpp, CPP_PATTERNS, CPP_NEGATIVE),
        (Language::CSharp, CSHARP_PATTERNS, CSHARP_NEGATIVE),
        (Language::Php, PHP_PATTERNS, &[]),
        (Language::Ruby, RUBY_PATTERNS, RUBY_NEGATIVE),
        (Language::Kotlin, KOTLIN_PATTERNS, KOTLIN_NEGATIVE),
        (Language::Swift, SWIFT_PATTERNS, SWIFT_NEGATIVE),
    ];
    table
        .iter()
        .map(|(language, positive, negative)| LanguageProfile {
            language: *language,
            positive: compile(positive),
            negative: compile(negative),
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    language: Language,
    score: f64,
    indicators: Vec<String>,
}

/// Language detector with a configurable fallback language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    default_language: Language,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(Language::JavaScript)
    }
}

impl LanguageDetector {
    pub fn new(default_language: Language) -> Self {
        Self { default_language }
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn detect(&self, source: &str) -> LanguageDetectionResult {
        let mut result = match smoking_gun(source) {
            Some(result) => result,
            None => self.weighted(source),
        };
        if result.detection_method != DetectionMethod::Fallback {
            result.dialect = detect_dialect(result.language, source);
        }
        debug!(
            language = %result.language,
            confidence = result.confidence,
            method = ?result.detection_method,
            "language detected"
        );
        result
    }

    fn weighted(&self, source: &str) -> LanguageDetectionResult {
        let lines = source.lines().count();
        let best = PROFILES
            .iter()
            .map(|profile| score_profile(profile, source, lines))
            .fold(None::<Candidate>, |best, candidate| match best {
                Some(b) if b.score >= candidate.score => Some(b),
                _ => Some(candidate),
            });

        match best {
            Some(candidate) if candidate.score >= MIN_WINNING_SCORE => LanguageDetectionResult {
                language: candidate.language,
                dialect: None,
                confidence: band_confidence(candidate.score, lines, candidate.indicators.len()),
                indicators: candidate.indicators,
                detection_method: DetectionMethod::WeightedScoring,
            },
            _ => LanguageDetectionResult::fallback(self.default_language),
        }
    }
}

/// Detect with the JavaScript fallback.
pub fn detect_language(source: &str) -> LanguageDetectionResult {
    LanguageDetector::default().detect(source)
}

fn smoking_gun(source: &str) -> Option<LanguageDetectionResult> {
    SMOKING_GUNS
        .iter()
        .find(|gun| gun.pattern.is_match(source))
        .map(|gun| LanguageDetectionResult {
            language: gun.language,
            dialect: None,
            confidence: gun.confidence,
            indicators: vec![gun.indicator.to_string()],
            detection_method: DetectionMethod::SmokingGun,
        })
}

fn score_profile(profile: &LanguageProfile, source: &str, lines: usize) -> Candidate {
    let short = lines < SHORT_SNIPPET_LINES;
    let mut score = 0.0;
    let mut indicators = Vec::new();

    for pattern in &profile.positive {
        let count = pattern.pattern.find_iter(source).count();
        if count == 0 {
            continue;
        }
        let extra = (count - 1).min(MAX_EXTRA_OCCURRENCES) as f64;
        let mut hit = pattern.weight * (1.0 + EXTRA_OCCURRENCE_BONUS * extra);
        if short {
            hit *= pattern.context_multiplier.unwrap_or(1.0);
        }
        score += hit;
        indicators.push(pattern.indicator.to_string());
    }
    for pattern in &profile.negative {
        if pattern.pattern.is_match(source) {
            score -= pattern.weight;
        }
    }

    Candidate {
        language: profile.language,
        score,
        indicators,
    }
}

fn band_confidence(score: f64, lines: usize, distinct_indicators: usize) -> f64 {
    let (raw, cap) = match lines {
        0..=3 => (score / 4.0, 0.85),
        4..=10 => (score / 8.0, 0.90),
        11..=50 => (score / 15.0, 0.95),
        _ => {
            let diversity = (0.02 * distinct_indicators.saturating_sub(3) as f64).min(0.1);
            (score / 25.0 + diversity, 0.95)
        }
    };
    round2(clamp_unit(raw.min(cap)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(SMOKING_GUNS.len(), SMOKING_GUN_SPECS.len());
        let compiled: usize = PROFILES.iter().map(|p| p.positive.len()).sum();
        let specs = JAVASCRIPT_PATTERNS.len()
            + TYPESCRIPT_PATTERNS.len()
            + PYTHON_PATTERNS.len()
            + GO_PATTERNS.len()
            + JAVA_PATTERNS.len()
            + RUST_PATTERNS.len()
            + C_PATTERNS.len()
            + CPP_PATTERNS.len()
            + CSHARP_PATTERNS.len()
            + PHP_PATTERNS.len()
            + RUBY_PATTERNS.len()
            + KOTLIN_PATTERNS.len()
            + SWIFT_PATTERNS.len();
        assert_eq!(compiled, specs);
    }

    #[test]
    fn test_go_package_main_is_smoking_gun() {
        let result = detect_language("package main\n\nfunc main() {}\n");
        assert_eq!(result.language, Language::Go);
        assert_eq!(result.detection_method, DetectionMethod::SmokingGun);
        assert!(result.confidence >= 0.9);
    }

    #[test]
    fn test_smoking_gun_order() {
        // The PHP open tag is checked before anything else.
        let result = detect_language("<?php\nfunction main() { echo 1; }\n");
        assert_eq!(result.language, Language::Php);
        assert_eq!(result.confidence, 0.98);
    }

    #[test]
    fn test_weighted_python() {
        let result = detect_language(indoc! {"
            def total(items):
                result = 0
                for item in items:
                    result += item.price
                return result
        "});
        assert_eq!(result.language, Language::Python);
        assert_eq!(result.detection_method, DetectionMethod::WeightedScoring);
        assert!(result.indicators.contains(&"def".to_string()));
        assert!(result.confidence > 0.0 && result.confidence <= 0.9);
    }

    #[test]
    fn test_weighted_typescript_beats_javascript() {
        let result = detect_language(indoc! {"
            interface User { name: string; age: number }
            const greet = (user: User): string => `hi ${user.name}`;
        "});
        assert_eq!(result.language, Language::TypeScript);
    }

    #[test]
    fn test_c_penalized_by_std_namespace() {
        let source = "int main() { std::vector<int> v; v.push_back(1); return 0; }";
        let result = detect_language(source);
        assert_eq!(result.language, Language::Cpp);
    }

    #[test]
    fn test_without_tree_drops_to_unknown() {
        let guess = detect_language("<?php\necho 'hi';\n");
        assert_eq!(guess.language, Language::Php);

        let reported = guess.without_tree();
        assert_eq!(reported.language, Language::Unknown);
        assert_eq!(reported.confidence, 0.0);
        assert_eq!(reported.dialect, None);
        assert_eq!(reported.indicators[0], "text-guess:php (0.98)");
    }

    #[test]
    fn test_fallback_below_threshold() {
        let result = detect_language("hello world");
        assert_eq!(result.language, Language::JavaScript);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(result.detection_method, DetectionMethod::Fallback);
        assert!(result.dialect.is_none());

        let python_default = LanguageDetector::new(Language::Python).detect("hello world");
        assert_eq!(python_default.language, Language::Python);
    }

    #[test]
    fn test_band_caps() {
        assert_eq!(band_confidence(100.0, 2, 1), 0.85);
        assert_eq!(band_confidence(100.0, 8, 1), 0.90);
        assert_eq!(band_confidence(100.0, 30, 1), 0.95);
        assert_eq!(band_confidence(2.0, 2, 1), 0.5);
        // 60 lines: 5/25 + 0.02 * (6 - 3)
        assert_eq!(band_confidence(5.0, 60, 6), 0.26);
    }

    #[test]
    fn test_dialect_attached_to_winner() {
        let result = detect_language("const x = require('fs');\nmodule.exports = x;\n");
        assert_eq!(result.language, Language::JavaScript);
        assert_eq!(result.dialect.as_deref(), Some("commonjs"));
    }
}
