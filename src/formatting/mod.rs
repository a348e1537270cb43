//! Human-readable renderings of characterization records for the CLI.

use colored::*;
use std::env;
use std::fmt::Write as _;
use std::io::IsTerminal;

use crate::characterization::{CodeCharacterization, Tolerance, TranslationValidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    /// Honors `NO_COLOR` and `CLICOLOR_FORCE`; otherwise `Auto`.
    pub fn from_env() -> Self {
        if env::var_os("NO_COLOR").is_some() {
            return Self::Never;
        }
        match env::var("CLICOLOR_FORCE") {
            Ok(val) if val == "1" => Self::Always,
            _ => Self::Auto,
        }
    }

    pub fn should_use_color(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::stdout().is_terminal(),
        }
    }
}

/// Wraps `colored` so every renderer respects one [`ColorMode`].
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            color: mode.should_use_color(),
        }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn header(&self, text: &str) -> String {
        self.paint(text, |t| t.blue().bold())
    }

    pub fn label(&self, text: &str) -> String {
        self.paint(text, |t| t.bold())
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow())
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed())
    }

    /// Green at or above 0.7, yellow at or above 0.4, red below.
    pub fn score(&self, value: f64) -> String {
        let text = format!("{value:.2}");
        if value >= 0.7 {
            self.success(&text)
        } else if value >= 0.4 {
            self.warning(&text)
        } else {
            self.error(&text)
        }
    }
}

pub fn render_summary(record: &CodeCharacterization, painter: Painter) -> String {
    let mut out = String::new();
    let p = &painter;

    let _ = writeln!(out, "{}", p.header("Code characterization"));
    let dialect = record
        .language
        .dialect
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "  {:<12} {}{} {} {}",
        p.label("Language"),
        record.language.language,
        dialect,
        p.score(record.language.confidence),
        p.dim(&format!("[{:?}]", record.language.detection_method)),
    );

    let secondary = record
        .paradigm
        .secondary
        .map(|s| format!(", secondary {s}"))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "  {:<12} {}{} {}",
        p.label("Paradigm"),
        record.paradigm.primary,
        secondary,
        p.score(record.paradigm.confidence),
    );
    let _ = writeln!(
        out,
        "  {:<12} {} {}",
        p.label("Code type"),
        record.code_type.code_type,
        p.score(record.code_type.confidence),
    );

    let complexity = &record.complexity;
    let time = if complexity.is_exponential() {
        p.error(&complexity.time_complexity)
    } else {
        complexity.time_complexity.clone()
    };
    let _ = writeln!(
        out,
        "  {:<12} time {}, space {} {}",
        p.label("Complexity"),
        time,
        complexity.space_complexity,
        p.dim(&format!("[{:?}]", complexity.method)),
    );

    let s = &record.structure;
    let _ = writeln!(
        out,
        "  {:<12} {} lines, {} functions, {} classes, cyclomatic {}, nesting {}",
        p.label("Structure"),
        s.lines,
        s.function_count,
        s.class_count,
        s.cyclomatic_complexity,
        s.max_nesting,
    );

    if !record.libraries.libraries.is_empty() {
        let names: Vec<&str> = record
            .libraries
            .libraries
            .iter()
            .map(|lib| lib.name.as_str())
            .collect();
        let _ = writeln!(out, "  {:<12} {}", p.label("Libraries"), names.join(", "));
    }
    if !record.libraries.frameworks.is_empty() {
        let names: Vec<&str> = record
            .libraries
            .frameworks
            .iter()
            .map(|fw| fw.name.as_str())
            .collect();
        let _ = writeln!(out, "  {:<12} {}", p.label("Frameworks"), names.join(", "));
    }
    if let Some(intent) = record.intent.primary {
        let _ = writeln!(
            out,
            "  {:<12} {} {}",
            p.label("Intent"),
            intent.name(),
            p.score(record.intent.confidence),
        );
    }

    let r = &record.readiness;
    let _ = writeln!(
        out,
        "  {:<12} review {}, refactor {}, execution {}",
        p.label("Readiness"),
        p.score(r.review),
        p.score(r.refactor),
        p.score(r.execution),
    );
    for issue in &r.blocking_issues {
        let _ = writeln!(out, "    {} {}", p.error("!"), issue);
    }

    if !complexity.optimization_suggestions.is_empty() {
        let _ = writeln!(out, "{}", p.header("Suggestions"));
        for suggestion in &complexity.optimization_suggestions {
            let _ = writeln!(
                out,
                "  - {} {}",
                suggestion.message,
                p.dim(&format!("(line {})", suggestion.line)),
            );
        }
    }
    if !record.guidance.prompt_hints.is_empty() {
        let _ = writeln!(out, "{}", p.header("Hints"));
        for hint in &record.guidance.prompt_hints {
            let _ = writeln!(out, "  - {hint}");
        }
    }
    out
}

pub fn render_validation(validation: &TranslationValidation, painter: Painter) -> String {
    let mut out = String::new();
    let p = &painter;

    let verdict = if validation.is_valid {
        p.success("valid")
    } else {
        p.error("invalid")
    };
    let _ = writeln!(out, "{} {}", p.header("Translation"), verdict);

    for check in &validation.checks {
        let mark = match (check.passed, check.tolerance) {
            (true, _) => p.success("ok"),
            (false, Tolerance::Advisory) => p.warning("~~"),
            (false, _) => p.error("xx"),
        };
        let _ = writeln!(
            out,
            "  {} {:<22} {} -> {}",
            mark, check.field, check.source, check.target
        );
    }
    for warning in &validation.warnings {
        let _ = writeln!(out, "  {} {}", p.warning("warning:"), warning);
    }
    out
}
