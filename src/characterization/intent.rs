//! Keyword scoring over eight fixed intent categories.
//!
//! Identifiers are split on `snake_case` and `camelCase` boundaries and each
//! lowercase token is matched against per-category stems by prefix. A hit in
//! a function name counts twice as much as a hit anywhere in the source.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{clamp_unit, round2};

const NAME_WEIGHT: f64 = 2.0;
const BODY_WEIGHT: f64 = 1.0;
/// Total weight at which confidence stops being discounted.
const FULL_EVIDENCE: f64 = 6.0;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentCategory {
    DataTransformation,
    Validation,
    Parsing,
    Aggregation,
    Routing,
    Formatting,
    Calculation,
    Orchestration,
}

impl IntentCategory {
    pub const ALL: [IntentCategory; 8] = [
        IntentCategory::DataTransformation,
        IntentCategory::Validation,
        IntentCategory::Parsing,
        IntentCategory::Aggregation,
        IntentCategory::Routing,
        IntentCategory::Formatting,
        IntentCategory::Calculation,
        IntentCategory::Orchestration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IntentCategory::DataTransformation => "data-transformation",
            IntentCategory::Validation => "validation",
            IntentCategory::Parsing => "parsing",
            IntentCategory::Aggregation => "aggregation",
            IntentCategory::Routing => "routing",
            IntentCategory::Formatting => "formatting",
            IntentCategory::Calculation => "calculation",
            IntentCategory::Orchestration => "orchestration",
        }
    }

    fn stems(&self) -> &'static [&'static str] {
        match self {
            IntentCategory::DataTransformation => &[
                "map", "transform", "convert", "normaliz", "flatten", "reshape", "serializ",
                "deserializ", "encode", "decode",
            ],
            IntentCategory::Validation => {
                &["valid", "check", "verif", "ensure", "sanitiz", "guard", "assert"]
            }
            IntentCategory::Parsing => &["pars", "token", "lex", "scan", "extract", "grammar"],
            IntentCategory::Aggregation => &[
                "sum", "count", "total", "aggregat", "reduce", "group", "accumul", "average",
                "avg", "collect",
            ],
            IntentCategory::Routing => &[
                "rout", "handl", "dispatch", "endpoint", "controller", "middleware", "request",
            ],
            IntentCategory::Formatting => {
                &["format", "render", "print", "display", "stringif", "pad", "templat"]
            }
            IntentCategory::Calculation => &[
                "calc", "comput", "math", "factorial", "fib", "sqrt", "pow", "multipl", "divid",
                "area", "interest",
            ],
            IntentCategory::Orchestration => &[
                "run", "main", "start", "init", "execut", "pipeline", "schedul", "workflow",
                "orchestr", "bootstrap",
            ],
        }
    }
}

impl std::fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentScore {
    pub category: IntentCategory,
    pub score: f64,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentAnalysis {
    pub primary: Option<IntentCategory>,
    pub confidence: f64,
    /// Non-zero categories, highest first
    pub scores: Vec<IntentScore>,
}

/// Lowercase tokens of every identifier in `text`.
fn tokens(text: &str) -> Vec<String> {
    IDENTIFIER
        .find_iter(text)
        .flat_map(|m| split_identifier(m.as_str()))
        .collect()
}

fn split_identifier(ident: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for chunk in ident.split('_').filter(|c| !c.is_empty()) {
        let mut current = String::new();
        let mut prev_lower = false;
        for ch in chunk.chars() {
            if ch.is_uppercase() && prev_lower && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            current.extend(ch.to_lowercase());
        }
        if !current.is_empty() {
            parts.push(current);
        }
    }
    parts
}

pub fn classify_intent(function_names: &[String], source: &str) -> IntentAnalysis {
    let name_tokens: Vec<String> = function_names.iter().flat_map(|n| tokens(n)).collect();
    let body_tokens = tokens(source);

    let mut scores: Vec<IntentScore> = IntentCategory::ALL
        .iter()
        .filter_map(|category| {
            let mut score = 0.0;
            let mut keywords: Vec<String> = Vec::new();
            for (weight, pool) in [(NAME_WEIGHT, &name_tokens), (BODY_WEIGHT, &body_tokens)] {
                for token in pool.iter() {
                    if category.stems().iter().any(|stem| token.starts_with(stem)) {
                        score += weight;
                        if !keywords.contains(token) {
                            keywords.push(token.clone());
                        }
                    }
                }
            }
            (score > 0.0).then_some(IntentScore {
                category: *category,
                score,
                keywords,
            })
        })
        .collect();

    // Stable: ties keep category order.
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    let total: f64 = scores.iter().map(|s| s.score).sum();
    let Some(top) = scores.first() else {
        return IntentAnalysis::default();
    };
    let evidence = (total / FULL_EVIDENCE).min(1.0);
    IntentAnalysis {
        primary: Some(top.category),
        confidence: round2(clamp_unit(top.score / total * evidence)),
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_identifier() {
        assert_eq!(split_identifier("parseHTTPHeader"), vec!["parse", "httpheader"]);
        assert_eq!(split_identifier("validate_email"), vec!["validate", "email"]);
        assert_eq!(split_identifier("__init__"), vec!["init"]);
    }

    #[test]
    fn test_validation_from_function_names() {
        let source = "function validateEmail(email) { return email.includes('@'); }";
        let intent = classify_intent(&["validateEmail".to_string()], source);
        assert_eq!(intent.primary, Some(IntentCategory::Validation));
        // 2 for the name, 1 for the body occurrence
        assert_eq!(intent.scores[0].score, 3.0);
        assert_eq!(intent.confidence, 0.5);
    }

    #[test]
    fn test_calculation_beats_orchestration() {
        let source = "def calculate_area(r):\n    return compute_pi() * r * r\n\nrun(calculate_area(2))\n";
        let names = vec!["calculate_area".to_string()];
        let intent = classify_intent(&names, source);
        assert_eq!(intent.primary, Some(IntentCategory::Calculation));
        assert!(intent.confidence > 0.5);
        assert!(intent
            .scores
            .iter()
            .any(|s| s.category == IntentCategory::Orchestration));
    }

    #[test]
    fn test_no_keywords() {
        let intent = classify_intent(&[], "x = 1");
        assert_eq!(intent, IntentAnalysis::default());
    }
}
