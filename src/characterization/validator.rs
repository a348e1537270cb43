//! Compare the characterization of a snippet with that of its translation.
//!
//! Structural fields are checked against per-field tolerances and decide
//! validity. Paradigm, time complexity and determinism are compared too, but
//! a mismatch there only produces a warning.

use serde::{Deserialize, Serialize};

use super::CodeCharacterization;

pub const DECISION_POINT_TOLERANCE: f64 = 1.0;
pub const CYCLOMATIC_TOLERANCE: f64 = 2.0;
/// Allowed line-count change relative to the source
pub const LINE_COUNT_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tolerance {
    Exact,
    Absolute,
    Relative,
    Advisory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCheck {
    pub field: String,
    pub source: String,
    pub target: String,
    /// `target - source` for numeric fields, 0 otherwise
    pub delta: f64,
    pub tolerance: Tolerance,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationValidation {
    pub is_valid: bool,
    pub checks: Vec<ValidationCheck>,
    pub warnings: Vec<String>,
}

impl TranslationValidation {
    pub fn check(&self, field: &str) -> Option<&ValidationCheck> {
        self.checks.iter().find(|check| check.field == field)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationCheck> {
        self.checks
            .iter()
            .filter(|check| !check.passed && check.tolerance != Tolerance::Advisory)
    }
}

fn numeric(field: &str, source: usize, target: usize, tolerance: Tolerance, allowed: f64) -> ValidationCheck {
    let delta = target as f64 - source as f64;
    let passed = match tolerance {
        Tolerance::Exact => delta == 0.0,
        Tolerance::Absolute => delta.abs() <= allowed,
        Tolerance::Relative => delta.abs() / (source.max(1) as f64) <= allowed,
        Tolerance::Advisory => true,
    };
    ValidationCheck {
        field: field.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        delta,
        tolerance,
        passed,
    }
}

fn advisory(field: &str, source: String, target: String) -> ValidationCheck {
    ValidationCheck {
        field: field.to_string(),
        passed: source == target,
        source,
        target,
        delta: 0.0,
        tolerance: Tolerance::Advisory,
    }
}

pub fn validate_translation(
    source: &CodeCharacterization,
    target: &CodeCharacterization,
) -> TranslationValidation {
    let (s, t) = (&source.structure, &target.structure);
    let checks = vec![
        numeric("functionCount", s.function_count, t.function_count, Tolerance::Exact, 0.0),
        numeric("classCount", s.class_count, t.class_count, Tolerance::Exact, 0.0),
        numeric(
            "decisionPoints",
            s.decision_points,
            t.decision_points,
            Tolerance::Absolute,
            DECISION_POINT_TOLERANCE,
        ),
        numeric(
            "cyclomaticComplexity",
            s.cyclomatic_complexity,
            t.cyclomatic_complexity,
            Tolerance::Absolute,
            CYCLOMATIC_TOLERANCE,
        ),
        numeric("lines", s.lines, t.lines, Tolerance::Relative, LINE_COUNT_TOLERANCE),
        advisory(
            "paradigm",
            source.paradigm.primary.to_string(),
            target.paradigm.primary.to_string(),
        ),
        advisory(
            "timeComplexity",
            source.complexity.time_complexity.clone(),
            target.complexity.time_complexity.clone(),
        ),
        advisory(
            "isDeterministic",
            source.behavior.is_deterministic.to_string(),
            target.behavior.is_deterministic.to_string(),
        ),
    ];

    let warnings = checks
        .iter()
        .filter(|check| !check.passed)
        .map(|check| match check.tolerance {
            Tolerance::Advisory => format!(
                "{} differs: {} vs {} (advisory)",
                check.field, check.source, check.target
            ),
            _ => format!(
                "{} out of tolerance: {} vs {}",
                check.field, check.source, check.target
            ),
        })
        .collect();

    TranslationValidation {
        is_valid: checks
            .iter()
            .all(|check| check.passed || check.tolerance == Tolerance::Advisory),
        checks,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characterization::structure::StructureMetrics;

    fn with_structure(structure: StructureMetrics) -> CodeCharacterization {
        CodeCharacterization {
            structure,
            ..CodeCharacterization::default()
        }
    }

    fn base() -> StructureMetrics {
        StructureMetrics {
            lines: 20,
            function_count: 2,
            class_count: 1,
            decision_points: 4,
            cyclomatic_complexity: 6,
            ..StructureMetrics::default()
        }
    }

    #[test]
    fn test_identical_records_are_valid() {
        let record = with_structure(base());
        let result = validate_translation(&record, &record);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_tolerances() {
        let source = with_structure(base());
        let target = with_structure(StructureMetrics {
            lines: 31,
            decision_points: 6,
            cyclomatic_complexity: 8,
            ..base()
        });
        let result = validate_translation(&source, &target);
        assert!(!result.is_valid);
        assert!(!result.check("decisionPoints").unwrap().passed);
        assert!(result.check("cyclomaticComplexity").unwrap().passed);
        assert!(!result.check("lines").unwrap().passed);
        let failed: Vec<&str> = result.failures().map(|c| c.field.as_str()).collect();
        assert_eq!(failed, vec!["decisionPoints", "lines"]);
    }

    #[test]
    fn test_function_count_must_match_exactly() {
        let source = with_structure(base());
        let target = with_structure(StructureMetrics {
            function_count: 3,
            ..base()
        });
        let result = validate_translation(&source, &target);
        assert!(!result.is_valid);
        assert_eq!(result.check("functionCount").unwrap().delta, 1.0);
    }

    #[test]
    fn test_advisory_mismatch_only_warns() {
        let source = with_structure(base());
        let mut target = with_structure(base());
        target.behavior.is_deterministic = false;
        let result = validate_translation(&source, &target);
        assert!(result.is_valid);
        assert_eq!(
            result.warnings,
            vec!["isDeterministic differs: true vs false (advisory)".to_string()]
        );
    }
}
