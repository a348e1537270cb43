//! Review, refactor and execution readiness.
//!
//! Four factors in `[0, 1]` feed every score:
//!
//! * structural clarity: penalized by nesting, per-function cyclomatic
//!   complexity, syntax errors and long function-free code
//! * semantic completeness: mean detector confidence
//! * context sufficiency: penalized by local imports, third-party packages
//!   and environment variables the snippet cannot resolve on its own
//! * risk: side effects, I/O, nondeterminism, async, exponential time and
//!   syntax errors; scores use `1 - risk`
//!
//! Execution readiness also weighs the code-type runnability estimate.

use serde::{Deserialize, Serialize};

use super::behavior::BehaviorProfile;
use super::structure::StructureMetrics;
use crate::complexity::ComplexityAnalysisResult;
use crate::core::{clamp_unit, round2};
use crate::detection::{
    CodeTypeResult, DetectionMethod, LanguageDetectionResult, LibraryAnalysisResult,
    ParadigmAnalysisResult,
};

const NESTING_LIMIT: usize = 3;
const CYCLOMATIC_LIMIT: f64 = 10.0;
const LONG_UNSTRUCTURED_LINES: usize = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessFactors {
    pub structural_clarity: f64,
    pub semantic_completeness: f64,
    pub context_sufficiency: f64,
    pub risk: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessScores {
    pub review: f64,
    pub refactor: f64,
    pub execution: f64,
    pub factors: ReadinessFactors,
    pub blocking_issues: Vec<String>,
}

/// Borrowed detector outputs the scores are computed from.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessInputs<'a> {
    pub language: &'a LanguageDetectionResult,
    pub libraries: &'a LibraryAnalysisResult,
    pub paradigm: &'a ParadigmAnalysisResult,
    pub code_type: &'a CodeTypeResult,
    pub complexity: &'a ComplexityAnalysisResult,
    pub structure: &'a StructureMetrics,
    pub behavior: &'a BehaviorProfile,
}

pub fn score_readiness(inputs: &ReadinessInputs<'_>) -> ReadinessScores {
    let factors = ReadinessFactors {
        structural_clarity: round2(structural_clarity(inputs.structure)),
        semantic_completeness: round2(semantic_completeness(inputs)),
        context_sufficiency: round2(context_sufficiency(inputs)),
        risk: round2(risk(inputs)),
    };
    let safety = 1.0 - factors.risk;
    let runnability = inputs
        .code_type
        .execution_intent
        .as_ref()
        .map(|intent| intent.runnability)
        .unwrap_or(0.0);

    let review = 0.35 * factors.structural_clarity
        + 0.25 * factors.semantic_completeness
        + 0.2 * factors.context_sufficiency
        + 0.2 * safety;
    let refactor = 0.3 * factors.structural_clarity
        + 0.2 * factors.semantic_completeness
        + 0.2 * factors.context_sufficiency
        + 0.3 * safety;
    let execution = 0.15 * factors.structural_clarity
        + 0.15 * factors.semantic_completeness
        + 0.3 * factors.context_sufficiency
        + 0.2 * safety
        + 0.2 * runnability;

    ReadinessScores {
        review: round2(clamp_unit(review)),
        refactor: round2(clamp_unit(refactor)),
        execution: round2(clamp_unit(execution)),
        factors,
        blocking_issues: blocking_issues(inputs),
    }
}

fn structural_clarity(structure: &StructureMetrics) -> f64 {
    let mut clarity = 1.0;
    clarity -= 0.1 * structure.max_nesting.saturating_sub(NESTING_LIMIT) as f64;
    let per_function = structure.cyclomatic_per_function();
    if per_function > CYCLOMATIC_LIMIT {
        clarity -= (0.05 * (per_function - CYCLOMATIC_LIMIT)).min(0.3);
    }
    clarity -= (0.2 * structure.syntax_errors as f64).min(0.6);
    if structure.function_count == 0 && structure.non_empty_lines > LONG_UNSTRUCTURED_LINES {
        clarity -= 0.2;
    }
    clamp_unit(clarity)
}

fn semantic_completeness(inputs: &ReadinessInputs<'_>) -> f64 {
    let confidences = [
        inputs.language.confidence,
        inputs.paradigm.confidence,
        inputs.code_type.confidence,
        inputs.complexity.confidence,
    ];
    clamp_unit(confidences.iter().sum::<f64>() / confidences.len() as f64)
}

fn context_sufficiency(inputs: &ReadinessInputs<'_>) -> f64 {
    let local = inputs
        .libraries
        .libraries
        .iter()
        .filter(|lib| lib.is_local)
        .count();
    let third_party = inputs.libraries.third_party().count();
    let has_env = inputs
        .code_type
        .execution_context
        .as_ref()
        .is_some_and(|ctx| !ctx.environment_variables.is_empty());

    let mut sufficiency = 1.0;
    sufficiency -= (0.15 * local as f64).min(0.45);
    sufficiency -= (0.05 * third_party as f64).min(0.3);
    if has_env {
        sufficiency -= 0.2;
    }
    clamp_unit(sufficiency)
}

fn risk(inputs: &ReadinessInputs<'_>) -> f64 {
    let behavior = inputs.behavior;
    let mut risk = 0.0;
    if behavior.has_side_effects {
        risk += 0.2;
    }
    if behavior.has_io {
        risk += 0.15;
    }
    if !behavior.is_deterministic {
        risk += 0.15;
    }
    if behavior.is_async {
        risk += 0.1;
    }
    if inputs.complexity.is_exponential() {
        risk += 0.25;
    }
    if inputs.structure.syntax_errors > 0 {
        risk += 0.25;
    }
    clamp_unit(risk)
}

fn blocking_issues(inputs: &ReadinessInputs<'_>) -> Vec<String> {
    let mut issues = Vec::new();
    let errors = inputs.structure.syntax_errors;
    if errors > 0 {
        let plural = if errors == 1 { "" } else { "s" };
        issues.push(format!("{errors} syntax error{plural} in the snippet"));
    }
    if inputs.language.detection_method == DetectionMethod::Fallback {
        issues.push("language could not be identified".to_string());
    }
    for lib in inputs.libraries.libraries.iter().filter(|lib| lib.is_local) {
        issues.push(format!("depends on local module {}", lib.name));
    }
    if inputs.complexity.is_exponential() {
        issues.push(format!(
            "exponential time complexity ({})",
            inputs.complexity.time_complexity
        ));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;
    use crate::detection::library::{LibraryCategory, LibraryInfo};

    fn detected(language: Language, confidence: f64) -> LanguageDetectionResult {
        LanguageDetectionResult {
            language,
            dialect: None,
            confidence,
            indicators: Vec::new(),
            detection_method: DetectionMethod::WeightedScoring,
        }
    }

    #[test]
    fn test_clean_snippet_scores_high() {
        let language = detected(Language::Python, 0.9);
        let libraries = LibraryAnalysisResult::default();
        let paradigm = ParadigmAnalysisResult {
            confidence: 0.8,
            ..ParadigmAnalysisResult::default()
        };
        let code_type = CodeTypeResult {
            confidence: 0.7,
            ..CodeTypeResult::default()
        };
        let complexity = ComplexityAnalysisResult {
            confidence: 0.8,
            ..ComplexityAnalysisResult::default()
        };
        let structure = StructureMetrics {
            lines: 10,
            non_empty_lines: 8,
            function_count: 1,
            cyclomatic_complexity: 2,
            ..StructureMetrics::default()
        };
        let behavior = BehaviorProfile::default();

        let scores = score_readiness(&ReadinessInputs {
            language: &language,
            libraries: &libraries,
            paradigm: &paradigm,
            code_type: &code_type,
            complexity: &complexity,
            structure: &structure,
            behavior: &behavior,
        });
        assert_eq!(scores.factors.structural_clarity, 1.0);
        assert_eq!(scores.factors.semantic_completeness, 0.8);
        assert_eq!(scores.factors.risk, 0.0);
        assert_eq!(scores.review, 0.95);
        assert!(scores.blocking_issues.is_empty());
    }

    #[test]
    fn test_blocking_issues_and_penalties() {
        let language = LanguageDetectionResult {
            detection_method: DetectionMethod::Fallback,
            ..detected(Language::JavaScript, 0.1)
        };
        let libraries = LibraryAnalysisResult {
            libraries: vec![LibraryInfo {
                name: "./helpers".to_string(),
                package: "./helpers".to_string(),
                category: LibraryCategory::Unknown,
                is_local: true,
                line: 1,
            }],
            ..LibraryAnalysisResult::default()
        };
        let paradigm = ParadigmAnalysisResult::default();
        let code_type = CodeTypeResult::default();
        let complexity = ComplexityAnalysisResult::default();
        let structure = StructureMetrics {
            syntax_errors: 2,
            max_nesting: 5,
            ..StructureMetrics::default()
        };
        let behavior = BehaviorProfile {
            is_deterministic: false,
            ..BehaviorProfile::default()
        };

        let scores = score_readiness(&ReadinessInputs {
            language: &language,
            libraries: &libraries,
            paradigm: &paradigm,
            code_type: &code_type,
            complexity: &complexity,
            structure: &structure,
            behavior: &behavior,
        });
        assert_eq!(scores.factors.structural_clarity, 0.4);
        assert_eq!(scores.factors.context_sufficiency, 0.85);
        assert_eq!(scores.factors.risk, 0.4);
        assert_eq!(
            scores.blocking_issues,
            vec![
                "2 syntax errors in the snippet".to_string(),
                "language could not be identified".to_string(),
                "depends on local module ./helpers".to_string(),
            ]
        );
        assert!(scores.review < 0.6);
    }
}
