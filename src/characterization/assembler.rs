//! Merges detector outputs into one [`CodeCharacterization`].
//!
//! This is the only place text is shortened. Conditions, outcomes and hints
//! are whitespace-collapsed and cut to fixed byte budgets on a char boundary
//! so prompt builders can embed them verbatim.

use tracing::debug;

use super::behavior::{analyze_behavior, BehaviorProfile};
use super::elements::{extract_elements, CodeElements};
use super::intent::classify_intent;
use super::readiness::{score_readiness, ReadinessInputs};
use super::structure::{compute_structure, StructureMetrics};
use super::{CodeCharacterization, Guidance, CHARACTERIZATION_VERSION};
use crate::adapters::LanguageAdapter;
use crate::complexity::{ComplexityAnalysisResult, SuggestionKind};
use crate::core::{Language, SyntaxTree};
use crate::detection::{
    CodeType, CodeTypeResult, DetectionMethod, LanguageDetectionResult, LibraryAnalysisResult,
    Paradigm, ParadigmAnalysisResult,
};

pub const CONDITION_BUDGET: usize = 120;
pub const OUTCOME_BUDGET: usize = 80;
pub const HINT_BUDGET: usize = 160;
pub const MAX_PROMPT_HINTS: usize = 8;
const ELLIPSIS: &str = "...";
const HIGH_CYCLOMATIC: f64 = 10.0;
const DEEP_NESTING: usize = 3;

/// Per-dimension detector results for one snippet.
#[derive(Debug, Clone)]
pub struct DetectorOutputs {
    pub language: LanguageDetectionResult,
    pub libraries: LibraryAnalysisResult,
    pub paradigm: ParadigmAnalysisResult,
    pub code_type: CodeTypeResult,
    pub complexity: ComplexityAnalysisResult,
}

/// Collapse whitespace runs and cut to at most `budget` bytes, ending in
/// `...` when shortened.
pub fn truncate_to_budget(text: &str, budget: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() <= budget {
        return collapsed;
    }
    let mut cut = budget.saturating_sub(ELLIPSIS.len());
    while !collapsed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{ELLIPSIS}", collapsed[..cut].trim_end())
}

/// Full characterization from a parsed tree.
pub fn assemble(
    tree: &SyntaxTree,
    adapter: Option<&dyn LanguageAdapter>,
    outputs: DetectorOutputs,
) -> CodeCharacterization {
    let structure = compute_structure(tree);
    let behavior = analyze_behavior(tree.source(), tree.language());
    let elements = extract_elements(
        tree,
        adapter,
        &outputs.libraries,
        &outputs.code_type.entry_points,
    );
    finish(tree.source(), outputs, structure, behavior, elements)
}

/// Record for text that could not be parsed: same shape, every detector at
/// its unknown/zero-confidence default, text-level facts still filled in.
/// `guess` is the raw-text language result; it only picks the behavior
/// signal set and is otherwise kept as an indicator.
pub fn assemble_degraded(source: &str, guess: LanguageDetectionResult) -> CodeCharacterization {
    let behavior = analyze_behavior(source, guess.language);
    let outputs = DetectorOutputs {
        language: guess.without_tree(),
        libraries: LibraryAnalysisResult::default(),
        paradigm: ParadigmAnalysisResult::unknown(),
        code_type: CodeTypeResult::unknown(),
        complexity: ComplexityAnalysisResult::unknown(),
    };
    finish(
        source,
        outputs,
        StructureMetrics::from_source(source),
        behavior,
        CodeElements::default(),
    )
}

fn finish(
    source: &str,
    outputs: DetectorOutputs,
    structure: StructureMetrics,
    behavior: BehaviorProfile,
    elements: CodeElements,
) -> CodeCharacterization {
    let intent = classify_intent(&elements.function_names(), source);
    let readiness = score_readiness(&ReadinessInputs {
        language: &outputs.language,
        libraries: &outputs.libraries,
        paradigm: &outputs.paradigm,
        code_type: &outputs.code_type,
        complexity: &outputs.complexity,
        structure: &structure,
        behavior: &behavior,
    });
    let elements = budget_elements(elements);
    let guidance = Guidance {
        prompt_hints: prompt_hints(&outputs, &structure, &behavior),
        focus_areas: focus_areas(&outputs, &structure, &behavior),
    };
    debug!(
        hints = guidance.prompt_hints.len(),
        blocking = readiness.blocking_issues.len(),
        "characterization assembled"
    );

    CodeCharacterization {
        version: CHARACTERIZATION_VERSION.to_string(),
        language: outputs.language,
        libraries: outputs.libraries,
        paradigm: outputs.paradigm,
        code_type: outputs.code_type,
        complexity: outputs.complexity,
        structure,
        behavior,
        elements,
        intent,
        readiness,
        guidance,
    }
}

fn budget_elements(mut elements: CodeElements) -> CodeElements {
    for condition in &mut elements.conditions {
        condition.condition = truncate_to_budget(&condition.condition, CONDITION_BUDGET);
        for outcome in &mut condition.outcomes {
            *outcome = truncate_to_budget(outcome, OUTCOME_BUDGET);
        }
    }
    elements
}

fn prompt_hints(
    outputs: &DetectorOutputs,
    structure: &StructureMetrics,
    behavior: &BehaviorProfile,
) -> Vec<String> {
    let mut hints = Vec::new();
    let language = &outputs.language;
    if language.detection_method != DetectionMethod::Fallback {
        let mut hint = format!("Source language is {}", language.language);
        if let Some(dialect) = &language.dialect {
            hint.push_str(&format!(" ({dialect})"));
        }
        hints.push(hint);
    }
    if outputs.paradigm.primary != Paradigm::Unknown {
        let mut hint = format!("Primary paradigm: {}", outputs.paradigm.primary);
        if let Some(secondary) = outputs.paradigm.secondary {
            hint.push_str(&format!(", secondary {secondary}"));
        }
        hints.push(hint);
    }
    if outputs.code_type.code_type != CodeType::Unknown {
        hints.push(format!("Code type: {}", outputs.code_type.code_type));
    }
    let frameworks: Vec<&str> = outputs
        .libraries
        .frameworks
        .iter()
        .map(|fw| fw.name.as_str())
        .collect();
    if !frameworks.is_empty() {
        hints.push(format!("Uses frameworks: {}", frameworks.join(", ")));
    }
    if outputs.complexity.time_cost.is_some() {
        hints.push(format!(
            "Preserve time complexity {} and space complexity {}",
            outputs.complexity.time_complexity, outputs.complexity.space_complexity
        ));
    }
    if !behavior.is_deterministic {
        let sources = behavior.labels(|kind| kind.is_nondeterministic());
        hints.push(format!("Nondeterministic: {}", sources.join(", ")));
    }
    if behavior.has_side_effects {
        let sources = behavior.labels(|kind| kind.is_side_effect());
        hints.push(format!("Side effects: {}", sources.join(", ")));
    }
    if behavior.is_async {
        hints.push("Keep asynchronous semantics".to_string());
    }
    if structure.syntax_errors > 0 {
        hints.push(format!(
            "Input has {} syntax error(s); infer intent conservatively",
            structure.syntax_errors
        ));
    }
    hints
        .iter()
        .take(MAX_PROMPT_HINTS)
        .map(|hint| truncate_to_budget(hint, HINT_BUDGET))
        .collect()
}

fn focus_areas(
    outputs: &DetectorOutputs,
    structure: &StructureMetrics,
    behavior: &BehaviorProfile,
) -> Vec<String> {
    let mut areas: Vec<String> = Vec::new();
    let mut push = |area: &str| {
        if !areas.iter().any(|a| a == area) {
            areas.push(area.to_string());
        }
    };
    for suggestion in &outputs.complexity.optimization_suggestions {
        match suggestion.kind {
            SuggestionKind::Hashing => push("nested loops"),
            SuggestionKind::Memoization | SuggestionKind::IterativeConversion => push("recursion"),
            SuggestionKind::HoistAllocation => push("allocation in loops"),
        }
    }
    if structure.cyclomatic_per_function() > HIGH_CYCLOMATIC || structure.max_nesting > DEEP_NESTING
    {
        push("control flow");
    }
    if behavior.has_side_effects {
        push("side effects");
    }
    if !behavior.is_deterministic {
        push("determinism");
    }
    if behavior.is_async {
        push("concurrency");
    }
    if structure.syntax_errors > 0 {
        push("syntax errors");
    }
    if outputs.libraries.third_party().next().is_some() {
        push("external dependencies");
    }
    if outputs.language.language == Language::Unknown {
        push("language identification");
    }
    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::language::detect_language;

    #[test]
    fn test_truncate_short_text_is_collapsed_only() {
        assert_eq!(truncate_to_budget("a  &&\n   b", 120), "a && b");
    }

    #[test]
    fn test_truncate_respects_budget() {
        let long = "x > 0 && ".repeat(30);
        let cut = truncate_to_budget(&long, CONDITION_BUDGET);
        assert!(cut.len() <= CONDITION_BUDGET);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        let text = "é".repeat(100);
        let cut = truncate_to_budget(&text, 10);
        // 7 bytes available before the ellipsis, so three two-byte chars fit
        assert_eq!(cut, "ééé...");
    }

    #[test]
    fn test_degraded_record_keeps_shape() {
        let source = "<?php echo rand(); ?>";
        let record = assemble_degraded(source, detect_language(source));
        assert_eq!(record.version, CHARACTERIZATION_VERSION);
        assert_eq!(record.language.language, Language::Unknown);
        assert_eq!(record.language.confidence, 0.0);
        assert!(record.language.indicators[0].starts_with("text-guess:php"));
        assert_eq!(record.paradigm.primary, Paradigm::Unknown);
        assert_eq!(record.code_type.code_type, CodeType::Unknown);
        assert_eq!(record.complexity.time_complexity, "unknown");
        assert_eq!(record.structure.lines, 1);
        assert!(record.elements.functions.is_empty());
        assert!(record.behavior.has_io);
        assert!(record
            .guidance
            .prompt_hints
            .iter()
            .all(|hint| hint.len() <= HINT_BUDGET));
    }
}
