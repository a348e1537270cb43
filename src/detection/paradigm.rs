//! Programming paradigm scoring.
//!
//! Structural evidence is counted from the CST with the per-language node
//! tables, then combined into object-oriented, functional and procedural
//! scores. Scores are normalized to sum to 100; confidence is discounted
//! when there is little evidence to go on.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::signals;
use crate::adapters::{node_kinds, simple_name, NodeKinds};
use crate::core::{clamp_unit, floor2, round2, CstNode, Language, SyntaxTree};

/// Secondary paradigm needs at least this normalized score...
pub const SECONDARY_MIN_SCORE: f64 = 20.0;
/// ...and at least this fraction of the primary score.
pub const SECONDARY_MIN_RATIO: f64 = 0.4;

const ARRAY_COMBINATORS: &[&str] = &[
    "map", "filter", "reduce", "forEach", "flatMap", "some", "every", "find", "findIndex",
    "reduceRight", "fold", "filter_map", "flat_map", "for_each", "any", "all", "zip",
    "sorted", "collect", "stream",
];

/// Root-level nodes that declare structure rather than execute.
const STRUCTURAL_TOP_LEVEL: &[&str] = &[
    "package_clause",
    "package_declaration",
    "type_declaration",
    "decorated_definition",
    "export_statement",
    "impl_item",
    "mod_item",
    "struct_item",
    "enum_item",
    "trait_item",
    "type_item",
    "const_item",
    "static_item",
    "attribute_item",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "preproc_include",
    "preproc_def",
    "type_definition",
    "struct_specifier",
];

static RECEIVER_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(this|self)\s*\.|\$this->").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Paradigm {
    ObjectOriented,
    Functional,
    Procedural,
    Unknown,
}

impl std::fmt::Display for Paradigm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Paradigm::ObjectOriented => "object-oriented",
            Paradigm::Functional => "functional",
            Paradigm::Procedural => "procedural",
            Paradigm::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternCounts {
    pub classes: usize,
    /// Named functions and methods, lambdas excluded
    pub functions: usize,
    pub methods: usize,
    pub loops: usize,
    pub lambdas: usize,
    pub higher_order_functions: usize,
    pub array_combinators: usize,
    pub mutations: usize,
    pub side_effect_calls: usize,
    pub receiver_references: usize,
    pub inheritance: usize,
    pub top_level_statements: usize,
    pub pure_functions: f64,
}

impl PatternCounts {
    pub fn free_functions(&self) -> usize {
        self.functions.saturating_sub(self.methods)
    }

    /// Evidence volume used for the confidence discount.
    pub fn structural_total(&self) -> usize {
        self.classes
            + self.functions
            + self.lambdas
            + self.loops
            + self.mutations
            + self.side_effect_calls
            + self.higher_order_functions
            + self.array_combinators
            + self.inheritance
    }
}

/// Normalized scores, summing to 100 when any evidence exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParadigmScores {
    pub object_oriented: f64,
    pub functional: f64,
    pub procedural: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParadigmAnalysisResult {
    pub primary: Paradigm,
    pub secondary: Option<Paradigm>,
    pub confidence: f64,
    pub scores: ParadigmScores,
    pub pattern_counts: PatternCounts,
    pub details: Vec<String>,
}

impl ParadigmAnalysisResult {
    pub fn unknown() -> Self {
        Self {
            primary: Paradigm::Unknown,
            secondary: None,
            confidence: 0.0,
            scores: ParadigmScores::default(),
            pattern_counts: PatternCounts::default(),
            details: Vec::new(),
        }
    }
}

impl Default for ParadigmAnalysisResult {
    fn default() -> Self {
        Self::unknown()
    }
}

pub fn analyze_paradigm(tree: &SyntaxTree) -> ParadigmAnalysisResult {
    match count_patterns(tree) {
        Some(counts) => score_paradigms(counts, tree.language()),
        None => ParadigmAnalysisResult::unknown(),
    }
}

/// Structural evidence for languages with a node table.
pub fn count_patterns(tree: &SyntaxTree) -> Option<PatternCounts> {
    let language = tree.language();
    let kinds = node_kinds(language)?;
    let root = tree.root();
    let mut counts = PatternCounts::default();

    for node in root.descendants() {
        let kind = node.kind();
        if kinds.is_class(kind) {
            counts.classes += 1;
        }
        if kinds.lambdas.contains(&kind) {
            counts.lambdas += 1;
            if returned_from_function(node, kinds) {
                counts.higher_order_functions += 1;
            }
        } else if kinds.is_function(kind) {
            counts.functions += 1;
            if is_method(node, kinds) {
                counts.methods += 1;
            }
        }
        if kinds.is_loop(kind) {
            counts.loops += 1;
        }
        if kinds.is_mutation(kind) {
            counts.mutations += 1;
        }
        if kinds.calls.contains(&kind) {
            if callee_name(node).is_some_and(|name| ARRAY_COMBINATORS.contains(&name.as_str())) {
                counts.array_combinators += 1;
            }
            if passes_function(node, kinds) {
                counts.higher_order_functions += 1;
            }
        }
        if kinds.returns.contains(&kind)
            && node
                .named_children()
                .any(|child| kinds.lambdas.contains(&child.kind()))
        {
            counts.higher_order_functions += 1;
        }
        if is_inheritance(node, kinds) {
            counts.inheritance += 1;
        }
    }

    counts.top_level_statements = root
        .named_children()
        .filter(|stmt| {
            let kind = stmt.kind();
            !(kinds.is_function(kind)
                || kinds.is_class(kind)
                || kinds.imports.contains(&kind)
                || kinds.comments.contains(&kind)
                || STRUCTURAL_TOP_LEVEL.contains(&kind)
                || kind.contains("class"))
        })
        .count();

    let source = tree.source();
    counts.receiver_references = RECEIVER_REFERENCE.find_iter(source).count();
    counts.side_effect_calls = signals::side_effect_count(&signals::scan(source, language));
    counts.pure_functions = (counts.functions as f64
        - counts.side_effect_calls as f64
        - 0.3 * counts.mutations as f64)
        .max(0.0);

    Some(counts)
}

/// `(object-oriented, functional, procedural)` multipliers.
fn language_multipliers(language: Language) -> (f64, f64, f64) {
    match language {
        Language::C => (0.3, 1.0, 1.5),
        Language::Go => (1.0, 1.0, 1.2),
        Language::Java | Language::CSharp | Language::Kotlin => (1.3, 1.0, 1.0),
        Language::JavaScript | Language::TypeScript | Language::Rust => (1.0, 1.1, 1.0),
        _ => (1.0, 1.0, 1.0),
    }
}

/// Discount for thin evidence.
pub fn evidence_factor(total_patterns: usize) -> f64 {
    match total_patterns {
        0..=4 => 0.6,
        5..=9 => 0.75,
        10..=19 => 0.9,
        _ => 1.0,
    }
}

/// Normalized scores (summing to 100) in object-oriented, functional,
/// procedural order, before display rounding. `None` without evidence.
pub fn normalized_scores(
    counts: &PatternCounts,
    language: Language,
) -> Option<[(Paradigm, f64); 3]> {
    let (oop_mult, fp_mult, proc_mult) = language_multipliers(language);

    let oop = 3.0 * counts.classes as f64
        + 1.5 * counts.methods as f64
        + 2.0 * counts.inheritance as f64
        + 0.5 * counts.receiver_references.min(10) as f64;
    let functional = (2.0 * counts.pure_functions
        + 2.5 * counts.higher_order_functions as f64
        + 1.5 * counts.array_combinators as f64
        + counts.lambdas as f64
        - 0.5 * counts.mutations as f64)
        .max(0.0);
    let procedural = counts.free_functions() as f64
        + counts.loops as f64
        + 0.5 * counts.mutations as f64
        + 0.5 * counts.side_effect_calls as f64
        + 0.5 * counts.top_level_statements as f64;

    let raw = [
        (Paradigm::ObjectOriented, oop * oop_mult),
        (Paradigm::Functional, functional * fp_mult),
        (Paradigm::Procedural, procedural * proc_mult),
    ];
    let total: f64 = raw.iter().map(|(_, s)| s).sum();
    if total <= 0.0 {
        return None;
    }
    Some(raw.map(|(p, s)| (p, s / total * 100.0)))
}

pub fn score_paradigms(counts: PatternCounts, language: Language) -> ParadigmAnalysisResult {
    let Some(normalized) = normalized_scores(&counts, language) else {
        return ParadigmAnalysisResult {
            pattern_counts: counts,
            ..ParadigmAnalysisResult::unknown()
        };
    };

    // Stable sort keeps the object-oriented, functional, procedural order on ties.
    let mut ranked = normalized;
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let (primary, primary_score) = ranked[0];
    let secondary = ranked
        .get(1)
        .filter(|(_, score)| {
            *score >= SECONDARY_MIN_SCORE && *score >= SECONDARY_MIN_RATIO * primary_score
        })
        .map(|(paradigm, _)| *paradigm);

    let factor = evidence_factor(counts.structural_total());
    // Floored so the evidence discount is never undone by rounding
    let confidence = floor2(clamp_unit(primary_score / 100.0 * factor));

    let scores = ParadigmScores {
        object_oriented: round2(normalized[0].1),
        functional: round2(normalized[1].1),
        procedural: round2(normalized[2].1),
    };
    let details = describe(&counts);
    debug!(%primary, confidence, "paradigm scored");

    ParadigmAnalysisResult {
        primary,
        secondary,
        confidence,
        scores,
        pattern_counts: counts,
        details,
    }
}

fn describe(counts: &PatternCounts) -> Vec<String> {
    let mut details = Vec::new();
    if counts.classes > 0 {
        details.push(format!(
            "{} class(es) with {} method(s)",
            counts.classes, counts.methods
        ));
    }
    if counts.inheritance > 0 {
        details.push(format!("{} inheritance clause(s)", counts.inheritance));
    }
    if counts.free_functions() > 0 {
        details.push(format!("{} free function(s)", counts.free_functions()));
    }
    if counts.lambdas > 0 || counts.higher_order_functions > 0 {
        details.push(format!(
            "{} lambda(s), {} higher-order use(s)",
            counts.lambdas, counts.higher_order_functions
        ));
    }
    if counts.array_combinators > 0 {
        details.push(format!(
            "{} collection combinator call(s)",
            counts.array_combinators
        ));
    }
    if counts.loops > 0 {
        details.push(format!("{} loop(s)", counts.loops));
    }
    if counts.mutations > 0 {
        details.push(format!("{} mutation site(s)", counts.mutations));
    }
    if counts.side_effect_calls > 0 {
        details.push(format!("{} side-effect call(s)", counts.side_effect_calls));
    }
    details
}

fn is_method(node: CstNode<'_>, kinds: &NodeKinds) -> bool {
    matches!(node.kind(), "method_definition" | "method_declaration")
        || node.has_ancestor_kind(kinds.method_scopes)
}

fn is_inheritance(node: CstNode<'_>, kinds: &NodeKinds) -> bool {
    kinds.inheritance.contains(&node.kind())
        || (node.kind() == "class_definition"
            && node
                .child_by_field("superclasses")
                .is_some_and(|s| s.named_children().next().is_some()))
        || (node.kind() == "impl_item" && node.child_by_field("trait").is_some())
}

fn callee_name(call: CstNode<'_>) -> Option<String> {
    let target = call
        .child_by_field("name")
        .filter(|_| call.kind() == "method_invocation")
        .or_else(|| call.child_by_field("function"))
        .or_else(|| call.child_by_field("macro"))?;
    let name = simple_name(target.text());
    (!name.is_empty()).then_some(name)
}

fn passes_function(call: CstNode<'_>, kinds: &NodeKinds) -> bool {
    call.child_by_field("arguments")
        .is_some_and(|args| args.named_children().any(|a| kinds.is_function(a.kind())))
}

/// A lambda that is the body of another function, `a => b => a + b`.
fn returned_from_function(lambda: CstNode<'_>, kinds: &NodeKinds) -> bool {
    lambda.field_name() == Some("body")
        && lambda
            .parent()
            .is_some_and(|parent| kinds.is_function(parent.kind()))
}
