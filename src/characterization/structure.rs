//! Structural metrics over the CST.

use serde::{Deserialize, Serialize};

use crate::adapters::{node_kinds, NodeKinds};
use crate::core::{CstNode, SyntaxTree};

const BOOLEAN_OPERATORS: &[&str] = &["&&", "||", "and", "or", "??"];
const TEXT_COMMENT_PREFIXES: &[&str] = &["//", "/*", "*", "#", "--"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureMetrics {
    pub lines: usize,
    pub non_empty_lines: usize,
    pub comment_lines: usize,
    pub function_count: usize,
    pub class_count: usize,
    pub loop_count: usize,
    /// Conditionals, loops, extra branches and short-circuit operators
    pub decision_points: usize,
    pub cyclomatic_complexity: usize,
    pub max_nesting: usize,
    pub syntax_errors: usize,
}

impl StructureMetrics {
    /// Line counts only; used when no tree is available.
    pub fn from_source(source: &str) -> Self {
        Self {
            lines: source.lines().count(),
            non_empty_lines: non_empty_lines(source),
            comment_lines: source
                .lines()
                .map(str::trim_start)
                .filter(|line| TEXT_COMMENT_PREFIXES.iter().any(|p| line.starts_with(p)))
                .count(),
            ..Self::default()
        }
    }

    pub fn cyclomatic_per_function(&self) -> f64 {
        self.cyclomatic_complexity as f64 / self.function_count.max(1) as f64
    }
}

fn non_empty_lines(source: &str) -> usize {
    source.lines().filter(|line| !line.trim().is_empty()).count()
}

pub fn compute_structure(tree: &SyntaxTree) -> StructureMetrics {
    let Some(kinds) = node_kinds(tree.language()) else {
        return StructureMetrics {
            syntax_errors: tree.error_count(),
            ..StructureMetrics::from_source(tree.source())
        };
    };

    let source = tree.source();
    let mut metrics = StructureMetrics {
        lines: source.lines().count(),
        non_empty_lines: non_empty_lines(source),
        syntax_errors: tree.error_count(),
        ..StructureMetrics::default()
    };
    let mut comment_rows: Vec<usize> = Vec::new();

    for node in tree.root().descendants() {
        let kind = node.kind();
        if !node.is_named() {
            if node.field_name() == Some("operator") && BOOLEAN_OPERATORS.contains(&kind) {
                metrics.decision_points += 1;
            }
            continue;
        }
        if kinds.is_function(kind) {
            metrics.function_count += 1;
        }
        if kinds.is_class(kind) {
            metrics.class_count += 1;
        }
        if kinds.is_loop(kind) {
            metrics.loop_count += 1;
            metrics.decision_points += 1;
        }
        if kinds.is_conditional(kind) || kinds.branches.contains(&kind) {
            metrics.decision_points += 1;
        }
        if kinds.is_loop(kind) || kinds.is_conditional(kind) {
            metrics.max_nesting = metrics.max_nesting.max(nesting_depth(node, kinds));
        }
        if kinds.comments.contains(&kind) {
            comment_rows.extend(node.start_line()..=node.end_line());
        }
    }

    comment_rows.sort_unstable();
    comment_rows.dedup();
    metrics.comment_lines = comment_rows.len();
    metrics.cyclomatic_complexity = metrics.decision_points + metrics.function_count.max(1);
    metrics
}

/// Control-structure depth of `node`, counting itself. An `if` chained
/// through an `else` stays on its parent's level.
fn nesting_depth(node: CstNode<'_>, kinds: &NodeKinds) -> usize {
    std::iter::once(node)
        .chain(node.ancestors())
        .filter(|n| kinds.is_loop(n.kind()) || kinds.is_conditional(n.kind()))
        .filter(|n| !is_else_if(*n, kinds))
        .count()
}

fn is_else_if(node: CstNode<'_>, kinds: &NodeKinds) -> bool {
    if !kinds.is_conditional(node.kind()) {
        return false;
    }
    node.field_name() == Some("alternative")
        || node
            .parent()
            .is_some_and(|parent| parent.kind() == "else_clause")
}
