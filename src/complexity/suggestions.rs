//! Rule-based optimization hints. Advisory only.

use serde::{Deserialize, Serialize};

use crate::ir::{FunctionIR, LoopGrowth, ProgramIR, StatementIR, StatementKind};

pub const MODULE_SCOPE: &str = "<module>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    /// Replace an inner scan with a hash lookup
    Hashing,
    /// Cache results of overlapping recursive calls
    Memoization,
    /// Turn single recursion into a loop
    IterativeConversion,
    /// Move an allocation out of a loop
    HoistAllocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSuggestion {
    pub kind: SuggestionKind,
    pub target: String,
    pub line: usize,
    pub message: String,
    pub expected_improvement: Option<String>,
}

pub fn suggest(program: &ProgramIR) -> Vec<OptimizationSuggestion> {
    let mut suggestions: Vec<OptimizationSuggestion> =
        program.functions.iter().flat_map(suggest_for_function).collect();
    suggestions.extend(loop_suggestions(
        MODULE_SCOPE,
        &program.top_level.statements,
    ));
    suggestions
}

fn suggest_for_function(function: &FunctionIR) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();
    if function.is_recursive {
        let self_calls = function.recursive_call_count();
        if self_calls >= 2 {
            suggestions.push(OptimizationSuggestion {
                kind: SuggestionKind::Memoization,
                target: function.name.clone(),
                line: function.line,
                message: format!(
                    "`{}` calls itself {self_calls} times per invocation; memoize results of overlapping subproblems",
                    function.name
                ),
                expected_improvement: Some("O(2^n) -> O(n)".to_string()),
            });
        } else {
            suggestions.push(OptimizationSuggestion {
                kind: SuggestionKind::IterativeConversion,
                target: function.name.clone(),
                line: function.line,
                message: format!(
                    "`{}` recurses once per call; an iterative loop avoids O(n) stack growth",
                    function.name
                ),
                expected_improvement: Some("O(n) stack -> O(1) stack".to_string()),
            });
        }
    }
    suggestions.extend(loop_suggestions(&function.name, &function.body.statements));
    suggestions
}

fn loop_suggestions(target: &str, statements: &[StatementIR]) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();
    if let Some(line) = nested_linear_loop(statements, false) {
        suggestions.push(OptimizationSuggestion {
            kind: SuggestionKind::Hashing,
            target: target.to_string(),
            line,
            message: format!(
                "nested loops over the input in `{target}`; a hash set or map lookup can replace the inner scan"
            ),
            expected_improvement: Some("O(n^2) -> O(n)".to_string()),
        });
    }
    if let Some(line) = allocation_in_loop(statements, false) {
        suggestions.push(OptimizationSuggestion {
            kind: SuggestionKind::HoistAllocation,
            target: target.to_string(),
            line,
            message: format!(
                "allocation inside a loop in `{target}`; hoist it or reuse a buffer across iterations"
            ),
            expected_improvement: None,
        });
    }
    suggestions
}

/// Line of the first linear loop nested inside another linear loop.
fn nested_linear_loop(statements: &[StatementIR], inside_linear: bool) -> Option<usize> {
    statements.iter().find_map(|statement| match &statement.kind {
        StatementKind::Loop { bounds, body } => {
            let linear = bounds.growth() == LoopGrowth::Linear;
            if linear && inside_linear {
                Some(statement.line)
            } else {
                nested_linear_loop(body, inside_linear || linear)
            }
        }
        StatementKind::Conditional { branches } => branches
            .iter()
            .find_map(|branch| nested_linear_loop(branch, inside_linear)),
        _ => None,
    })
}

fn allocation_in_loop(statements: &[StatementIR], in_loop: bool) -> Option<usize> {
    statements.iter().find_map(|statement| match &statement.kind {
        StatementKind::Allocation { .. } if in_loop => Some(statement.line),
        StatementKind::Loop { body, .. } => allocation_in_loop(body, true),
        StatementKind::Conditional { branches } => branches
            .iter()
            .find_map(|branch| allocation_in_loop(branch, in_loop)),
        _ => None,
    })
}
