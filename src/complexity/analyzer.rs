//! IR-based complexity analysis.

use std::collections::BTreeSet;

use tracing::debug;

use super::cost_expr::{CostExpr, INPUT_VARIABLE};
use super::suggestions::suggest;
use super::{ComplexityAnalysisResult, ComplexityMethod, FunctionComplexity};
use crate::core::clamp_unit;
use crate::ir::{
    walk_statements, BlockIR, BoundKind, FunctionIR, LoopGrowth, ProgramIR, StatementIR,
    StatementKind,
};

/// Calls that grow a collection in place.
const GROWTH_CALLS: &[&str] = &[
    "push", "append", "add", "insert", "extend", "put", "unshift", "push_back", "concat",
];

const BASE_CONFIDENCE: f64 = 0.7;
const UNKNOWN_BOUND_PENALTY: f64 = 0.1;
const RECURSION_CONFIDENCE_CAP: f64 = 0.5;
const MIN_CONFIDENCE: f64 = 0.3;

pub fn analyze_program(program: &ProgramIR) -> ComplexityAnalysisResult {
    let mut time_terms = Vec::new();
    let mut space_terms = Vec::new();
    let mut functions = Vec::new();

    for function in &program.functions {
        let time = function_time(function).reduce();
        let space = function_space(function).reduce();
        functions.push(FunctionComplexity {
            name: function.name.clone(),
            line: function.line,
            time_complexity: time.to_big_o(),
            space_complexity: space.to_big_o(),
            is_recursive: function.is_recursive,
            loop_depth: loop_depth(&function.body.statements),
        });
        time_terms.push(time);
        space_terms.push(space);
    }
    time_terms.push(block_time(&program.top_level.statements));
    space_terms.push(block_space(&program.top_level));

    let mut result = ComplexityAnalysisResult::from_costs(
        CostExpr::add(time_terms),
        CostExpr::add(space_terms),
        ComplexityMethod::Ir,
    );
    result.input_sizes = input_sizes(program);
    result.dominant_operations = dominant_operations(program, &functions, &result.time_complexity);
    result.optimization_suggestions = suggest(program);
    result.confidence = confidence(program);
    result.functions = functions;

    debug!(
        time = %result.time_complexity,
        space = %result.space_complexity,
        functions = result.functions.len(),
        "complexity from IR"
    );
    result
}

/// Recursive functions are reported as `O(2^n)` until recurrences are solved.
pub fn function_time(function: &FunctionIR) -> CostExpr {
    if function.is_recursive {
        CostExpr::exponential(2, INPUT_VARIABLE)
    } else {
        block_time(&function.body.statements)
    }
}

/// Loop costs folded by nesting level: each level takes its loosest growth,
/// levels multiply.
pub fn block_time(statements: &[StatementIR]) -> CostExpr {
    let mut levels: Vec<LoopGrowth> = Vec::new();
    collect_levels(statements, 0, &mut levels);
    CostExpr::multiply(levels.into_iter().map(growth_cost)).reduce()
}

fn collect_levels(statements: &[StatementIR], depth: usize, levels: &mut Vec<LoopGrowth>) {
    for statement in statements {
        match &statement.kind {
            StatementKind::Loop { bounds, body } => {
                let growth = bounds.growth();
                match levels.get_mut(depth) {
                    Some(level) => *level = (*level).max(growth),
                    None => levels.push(growth),
                }
                collect_levels(body, depth + 1, levels);
            }
            StatementKind::Conditional { branches } => {
                for branch in branches {
                    collect_levels(branch, depth, levels);
                }
            }
            _ => {}
        }
    }
}

fn growth_cost(growth: LoopGrowth) -> CostExpr {
    match growth {
        LoopGrowth::Constant => CostExpr::one(),
        LoopGrowth::Logarithmic => CostExpr::log_n(),
        LoopGrowth::Linear => CostExpr::n(),
    }
}

pub fn function_space(function: &FunctionIR) -> CostExpr {
    let mut terms = vec![block_space(&function.body)];
    if function.is_recursive {
        terms.push(CostExpr::n());
    }
    CostExpr::add(terms)
}

/// `O(n)` when the block allocates in proportion to the input or grows a
/// collection inside an input-bound loop.
fn block_space(block: &BlockIR) -> CostExpr {
    let mut sized = false;
    walk_statements(&block.statements, &mut |s| {
        if let StatementKind::Allocation {
            size_dependent: true,
        } = s.kind
        {
            sized = true;
        }
    });
    if sized || grows_in_input_loop(&block.statements, false) {
        CostExpr::n()
    } else {
        CostExpr::one()
    }
}

fn grows_in_input_loop(statements: &[StatementIR], in_input_loop: bool) -> bool {
    statements.iter().any(|statement| match &statement.kind {
        StatementKind::Call { callee, .. } => {
            in_input_loop && GROWTH_CALLS.contains(&callee.as_str())
        }
        StatementKind::Loop { bounds, body } => {
            grows_in_input_loop(body, in_input_loop || bounds.is_input_bound())
        }
        StatementKind::Conditional { branches } => branches
            .iter()
            .any(|branch| grows_in_input_loop(branch, in_input_loop)),
        _ => false,
    })
}

/// Deepest chain of nested loops.
pub fn loop_depth(statements: &[StatementIR]) -> usize {
    statements
        .iter()
        .map(|statement| match &statement.kind {
            StatementKind::Loop { body, .. } => 1 + loop_depth(body),
            StatementKind::Conditional { branches } => {
                branches.iter().map(|b| loop_depth(b)).max().unwrap_or(0)
            }
            _ => 0,
        })
        .max()
        .unwrap_or(0)
}

fn input_sizes(program: &ProgramIR) -> Vec<String> {
    let mut sizes = BTreeSet::new();
    let mut visit = |s: &StatementIR| {
        if let StatementKind::Loop { bounds, .. } = &s.kind {
            if bounds.is_input_bound() {
                if let Some(name) = bounds.variable.as_deref().and_then(input_name) {
                    sizes.insert(name);
                }
            }
        }
    };
    for function in &program.functions {
        walk_statements(&function.body.statements, &mut visit);
    }
    walk_statements(&program.top_level.statements, &mut visit);
    for function in program.functions.iter().filter(|f| f.is_recursive) {
        if let Some(first) = function.parameters.first() {
            sizes.insert(first.clone());
        }
    }
    sizes.into_iter().collect()
}

/// Leading identifier of a bound expression, skipping receivers.
fn input_name(variable: &str) -> Option<String> {
    variable
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .find(|segment| {
            !segment.is_empty()
                && !matches!(*segment, "self" | "this" | "range" | "len")
                && !segment.chars().next().is_some_and(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
}

fn dominant_operations(
    program: &ProgramIR,
    functions: &[FunctionComplexity],
    program_time: &str,
) -> Vec<String> {
    let mut operations: Vec<String> = program
        .functions
        .iter()
        .zip(functions)
        .filter(|(_, summary)| summary.time_complexity == program_time)
        .filter_map(|(function, summary)| {
            if function.is_recursive {
                Some(format!(
                    "recursive calls in {} ({} self-call{})",
                    function.name,
                    function.recursive_call_count(),
                    if function.recursive_call_count() == 1 { "" } else { "s" }
                ))
            } else if summary.loop_depth > 1 {
                Some(format!(
                    "nested loops (depth {}) in {} at line {}",
                    summary.loop_depth, function.name, function.line
                ))
            } else if summary.loop_depth == 1 {
                Some(format!("loop in {} at line {}", function.name, function.line))
            } else {
                None
            }
        })
        .collect();

    let top_depth = loop_depth(&program.top_level.statements);
    if top_depth > 0 && block_time(&program.top_level.statements).to_big_o() == program_time {
        operations.push(format!("module-level loops (depth {top_depth})"));
    }
    operations
}

fn confidence(program: &ProgramIR) -> f64 {
    let mut unknown_bounds = 0usize;
    let mut visit = |s: &StatementIR| {
        if let StatementKind::Loop { bounds, .. } = &s.kind {
            if bounds.kind == BoundKind::Unknown {
                unknown_bounds += 1;
            }
        }
    };
    for function in &program.functions {
        walk_statements(&function.body.statements, &mut visit);
    }
    walk_statements(&program.top_level.statements, &mut visit);

    let mut confidence =
        (BASE_CONFIDENCE - UNKNOWN_BOUND_PENALTY * unknown_bounds as f64).max(MIN_CONFIDENCE);
    if program.functions.iter().any(|f| f.is_recursive) {
        confidence = confidence.min(RECURSION_CONFIDENCE_CAP);
    }
    clamp_unit(confidence)
}
