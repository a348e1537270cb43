//! Adapter-free complexity heuristics over the raw CST.
//!
//! Used for grammars without a language adapter. Loop nesting depth gives
//! `n^depth`; a function whose body mentions its own name as a call is
//! treated as exponential.

use regex::Regex;
use tracing::debug;

use super::cost_expr::{CostExpr, INPUT_VARIABLE};
use super::suggestions::{OptimizationSuggestion, SuggestionKind};
use super::{ComplexityAnalysisResult, ComplexityMethod, FunctionComplexity};
use crate::adapters::kinds::{NodeKinds, C, GO, JAVA, JAVASCRIPT, PYTHON, RUST};
use crate::core::{CstNode, SyntaxTree};

const LEGACY_CONFIDENCE: f64 = 0.4;

const EXTRA_LOOP_KINDS: &[&str] = &["foreach_statement", "for_range_loop", "repeat_statement"];

static TABLES: &[&NodeKinds] = &[&JAVASCRIPT, &PYTHON, &GO, &JAVA, &RUST, &C];

fn is_loop(kind: &str) -> bool {
    EXTRA_LOOP_KINDS.contains(&kind) || TABLES.iter().any(|t| t.is_loop(kind))
}

fn is_function(kind: &str) -> bool {
    TABLES.iter().any(|t| t.is_function(kind))
}

pub fn analyze_cst(tree: &SyntaxTree) -> ComplexityAnalysisResult {
    let root = tree.root();
    let depth = max_loop_depth(root);

    let mut functions = Vec::new();
    let mut recursive_calls = Vec::new();
    for function in root.descendants().filter(|n| is_function(n.kind())) {
        let Some(name) = function
            .child_by_field("name")
            .or_else(|| function.child_by_field("declarator"))
            .map(declared_name)
        else {
            continue;
        };
        let self_calls = self_call_count(function, &name);
        let loop_depth = max_loop_depth(function);
        let time = if self_calls > 0 {
            CostExpr::exponential(2, INPUT_VARIABLE)
        } else {
            nested_cost(loop_depth)
        };
        let space = if self_calls > 0 { CostExpr::n() } else { CostExpr::one() };
        if self_calls > 0 {
            recursive_calls.push((name.clone(), function.start_line(), self_calls));
        }
        functions.push(FunctionComplexity {
            name,
            line: function.start_line(),
            time_complexity: time.to_big_o(),
            space_complexity: space.to_big_o(),
            is_recursive: self_calls > 0,
            loop_depth,
        });
    }

    let (time, space) = if recursive_calls.is_empty() {
        (nested_cost(depth), CostExpr::one())
    } else {
        (CostExpr::exponential(2, INPUT_VARIABLE), CostExpr::n())
    };
    let mut result = ComplexityAnalysisResult::from_costs(time, space, ComplexityMethod::Legacy);
    result.confidence = LEGACY_CONFIDENCE;

    for (name, line, calls) in &recursive_calls {
        result
            .dominant_operations
            .push(format!("recursive calls in {name} ({calls} textual self-calls)"));
        let (kind, message, improvement) = if *calls >= 2 {
            (
                SuggestionKind::Memoization,
                format!("`{name}` calls itself more than once; memoize overlapping subproblems"),
                Some("O(2^n) -> O(n)".to_string()),
            )
        } else {
            (
                SuggestionKind::IterativeConversion,
                format!("`{name}` recurses once per call; an iterative loop avoids stack growth"),
                None,
            )
        };
        result.optimization_suggestions.push(OptimizationSuggestion {
            kind,
            target: name.clone(),
            line: *line,
            message,
            expected_improvement: improvement,
        });
    }
    if depth >= 2 {
        result
            .dominant_operations
            .push(format!("nested loops (depth {depth})"));
        result.optimization_suggestions.push(OptimizationSuggestion {
            kind: SuggestionKind::Hashing,
            target: super::suggestions::MODULE_SCOPE.to_string(),
            line: first_nested_loop_line(root).unwrap_or(1),
            message: "nested loops; a hash set or map lookup can replace the inner scan".to_string(),
            expected_improvement: Some(format!("O(n^{depth}) -> O(n^{})", depth - 1)),
        });
    } else if depth == 1 && recursive_calls.is_empty() {
        result.dominant_operations.push("single loop".to_string());
    }
    result.functions = functions;

    debug!(time = %result.time_complexity, depth, "complexity from CST heuristics");
    result
}

fn nested_cost(depth: usize) -> CostExpr {
    match depth {
        0 => CostExpr::one(),
        1 => CostExpr::n(),
        d => CostExpr::polynomial(d as u32, INPUT_VARIABLE),
    }
}

/// Deepest chain of nested loop nodes under `node`.
pub fn max_loop_depth(node: CstNode<'_>) -> usize {
    node.children()
        .map(|child| {
            let nested = max_loop_depth(child);
            if is_loop(child.kind()) {
                nested + 1
            } else {
                nested
            }
        })
        .max()
        .unwrap_or(0)
}

fn first_nested_loop_line(root: CstNode<'_>) -> Option<usize> {
    root.descendants()
        .filter(|n| is_loop(n.kind()))
        .find(|n| n.ancestors().any(|a| is_loop(a.kind())))
        .map(|n| n.start_line())
}

/// C declarators wrap the identifier (`*name`, `name(args)`).
fn declared_name(node: CstNode<'_>) -> String {
    if let Some(inner) = node.child_by_field("declarator") {
        return declared_name(inner);
    }
    node.text().to_string()
}

fn self_call_count(function: CstNode<'_>, name: &str) -> usize {
    let Some(body) = function.child_by_field("body") else {
        return 0;
    };
    let Ok(pattern) = Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))) else {
        return 0;
    };
    pattern.find_iter(body.text()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Language, ParserProvider, TreeSitterProvider};
    use indoc::indoc;

    fn parse_c(source: &str) -> SyntaxTree {
        TreeSitterProvider::new().parse(source, Language::C).unwrap()
    }

    #[test]
    fn test_nested_loops_polynomial() {
        let tree = parse_c(indoc! {"
            void bubble(int *a, int n) {
                for (int i = 0; i < n; i++)
                    for (int j = 0; j < n - 1; j++)
                        if (a[j] > a[j + 1]) { int t = a[j]; a[j] = a[j + 1]; a[j + 1] = t; }
            }
        "});
        let result = analyze_cst(&tree);
        assert_eq!(result.method, ComplexityMethod::Legacy);
        assert_eq!(result.time_complexity, "O(n^2)");
        assert_eq!(result.confidence, LEGACY_CONFIDENCE);
        assert_eq!(result.optimization_suggestions[0].kind, SuggestionKind::Hashing);
    }

    #[test]
    fn test_textual_recursion() {
        let tree = parse_c("int fib(int n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }");
        let result = analyze_cst(&tree);
        assert_eq!(result.time_complexity, "O(2^n)");
        assert_eq!(result.space_complexity, "O(n)");
        assert_eq!(result.functions[0].name, "fib");
        assert!(result.functions[0].is_recursive);
    }

    #[test]
    fn test_straight_line_code_constant() {
        let tree = parse_c("int add(int a, int b) { return a + b; }");
        let result = analyze_cst(&tree);
        assert_eq!(result.time_complexity, "O(1)");
        assert!(result.optimization_suggestions.is_empty());
    }
}
