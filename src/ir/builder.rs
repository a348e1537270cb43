//! Language-agnostic CST → IR lowering.
//!
//! One pass over the tree. Node roles come from the adapter; the builder only
//! decides statement order and nesting:
//!
//! - calls nested in an expression are emitted before the enclosing statement
//! - loop header expressions belong to the enclosing block
//! - every function (nested or not) becomes its own [`FunctionIR`]
//! - `xs.map(x => ...)` style combinator calls with an inline lambda are
//!   lowered as loops over the receiver, with the lambda body inlined

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::loop_bounds::collection_iteration;
use super::{BlockIR, FunctionIR, LoopBounds, ProgramIR, StatementIR, StatementKind};
use crate::adapters::{EntryPointKind, LanguageAdapter, LoopHeader, NodeClass};
use crate::core::{CstNode, SyntaxTree};

pub const ANONYMOUS: &str = "<anonymous>";

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_]\w*").unwrap());

const ITERATION_COMBINATORS: &[&str] = &[
    "map",
    "forEach",
    "filter",
    "reduce",
    "flatMap",
    "some",
    "every",
    "find",
    "findIndex",
    "for_each",
    "filter_map",
    "flat_map",
    "fold",
    "any",
    "all",
    "stream",
];

pub struct IrBuilder<'a> {
    adapter: &'a dyn LanguageAdapter,
}

impl<'a> IrBuilder<'a> {
    pub fn new(adapter: &'a dyn LanguageAdapter) -> Self {
        Self { adapter }
    }

    pub fn build(&self, tree: &SyntaxTree) -> ProgramIR {
        let root = tree.root();
        let entry_points = self.adapter.detect_entry_points(root);

        let mut functions = Vec::new();
        let mut top_level = Vec::new();
        self.lower(root, &mut top_level, &mut functions, false);
        functions.sort_by_key(|f: &FunctionIR| f.node);

        let callable_entries: BTreeSet<&str> = entry_points
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    EntryPointKind::MainFunction | EntryPointKind::TopLevelCall
                )
            })
            .map(|e| e.name.as_str())
            .collect();
        for function in &mut functions {
            function.is_entry_point = callable_entries.contains(function.name.as_str());
        }

        let mut names: Vec<String> = Vec::new();
        for entry in &entry_points {
            if !names.contains(&entry.name) {
                names.push(entry.name.clone());
            }
        }

        trace!(
            language = %self.adapter.language(),
            functions = functions.len(),
            "built program IR"
        );
        ProgramIR {
            language: self.adapter.language(),
            functions,
            top_level: BlockIR::new(top_level),
            entry_points: names,
        }
    }

    fn lower(
        &self,
        node: CstNode<'_>,
        out: &mut Vec<StatementIR>,
        functions: &mut Vec<FunctionIR>,
        in_input_loop: bool,
    ) {
        let Some(class) = self.adapter.classify(node) else {
            self.lower_children(node, out, functions, in_input_loop);
            return;
        };

        let kind = match class {
            NodeClass::Function => {
                let function = self.build_function(node, functions);
                functions.push(function);
                return;
            }
            NodeClass::Loop => {
                let bounds = self.loop_bounds(node);
                let body_node = self.adapter.loop_body(node);
                for child in node.children().filter(|c| Some(*c) != body_node) {
                    self.lower(child, out, functions, in_input_loop);
                }
                let mut body = Vec::new();
                let nested_input = in_input_loop || bounds.is_input_bound();
                if let Some(body_node) = body_node {
                    self.lower(body_node, &mut body, functions, nested_input);
                }
                StatementKind::Loop { bounds, body }
            }
            NodeClass::Conditional => {
                let branch_nodes = self.adapter.conditional_branches(node);
                for child in node.children() {
                    let holds_branch = branch_nodes
                        .iter()
                        .any(|branch| child.span().contains(&branch.span()));
                    if !holds_branch {
                        self.lower(child, out, functions, in_input_loop);
                    }
                }
                let branches = branch_nodes
                    .iter()
                    .map(|branch| {
                        let mut statements = Vec::new();
                        self.lower(*branch, &mut statements, functions, in_input_loop);
                        statements
                    })
                    .collect();
                StatementKind::Conditional { branches }
            }
            NodeClass::Call => {
                if let Some(kind) = self.lower_combinator(node, out, functions, in_input_loop) {
                    kind
                } else {
                    self.lower_children(node, out, functions, in_input_loop);
                    StatementKind::Call {
                        callee: self
                            .adapter
                            .call_target(node)
                            .unwrap_or_else(|| ANONYMOUS.to_string()),
                        is_recursive: false,
                    }
                }
            }
            NodeClass::Allocation => {
                let size_dependent =
                    in_input_loop || self.adapter.is_size_dependent_allocation(node);
                self.lower_children(node, out, functions, in_input_loop);
                StatementKind::Allocation { size_dependent }
            }
            other => {
                self.lower_children(node, out, functions, in_input_loop);
                match other {
                    NodeClass::Return => StatementKind::Return,
                    NodeClass::Break => StatementKind::Break,
                    NodeClass::Continue => StatementKind::Continue,
                    NodeClass::Assignment => StatementKind::Assignment,
                    NodeClass::Declaration => StatementKind::Declaration,
                    _ => StatementKind::Expression,
                }
            }
        };
        out.push(StatementIR::new(kind, node.id(), node.start_line()));
    }

    fn lower_children(
        &self,
        node: CstNode<'_>,
        out: &mut Vec<StatementIR>,
        functions: &mut Vec<FunctionIR>,
        in_input_loop: bool,
    ) {
        for child in node.children() {
            self.lower(child, out, functions, in_input_loop);
        }
    }

    /// Bounds from the loop header. For condition loops, assignments in the
    /// body that feed the condition variables (directly or through one
    /// intermediate binding) are appended, so `mid = (lo + hi) / 2` counts as
    /// a halving step of `while (lo <= hi)`.
    fn loop_bounds(&self, node: CstNode<'_>) -> LoopBounds {
        let header = self.adapter.loop_header(node);
        let (LoopHeader::Condition(condition), Some(body)) = (&header, self.adapter.loop_body(node))
        else {
            return header.bounds();
        };

        let kinds = self.adapter.kinds();
        let bindings: Vec<(&str, BTreeSet<&str>, &str)> = body
            .descendants()
            .filter(|n| {
                kinds.assignments.contains(&n.kind())
                    || kinds.declarations.contains(&n.kind())
                    || n.kind() == "variable_declarator"
            })
            .filter_map(|n| {
                let target = ["left", "name", "pattern"]
                    .iter()
                    .find_map(|field| n.child_by_field(field))?;
                let value = ["right", "value"]
                    .iter()
                    .find_map(|field| n.child_by_field(field))?;
                let target = target.text().trim();
                IDENTIFIER
                    .find(target)
                    .filter(|m| m.as_str() == target)?;
                Some((target, identifiers(value.text()), n.text()))
            })
            .collect();

        let mut relevant = identifiers(condition);
        let mut steps: Vec<&str> = Vec::new();
        for _ in 0..2 {
            let mut discovered = BTreeSet::new();
            for (target, sources, text) in &bindings {
                if !steps.contains(text) && relevant.contains(target) {
                    steps.push(*text);
                    discovered.extend(sources.iter().copied());
                }
            }
            relevant.extend(discovered);
        }

        if steps.is_empty() {
            header.bounds()
        } else {
            LoopHeader::Condition(format!("{condition}; {}", steps.join("; "))).bounds()
        }
    }

    /// Lower `receiver.map(lambda)` as a loop over `receiver`.
    fn lower_combinator(
        &self,
        call: CstNode<'_>,
        out: &mut Vec<StatementIR>,
        functions: &mut Vec<FunctionIR>,
        in_input_loop: bool,
    ) -> Option<StatementKind> {
        let callee = self.adapter.call_target(call)?;
        if !ITERATION_COMBINATORS.contains(&callee.as_str()) {
            return None;
        }
        let arguments = self.adapter.call_arguments(call)?;
        let lambdas = self.adapter.kinds().lambdas;
        let (inline, rest): (Vec<_>, Vec<_>) = arguments
            .named_children()
            .partition(|arg| lambdas.contains(&arg.kind()));
        if inline.is_empty() {
            return None;
        }

        let iterable = self
            .adapter
            .call_receiver(call)
            .or_else(|| rest.first().map(|arg| arg.text().to_string()));
        let bounds = iterable
            .as_deref()
            .map(collection_iteration)
            .unwrap_or_else(LoopBounds::unknown);

        if let Some(callee_node) = call.child_by_field("function") {
            self.lower(callee_node, out, functions, in_input_loop);
        }
        for arg in rest {
            self.lower(arg, out, functions, in_input_loop);
        }
        let nested_input = in_input_loop || bounds.is_input_bound();
        let mut body = Vec::new();
        for lambda in inline {
            if let Some(lambda_body) = self.adapter.function_body(lambda) {
                self.lower(lambda_body, &mut body, functions, nested_input);
            }
        }
        Some(StatementKind::Loop { bounds, body })
    }

    fn build_function(&self, node: CstNode<'_>, functions: &mut Vec<FunctionIR>) -> FunctionIR {
        let name = self
            .adapter
            .function_name(node)
            .unwrap_or_else(|| ANONYMOUS.to_string());
        let parameters = self.adapter.parameters(node);

        let mut statements = Vec::new();
        if let Some(body) = self.adapter.function_body(node) {
            self.lower(body, &mut statements, functions, false);
        }
        if name != ANONYMOUS {
            mark_recursive(&mut statements, &name);
        }

        let body = BlockIR::new(statements);
        let calls = body.call_targets();
        let is_recursive = name != ANONYMOUS && calls.contains(&name);
        FunctionIR {
            name,
            parameters,
            body,
            calls,
            is_recursive,
            is_entry_point: false,
            node: node.id(),
            line: node.start_line(),
        }
    }
}

fn identifiers(text: &str) -> BTreeSet<&str> {
    IDENTIFIER.find_iter(text).map(|m| m.as_str()).collect()
}

fn mark_recursive(statements: &mut [StatementIR], name: &str) {
    for statement in statements {
        match &mut statement.kind {
            StatementKind::Call {
                callee,
                is_recursive,
            } => *is_recursive = callee.as_str() == name,
            StatementKind::Loop { body, .. } => mark_recursive(body, name),
            StatementKind::Conditional { branches } => {
                for branch in branches {
                    mark_recursive(branch, name);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::get_adapter;
    use crate::core::{Language, ParserProvider, TreeSitterProvider};
    use crate::ir::{walk_statements, BoundKind};
    use indoc::indoc;

    fn build(source: &str, language: Language) -> ProgramIR {
        let tree = TreeSitterProvider::new().parse(source, language).unwrap();
        let adapter = get_adapter(language).unwrap();
        IrBuilder::new(adapter.as_ref()).build(&tree)
    }

    fn loops(block: &BlockIR) -> Vec<&StatementIR> {
        let mut found = Vec::new();
        walk_statements(&block.statements, &mut |s| {
            if matches!(s.kind, StatementKind::Loop { .. }) {
                found.push(s);
            }
        });
        found
    }

    #[test]
    fn test_nested_collection_loops() {
        let program = build(
            indoc! {"
                function hasDuplicate(arr) {
                  for (let i = 0; i < arr.length; i++) {
                    for (let j = i + 1; j < arr.length; j++) {
                      if (arr[i] === arr[j]) return true;
                    }
                  }
                  return false;
                }
            "},
            Language::JavaScript,
        );
        let function = program.function("hasDuplicate").unwrap();
        assert_eq!(function.parameters, vec!["arr"]);
        assert_eq!(function.body.max_depth, 3);
        assert!(function.body.has_early_exit);
        assert!(!function.is_recursive);
        let found = loops(&function.body);
        assert_eq!(found.len(), 2);
        for l in found {
            if let StatementKind::Loop { bounds, .. } = &l.kind {
                assert_eq!(bounds.kind, BoundKind::Input);
            }
        }
    }

    #[test]
    fn test_double_recursion_is_marked() {
        let program = build(
            indoc! {"
                def fib(n):
                    if n < 2:
                        return n
                    return fib(n - 1) + fib(n - 2)
            "},
            Language::Python,
        );
        let fib = program.function("fib").unwrap();
        assert!(fib.is_recursive);
        assert_eq!(fib.recursive_call_count(), 2);
        assert!(fib.calls.contains("fib"));
    }

    #[test]
    fn test_combinator_with_lambda_becomes_loop() {
        let program = build("const doubled = items.map(x => x * 2);\n", Language::JavaScript);
        let found = loops(&program.top_level);
        assert_eq!(found.len(), 1);
        if let StatementKind::Loop { bounds, .. } = &found[0].kind {
            assert_eq!(bounds.variable.as_deref(), Some("items"));
        }
        assert!(program.functions.is_empty());
    }

    #[test]
    fn test_nested_functions_are_separate() {
        let program = build(
            indoc! {"
                function outer(xs) {
                  function inner(y) { return y + 1; }
                  return inner(xs[0]);
                }
            "},
            Language::JavaScript,
        );
        let names: Vec<&str> = program.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
        assert!(program.function("outer").unwrap().calls.contains("inner"));
    }

    #[test]
    fn test_entry_points_marked() {
        let program = build(
            indoc! {r#"
                def main():
                    print("hi")

                if __name__ == "__main__":
                    main()
            "#},
            Language::Python,
        );
        assert!(program.function("main").unwrap().is_entry_point);
        assert!(program.entry_points.contains(&"__main__".to_string()));
        assert!(!program.top_level.is_empty());
    }

    #[test]
    fn test_allocation_in_input_loop_is_size_dependent() {
        let program = build(
            indoc! {"
                package p

                func group(xs []int) {
                    for _, x := range xs {
                        bucket := []int{x}
                        _ = bucket
                    }
                }
            "},
            Language::Go,
        );
        let function = program.function("group").unwrap();
        let mut size_dependent = false;
        walk_statements(&function.body.statements, &mut |s| {
            if let StatementKind::Allocation { size_dependent: true } = s.kind {
                size_dependent = true;
            }
        });
        assert!(size_dependent);
    }
}
