use super::kinds::{NodeKinds, PYTHON};
use super::{top_level_calls, EntryPoint, EntryPointKind, LanguageAdapter, LoopHeader};
use crate::core::{CstNode, Language};

const COMPREHENSIONS: &[&str] = &[
    "list_comprehension",
    "dictionary_comprehension",
    "set_comprehension",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PythonAdapter;

impl PythonAdapter {
    fn is_main_guard(node: CstNode<'_>) -> bool {
        node.kind() == "if_statement"
            && node
                .child_by_field("condition")
                .map(|c| c.text().contains("__name__") && c.text().contains("__main__"))
                .unwrap_or(false)
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn kinds(&self) -> &'static NodeKinds {
        &PYTHON
    }

    fn is_size_dependent_allocation(&self, node: CstNode<'_>) -> bool {
        COMPREHENSIONS.contains(&node.kind()) || super::SIZE_HINT.is_match(node.text())
    }

    fn loop_header(&self, node: CstNode<'_>) -> LoopHeader {
        match node.kind() {
            "for_statement" | "for_in_clause" => node
                .child_by_field("right")
                .map(|iterable| LoopHeader::Iteration(iterable.text().to_string()))
                .unwrap_or(LoopHeader::Infinite),
            _ => match node.child_by_field("condition") {
                Some(condition) if condition.text() != "True" => {
                    LoopHeader::Condition(condition.text().to_string())
                }
                _ => LoopHeader::Infinite,
            },
        }
    }

    fn detect_entry_points(&self, root: CstNode<'_>) -> Vec<EntryPoint> {
        let mut entry_points = top_level_calls(self, root);
        for guard in root.named_children().filter(|n| Self::is_main_guard(*n)) {
            entry_points.push(EntryPoint::new(
                "__main__",
                EntryPointKind::MainGuard,
                guard.start_line(),
            ));
            if let Some(body) = guard.child_by_field("consequence") {
                entry_points.extend(body.descendants().filter(|n| n.kind() == "call").filter_map(
                    |call| {
                        let name = self.call_target(call)?;
                        Some(EntryPoint::new(name, EntryPointKind::MainFunction, call.start_line()))
                    },
                ));
            }
        }
        entry_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ParserProvider, SyntaxTree, TreeSitterProvider};
    use indoc::indoc;

    fn parse(source: &str) -> SyntaxTree {
        TreeSitterProvider::new().parse(source, Language::Python).unwrap()
    }

    #[test]
    fn test_method_parameters_skip_self() {
        let tree = parse(indoc! {"
            class Greeter:
                def greet(self, name, *args, punctuation='!', **kwargs):
                    return name + punctuation
        "});
        let adapter = PythonAdapter;
        let function = adapter.extract_functions(tree.root())[0];
        assert_eq!(adapter.function_name(function).as_deref(), Some("greet"));
        assert_eq!(
            adapter.parameters(function),
            vec!["name", "args", "punctuation", "kwargs"]
        );
    }

    #[test]
    fn test_for_header_is_iteration() {
        let tree = parse("for x in range(len(xs)):\n    print(x)\n");
        let adapter = PythonAdapter;
        let header = adapter.loop_header(adapter.extract_loops(tree.root())[0]);
        assert_eq!(header, LoopHeader::Iteration("range(len(xs))".to_string()));
        assert_eq!(header.bounds().variable.as_deref(), Some("xs"));
    }

    #[test]
    fn test_while_true_is_infinite() {
        let tree = parse("while True:\n    step()\n");
        let adapter = PythonAdapter;
        let header = adapter.loop_header(adapter.extract_loops(tree.root())[0]);
        assert_eq!(header, LoopHeader::Infinite);
    }

    #[test]
    fn test_main_guard_entry_points() {
        let tree = parse(indoc! {r#"
            def main():
                pass

            if __name__ == "__main__":
                main()
        "#});
        let entry_points = PythonAdapter.detect_entry_points(tree.root());
        assert!(entry_points
            .iter()
            .any(|e| e.kind == EntryPointKind::MainGuard));
        assert!(entry_points
            .iter()
            .any(|e| e.name == "main" && e.kind == EntryPointKind::MainFunction));
    }

    #[test]
    fn test_comprehension_is_size_dependent() {
        let tree = parse("squares = [x * x for x in values]\n");
        let adapter = PythonAdapter;
        let allocation = adapter.extract_allocations(tree.root())[0];
        assert!(adapter.is_size_dependent_allocation(allocation));
    }
}
