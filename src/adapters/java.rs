use super::kinds::{NodeKinds, JAVA};
use super::{EntryPoint, EntryPointKind, LanguageAdapter, LoopHeader};
use crate::core::{CstNode, Language};

#[derive(Debug, Clone, Copy, Default)]
pub struct JavaAdapter;

impl JavaAdapter {
    fn is_static_main(node: CstNode<'_>) -> bool {
        node.kind() == "method_declaration"
            && node.child_by_field("name").map(|n| n.text()) == Some("main")
            && node
                .named_children()
                .find(|child| child.kind() == "modifiers")
                .map(|m| m.text().contains("static"))
                .unwrap_or(false)
    }
}

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn kinds(&self) -> &'static NodeKinds {
        &JAVA
    }

    fn loop_header(&self, node: CstNode<'_>) -> LoopHeader {
        match node.kind() {
            "enhanced_for_statement" => node
                .child_by_field("value")
                .map(|iterable| LoopHeader::Iteration(iterable.text().to_string()))
                .unwrap_or(LoopHeader::Infinite),
            "for_statement" => {
                if node.child_by_field("condition").is_none() {
                    return LoopHeader::Infinite;
                }
                let parts: Vec<&str> = ["init", "condition", "update"]
                    .iter()
                    .filter_map(|field| node.child_by_field(field))
                    .map(|part| part.text().trim_end_matches(';'))
                    .collect();
                LoopHeader::Condition(parts.join("; "))
            }
            _ => match node.child_by_field("condition") {
                Some(condition) => LoopHeader::Condition(condition.text().to_string()),
                None => LoopHeader::Infinite,
            },
        }
    }

    fn call_target(&self, call: CstNode<'_>) -> Option<String> {
        call.child_by_field("name").map(|name| name.text().to_string())
    }

    fn call_receiver(&self, call: CstNode<'_>) -> Option<String> {
        call.child_by_field("object").map(|object| object.text().to_string())
    }

    fn detect_entry_points(&self, root: CstNode<'_>) -> Vec<EntryPoint> {
        root.descendants()
            .filter(|node| Self::is_static_main(*node))
            .map(|node| EntryPoint::new("main", EntryPointKind::MainFunction, node.start_line()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ParserProvider, SyntaxTree, TreeSitterProvider};
    use indoc::indoc;

    fn parse(source: &str) -> SyntaxTree {
        TreeSitterProvider::new().parse(source, Language::Java).unwrap()
    }

    const SOURCE: &str = indoc! {"
        public class App {
            public static void main(String[] args) {
                for (int i = 0; i < args.length; i++) {
                    System.out.println(args[i]);
                }
                for (String arg : args) { run(arg); }
            }
            static void run(String arg) {}
        }
    "};

    #[test]
    fn test_main_method_is_entry_point() {
        let tree = parse(SOURCE);
        let entry_points = JavaAdapter.detect_entry_points(tree.root());
        assert_eq!(entry_points.len(), 1);
        assert_eq!(entry_points[0].name, "main");
    }

    #[test]
    fn test_method_invocation_target() {
        let tree = parse(SOURCE);
        let adapter = JavaAdapter;
        let targets: Vec<String> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == "method_invocation")
            .filter_map(|n| adapter.call_target(n))
            .collect();
        assert_eq!(targets, vec!["println", "run"]);
    }

    #[test]
    fn test_loop_headers() {
        let tree = parse(SOURCE);
        let adapter = JavaAdapter;
        let loops = adapter.extract_loops(tree.root());
        assert!(matches!(adapter.loop_header(loops[0]), LoopHeader::Condition(c) if c.contains("args.length")));
        assert_eq!(adapter.loop_header(loops[1]), LoopHeader::Iteration("args".into()));
        assert_eq!(adapter.parameters(adapter.extract_functions(tree.root())[0]), vec!["args"]);
    }
}
