use super::kinds::{NodeKinds, RUST};
use super::{EntryPoint, EntryPointKind, LanguageAdapter, LoopHeader};
use crate::core::{CstNode, Language};

const COLLECTION_TYPES: &[&str] = &[
    "Vec", "VecDeque", "HashMap", "HashSet", "BTreeMap", "BTreeSet", "String", "Box",
];

const COLLECTING_METHODS: &[&str] = &["collect", "to_vec", "to_owned", "to_string", "clone"];

#[derive(Debug, Clone, Copy, Default)]
pub struct RustAdapter;

impl RustAdapter {
    fn is_constructor_call(callee: &str) -> bool {
        let mut segments = callee.rsplitn(2, "::");
        let method = segments.next().unwrap_or_default();
        let owner = segments.next().unwrap_or_default();
        let owner = owner.split('<').next().unwrap_or(owner);
        COLLECTION_TYPES.contains(&owner)
            && matches!(method, "new" | "with_capacity" | "from" | "from_iter")
    }

    fn is_collecting_call(&self, call: CstNode<'_>) -> bool {
        call.child_by_field("function")
            .filter(|f| f.kind() == "field_expression" || f.kind() == "generic_function")
            .and_then(|_| self.call_target(call))
            .map(|name| COLLECTING_METHODS.contains(&name.as_str()))
            .unwrap_or(false)
    }
}

impl LanguageAdapter for RustAdapter {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn kinds(&self) -> &'static NodeKinds {
        &RUST
    }

    fn is_allocation(&self, node: CstNode<'_>) -> bool {
        match node.kind() {
            "array_expression" => true,
            "macro_invocation" => node
                .child_by_field("macro")
                .map(|m| matches!(m.text(), "vec" | "format"))
                .unwrap_or(false),
            "call_expression" => {
                let constructs = node
                    .child_by_field("function")
                    .map(|f| Self::is_constructor_call(f.text()))
                    .unwrap_or(false);
                constructs || self.is_collecting_call(node)
            }
            _ => false,
        }
    }

    fn is_size_dependent_allocation(&self, node: CstNode<'_>) -> bool {
        (node.kind() == "call_expression" && self.is_collecting_call(node))
            || super::SIZE_HINT.is_match(node.text())
    }

    fn loop_header(&self, node: CstNode<'_>) -> LoopHeader {
        match node.kind() {
            "for_expression" => node
                .child_by_field("value")
                .map(|iterable| {
                    let iterable = iterable.text().trim_start_matches('&').trim_start_matches("mut ");
                    LoopHeader::Iteration(iterable.to_string())
                })
                .unwrap_or(LoopHeader::Infinite),
            "while_expression" => match node.child_by_field("condition") {
                Some(condition) if condition.text() != "true" => {
                    LoopHeader::Condition(condition.text().to_string())
                }
                _ => LoopHeader::Infinite,
            },
            _ => LoopHeader::Infinite,
        }
    }

    fn detect_entry_points(&self, root: CstNode<'_>) -> Vec<EntryPoint> {
        root.named_children()
            .filter(|node| node.kind() == "function_item")
            .filter(|node| node.child_by_field("name").map(|n| n.text()) == Some("main"))
            .map(|node| EntryPoint::new("main", EntryPointKind::MainFunction, node.start_line()))
            .collect()
    }
}
