use super::kinds::{NodeKinds, GO};
use super::{top_level_calls, EntryPoint, EntryPointKind, LanguageAdapter, LoopHeader};
use crate::core::{CstNode, Language};

#[derive(Debug, Clone, Copy, Default)]
pub struct GoAdapter;

impl LanguageAdapter for GoAdapter {
    fn language(&self) -> Language {
        Language::Go
    }

    fn kinds(&self) -> &'static NodeKinds {
        &GO
    }

    /// Composite literals plus `make(...)`/`new(...)`.
    fn is_allocation(&self, node: CstNode<'_>) -> bool {
        match node.kind() {
            "composite_literal" => true,
            "call_expression" => node
                .child_by_field("function")
                .map(|f| matches!(f.text(), "make" | "new"))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// `a, b int` declares two parameters; the receiver is not one.
    fn parameters(&self, function: CstNode<'_>) -> Vec<String> {
        let Some(list) = function.child_by_field("parameters") else {
            return Vec::new();
        };
        list.named_children()
            .flat_map(|decl| decl.children_by_field("name").collect::<Vec<_>>())
            .map(|name| name.text().to_string())
            .collect()
    }

    fn loop_header(&self, node: CstNode<'_>) -> LoopHeader {
        let clause = node
            .named_children()
            .find(|child| child.field_name() != Some("body"));
        match clause {
            Some(clause) if clause.kind() == "range_clause" => clause
                .child_by_field("right")
                .map(|iterable| LoopHeader::Iteration(iterable.text().to_string()))
                .unwrap_or(LoopHeader::Infinite),
            Some(clause) if clause.kind() == "for_clause" => {
                if clause.child_by_field("condition").is_none() {
                    return LoopHeader::Infinite;
                }
                let parts: Vec<&str> = ["initializer", "condition", "update"]
                    .iter()
                    .filter_map(|field| clause.child_by_field(field))
                    .map(|part| part.text())
                    .collect();
                LoopHeader::Condition(parts.join("; "))
            }
            Some(condition) if condition.kind() != "block" && condition.kind() != "comment" => {
                LoopHeader::Condition(condition.text().to_string())
            }
            _ => LoopHeader::Infinite,
        }
    }

    fn detect_entry_points(&self, root: CstNode<'_>) -> Vec<EntryPoint> {
        let mut entry_points: Vec<EntryPoint> = root
            .named_children()
            .filter(|node| node.kind() == "function_declaration")
            .filter(|node| node.child_by_field("name").map(|n| n.text()) == Some("main"))
            .map(|node| EntryPoint::new("main", EntryPointKind::MainFunction, node.start_line()))
            .collect();
        entry_points.extend(
            root.descendants()
                .filter(|node| node.kind() == "call_expression")
                .filter(|call| self.call_target(*call).as_deref() == Some("ListenAndServe"))
                .map(|call| {
                    EntryPoint::new("ListenAndServe", EntryPointKind::ServerListen, call.start_line())
                }),
        );
        entry_points.extend(top_level_calls(self, root));
        entry_points
    }
}
