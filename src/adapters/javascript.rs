//! JavaScript and TypeScript adapter.
//!
//! TypeScript is parsed with the TSX grammar, which shares every production
//! this adapter relies on with the JavaScript grammar.

use super::kinds::{NodeKinds, JAVASCRIPT};
use super::{top_level_calls, EntryPoint, EntryPointKind, LanguageAdapter, LoopHeader};
use crate::core::{CstNode, Language};

#[derive(Debug, Clone, Copy)]
pub struct JavaScriptAdapter {
    language: Language,
}

impl JavaScriptAdapter {
    pub fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }

    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language(&self) -> Language {
        self.language
    }

    fn kinds(&self) -> &'static NodeKinds {
        &JAVASCRIPT
    }

    fn loop_header(&self, node: CstNode<'_>) -> LoopHeader {
        match node.kind() {
            "for_in_statement" => node
                .child_by_field("right")
                .map(|iterable| LoopHeader::Iteration(iterable.text().to_string()))
                .unwrap_or(LoopHeader::Infinite),
            "for_statement" => {
                let parts: Vec<&str> = ["initializer", "condition", "increment"]
                    .iter()
                    .filter_map(|field| node.child_by_field(field))
                    .map(|part| part.text().trim_end_matches(';'))
                    .collect();
                if node.child_by_field("condition").is_none() {
                    LoopHeader::Infinite
                } else {
                    LoopHeader::Condition(parts.join("; "))
                }
            }
            _ => match node.child_by_field("condition") {
                Some(condition) => LoopHeader::Condition(condition.text().to_string()),
                None => LoopHeader::Infinite,
            },
        }
    }

    fn detect_entry_points(&self, root: CstNode<'_>) -> Vec<EntryPoint> {
        let mut entry_points = top_level_calls(self, root);
        if let Some(guard) = root
            .descendants()
            .find(|node| node.kind() == "if_statement" && node.text().contains("require.main === module"))
        {
            entry_points.push(EntryPoint::new(
                "require.main",
                EntryPointKind::MainGuard,
                guard.start_line(),
            ));
            if let Some(body) = guard.child_by_field("consequence") {
                entry_points.extend(
                    body.descendants()
                        .filter(|node| node.kind() == "call_expression")
                        .filter_map(|call| {
                            let name = self.call_target(call)?;
                            Some(EntryPoint::new(name, EntryPointKind::MainFunction, call.start_line()))
                        }),
                );
            }
        }
        entry_points
    }
}
