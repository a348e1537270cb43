//! Language-neutral semantic IR built from a CST by a language adapter.
//!
//! Ownership is strictly tree-shaped. Statements keep the [`NodeId`] of the
//! CST node they came from; calls refer to other functions by name only.

pub mod builder;
pub mod loop_bounds;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::{Language, NodeId};

pub use builder::IrBuilder;
pub use loop_bounds::{BoundKind, LoopBounds, LoopGrowth};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StatementKind {
    Loop {
        bounds: LoopBounds,
        body: Vec<StatementIR>,
    },
    Conditional {
        branches: Vec<Vec<StatementIR>>,
    },
    Call {
        callee: String,
        is_recursive: bool,
    },
    Return,
    Break,
    Continue,
    Allocation {
        size_dependent: bool,
    },
    Assignment,
    Expression,
    Declaration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementIR {
    pub kind: StatementKind,
    /// Originating CST node
    pub node: NodeId,
    pub line: usize,
}

impl StatementIR {
    pub fn new(kind: StatementKind, node: NodeId, line: usize) -> Self {
        Self { kind, node, line }
    }

    /// Nested statements (loop body or all conditional branches).
    pub fn children(&self) -> Box<dyn Iterator<Item = &StatementIR> + '_> {
        match &self.kind {
            StatementKind::Loop { body, .. } => Box::new(body.iter()),
            StatementKind::Conditional { branches } => Box::new(branches.iter().flatten()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Loop/conditional nesting depth rooted at this statement.
    pub fn depth(&self) -> usize {
        let nested = self.children().map(StatementIR::depth).max().unwrap_or(0);
        match self.kind {
            StatementKind::Loop { .. } | StatementKind::Conditional { .. } => nested + 1,
            _ => nested,
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::Return | StatementKind::Break | StatementKind::Continue
        )
    }
}

/// Pre-order walk over a statement list, including nested bodies.
pub fn walk_statements<'a>(statements: &'a [StatementIR], visit: &mut impl FnMut(&'a StatementIR)) {
    for statement in statements {
        visit_one(statement, visit);
    }
}

fn visit_one<'a>(statement: &'a StatementIR, visit: &mut impl FnMut(&'a StatementIR)) {
    visit(statement);
    for child in statement.children() {
        visit_one(child, visit);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockIR {
    pub statements: Vec<StatementIR>,
    /// Deepest loop/conditional nesting
    pub max_depth: usize,
    pub has_early_exit: bool,
}

impl BlockIR {
    pub fn new(statements: Vec<StatementIR>) -> Self {
        let max_depth = statements.iter().map(StatementIR::depth).max().unwrap_or(0);
        let has_early_exit = detect_early_exit(&statements);
        Self {
            statements,
            max_depth,
            has_early_exit,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Names of every call target in the block, nested bodies included.
    pub fn call_targets(&self) -> BTreeSet<String> {
        let mut targets = BTreeSet::new();
        walk_statements(&self.statements, &mut |s| {
            if let StatementKind::Call { callee, .. } = &s.kind {
                targets.insert(callee.clone());
            }
        });
        targets
    }
}

/// An exit is early when it is a break/continue, sits inside a loop or
/// conditional, or is followed by further statements.
fn detect_early_exit(statements: &[StatementIR]) -> bool {
    let last = statements.len().saturating_sub(1);
    statements.iter().enumerate().any(|(i, s)| {
        let top_level_early = match s.kind {
            StatementKind::Break | StatementKind::Continue => true,
            StatementKind::Return => i < last,
            _ => false,
        };
        let mut nested_exit = false;
        for child in s.children() {
            visit_one(child, &mut |n| nested_exit |= n.is_exit());
        }
        top_level_early || nested_exit
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionIR {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: BlockIR,
    pub calls: BTreeSet<String>,
    pub is_recursive: bool,
    pub is_entry_point: bool,
    pub node: NodeId,
    pub line: usize,
}

impl FunctionIR {
    /// Number of self-call sites in the body.
    pub fn recursive_call_count(&self) -> usize {
        let mut count = 0;
        walk_statements(&self.body.statements, &mut |s| {
            if let StatementKind::Call {
                is_recursive: true,
                ..
            } = s.kind
            {
                count += 1;
            }
        });
        count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramIR {
    pub language: Language,
    pub functions: Vec<FunctionIR>,
    pub top_level: BlockIR,
    pub entry_points: Vec<String>,
}

impl ProgramIR {
    pub fn function(&self, name: &str) -> Option<&FunctionIR> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(kind: StatementKind) -> StatementIR {
        StatementIR::new(kind, NodeId::ROOT, 1)
    }

    fn loop_of(body: Vec<StatementIR>) -> StatementIR {
        stmt(StatementKind::Loop {
            bounds: LoopBounds::input("xs"),
            body,
        })
    }

    #[test]
    fn test_block_depth_counts_nested_loops_and_branches() {
        let inner = stmt(StatementKind::Conditional {
            branches: vec![vec![stmt(StatementKind::Expression)]],
        });
        let block = BlockIR::new(vec![loop_of(vec![loop_of(vec![inner])]), stmt(StatementKind::Return)]);
        assert_eq!(block.max_depth, 3);
        assert!(!block.has_early_exit);
    }

    #[test]
    fn test_early_exit_inside_loop() {
        let block = BlockIR::new(vec![loop_of(vec![stmt(StatementKind::Break)])]);
        assert!(block.has_early_exit);
    }

    #[test]
    fn test_return_before_end_is_early() {
        let block = BlockIR::new(vec![stmt(StatementKind::Return), stmt(StatementKind::Expression)]);
        assert!(block.has_early_exit);
    }

    #[test]
    fn test_call_targets_include_nested() {
        let call = |name: &str| {
            stmt(StatementKind::Call {
                callee: name.to_string(),
                is_recursive: false,
            })
        };
        let block = BlockIR::new(vec![call("a"), loop_of(vec![call("b"), call("a")])]);
        let targets: Vec<String> = block.call_targets().into_iter().collect();
        assert_eq!(targets, vec!["a".to_string(), "b".to_string()]);
    }
}
