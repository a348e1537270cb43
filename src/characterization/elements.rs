//! Named program elements: functions, classes, conditions, imports.
//!
//! Text is copied verbatim from the tree. Budgets are applied later by the
//! assembler, never here.

use serde::{Deserialize, Serialize};

use crate::adapters::{node_kinds, simple_name, EntryPoint, LanguageAdapter, NodeKinds};
use crate::core::{CstNode, SyntaxTree};
use crate::detection::LibraryAnalysisResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionElement {
    pub name: String,
    pub params: Vec<String>,
    pub line: usize,
    pub is_method: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassElement {
    pub name: String,
    pub line: usize,
    pub methods: Vec<String>,
}

/// A decision with the code each branch leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionElement {
    pub condition: String,
    pub outcomes: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeElements {
    pub functions: Vec<FunctionElement>,
    pub classes: Vec<ClassElement>,
    pub conditions: Vec<ConditionElement>,
    pub imports: Vec<String>,
    pub entry_points: Vec<EntryPoint>,
}

impl CodeElements {
    pub fn function_names(&self) -> Vec<String> {
        self.functions.iter().map(|f| f.name.clone()).collect()
    }
}

pub fn extract_elements(
    tree: &SyntaxTree,
    adapter: Option<&dyn LanguageAdapter>,
    libraries: &LibraryAnalysisResult,
    entry_points: &[EntryPoint],
) -> CodeElements {
    let imports = libraries.libraries.iter().map(|lib| lib.name.clone()).collect();
    let Some(kinds) = node_kinds(tree.language()) else {
        return CodeElements {
            imports,
            entry_points: entry_points.to_vec(),
            ..CodeElements::default()
        };
    };
    let root = tree.root();

    let functions = root
        .descendants()
        .filter(|node| node.is_named() && kinds.is_function(node.kind()))
        .map(|node| FunctionElement {
            name: function_name(node, adapter).unwrap_or_else(|| "<anonymous>".to_string()),
            params: adapter.map(|a| a.parameters(node)).unwrap_or_default(),
            line: node.start_line(),
            is_method: node.has_ancestor_kind(kinds.method_scopes),
        })
        .collect();

    let classes = root
        .descendants()
        .filter(|node| node.is_named() && kinds.is_class(node.kind()))
        .map(|class| ClassElement {
            name: class
                .child_by_field("name")
                .map(|n| n.text().to_string())
                .unwrap_or_else(|| "<anonymous>".to_string()),
            line: class.start_line(),
            methods: methods_of(class, kinds, adapter),
        })
        .collect();

    let conditions = root
        .descendants()
        .filter(|node| node.is_named() && kinds.is_conditional(node.kind()))
        .filter_map(|node| condition_element(node, adapter))
        .collect();

    CodeElements {
        functions,
        classes,
        conditions,
        imports,
        entry_points: entry_points.to_vec(),
    }
}

fn function_name(node: CstNode<'_>, adapter: Option<&dyn LanguageAdapter>) -> Option<String> {
    match adapter {
        Some(adapter) => adapter.function_name(node),
        None => node
            .child_by_field("name")
            .or_else(|| node.child_by_field("declarator"))
            .map(|name| simple_name(name.text())),
    }
}

/// Named functions whose nearest enclosing class is `class`.
fn methods_of(
    class: CstNode<'_>,
    kinds: &NodeKinds,
    adapter: Option<&dyn LanguageAdapter>,
) -> Vec<String> {
    class
        .descendants()
        .filter(|node| node.is_named() && kinds.is_function(node.kind()))
        .filter(|node| {
            node.ancestors()
                .find(|a| kinds.is_class(a.kind()))
                .is_some_and(|owner| owner == class)
        })
        .filter_map(|node| function_name(node, adapter))
        .collect()
}

fn condition_element(
    node: CstNode<'_>,
    adapter: Option<&dyn LanguageAdapter>,
) -> Option<ConditionElement> {
    let (condition, branches) = match adapter {
        Some(adapter) => (adapter.condition(node), adapter.conditional_branches(node)),
        None => (
            node.child_by_field("condition"),
            node.children_by_field("consequence")
                .chain(node.children_by_field("alternative"))
                .collect(),
        ),
    };
    let condition = condition?;
    Some(ConditionElement {
        condition: condition.text().trim().to_string(),
        outcomes: branches
            .iter()
            .map(|branch| branch.text().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect(),
        line: node.start_line(),
    })
}
