//! Language adapters.
//!
//! A [`LanguageAdapter`] maps one grammar's productions onto the fixed set of
//! capabilities the IR builder needs. Most capabilities have table-driven
//! defaults over [`NodeKinds`]; adapters override the grammar-specific shapes.

pub mod go;
pub mod java;
pub mod javascript;
pub mod kinds;
pub mod python;
pub mod rust;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{CstNode, Language};
use crate::ir::loop_bounds::{classify_loop_header, collection_iteration};
use crate::ir::LoopBounds;

pub use kinds::{node_kinds, NodeKinds};

static SIZE_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\.length\b|\.size\(\)|\.len\(\)|\blen\(|\.count\b|\.\.\.|\bn\b|\bsize\b|\blength\b)")
        .unwrap()
});

const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "shorthand_property_identifier_pattern",
    "simple_identifier",
];

const RECEIVER_NAMES: &[&str] = &["self", "cls", "this"];

/// Statement-level role of a CST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Loop,
    Function,
    Conditional,
    Allocation,
    Call,
    Return,
    Break,
    Continue,
    Assignment,
    Declaration,
    Expression,
}

/// What drives a loop's iteration count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopHeader {
    /// Condition text, including initializer and update for C-style loops
    Condition(String),
    /// The iterable of a for-each loop
    Iteration(String),
    /// No condition at all (`loop {}`, `for {}`)
    Infinite,
}

impl LoopHeader {
    pub fn bounds(&self) -> LoopBounds {
        match self {
            LoopHeader::Condition(text) => classify_loop_header(text),
            LoopHeader::Iteration(iterable) => collection_iteration(iterable),
            LoopHeader::Infinite => LoopBounds::unknown(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryPointKind {
    /// `main` function recognized by the runtime
    MainFunction,
    /// `if __name__ == "__main__"`, `require.main === module`
    MainGuard,
    /// Call statement at module level
    TopLevelCall,
    /// Server start (`app.listen`, `ListenAndServe`)
    ServerListen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub name: String,
    pub kind: EntryPointKind,
    pub line: usize,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>, kind: EntryPointKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            line,
        }
    }
}

pub trait LanguageAdapter: Send + Sync {
    fn language(&self) -> Language;

    fn kinds(&self) -> &'static NodeKinds;

    fn classify(&self, node: CstNode<'_>) -> Option<NodeClass> {
        if !node.is_named() || node.is_error() {
            return None;
        }
        let kinds = self.kinds();
        let kind = node.kind();
        let class = if kinds.is_function(kind) {
            NodeClass::Function
        } else if kinds.is_loop(kind) {
            NodeClass::Loop
        } else if kinds.is_conditional(kind) {
            NodeClass::Conditional
        } else if self.is_allocation(node) {
            NodeClass::Allocation
        } else if kinds.calls.contains(&kind) {
            NodeClass::Call
        } else if kinds.returns.contains(&kind) {
            NodeClass::Return
        } else if kinds.breaks.contains(&kind) {
            NodeClass::Break
        } else if kinds.continues.contains(&kind) {
            NodeClass::Continue
        } else if kinds.is_mutation(kind) {
            NodeClass::Assignment
        } else if kinds.declarations.contains(&kind) {
            NodeClass::Declaration
        } else if kinds.expressions.contains(&kind) {
            NodeClass::Expression
        } else {
            return None;
        };
        Some(class)
    }

    fn is_allocation(&self, node: CstNode<'_>) -> bool {
        self.kinds().allocations.contains(&node.kind())
    }

    /// Whether an allocation grows with the input.
    fn is_size_dependent_allocation(&self, node: CstNode<'_>) -> bool {
        SIZE_HINT.is_match(node.text())
    }

    fn extract_loops<'t>(&self, root: CstNode<'t>) -> Vec<CstNode<'t>> {
        self.extract(root, NodeClass::Loop)
    }

    fn extract_functions<'t>(&self, root: CstNode<'t>) -> Vec<CstNode<'t>> {
        self.extract(root, NodeClass::Function)
    }

    fn extract_conditionals<'t>(&self, root: CstNode<'t>) -> Vec<CstNode<'t>> {
        self.extract(root, NodeClass::Conditional)
    }

    fn extract_allocations<'t>(&self, root: CstNode<'t>) -> Vec<CstNode<'t>> {
        self.extract(root, NodeClass::Allocation)
    }

    fn extract<'t>(&self, root: CstNode<'t>, class: NodeClass) -> Vec<CstNode<'t>> {
        root.descendants()
            .filter(|node| self.classify(*node) == Some(class))
            .collect()
    }

    /// Declared name, or the name an anonymous function is bound to.
    fn function_name(&self, function: CstNode<'_>) -> Option<String> {
        if let Some(name) = function.child_by_field("name") {
            return Some(name.text().to_string());
        }
        let parent = function.parent()?;
        let binding = ["name", "left", "pattern", "key"]
            .iter()
            .find_map(|field| parent.child_by_field(field))?;
        if binding == function {
            None
        } else {
            Some(simple_name(binding.text()))
        }
    }

    fn parameters(&self, function: CstNode<'_>) -> Vec<String> {
        let Some(list) = function
            .child_by_field("parameters")
            .or_else(|| function.child_by_field("parameter"))
        else {
            return Vec::new();
        };
        if IDENTIFIER_KINDS.contains(&list.kind()) {
            return vec![list.text().to_string()];
        }
        list.named_children()
            .filter(|child| !self.kinds().comments.contains(&child.kind()))
            .filter_map(pattern_name)
            .filter(|name| !RECEIVER_NAMES.contains(&name.as_str()))
            .collect()
    }

    fn function_body<'t>(&self, function: CstNode<'t>) -> Option<CstNode<'t>> {
        function.child_by_field("body")
    }

    fn loop_header(&self, node: CstNode<'_>) -> LoopHeader;

    fn loop_body<'t>(&self, node: CstNode<'t>) -> Option<CstNode<'t>> {
        node.child_by_field("body")
    }

    /// Condition node of a conditional, when the grammar names one.
    fn condition<'t>(&self, node: CstNode<'t>) -> Option<CstNode<'t>> {
        node.child_by_field("condition")
            .or_else(|| node.child_by_field("value"))
    }

    /// One node per branch; each is lowered as its own statement list.
    fn conditional_branches<'t>(&self, node: CstNode<'t>) -> Vec<CstNode<'t>> {
        let mut branches: Vec<CstNode<'t>> = node
            .children_by_field("consequence")
            .chain(node.children_by_field("alternative"))
            .collect();
        if branches.is_empty() {
            if let Some(body) = node.child_by_field("body") {
                branches = body.named_children().collect();
            }
        }
        if branches.is_empty() {
            let condition = self.condition(node);
            branches = node
                .named_children()
                .filter(|child| Some(*child) != condition)
                .collect();
        }
        branches
    }

    /// Resolved simple name of the called function.
    fn call_target(&self, call: CstNode<'_>) -> Option<String> {
        let callee = call
            .child_by_field("function")
            .or_else(|| call.child_by_field("macro"))?;
        let member = ["property", "attribute", "field", "name"]
            .iter()
            .find_map(|field| callee.child_by_field(field))
            .unwrap_or(callee);
        let name = simple_name(member.text());
        (!name.is_empty()).then_some(name)
    }

    /// Receiver text of a method call (`xs` in `xs.map(f)`).
    fn call_receiver(&self, call: CstNode<'_>) -> Option<String> {
        let callee = call.child_by_field("function")?;
        ["object", "operand", "value"]
            .iter()
            .find_map(|field| callee.child_by_field(field))
            .map(|receiver| receiver.text().to_string())
    }

    fn call_arguments<'t>(&self, call: CstNode<'t>) -> Option<CstNode<'t>> {
        call.child_by_field("arguments")
    }

    fn detect_entry_points(&self, root: CstNode<'_>) -> Vec<EntryPoint>;
}

/// Last path segment of a callee or binding, without generics or call parens.
pub fn simple_name(text: &str) -> String {
    let head = text
        .split(|c| c == '<' || c == '(' || c == '!')
        .next()
        .unwrap_or(text)
        .trim_end_matches(|c| c == ':' || c == '.');
    head.rsplit(|c| c == '.' || c == ':')
        .next()
        .unwrap_or(head)
        .trim()
        .to_string()
}

/// Name bound by a parameter or pattern node.
pub fn pattern_name(node: CstNode<'_>) -> Option<String> {
    if IDENTIFIER_KINDS.contains(&node.kind()) {
        return Some(node.text().to_string());
    }
    for field in ["name", "pattern", "left"] {
        if let Some(child) = node.child_by_field(field) {
            return pattern_name(child);
        }
    }
    node.named_children().find_map(pattern_name)
}

/// Module-level call statements, the common shape of script entry points.
pub(crate) fn top_level_calls(
    adapter: &dyn LanguageAdapter,
    root: CstNode<'_>,
) -> Vec<EntryPoint> {
    root.named_children()
        .filter(|stmt| adapter.kinds().expressions.contains(&stmt.kind()))
        .filter_map(|stmt| stmt.named_children().next())
        .filter(|expr| adapter.kinds().calls.contains(&expr.kind()))
        .filter_map(|call| {
            let name = adapter.call_target(call)?;
            let kind = if matches!(name.as_str(), "listen" | "ListenAndServe" | "run_forever") {
                EntryPointKind::ServerListen
            } else {
                EntryPointKind::TopLevelCall
            };
            Some(EntryPoint::new(name, kind, call.start_line()))
        })
        .collect()
}

type AdapterFactory = fn() -> Box<dyn LanguageAdapter>;

static ADAPTER_MAP: &[(Language, AdapterFactory)] = &[
    (Language::JavaScript, || {
        Box::new(javascript::JavaScriptAdapter::javascript())
    }),
    (Language::TypeScript, || {
        Box::new(javascript::JavaScriptAdapter::typescript())
    }),
    (Language::Python, || Box::new(python::PythonAdapter)),
    (Language::Go, || Box::new(go::GoAdapter)),
    (Language::Java, || Box::new(java::JavaAdapter)),
    (Language::Rust, || Box::new(rust::RustAdapter)),
];

/// Fresh adapter for `language`, if one is registered.
pub fn get_adapter(language: Language) -> Option<Box<dyn LanguageAdapter>> {
    ADAPTER_MAP
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, factory)| factory())
}

/// Adapter lookup table built once per pipeline.
pub struct AdapterRegistry {
    adapters: HashMap<Language, Box<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(&mut self, adapter: Box<dyn LanguageAdapter>) {
        self.adapters.insert(adapter.language(), adapter);
    }

    pub fn get(&self, language: Language) -> Option<&dyn LanguageAdapter> {
        self.adapters.get(&language).map(|adapter| adapter.as_ref())
    }

    pub fn supports(&self, language: Language) -> bool {
        self.adapters.contains_key(&language)
    }

    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.adapters.keys().copied().collect();
        languages.sort();
        languages
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (_, factory) in ADAPTER_MAP {
            registry.register(factory());
        }
        registry
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
