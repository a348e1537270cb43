//! Lossless concrete syntax tree.
//!
//! A [`SyntaxTree`] owns the exact source text plus an arena of nodes linked
//! by index. Node text is never stored separately: [`CstNode::text`] slices
//! the owned source by the node's byte span, so every node's text is the
//! verbatim substring `source[start_byte..end_byte]` with no length cap.
//!
//! Trees are produced either by a grammar-backed provider
//! ([`super::parsing::TreeSitterProvider`]) or by hand through
//! [`TreeBuilder`], which rejects spans that escape their parent.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Language;
use crate::errors::{Error, Result};

/// Index of a node inside its [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Zero-based row/column position (column counted in bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }

    /// Whether `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: Cow<'static, str>,
    is_named: bool,
    is_missing: bool,
    field_name: Option<Cow<'static, str>>,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable, lossless parse tree for one snippet.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    language: Language,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    pub fn root(&self) -> CstNode<'_> {
        CstNode {
            tree: self,
            id: NodeId::ROOT,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<CstNode<'_>> {
        (id.index() < self.nodes.len()).then_some(CstNode { tree: self, id })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn line_count(&self) -> usize {
        self.source.lines().count()
    }

    /// Count of `ERROR` and missing nodes left by error recovery.
    pub fn error_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind == "ERROR" || n.is_missing)
            .count()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Borrowed handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct CstNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> CstNode<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> &'t str {
        &self.tree.data(self.id).kind
    }

    pub fn is_named(&self) -> bool {
        self.tree.data(self.id).is_named
    }

    pub fn is_missing(&self) -> bool {
        self.tree.data(self.id).is_missing
    }

    pub fn is_error(&self) -> bool {
        self.kind() == "ERROR" || self.is_missing()
    }

    /// Field name under which this node hangs off its parent.
    pub fn field_name(&self) -> Option<&'t str> {
        self.tree.data(self.id).field_name.as_deref()
    }

    pub fn span(&self) -> Span {
        self.tree.data(self.id).span
    }

    pub fn start_byte(&self) -> usize {
        self.span().start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.span().end_byte
    }

    /// One-based line of the first byte.
    pub fn start_line(&self) -> usize {
        self.span().start.row + 1
    }

    /// One-based line of the last byte.
    pub fn end_line(&self) -> usize {
        self.span().end.row + 1
    }

    /// Verbatim source text of this node.
    pub fn text(&self) -> &'t str {
        let span = self.span();
        &self.tree.source[span.start_byte..span.end_byte]
    }

    pub fn parent(&self) -> Option<CstNode<'t>> {
        self.tree.data(self.id).parent.map(|id| CstNode {
            tree: self.tree,
            id,
        })
    }

    pub fn child_count(&self) -> usize {
        self.tree.data(self.id).children.len()
    }

    pub fn child(&self, index: usize) -> Option<CstNode<'t>> {
        self.tree
            .data(self.id)
            .children
            .get(index)
            .map(|&id| CstNode {
                tree: self.tree,
                id,
            })
    }

    pub fn children(&self) -> impl Iterator<Item = CstNode<'t>> + 't {
        let tree = self.tree;
        tree.data(self.id)
            .children
            .iter()
            .map(move |&id| CstNode { tree, id })
    }

    pub fn named_children(&self) -> impl Iterator<Item = CstNode<'t>> + 't {
        self.children().filter(|c| c.is_named())
    }

    pub fn child_by_field(&self, field: &str) -> Option<CstNode<'t>> {
        self.children().find(|c| c.field_name() == Some(field))
    }

    pub fn children_by_field<'f>(&self, field: &'f str) -> impl Iterator<Item = CstNode<'t>> + 'f
    where
        't: 'f,
    {
        self.children().filter(move |c| c.field_name() == Some(field))
    }

    pub fn first_child_of_kind(&self, kinds: &[&str]) -> Option<CstNode<'t>> {
        self.children().find(|c| kinds.contains(&c.kind()))
    }

    /// Pre-order traversal including this node.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            stack: vec![self.id],
        }
    }

    /// Parent chain, nearest first, excluding this node.
    pub fn ancestors(&self) -> impl Iterator<Item = CstNode<'t>> + 't {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn has_ancestor_kind(&self, kinds: &[&str]) -> bool {
        self.ancestors().any(|a| kinds.contains(&a.kind()))
    }
}

impl PartialEq for CstNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for CstNode<'_> {}

impl fmt::Debug for CstNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        write!(
            f,
            "{}[{}..{}]",
            self.kind(),
            span.start_byte,
            span.end_byte
        )
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = CstNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = &self.tree.data(id).children;
        self.stack.extend(children.iter().rev().copied());
        Some(CstNode {
            tree: self.tree,
            id,
        })
    }
}

/// Description of one node handed to [`TreeBuilder::open`].
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub kind: Cow<'static, str>,
    pub start_byte: usize,
    pub end_byte: usize,
    pub is_named: bool,
    pub is_missing: bool,
    pub field_name: Option<Cow<'static, str>>,
}

impl NodeSpec {
    pub fn new(kind: impl Into<Cow<'static, str>>, start_byte: usize, end_byte: usize) -> Self {
        Self {
            kind: kind.into(),
            start_byte,
            end_byte,
            is_named: true,
            is_missing: false,
            field_name: None,
        }
    }

    pub fn anonymous(mut self) -> Self {
        self.is_named = false;
        self
    }

    pub fn missing(mut self) -> Self {
        self.is_missing = true;
        self
    }

    pub fn field(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.field_name = Some(name.into());
        self
    }
}

/// Deepest nesting a [`SyntaxTree`] may have, root at depth 1. Tree passes
/// recurse per level, so deeper input is refused rather than walked.
pub const MAX_TREE_DEPTH: usize = 256;

/// Incremental constructor enforcing the CST invariants.
///
/// Nodes are opened and closed in document order; the first opened node is
/// the root. A child whose span is not contained in its parent's span, or a
/// span that is out of bounds or splits a UTF-8 character, is rejected, as is
/// a node deeper than [`MAX_TREE_DEPTH`].
#[derive(Debug)]
pub struct TreeBuilder {
    source: String,
    language: Language,
    line_starts: Vec<usize>,
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new(source: impl Into<String>, language: Language) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            language,
            line_starts,
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Open a node as a child of the currently open node.
    pub fn open(&mut self, spec: NodeSpec) -> Result<NodeId> {
        self.check_bounds(&spec)?;
        if self.stack.len() >= MAX_TREE_DEPTH {
            return Err(Error::parse(
                self.language,
                format!("syntax tree nested deeper than {MAX_TREE_DEPTH} levels"),
            ));
        }
        let parent = self.stack.last().copied();

        match parent {
            None if !self.nodes.is_empty() => {
                return Err(Error::MalformedTree(format!(
                    "second root node '{}' opened",
                    spec.kind
                )));
            }
            Some(parent_id) => {
                let parent_span = self.nodes[parent_id.index()].span;
                if spec.start_byte < parent_span.start_byte || spec.end_byte > parent_span.end_byte
                {
                    return Err(Error::MalformedTree(format!(
                        "node '{}' [{}..{}] escapes parent '{}' [{}..{}]",
                        spec.kind,
                        spec.start_byte,
                        spec.end_byte,
                        self.nodes[parent_id.index()].kind,
                        parent_span.start_byte,
                        parent_span.end_byte
                    )));
                }
            }
            None => {}
        }

        let id = NodeId(self.nodes.len() as u32);
        let span = Span {
            start_byte: spec.start_byte,
            end_byte: spec.end_byte,
            start: self.position_of(spec.start_byte),
            end: self.position_of(spec.end_byte),
        };
        self.nodes.push(NodeData {
            kind: spec.kind,
            is_named: spec.is_named,
            is_missing: spec.is_missing,
            field_name: spec.field_name,
            span,
            parent,
            children: Vec::new(),
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.index()].children.push(id);
        }
        self.stack.push(id);
        Ok(id)
    }

    /// Close the most recently opened node.
    pub fn close(&mut self) -> Result<()> {
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| Error::MalformedTree("close() without open node".to_string()))
    }

    /// Open and immediately close a node with no children.
    pub fn leaf(&mut self, spec: NodeSpec) -> Result<NodeId> {
        let id = self.open(spec)?;
        self.close()?;
        Ok(id)
    }

    pub fn finish(self) -> Result<SyntaxTree> {
        if self.nodes.is_empty() {
            return Err(Error::MalformedTree("tree has no root".to_string()));
        }
        if !self.stack.is_empty() {
            return Err(Error::MalformedTree(format!(
                "{} node(s) left open",
                self.stack.len()
            )));
        }
        Ok(SyntaxTree {
            source: self.source,
            language: self.language,
            nodes: self.nodes,
        })
    }

    fn check_bounds(&self, spec: &NodeSpec) -> Result<()> {
        let valid = spec.start_byte <= spec.end_byte
            && spec.end_byte <= self.source.len()
            && self.source.is_char_boundary(spec.start_byte)
            && self.source.is_char_boundary(spec.end_byte);
        if valid {
            Ok(())
        } else {
            Err(Error::MalformedTree(format!(
                "node '{}' has invalid span [{}..{}] for source of {} bytes",
                spec.kind,
                spec.start_byte,
                spec.end_byte,
                self.source.len()
            )))
        }
    }

    fn position_of(&self, byte: usize) -> Position {
        let row = self.line_starts.partition_point(|&start| start <= byte) - 1;
        Position {
            row,
            column: byte - self.line_starts[row],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> SyntaxTree {
        // "let x = 1;\nfoo(x);"
        let source = "let x = 1;\nfoo(x);";
        let mut b = TreeBuilder::new(source, Language::JavaScript);
        b.open(NodeSpec::new("program", 0, source.len())).unwrap();
        b.open(NodeSpec::new("lexical_declaration", 0, 10)).unwrap();
        b.leaf(NodeSpec::new("let", 0, 3).anonymous()).unwrap();
        b.open(NodeSpec::new("variable_declarator", 4, 9)).unwrap();
        b.leaf(NodeSpec::new("identifier", 4, 5).field("name")).unwrap();
        b.leaf(NodeSpec::new("number", 8, 9).field("value")).unwrap();
        b.close().unwrap();
        b.close().unwrap();
        b.open(NodeSpec::new("expression_statement", 11, 18)).unwrap();
        b.open(NodeSpec::new("call_expression", 11, 17)).unwrap();
        b.leaf(NodeSpec::new("identifier", 11, 14).field("function"))
            .unwrap();
        b.leaf(NodeSpec::new("arguments", 14, 17).field("arguments"))
            .unwrap();
        b.close().unwrap();
        b.close().unwrap();
        b.close().unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_text_is_verbatim_slice() {
        let tree = sample_tree();
        for node in tree.root().descendants() {
            let span = node.span();
            assert_eq!(node.text(), &tree.source()[span.start_byte..span.end_byte]);
        }
        assert_eq!(tree.root().text(), "let x = 1;\nfoo(x);");
    }

    #[test]
    fn test_positions_follow_lines() {
        let tree = sample_tree();
        let call = tree
            .root()
            .descendants()
            .find(|n| n.kind() == "call_expression")
            .unwrap();
        assert_eq!(call.span().start, Position { row: 1, column: 0 });
        assert_eq!(call.start_line(), 2);
    }

    #[test]
    fn test_field_lookup_and_parent_links() {
        let tree = sample_tree();
        let declarator = tree
            .root()
            .descendants()
            .find(|n| n.kind() == "variable_declarator")
            .unwrap();
        let name = declarator.child_by_field("name").unwrap();
        assert_eq!(name.text(), "x");
        assert_eq!(name.parent(), Some(declarator));
        assert!(name.has_ancestor_kind(&["program"]));
    }

    #[test]
    fn test_descendants_preorder() {
        let tree = sample_tree();
        let kinds: Vec<&str> = tree.root().descendants().map(|n| n.kind()).collect();
        assert_eq!(kinds[0], "program");
        assert_eq!(kinds[1], "lexical_declaration");
        assert_eq!(kinds[2], "let");
        assert_eq!(kinds.last(), Some(&"arguments"));
    }

    #[test]
    fn test_child_escaping_parent_is_rejected() {
        let mut b = TreeBuilder::new("abcdef", Language::Unknown);
        b.open(NodeSpec::new("root", 0, 6)).unwrap();
        b.open(NodeSpec::new("inner", 1, 3)).unwrap();
        let err = b.open(NodeSpec::new("bad", 2, 5)).unwrap_err();
        assert!(matches!(err, Error::MalformedTree(_)));
    }

    #[test]
    fn test_span_splitting_utf8_is_rejected() {
        let mut b = TreeBuilder::new("é", Language::Unknown);
        assert!(b.open(NodeSpec::new("root", 0, 1)).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let source = "x";
        let mut builder = TreeBuilder::new(source, Language::Python);
        for _ in 0..MAX_TREE_DEPTH {
            builder.open(NodeSpec::new("wrap", 0, 1)).unwrap();
        }
        let err = builder.open(NodeSpec::new("wrap", 0, 1)).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));

        for _ in 0..MAX_TREE_DEPTH {
            builder.close().unwrap();
        }
        assert_eq!(builder.finish().unwrap().node_count(), MAX_TREE_DEPTH);
    }

    #[test]
    fn test_unclosed_nodes_fail_finish() {
        let mut b = TreeBuilder::new("x", Language::Unknown);
        b.open(NodeSpec::new("root", 0, 1)).unwrap();
        assert!(b.finish().is_err());
    }

    #[test]
    fn test_error_count() {
        let mut b = TreeBuilder::new("f(", Language::JavaScript);
        b.open(NodeSpec::new("program", 0, 2)).unwrap();
        b.leaf(NodeSpec::new("ERROR", 0, 2)).unwrap();
        b.leaf(NodeSpec::new(")", 2, 2).anonymous().missing())
            .unwrap();
        b.close().unwrap();
        let tree = b.finish().unwrap();
        assert_eq!(tree.error_count(), 2);
    }
}
