//! CST providers.
//!
//! The characterization core only depends on [`ParserProvider`]. The bundled
//! [`TreeSitterProvider`] converts tree-sitter trees into the arena-backed
//! [`SyntaxTree`], keeping anonymous tokens, field names and error nodes.

use tree_sitter::{Parser, TreeCursor};

use super::cst::{NodeSpec, SyntaxTree, TreeBuilder};
use super::Language;
use crate::errors::{Error, Result};

/// Source of lossless syntax trees for a declared language.
pub trait ParserProvider: Send + Sync {
    /// Whether a tree can be produced for `language` at all.
    fn supports(&self, language: Language) -> bool;

    /// Parse `source`. `Err` means no CST is available for this input.
    fn parse(&self, source: &str, language: Language) -> Result<SyntaxTree>;
}

/// Grammar-backed provider for the bundled tree-sitter languages.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterProvider;

impl TreeSitterProvider {
    pub fn new() -> Self {
        Self
    }

    fn grammar(language: Language) -> Option<tree_sitter::Language> {
        let grammar: tree_sitter::Language = match language {
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::C => tree_sitter_c::LANGUAGE.into(),
            _ => return None,
        };
        Some(grammar)
    }
}

impl ParserProvider for TreeSitterProvider {
    fn supports(&self, language: Language) -> bool {
        Self::grammar(language).is_some()
    }

    fn parse(&self, source: &str, language: Language) -> Result<SyntaxTree> {
        let grammar = Self::grammar(language).ok_or(Error::UnsupportedLanguage(language))?;
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| Error::parse(language, format!("failed to load grammar: {e}")))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::parse(language, "parser returned no tree"))?;

        let mut builder = TreeBuilder::new(source, language);
        let mut cursor = tree.walk();
        convert(&mut cursor, &mut builder)?;
        builder.finish()
    }
}

/// Copy the tree under `cursor` into `builder` in document order.
///
/// Walks with the cursor and an explicit stack of parent ranges, so input
/// nesting never maps onto call depth. Child ranges are clamped into the
/// parent range; tree-sitter occasionally reports zero-width missing tokens
/// just past their parent's end.
fn convert(cursor: &mut TreeCursor<'_>, builder: &mut TreeBuilder) -> Result<()> {
    let mut parents: Vec<(usize, usize)> = Vec::new();
    loop {
        let node = cursor.node();
        let (mut start, mut end) = (node.start_byte(), node.end_byte());
        if let Some(&(parent_start, parent_end)) = parents.last() {
            start = start.clamp(parent_start, parent_end);
            end = end.clamp(start, parent_end);
        }

        let mut spec = NodeSpec::new(node.kind(), start, end);
        if !node.is_named() {
            spec = spec.anonymous();
        }
        if node.is_missing() {
            spec = spec.missing();
        }
        if let Some(field) = cursor.field_name() {
            spec = spec.field(field);
        }
        builder.open(spec)?;

        if cursor.goto_first_child() {
            parents.push((start, end));
            continue;
        }
        builder.close()?;

        // Climb until a sibling is found, closing every finished parent
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return Ok(());
            }
            parents.pop();
            builder.close()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_languages() {
        let provider = TreeSitterProvider::new();
        assert!(provider.supports(Language::Python));
        assert!(provider.supports(Language::C));
        assert!(!provider.supports(Language::Php));
    }

    #[test]
    fn test_unsupported_language_errors() {
        let provider = TreeSitterProvider::new();
        let err = provider.parse("<?php echo 1;", Language::Php).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(Language::Php)));
    }

    #[test]
    fn test_parse_python_keeps_fields() {
        let provider = TreeSitterProvider::new();
        let tree = provider
            .parse("def add(a, b):\n    return a + b\n", Language::Python)
            .unwrap();
        let func = tree
            .root()
            .descendants()
            .find(|n| n.kind() == "function_definition")
            .unwrap();
        assert_eq!(func.child_by_field("name").unwrap().text(), "add");
        assert_eq!(tree.error_count(), 0);
    }

    #[test]
    fn test_deep_nesting_is_rejected_without_overflow() {
        let depth = 5_000;
        let source = format!("const x = {}1{};", "[".repeat(depth), "]".repeat(depth));
        let err = TreeSitterProvider::new()
            .parse(&source, Language::JavaScript)
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err}");
        assert!(err.to_string().contains("nested deeper than"));
    }

    #[test]
    fn test_moderate_nesting_converts() {
        let depth = 100;
        let source = format!("const x = {}1{};", "[".repeat(depth), "]".repeat(depth));
        let tree = TreeSitterProvider::new()
            .parse(&source, Language::JavaScript)
            .unwrap();
        assert!(tree.root().text().contains("[[1]]"));
        assert_eq!(
            tree.root().descendants().filter(|n| n.kind() == "array").count(),
            depth
        );
    }

    #[test]
    fn test_every_node_text_matches_source_slice() {
        let provider = TreeSitterProvider::new();
        let source = "function f(xs) {\n  // a long comment that must survive intact\n  return xs.map(x => x * 2);\n}\n";
        let tree = provider.parse(source, Language::JavaScript).unwrap();
        for node in tree.root().descendants() {
            let span = node.span();
            assert_eq!(node.text(), &source[span.start_byte..span.end_byte]);
            if let Some(parent) = node.parent() {
                assert!(parent.span().contains(&span));
            }
        }
    }
}
