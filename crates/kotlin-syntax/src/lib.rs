//! Read-only Kotlin syntax tree access for compose-guard.
//!
//! This crate is the boundary to the host parser: it wraps the tree-sitter
//! Kotlin grammar and exposes the pieces the analyses need: spans, tree
//! queries, control-construct classification, Kotlin declaration/call shapes,
//! and a per-file symbol table. The tree is owned here and read-only to
//! everything downstream; analyses walk it, they never copy or mutate it.
//!
//! # Example
//!
//! ```
//! use kotlin_syntax::SyntaxTree;
//!
//! let tree = SyntaxTree::parse("fun greet() { println(\"hi\") }").unwrap();
//! let functions = kotlin_syntax::functions_in(tree.root());
//! assert_eq!(functions.len(), 1);
//! ```

mod calls;
mod decl;
mod error;
mod kind;
mod span;
mod symbols;
mod tree;

pub use calls::{calls_in, CallExpr, ValueArg};
pub use decl::{functions_in, properties_in, FunctionDecl, Parameter, PropertyDecl};
pub use error::ParseError;
pub use kind::{
    control_construct, is_interpolation, is_lambda, is_literal, is_string_literal,
    ControlConstruct,
};
pub use span::{LineCol, LineIndex, Span};
pub use symbols::{Binding, Mutability, SymbolTable};
pub use tree::{
    ancestors, descendants, descendants_matching, descendants_of_kind, find_first, named_children,
};

use tree_sitter::{Node, Parser, Tree};

/// An owned, parsed Kotlin source file.
///
/// The underlying tree-sitter tree is kept alive for the lifetime of this
/// value; [`Node`] handles borrowed from [`SyntaxTree::root`] stay valid as
/// long as the tree does.
pub struct SyntaxTree {
    source: String,
    tree: Tree,
}

impl SyntaxTree {
    /// Parses Kotlin source into a syntax tree.
    ///
    /// Parsing is delegated entirely to the tree-sitter grammar; a tree is
    /// produced even for source containing syntax errors (see
    /// [`SyntaxTree::has_errors`]).
    pub fn parse(source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_kotlin_ng::LANGUAGE.into())
            .map_err(|e| ParseError::Grammar(e.to_string()))?;

        let tree = parser.parse(&source, None).ok_or(ParseError::Cancelled)?;
        Ok(Self { source, tree })
    }

    /// Returns the root node of the tree.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns the original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the source text covered by a node.
    pub fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    /// Returns true if the grammar reported any syntax errors.
    ///
    /// Analyses still run over erroneous trees; unrecognized regions simply
    /// yield no findings.
    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("source_len", &self.source.len())
            .field("has_errors", &self.has_errors())
            .finish()
    }
}

/// Returns the source text covered by a node.
///
/// Free-function form for call sites that carry the source separately from
/// the tree.
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_function() {
        let tree = SyntaxTree::parse("fun main() { println(\"hello\") }").unwrap();
        assert!(!tree.has_errors());
        assert_eq!(tree.root().kind(), "source_file");
    }

    #[test]
    fn parse_tolerates_errors() {
        let tree = SyntaxTree::parse("fun broken( {").unwrap();
        assert!(tree.has_errors());
    }

    #[test]
    fn text_of_node() {
        let tree = SyntaxTree::parse("fun f() {}").unwrap();
        assert_eq!(tree.text(tree.root()), "fun f() {}");
    }

    // Pins the grammar shapes everything downstream assumes.
    #[test]
    fn grammar_shapes() {
        let tree = SyntaxTree::parse(
            "fun f(x: Int) {\n    val label = \"v: $x\"\n    if (x > 0) g() else if (x < 0) h()\n    vm.load(x)\n}",
        )
        .unwrap();
        let root = tree.root();
        assert!(!tree.has_errors());

        // Names lex as `identifier`, numbers as `number_literal`.
        assert!(find_first(root, |n| n.kind() == "identifier").is_some());
        assert!(find_first(root, |n| n.kind() == "number_literal").is_some());
        assert!(find_first(root, |n| n.kind() == "simple_identifier").is_none());

        // Statements sit directly inside `block`, with no wrapper node.
        let block = find_first(root, |n| n.kind() == "block").unwrap();
        assert_eq!(block.named_child_count(), 3);

        // `$x` is an interpolation holding the identifier.
        let interp = find_first(root, |n| n.kind() == "interpolation").unwrap();
        assert_eq!(interp.named_child(0).unwrap().kind(), "identifier");

        // `else if` hangs directly off the outer `if_expression`.
        let outer_if = find_first(root, |n| n.kind() == "if_expression").unwrap();
        assert!(named_children(outer_if)
            .iter()
            .any(|n| n.kind() == "if_expression"));

        // Arguments hang off the call with no `call_suffix` layer.
        let call = find_first(root, |n| {
            n.kind() == "call_expression" && tree.text(n).starts_with("vm.load")
        })
        .unwrap();
        assert!(named_children(call)
            .iter()
            .any(|n| n.kind() == "value_arguments"));
    }
}
