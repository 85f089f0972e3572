//! Declaration shapes: functions, parameters, properties.

use crate::span::Span;
use crate::tree::{descendants_of_kind, named_children};
use tree_sitter::Node;

/// A view over a `function_declaration` node.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDecl<'t> {
    /// The underlying declaration node.
    pub node: Node<'t>,
}

/// A single declared function parameter.
#[derive(Debug, Clone)]
pub struct Parameter<'t> {
    /// The parameter name.
    pub name: String,
    /// The declared type, as source text (empty when absent).
    pub type_text: String,
    /// The name token node.
    pub name_node: Node<'t>,
    /// The whole parameter node.
    pub node: Node<'t>,
}

impl<'t> FunctionDecl<'t> {
    /// Wraps a node if it is a function declaration.
    pub fn cast(node: Node<'t>) -> Option<Self> {
        (node.kind() == "function_declaration").then_some(Self { node })
    }

    /// Returns the declared name token.
    pub fn name_node(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("name")
    }

    /// Returns the declared name.
    pub fn name(&self, source: &str) -> Option<String> {
        self.name_node().map(|n| source[n.byte_range()].to_string())
    }

    /// Returns the span of the name token, falling back to the declaration.
    pub fn name_span(&self) -> Span {
        self.name_node()
            .map(Span::of)
            .unwrap_or_else(|| Span::of(self.node))
    }

    /// Returns the declared parameters in order.
    pub fn parameters(&self, source: &str) -> Vec<Parameter<'t>> {
        let Some(params_node) = named_children(self.node)
            .into_iter()
            .find(|n| n.kind() == "function_value_parameters")
        else {
            return Vec::new();
        };

        // Direct children only; a function-typed parameter nests further
        // `parameter` nodes inside its type.
        named_children(params_node)
            .into_iter()
            .filter(|n| n.kind() == "parameter")
            .filter_map(|param| {
                let children = named_children(param);
                let name_node = children
                    .iter()
                    .copied()
                    .find(|n| n.kind() == "identifier")?;
                let type_text = children
                    .iter()
                    .copied()
                    .filter(|n| n.id() != name_node.id())
                    .last()
                    .map(|n| source[n.byte_range()].to_string())
                    .unwrap_or_default();
                Some(Parameter {
                    name: source[name_node.byte_range()].to_string(),
                    type_text,
                    name_node,
                    node: param,
                })
            })
            .collect()
    }

    /// Returns the annotation texts on this declaration (e.g. `@Composable`).
    pub fn annotations(&self, source: &str) -> Vec<String> {
        let Some(modifiers) = named_children(self.node)
            .into_iter()
            .find(|n| n.kind() == "modifiers")
        else {
            return Vec::new();
        };
        descendants_of_kind(modifiers, "annotation")
            .into_iter()
            .map(|n| source[n.byte_range()].to_string())
            .collect()
    }

    /// Returns true if the function carries a `@Composable` annotation.
    pub fn is_composable(&self, source: &str) -> bool {
        self.annotations(source)
            .iter()
            .any(|a| a.contains("Composable"))
    }

    /// Returns the block body, or `None` for expression-bodied and bodiless
    /// declarations.
    ///
    /// Statement-based analyses skip functions without a block body.
    pub fn body_block(&self) -> Option<Node<'t>> {
        let body = named_children(self.node)
            .into_iter()
            .find(|n| n.kind() == "function_body")?;
        // An expression body (`fun f() = expr`) holds an expression here
        // instead of a block.
        named_children(body).into_iter().find(|n| n.kind() == "block")
    }
}

/// A view over a `property_declaration` node (`val`/`var`).
#[derive(Debug, Clone, Copy)]
pub struct PropertyDecl<'t> {
    /// The underlying declaration node.
    pub node: Node<'t>,
}

impl<'t> PropertyDecl<'t> {
    /// Wraps a node if it is a property declaration.
    pub fn cast(node: Node<'t>) -> Option<Self> {
        (node.kind() == "property_declaration").then_some(Self { node })
    }

    /// Returns true for `var` declarations.
    pub fn is_var(&self) -> bool {
        let mut i = 0;
        while let Some(child) = self.node.child(i) {
            if child.kind() == "var" {
                return true;
            }
            i += 1;
        }
        false
    }

    /// Returns the declared name token.
    pub fn name_node(&self) -> Option<Node<'t>> {
        let var_decl = named_children(self.node)
            .into_iter()
            .find(|n| n.kind() == "variable_declaration")?;
        named_children(var_decl)
            .into_iter()
            .find(|n| n.kind() == "identifier")
    }

    /// Returns the declared name.
    pub fn name(&self, source: &str) -> Option<String> {
        self.name_node().map(|n| source[n.byte_range()].to_string())
    }

    /// Returns true if the property is declared with `by` delegation.
    pub fn is_delegated(&self) -> bool {
        named_children(self.node)
            .iter()
            .any(|n| n.kind() == "property_delegate")
    }

    /// Returns the initializer expression.
    ///
    /// For `val x = expr` this is `expr`; for `val x by expr` it is the
    /// delegate expression. Returns `None` for uninitialized declarations.
    pub fn initializer(&self) -> Option<Node<'t>> {
        let children = named_children(self.node);
        if let Some(delegate) = children.iter().copied().find(|n| n.kind() == "property_delegate") {
            return named_children(delegate).into_iter().last();
        }

        // `val x = expr`: the initializer follows an anonymous `=` token.
        let mut saw_eq = false;
        let mut i = 0;
        while let Some(child) = self.node.child(i) {
            if saw_eq && child.is_named() {
                return Some(child);
            }
            if child.kind() == "=" {
                saw_eq = true;
            }
            i += 1;
        }
        None
    }
}

/// Collects all function declarations under a node, in document order.
pub fn functions_in(node: Node<'_>) -> Vec<FunctionDecl<'_>> {
    descendants_of_kind(node, "function_declaration")
        .into_iter()
        .map(|node| FunctionDecl { node })
        .collect()
}

/// Collects all property declarations under a node, in document order.
pub fn properties_in(node: Node<'_>) -> Vec<PropertyDecl<'_>> {
    descendants_of_kind(node, "property_declaration")
        .into_iter()
        .map(|node| PropertyDecl { node })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn function_name_and_params() {
        let tree = SyntaxTree::parse("fun greet(name: String, count: Int) {}").unwrap();
        let funcs = functions_in(tree.root());
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name(tree.source()), Some("greet".to_string()));

        let params = funcs[0].parameters(tree.source());
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "name");
        assert_eq!(params[0].type_text, "String");
        assert_eq!(params[1].name, "count");
        assert_eq!(params[1].type_text, "Int");
    }

    #[test]
    fn composable_annotation() {
        let tree = SyntaxTree::parse("@Composable\nfun Greeting() {}").unwrap();
        let funcs = functions_in(tree.root());
        assert!(funcs[0].is_composable(tree.source()));

        let tree = SyntaxTree::parse("fun plain() {}").unwrap();
        let funcs = functions_in(tree.root());
        assert!(!funcs[0].is_composable(tree.source()));
    }

    #[test]
    fn expression_body_is_skipped() {
        let tree = SyntaxTree::parse("fun f() = 1").unwrap();
        let funcs = functions_in(tree.root());
        assert!(funcs[0].body_block().is_none());

        let tree = SyntaxTree::parse("fun f() { g() }").unwrap();
        let funcs = functions_in(tree.root());
        assert!(funcs[0].body_block().is_some());
    }

    #[test]
    fn property_shapes() {
        let tree = SyntaxTree::parse(
            "fun f() {\n    val a = 1\n    var b = 2\n    val c by remember { mutableStateOf(0) }\n}",
        )
        .unwrap();
        let props = properties_in(tree.root());
        assert_eq!(props.len(), 3);
        assert_eq!(props[0].name(tree.source()), Some("a".to_string()));
        assert!(!props[0].is_var());
        assert!(props[1].is_var());
        assert!(props[2].is_delegated());
        assert!(props[2].initializer().is_some());
    }
}
