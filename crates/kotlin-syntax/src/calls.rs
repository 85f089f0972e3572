//! Call-expression shapes.

use crate::tree::{descendants_of_kind, named_children};
use tree_sitter::Node;

/// A view over a `call_expression` node.
#[derive(Debug, Clone, Copy)]
pub struct CallExpr<'t> {
    /// The underlying call node.
    pub node: Node<'t>,
}

/// One parenthesized argument at a call site.
#[derive(Debug, Clone)]
pub struct ValueArg<'t> {
    /// The named-argument label, when the `label = value` form is used.
    pub label: Option<String>,
    /// The argument value expression.
    pub value: Node<'t>,
    /// The whole `value_argument` node.
    pub node: Node<'t>,
}

impl<'t> CallExpr<'t> {
    /// Wraps a node if it is a call expression.
    pub fn cast(node: Node<'t>) -> Option<Self> {
        (node.kind() == "call_expression").then_some(Self { node })
    }

    /// Returns the simple callee name.
    ///
    /// For `foo(..)` this is `foo`; for `receiver.bar(..)` it is `bar`.
    /// Computed callees (`fns[i]()`, `f()()`) return `None`.
    pub fn callee_name(&self, source: &str) -> Option<String> {
        let callee = self.node.named_child(0)?;
        match callee.kind() {
            "identifier" => Some(source[callee.byte_range()].to_string()),
            // The member identifier is the last named child of the chain.
            "navigation_expression" => {
                let ident = named_children(callee)
                    .into_iter()
                    .rev()
                    .find(|n| n.kind() == "identifier")?;
                Some(source[ident.byte_range()].to_string())
            }
            _ => None,
        }
    }

    /// Returns the root identifier of the callee's receiver chain, if any.
    ///
    /// For `viewModel.items.collectAsState()` this is `viewModel`.
    pub fn receiver_root(&self, source: &str) -> Option<String> {
        let callee = self.node.named_child(0)?;
        if callee.kind() != "navigation_expression" {
            return None;
        }
        let mut current = callee;
        loop {
            let first = current.named_child(0)?;
            match first.kind() {
                "navigation_expression" => current = first,
                "identifier" => return Some(source[first.byte_range()].to_string()),
                _ => return None,
            }
        }
    }

    /// Returns the parenthesized arguments in order.
    pub fn value_arguments(&self, source: &str) -> Vec<ValueArg<'t>> {
        let Some(args_node) = self.value_arguments_node() else {
            return Vec::new();
        };

        named_children(args_node)
            .into_iter()
            .filter(|n| n.kind() == "value_argument")
            .filter_map(|arg| {
                let children = named_children(arg);
                let value = children.iter().copied().last()?;
                let label = has_anonymous_eq(arg)
                    .then(|| {
                        children
                            .iter()
                            .copied()
                            .find(|n| n.kind() == "identifier" && n.id() != value.id())
                    })
                    .flatten()
                    .map(|n| source[n.byte_range()].to_string());
                Some(ValueArg {
                    label,
                    value,
                    node: arg,
                })
            })
            .collect()
    }

    /// Returns the trailing lambda's `lambda_literal`, if present.
    pub fn trailing_lambda(&self) -> Option<Node<'t>> {
        let annotated = named_children(self.node)
            .into_iter()
            .find(|n| n.kind() == "annotated_lambda")?;
        named_children(annotated)
            .into_iter()
            .find(|n| n.kind() == "lambda_literal")
    }

    /// Returns true if any argument (parenthesized or trailing) is a lambda.
    pub fn has_lambda_argument(&self, source: &str) -> bool {
        self.trailing_lambda().is_some()
            || self
                .value_arguments(source)
                .iter()
                .any(|a| a.value.kind() == "lambda_literal")
    }

    /// Returns the argument count as seen by overload resolution: the
    /// parenthesized arguments plus the trailing lambda.
    pub fn total_arg_count(&self, source: &str) -> usize {
        self.value_arguments(source).len() + usize::from(self.trailing_lambda().is_some())
    }

    fn value_arguments_node(&self) -> Option<Node<'t>> {
        named_children(self.node)
            .into_iter()
            .find(|n| n.kind() == "value_arguments")
    }
}

/// Collects all call expressions under a node, in document order.
pub fn calls_in(node: Node<'_>) -> Vec<CallExpr<'_>> {
    descendants_of_kind(node, "call_expression")
        .into_iter()
        .map(|node| CallExpr { node })
        .collect()
}

fn has_anonymous_eq(node: Node<'_>) -> bool {
    let mut i = 0;
    while let Some(child) = node.child(i) {
        if child.kind() == "=" {
            return true;
        }
        i += 1;
    }
    false
}
