//! Generic tree-query utilities.
//!
//! Every detector walks the tree through these helpers rather than juggling
//! cursors at each call site.

use tree_sitter::Node;

/// Collects the named children of a node.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Collects all named descendants of a node in preorder, excluding the node
/// itself.
pub fn descendants<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    collect(node, &mut |_| true, &mut out);
    out
}

/// Collects all named descendants matching a predicate, in preorder.
pub fn descendants_matching<'t>(
    node: Node<'t>,
    pred: impl Fn(Node<'t>) -> bool,
) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    collect(node, &mut |n| pred(n), &mut out);
    out
}

/// Collects all named descendants of the given kind.
pub fn descendants_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    descendants_matching(node, |n| n.kind() == kind)
}

/// Finds the first named descendant matching a predicate, in preorder.
pub fn find_first<'t>(node: Node<'t>, pred: impl Fn(Node<'t>) -> bool) -> Option<Node<'t>> {
    // Recurse through a dyn reference so the generic is instantiated once.
    find_first_inner(node, &pred)
}

fn find_first_inner<'t>(node: Node<'t>, pred: &dyn Fn(Node<'t>) -> bool) -> Option<Node<'t>> {
    for child in named_children(node) {
        if pred(child) {
            return Some(child);
        }
        if let Some(found) = find_first_inner(child, pred) {
            return Some(found);
        }
    }
    None
}

/// Returns the chain of ancestors of a node, nearest first.
pub fn ancestors<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut current = node.parent();
    while let Some(parent) = current {
        out.push(parent);
        current = parent.parent();
    }
    out
}

fn collect<'t>(
    node: Node<'t>,
    pred: &mut impl FnMut(Node<'t>) -> bool,
    out: &mut Vec<Node<'t>>,
) {
    for child in named_children(node) {
        if pred(child) {
            out.push(child);
        }
        collect(child, pred, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxTree;

    #[test]
    fn finds_descendants_of_kind() {
        let tree = SyntaxTree::parse("fun f() { g(); h() }").unwrap();
        let calls = descendants_of_kind(tree.root(), "call_expression");
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn ancestors_reach_root() {
        let tree = SyntaxTree::parse("fun f() { g() }").unwrap();
        let call = find_first(tree.root(), |n| n.kind() == "call_expression").unwrap();
        let chain = ancestors(call);
        assert_eq!(chain.last().unwrap().kind(), "source_file");
    }
}
