//! In-file symbol table.
//!
//! A single pass over one file collecting `val`/`var` bindings and whether
//! they are ever reassigned. This is the resolution service the detectors
//! consult; names it cannot resolve answer `None`, and consumers treat that
//! conservatively (non-constant, non-reactive).
//!
//! The table is name-keyed and scope-insensitive: shadowed names resolve to
//! the last declaration in document order. That loses precision on shadowing
//! but only ever in the conservative direction.

use crate::decl::{properties_in, PropertyDecl};
use crate::span::Span;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tree_sitter::Node;

/// Whether a binding can be reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// `val`, assignable once.
    Val,
    /// `var`, reassignable.
    Var,
}

/// A resolved `val`/`var` binding.
#[derive(Debug, Clone)]
pub struct Binding<'t> {
    /// The binding name.
    pub name: SmolStr,
    /// `val` or `var`.
    pub mutability: Mutability,
    /// The initializer (or delegate) expression, when present.
    pub initializer: Option<Node<'t>>,
    /// True for `by`-delegated properties.
    pub delegated: bool,
    /// True if any assignment targets this name.
    pub reassigned: bool,
    /// The span of the name token.
    pub name_span: Span,
}

impl Binding<'_> {
    /// True if the binding provably never changes after initialization.
    pub fn is_stable(&self) -> bool {
        self.mutability == Mutability::Val && !self.reassigned
    }
}

/// All `val`/`var` bindings of one file, keyed by name.
#[derive(Debug, Default)]
pub struct SymbolTable<'t> {
    bindings: FxHashMap<SmolStr, Binding<'t>>,
}

impl<'t> SymbolTable<'t> {
    /// Builds the table from a file's root node.
    pub fn build(root: Node<'t>, source: &str) -> Self {
        let mut bindings = FxHashMap::default();

        for prop in properties_in(root) {
            if let Some(binding) = binding_of(&prop, source) {
                bindings.insert(binding.name.clone(), binding);
            }
        }

        let mut table = Self { bindings };
        table.mark_reassignments(root, source);
        table
    }

    /// Resolves a name to its binding, or `None` for unknown names.
    pub fn resolve(&self, name: &str) -> Option<&Binding<'t>> {
        self.bindings.get(name)
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no bindings were collected.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn mark_reassignments(&mut self, root: Node<'t>, source: &str) {
        for assignment in crate::tree::descendants_of_kind(root, "assignment") {
            let Some(lhs) = assignment.child_by_field_name("left") else {
                continue;
            };
            // Member writes (`x.value = ..`) do not rebind the name.
            if lhs.kind() != "identifier" {
                continue;
            }
            if let Some(binding) = self.bindings.get_mut(&source[lhs.byte_range()]) {
                binding.reassigned = true;
            }
        }
    }
}

fn binding_of<'t>(prop: &PropertyDecl<'t>, source: &str) -> Option<Binding<'t>> {
    let name_node = prop.name_node()?;
    Some(Binding {
        name: SmolStr::new(&source[name_node.byte_range()]),
        mutability: if prop.is_var() {
            Mutability::Var
        } else {
            Mutability::Val
        },
        initializer: prop.initializer(),
        delegated: prop.is_delegated(),
        reassigned: false,
        name_span: Span::of(name_node),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxTree;

    #[test]
    fn resolves_val_binding() {
        let tree = SyntaxTree::parse("val limit = 10\nfun f() {}").unwrap();
        let table = SymbolTable::build(tree.root(), tree.source());
        let binding = table.resolve("limit").unwrap();
        assert_eq!(binding.mutability, Mutability::Val);
        assert!(binding.is_stable());
        assert!(binding.initializer.is_some());
    }

    #[test]
    fn reassignment_marks_binding() {
        let tree = SyntaxTree::parse("fun f() {\n    var count = 0\n    count = 1\n}").unwrap();
        let table = SymbolTable::build(tree.root(), tree.source());
        let binding = table.resolve("count").unwrap();
        assert!(binding.reassigned);
        assert!(!binding.is_stable());
    }

    #[test]
    fn unknown_name_is_none() {
        let tree = SyntaxTree::parse("fun f() {}").unwrap();
        let table = SymbolTable::build(tree.root(), tree.source());
        assert!(table.resolve("missing").is_none());
        assert!(table.is_empty());
    }
}
