//! Constant/immutability classification.
//!
//! Decides whether an expression's value is guaranteed invariant across
//! recompositions. Pure function over the tree: unresolvable references
//! classify as non-constant, nothing here panics or errors.

use crate::patterns::{is_capitalized, PURE_FACTORIES};
use crate::FileContext;
use kotlin_syntax::{
    descendants_matching, is_interpolation, is_literal, is_string_literal, named_children,
    CallExpr,
};
use tree_sitter::Node;

/// Recursion guard for pathological reference cycles (`val a = b; val b = a`).
const MAX_DEPTH: usize = 32;

/// Returns true if the expression's value is invariant across re-executions.
pub fn is_constant_or_immutable(node: Node<'_>, ctx: &FileContext<'_>) -> bool {
    classify(node, ctx, 0, false)
}

fn classify(node: Node<'_>, ctx: &FileContext<'_>, depth: usize, in_interpolation: bool) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }
    let kind = node.kind();

    if is_literal(kind) {
        return true;
    }
    if is_string_literal(kind) {
        return string_is_constant(node, ctx, depth);
    }

    match kind {
        "identifier" => {
            let name = &ctx.source[node.byte_range()];
            // The grammar lexes these keywords as identifiers.
            if matches!(name, "true" | "false" | "null") {
                return true;
            }
            match ctx.symbols.resolve(name) {
                Some(binding) => {
                    binding.is_stable()
                        && !binding.delegated
                        && binding
                            .initializer
                            .is_some_and(|init| classify(init, ctx, depth + 1, in_interpolation))
                }
                // Unknown names and function parameters are never assumed
                // constant here.
                None => false,
            }
        }
        "parenthesized_expression" => named_children(node)
            .first()
            .is_some_and(|inner| classify(*inner, ctx, depth + 1, in_interpolation)),
        // Arithmetic over constants only; comparisons and logic share the
        // node kind and are excluded by operator.
        "binary_expression" => {
            let arithmetic = node
                .child_by_field_name("operator")
                .is_some_and(|op| matches!(op.kind(), "+" | "-" | "*" | "/" | "%"));
            arithmetic
                && named_children(node)
                    .iter()
                    .all(|op| classify(*op, ctx, depth + 1, in_interpolation))
        }
        "unary_expression" => {
            let signed = node
                .child_by_field_name("operator")
                .is_some_and(|op| matches!(op.kind(), "+" | "-"));
            signed
                && node
                    .child_by_field_name("argument")
                    .is_some_and(|inner| classify(inner, ctx, depth + 1, in_interpolation))
        }
        "call_expression" => call_is_constant(node, ctx, depth, in_interpolation),
        "navigation_expression" => unit_conversion_is_constant(node, ctx, depth),
        _ => false,
    }
}

fn string_is_constant(node: Node<'_>, ctx: &FileContext<'_>, depth: usize) -> bool {
    let segments = descendants_matching(node, |n| is_interpolation(n.kind()));
    segments.iter().all(|segment| {
        // `$name` holds an identifier child, `${expr}` an expression.
        named_children(*segment)
            .into_iter()
            .next()
            .is_some_and(|inner| classify(inner, ctx, depth + 1, true))
    })
}

fn call_is_constant(
    node: Node<'_>,
    ctx: &FileContext<'_>,
    depth: usize,
    in_interpolation: bool,
) -> bool {
    let Some(call) = CallExpr::cast(node) else {
        return false;
    };
    let Some(callee) = call.callee_name(ctx.source) else {
        return false;
    };
    let args = call.value_arguments(ctx.source);

    if PURE_FACTORIES.contains(&callee.as_str()) {
        let non_lambda_constant = args
            .iter()
            .filter(|a| a.value.kind() != "lambda_literal")
            .all(|a| classify(a.value, ctx, depth + 1, in_interpolation));
        if non_lambda_constant {
            return true;
        }
        // Relaxed form: a collection of records built from literals, where
        // every argument is itself a constant-producing call.
        return !args.is_empty()
            && args.iter().all(|a| {
                a.value.kind() == "call_expression"
                    && classify(a.value, ctx, depth + 1, in_interpolation)
            });
    }

    // Constructor-like calls never count inside string interpolations, which
    // are overwhelmingly dynamic in practice.
    if is_capitalized(&callee) && !in_interpolation {
        return args
            .iter()
            .filter(|a| a.value.kind() != "lambda_literal")
            .all(|a| classify(a.value, ctx, depth + 1, in_interpolation));
    }

    false
}

/// `16.dp`, `8.sp`: numeric-constant receiver with a short alphabetic member.
fn unit_conversion_is_constant(node: Node<'_>, ctx: &FileContext<'_>, depth: usize) -> bool {
    let children = named_children(node);
    let [receiver, member] = children.as_slice() else {
        return false;
    };
    if member.kind() != "identifier" {
        return false;
    }
    let member_name = &ctx.source[member.byte_range()];
    let short_alpha =
        (1..=3).contains(&member_name.len()) && member_name.chars().all(|c| c.is_ascii_alphabetic());
    short_alpha && classify(*receiver, ctx, depth + 1, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;

    fn first_initializer_is_constant(source: &str) -> bool {
        let tree = kotlin_syntax::SyntaxTree::parse(source).unwrap();
        let ctx = context(&tree);
        let prop = kotlin_syntax::properties_in(tree.root())
            .into_iter()
            .find(|p| p.name(tree.source()).as_deref() == Some("subject"))
            .expect("fixture must declare `subject`");
        let init = prop.initializer().expect("subject must have an initializer");
        is_constant_or_immutable(init, &ctx)
    }

    #[test]
    fn literals_are_constant() {
        assert!(first_initializer_is_constant("val subject = 42"));
        assert!(first_initializer_is_constant("val subject = true"));
        assert!(first_initializer_is_constant("val subject = 'x'"));
        assert!(first_initializer_is_constant("val subject = \"plain\""));
    }

    #[test]
    fn interpolated_strings_depend_on_segments() {
        assert!(first_initializer_is_constant(
            "val pieces = 3\nval subject = \"count: $pieces\""
        ));
        assert!(!first_initializer_is_constant(
            "var pieces = 3\nval subject = \"count: $pieces\""
        ));
    }

    #[test]
    fn stable_val_references_are_constant() {
        assert!(first_initializer_is_constant("val base = 10\nval subject = base"));
    }

    #[test]
    fn reassigned_bindings_are_not() {
        assert!(!first_initializer_is_constant(
            "fun f() {\n    var base = 10\n    base = 11\n}\nval subject = base"
        ));
    }

    #[test]
    fn arithmetic_over_constants() {
        assert!(first_initializer_is_constant("val subject = 2 + 3 * 4"));
        assert!(!first_initializer_is_constant("val subject = 2 + unknownThing"));
    }

    #[test]
    fn pure_factories() {
        assert!(first_initializer_is_constant("val subject = emptyList<Int>()"));
        assert!(first_initializer_is_constant("val subject = listOf(1, 2, 3)"));
        assert!(first_initializer_is_constant(
            "val subject = listOf(Pair(\"a\", 1), Pair(\"b\", 2))"
        ));
        assert!(!first_initializer_is_constant("val subject = listOf(fetchValue())"));
    }

    #[test]
    fn constructor_like_calls() {
        assert!(first_initializer_is_constant("val subject = Spacing(4, 8)"));
        assert!(!first_initializer_is_constant("val subject = Spacing(currentWidth)"));
    }

    #[test]
    fn unit_conversions() {
        assert!(first_initializer_is_constant("val subject = 16.dp"));
        assert!(!first_initializer_is_constant("val subject = width.dp"));
    }

    #[test]
    fn ordinary_calls_are_dynamic() {
        assert!(!first_initializer_is_constant("val subject = computeLayout()"));
    }
}
