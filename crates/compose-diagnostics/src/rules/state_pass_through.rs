//! Reactive pass-through chain rule. File-scoped, unlike the per-function
//! rules, because the chains it reports cross function boundaries.

use tree_sitter::Node;

use crate::config::RuleConfig;
use crate::diagnostic::{Diagnostic, RuleCode};
use crate::pass_through::{analyze, collect_functions};
use crate::FileContext;

pub const DEFAULT_MIN_CHAIN: usize = 2;

pub fn check(ctx: &FileContext<'_>, root: Node<'_>, config: &RuleConfig) -> Vec<Diagnostic> {
    let min_chain = config.threshold_usize(RuleCode::StatePassThrough, "minChain", DEFAULT_MIN_CHAIN);
    let funcs = collect_functions(ctx, root);

    analyze(&funcs, min_chain)
        .into_iter()
        .map(|flag| {
            let mut message = format!(
                "'{}' only relays '{}' (chain of {} pass-through hops",
                flag.function, flag.param, flag.chain_len,
            );
            if let Some((callee, param)) = &flag.forwarded_to {
                message.push_str(&format!(", next hop {callee}({param})"));
            }
            message.push_str("); consider a state holder or CompositionLocal");

            let mut diag = Diagnostic::new(RuleCode::StatePassThrough, message, flag.span);
            if let Some(origin) = &flag.origin {
                diag = diag.with_related(
                    format!(
                        "the relayed state is declared here as '{}' in '{}'",
                        origin.variable, origin.function,
                    ),
                    origin.span,
                );
            }
            diag
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;
    use kotlin_syntax::SyntaxTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn chain_diagnostics_carry_the_origin_declaration() {
        let source = r#"
            @Composable
            fun Dashboard() {
                val items by remember { mutableStateOf(listOf<String>()) }
                ItemPane(items)
            }

            @Composable
            fun ItemPane(items: List<String>) {
                ItemList(items)
            }

            @Composable
            fun ItemList(items: List<String>) {
                ItemRows(items)
            }
        "#;
        let tree = SyntaxTree::parse(source).unwrap();
        let ctx = context(&tree);
        let diags = check(&ctx, tree.root(), &RuleConfig::new());

        assert_eq!(diags.len(), 2);
        for diag in &diags {
            assert!(diag.message.contains("pass-through"));
            assert_eq!(diag.related.len(), 1);
            assert!(diag.related[0].message.contains("'items' in 'Dashboard'"));
        }
    }
}
