//! Per-effect-block complexity rule.

use kotlin_syntax::{FunctionDecl, Span};

use crate::config::RuleConfig;
use crate::diagnostic::{Diagnostic, RuleCode};
use crate::effects::{compute_effect_complexity, effect_calls_in};
use crate::FileContext;

pub const DEFAULT_THRESHOLD: f64 = 10.0;

pub fn check(
    func: &FunctionDecl<'_>,
    ctx: &FileContext<'_>,
    config: &RuleConfig,
) -> Vec<Diagnostic> {
    if !func.is_composable(ctx.source) {
        return Vec::new();
    }
    let Some(body) = func.body_block() else {
        return Vec::new();
    };
    let threshold = config.threshold_f64(RuleCode::EffectComplexity, "threshold", DEFAULT_THRESHOLD);

    let mut diagnostics = Vec::new();
    for call in effect_calls_in(body, ctx) {
        let Some(lambda) = call.trailing_lambda() else {
            continue;
        };
        let Some(construct) = call.callee_name(ctx.source) else {
            continue;
        };
        let metrics = compute_effect_complexity(lambda, ctx);
        if metrics.score < threshold {
            continue;
        }
        diagnostics.push(Diagnostic::new(
            RuleCode::EffectComplexity,
            format!(
                "{construct} block scores {:.1} (threshold {threshold}): {} branches, \
                 {} loops, nesting depth {}, {} launched scopes, {} statements; \
                 extract the work into the ViewModel",
                metrics.score,
                metrics.branches,
                metrics.loops,
                metrics.max_nesting_depth,
                metrics.launched_scopes,
                metrics.statements,
            ),
            Span::of(call.node),
        ));
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;
    use kotlin_syntax::{functions_in, SyntaxTree};
    use pretty_assertions::assert_eq;

    fn check_source(source: &str) -> Vec<Diagnostic> {
        let tree = SyntaxTree::parse(source).unwrap();
        let ctx = context(&tree);
        let func = functions_in(tree.root()).into_iter().next().unwrap();
        check(&func, &ctx, &RuleConfig::new())
    }

    #[test]
    fn trivial_effect_passes() {
        let diags = check_source(
            r#"
            @Composable
            fun Tracker(id: String) {
                LaunchedEffect(id) {
                    log(id)
                }
            }
            "#,
        );
        assert_eq!(diags, vec![]);
    }

    #[test]
    fn branchy_launching_effect_is_flagged() {
        // 2 branches, depth 2, 2 launched scopes put this well past 10.
        let diags = check_source(
            r#"
            @Composable
            fun Sync(id: String, scope: CoroutineScope) {
                LaunchedEffect(id) {
                    if (id.isNotEmpty()) {
                        scope.launch { push(id) }
                        if (needsPull(id)) {
                            scope.launch { pull(id) }
                        }
                    }
                }
            }
            "#,
        );
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("LaunchedEffect"));
        assert!(diags[0].message.contains("2 launched scopes"));
    }
}
