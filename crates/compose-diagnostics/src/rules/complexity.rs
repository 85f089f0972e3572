//! Weighted-complexity rule for composable functions.

use kotlin_syntax::FunctionDecl;

use crate::config::RuleConfig;
use crate::control_flow::compute_complexity;
use crate::diagnostic::{Diagnostic, RuleCode};
use crate::FileContext;

pub const DEFAULT_THRESHOLD: f64 = 25.0;
pub const DEFAULT_MAX_LOOPS: usize = 4;

pub fn check(
    func: &FunctionDecl<'_>,
    ctx: &FileContext<'_>,
    config: &RuleConfig,
) -> Option<Diagnostic> {
    if !func.is_composable(ctx.source) {
        return None;
    }
    let name = func.name(ctx.source)?;
    let breakdown = compute_complexity(func, ctx)?;

    let threshold = config.threshold_f64(RuleCode::ComplexComposable, "threshold", DEFAULT_THRESHOLD);
    let max_loops = config.threshold_usize(RuleCode::ComplexComposable, "maxLoops", DEFAULT_MAX_LOOPS);

    // The loop cap fires on its own, independent of the weighted score.
    if breakdown.loops > max_loops {
        return Some(Diagnostic::new(
            RuleCode::ComplexComposable,
            format!(
                "'{name}' contains {} loops (max {max_loops}); move the iteration into a \
                 ViewModel or plain function",
                breakdown.loops,
            ),
            func.name_span(),
        ));
    }

    if breakdown.weighted_score < threshold {
        return None;
    }
    Some(Diagnostic::new(
        RuleCode::ComplexComposable,
        format!(
            "'{name}' has weighted complexity {:.1} (threshold {threshold}): \
             {} branches, {} loops, nesting depth {}, {} effect blocks \
             (sub-score {:.1}), {} relevant parameters, {} state sources",
            breakdown.weighted_score,
            breakdown.branches,
            breakdown.loops,
            breakdown.max_depth,
            breakdown.effect_blocks.len(),
            breakdown.effect_complexity_sum(),
            breakdown.relevant_parameter_count,
            breakdown.state_source_count,
        ),
        func.name_span(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;
    use kotlin_syntax::{functions_in, SyntaxTree};
    use pretty_assertions::assert_eq;

    fn check_first(source: &str, config: &RuleConfig) -> Option<Diagnostic> {
        let tree = SyntaxTree::parse(source).unwrap();
        let ctx = context(&tree);
        let func = functions_in(tree.root()).into_iter().next().unwrap();
        check(&func, &ctx, config)
    }

    #[test]
    fn simple_composable_passes() {
        let diag = check_first(
            r#"
            @Composable
            fun Greeting(name: String) {
                Text("Hello $name")
            }
            "#,
            &RuleConfig::new(),
        );
        assert_eq!(diag, None);
    }

    #[test]
    fn loop_cap_fires_without_any_score() {
        let diag = check_first(
            r#"
            @Composable
            fun Busy(items: List<Int>) {
                for (a in items) { draw(a) }
                for (b in items) { draw(b) }
                for (c in items) { draw(c) }
                for (d in items) { draw(d) }
                for (e in items) { draw(e) }
            }
            "#,
            &RuleConfig::new(),
        );
        let diag = diag.expect("five loops must flag");
        assert!(diag.message.contains("5 loops"));
    }

    #[test]
    fn threshold_override_applies() {
        let mut config = RuleConfig::new();
        config.set(RuleCode::ComplexComposable, "threshold", 1);
        let diag = check_first(
            r#"
            @Composable
            fun Greeting(name: String, count: Int) {
                if (count > 0) {
                    Text("Hello $name")
                }
            }
            "#,
            &config,
        );
        assert!(diag.is_some());
    }

    #[test]
    fn non_composable_functions_are_ignored() {
        let diag = check_first(
            r#"
            fun compute(items: List<Int>) {
                for (a in items) { use(a) }
                for (b in items) { use(b) }
                for (c in items) { use(c) }
                for (d in items) { use(d) }
                for (e in items) { use(e) }
            }
            "#,
            &RuleConfig::new(),
        );
        assert_eq!(diag, None);
    }
}
