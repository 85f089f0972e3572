//! Effect-to-UI density rule.

use kotlin_syntax::FunctionDecl;

use crate::config::RuleConfig;
use crate::diagnostic::{Diagnostic, RuleCode};
use crate::effects::effect_density;
use crate::FileContext;

pub const DEFAULT_MIN_EFFECTS: usize = 2;
pub const DEFAULT_DENSITY: f64 = 0.3;

pub fn check(
    func: &FunctionDecl<'_>,
    ctx: &FileContext<'_>,
    config: &RuleConfig,
) -> Option<Diagnostic> {
    if !func.is_composable(ctx.source) {
        return None;
    }
    let name = func.name(ctx.source)?;
    let density = effect_density(func, ctx)?;

    let min_effects = config.threshold_usize(RuleCode::EffectDensity, "minEffects", DEFAULT_MIN_EFFECTS);
    let min_density = config.threshold_f64(RuleCode::EffectDensity, "density", DEFAULT_DENSITY);

    if density.effect_count < min_effects || density.density < min_density {
        return None;
    }

    let mut message = format!(
        "'{name}' runs {} side effects against {} UI calls (density {:.2}, limit {min_density})",
        density.effect_count, density.ui_call_count, density.density,
    );
    if !density.duplicates.is_empty() {
        message.push_str(&format!(
            "; {} duplicated effect invocations share the same keys",
            density.duplicates.len(),
        ));
    }
    for (construct, keys, count) in &density.consolidation_candidates {
        message.push_str(&format!(
            "; {count} {construct} blocks keyed on ({keys}) could be merged"
        ));
    }

    let mut diag = Diagnostic::new(RuleCode::EffectDensity, message, func.name_span());
    for dup in &density.duplicates {
        diag = diag.with_related(
            format!("duplicate {} with keys ({})", dup.construct, dup.keys),
            dup.span,
        );
    }
    Some(diag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;
    use kotlin_syntax::{functions_in, SyntaxTree};
    use pretty_assertions::assert_eq;

    fn check_source(source: &str) -> Option<Diagnostic> {
        let tree = SyntaxTree::parse(source).unwrap();
        let ctx = context(&tree);
        let func = functions_in(tree.root()).into_iter().next().unwrap();
        check(&func, &ctx, &RuleConfig::new())
    }

    #[test]
    fn single_effect_never_triggers() {
        let diag = check_source(
            r#"
            @Composable
            fun Screen(id: String) {
                LaunchedEffect(id) { load(id) }
                Text("a")
            }
            "#,
        );
        assert_eq!(diag, None);
    }

    #[test]
    fn two_effects_against_six_ui_calls_trigger() {
        let diag = check_source(
            r#"
            @Composable
            fun Screen(id: String) {
                LaunchedEffect(id) { load(id) }
                SideEffect { report(id) }
                Text("a")
                Text("b")
                Text("c")
                Text("d")
                Text("e")
                Text("f")
            }
            "#,
        );
        let diag = diag.expect("density 0.33 must trigger");
        assert!(diag.message.contains("2 side effects"));
        assert!(diag.message.contains("6 UI calls"));
    }

    #[test]
    fn duplicate_effects_are_called_out() {
        let diag = check_source(
            r#"
            @Composable
            fun Screen(id: String) {
                LaunchedEffect(id) { load(id) }
                LaunchedEffect(id) { track(id) }
                Text("a")
            }
            "#,
        );
        let diag = diag.expect("two effects against one UI call");
        assert!(diag.message.contains("duplicated effect"));
        // The first occurrence is legitimate; only the repeat is related.
        assert_eq!(diag.related.len(), 1);
    }
}
