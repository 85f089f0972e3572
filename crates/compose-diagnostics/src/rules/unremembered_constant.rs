//! Constant-rebuilt-every-composition rule.
//!
//! A `val` whose initializer is a constant-valued constructor call is
//! rebuilt on every recomposition. Hinted, not warned: the cost is usually
//! small and the fix (hoist to a top-level `val`, or `remember`) trivial.

use kotlin_syntax::{properties_in, CallExpr, FunctionDecl, Span};

use crate::const_eval::is_constant_or_immutable;
use crate::diagnostic::{Diagnostic, RuleCode};
use crate::mutation::on_render_path;
use crate::FileContext;

pub fn check(func: &FunctionDecl<'_>, ctx: &FileContext<'_>) -> Vec<Diagnostic> {
    if !func.is_composable(ctx.source) {
        return Vec::new();
    }
    let Some(body) = func.body_block() else {
        return Vec::new();
    };

    let mut diagnostics = Vec::new();
    for prop in properties_in(body) {
        if prop.is_var() || prop.is_delegated() {
            continue;
        }
        let Some(name) = prop.name(ctx.source) else {
            continue;
        };
        let Some(init) = prop.initializer() else {
            continue;
        };
        // Only allocation-shaped initializers are worth reporting; a literal
        // rebuilt per composition costs nothing.
        if CallExpr::cast(init).is_none() {
            continue;
        }
        if !is_constant_or_immutable(init, ctx) {
            continue;
        }
        if !on_render_path(prop.node, func.node, ctx) {
            continue;
        }
        let span = prop.name_node().map(Span::of).unwrap_or_else(|| Span::of(prop.node));
        diagnostics.push(Diagnostic::new(
            RuleCode::UnrememberedConstant,
            format!(
                "'{name}' is built from constants on every recomposition; hoist it to a \
                 top-level val or wrap it in remember"
            ),
            span,
        ));
    }
    diagnostics
}
