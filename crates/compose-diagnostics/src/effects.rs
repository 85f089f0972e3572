//! Effect complexity and effect density.
//!
//! The sub-engine applies the same counting functions as the control-flow
//! engine to the body of a single lifecycle-bound effect, so the two scores
//! can never drift apart. Density relates how much of a composable is
//! effects versus emitted UI.

use crate::control_flow::measure_body;
use crate::patterns::{is_capitalized, EFFECT_CONSTRUCTS, PURE_FACTORIES};
use crate::FileContext;
use indexmap::IndexMap;
use kotlin_syntax::{calls_in, CallExpr, FunctionDecl, Span};
use smol_str::SmolStr;
use tree_sitter::Node;

/// The score of a single lifecycle-bound side-effect block.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectComplexity {
    /// `2·branches + 3·loops + 2·depth + 3·launchedScopes + statements/10`.
    pub score: f64,
    /// Decision points inside the effect body.
    pub branches: usize,
    /// Loops inside the effect body.
    pub loops: usize,
    /// Maximum nesting depth inside the effect body.
    pub max_nesting_depth: usize,
    /// Nested concurrency-launching or effect-starting invocations.
    pub launched_scopes: usize,
    /// Statements transitively reachable in the effect body.
    pub statements: usize,
}

/// Scores one effect's trailing closure.
pub fn compute_effect_complexity(lambda: Node<'_>, ctx: &FileContext<'_>) -> EffectComplexity {
    let metrics = measure_body(lambda, ctx);
    let score = 2.0 * metrics.branches as f64
        + 3.0 * metrics.loops as f64
        + 2.0 * metrics.max_depth as f64
        + 3.0 * metrics.launched_scopes as f64
        + metrics.statements as f64 / 10.0;
    EffectComplexity {
        score,
        branches: metrics.branches,
        loops: metrics.loops,
        max_nesting_depth: metrics.max_depth,
        launched_scopes: metrics.launched_scopes,
        statements: metrics.statements,
    }
}

/// Collects the lifecycle-bound effect invocations in a body.
pub fn effect_calls_in<'t>(body: Node<'t>, ctx: &FileContext<'_>) -> Vec<CallExpr<'t>> {
    calls_in(body)
        .into_iter()
        .filter(|call| {
            call.callee_name(ctx.source)
                .is_some_and(|name| EFFECT_CONSTRUCTS.contains(&name.as_str()))
        })
        .collect()
}

/// One effect invocation, keyed for duplicate detection.
#[derive(Debug, Clone)]
pub struct EffectSite {
    /// The effect construct name (`LaunchedEffect`, ...).
    pub construct: SmolStr,
    /// The key arguments as written, comma-joined.
    pub keys: String,
    /// The invocation's location.
    pub span: Span,
}

/// Effect density of one composable.
#[derive(Debug, Clone)]
pub struct EffectDensity {
    /// Lifecycle-bound effect invocations.
    pub effect_count: usize,
    /// Calls recognized as producing visual output.
    pub ui_call_count: usize,
    /// `effect_count / ui_call_count` (0 when no UI calls).
    pub density: f64,
    /// `(construct, keys)` pairs invoked more than once.
    pub duplicates: Vec<EffectSite>,
    /// Same-construct same-key groups of size ≥ 2 that could be merged.
    pub consolidation_candidates: Vec<(SmolStr, String, usize)>,
}

/// Measures effect density for a function.
///
/// UI-construction calls are resolved against in-file `@Composable`
/// declarations; unresolvable callees fall back to the capitalized-name
/// convention. The fallback is a heuristic and a known source of noise.
pub fn effect_density(func: &FunctionDecl<'_>, ctx: &FileContext<'_>) -> Option<EffectDensity> {
    let body = func.body_block()?;

    let mut effect_sites = Vec::new();
    let mut ui_call_count = 0usize;

    for call in calls_in(body) {
        let Some(callee) = call.callee_name(ctx.source) else {
            continue;
        };
        if EFFECT_CONSTRUCTS.contains(&callee.as_str()) {
            let keys = call
                .value_arguments(ctx.source)
                .iter()
                .map(|a| ctx.source[a.value.byte_range()].to_string())
                .collect::<Vec<_>>()
                .join(", ");
            effect_sites.push(EffectSite {
                construct: SmolStr::new(&callee),
                keys,
                span: Span::of(call.node),
            });
        } else if is_ui_call(&callee, ctx) {
            ui_call_count += 1;
        }
    }

    let effect_count = effect_sites.len();
    let density = if ui_call_count == 0 {
        0.0
    } else {
        effect_count as f64 / ui_call_count as f64
    };

    // Insertion order keeps both lists in source order.
    let mut groups: IndexMap<(SmolStr, String), Vec<&EffectSite>> = IndexMap::new();
    for site in &effect_sites {
        groups
            .entry((site.construct.clone(), site.keys.clone()))
            .or_default()
            .push(site);
    }

    let mut duplicates = Vec::new();
    let mut consolidation_candidates = Vec::new();
    for ((construct, keys), sites) in groups {
        if sites.len() > 1 {
            duplicates.extend(sites.iter().skip(1).map(|s| (*s).clone()));
            consolidation_candidates.push((construct, keys, sites.len()));
        }
    }

    Some(EffectDensity {
        effect_count,
        ui_call_count,
        density,
        duplicates,
        consolidation_candidates,
    })
}

fn is_ui_call(callee: &str, ctx: &FileContext<'_>) -> bool {
    if ctx.composables.contains(callee) {
        return true;
    }
    is_capitalized(callee) && !PURE_FACTORIES.contains(&callee)
}
