//! Control-flow complexity engine.
//!
//! Walks a function body and computes branch count, loop count, maximum
//! nesting depth and a recursive, block-aware statement count, classifying
//! each control construct as render-path or behavioral (inside a callback).
//!
//! The walk is a fold: every recursive call returns its own metrics and the
//! caller merges them. No shared mutable counters are threaded through the
//! traversal, so a block can never be counted twice.

use crate::effects::{compute_effect_complexity, effect_calls_in, EffectComplexity};
use crate::patterns::{
    is_callback_label, is_capitalized, is_presentational_parameter, EFFECT_CONSTRUCTS,
    ITERATION_CALLS, RENDER_SCOPE_CALLS, SCOPE_LAUNCHERS, STATE_FACTORIES, STATE_PROVIDER_CALLS,
};
use crate::FileContext;
use kotlin_syntax::{
    calls_in, control_construct, named_children, CallExpr, ControlConstruct, FunctionDecl,
    PropertyDecl,
};
use rustc_hash::FxHashSet;
use tree_sitter::Node;

/// Statement and control-flow tallies for one analyzed function.
///
/// Counts only ever grow during a traversal and are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlowCounters {
    /// Statements transitively reachable through blocks.
    pub total_statements: usize,
    /// Control constructs on the render path.
    pub render_control_flow: usize,
    /// Control constructs inside callback/event-handler closures.
    pub behavioral_control_flow: usize,
}

/// Raw metrics for one body subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyMetrics {
    /// Recursive statement count (see [`ControlFlowCounters`]).
    pub statements: usize,
    /// Decision points: `if` links, conditioned `when` cases minus one, and
    /// one per loop.
    pub branches: usize,
    /// Loops, including lambda-taking iteration calls.
    pub loops: usize,
    /// Maximum lexical nesting depth of control constructs.
    pub max_depth: usize,
    /// Render-path control constructs.
    pub render_control_flow: usize,
    /// Behavioral (callback-scoped) control constructs.
    pub behavioral_control_flow: usize,
    /// Concurrency-launching and effect-starting invocations.
    pub launched_scopes: usize,
}

impl BodyMetrics {
    fn merge(mut self, other: BodyMetrics) -> BodyMetrics {
        self.statements += other.statements;
        self.branches += other.branches;
        self.loops += other.loops;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.render_control_flow += other.render_control_flow;
        self.behavioral_control_flow += other.behavioral_control_flow;
        self.launched_scopes += other.launched_scopes;
        self
    }
}

/// Everything the complexity front-end needs for one composable.
#[derive(Debug, Clone)]
pub struct ComplexityBreakdown {
    /// Statement/classification tallies.
    pub counters: ControlFlowCounters,
    /// Decision-point count.
    pub branches: usize,
    /// Loop count.
    pub loops: usize,
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Per-effect-block sub-scores.
    pub effect_blocks: Vec<EffectComplexity>,
    /// Parameters that are neither presentational nor slots of styling.
    pub relevant_parameter_count: usize,
    /// Distinct observed-state sources feeding this function.
    pub state_source_count: usize,
    /// The aggregate weighted score.
    pub weighted_score: f64,
}

impl ComplexityBreakdown {
    /// Sum of the effect sub-scores.
    pub fn effect_complexity_sum(&self) -> f64 {
        self.effect_blocks.iter().map(|e| e.score).sum()
    }
}

/// Computes the full complexity breakdown for a function.
///
/// Returns `None` for functions without a block body (expression bodies,
/// abstract declarations); those are skipped silently, not flagged.
pub fn compute_complexity(func: &FunctionDecl<'_>, ctx: &FileContext<'_>) -> Option<ComplexityBreakdown> {
    let body = func.body_block()?;
    let metrics = measure_body(body, ctx);

    let effect_blocks: Vec<EffectComplexity> = effect_calls_in(body, ctx)
        .into_iter()
        .filter_map(|call| call.trailing_lambda())
        .map(|lambda| compute_effect_complexity(lambda, ctx))
        .collect();

    let params = func.parameters(ctx.source);
    let relevant_parameter_count = params
        .iter()
        .filter(|p| !is_presentational_parameter(&p.name, &p.type_text))
        .count();

    let mut sources = state_sources(body, ctx);
    for param in &params {
        if param.type_text.contains("ViewModel") {
            sources.insert(param.name.clone());
        }
    }

    let effect_complexity_sum: f64 = effect_blocks.iter().map(|e| e.score).sum();
    let weighted_score = 2.0 * metrics.branches as f64
        + 3.0 * metrics.loops as f64
        + 2.0 * metrics.max_depth as f64
        + effect_complexity_sum
        + 2.0 * effect_blocks.len() as f64
        + relevant_parameter_count as f64
        + 3.0 * sources.len() as f64;

    Some(ComplexityBreakdown {
        counters: ControlFlowCounters {
            total_statements: metrics.statements,
            render_control_flow: metrics.render_control_flow,
            behavioral_control_flow: metrics.behavioral_control_flow,
        },
        branches: metrics.branches,
        loops: metrics.loops,
        max_depth: metrics.max_depth,
        effect_blocks,
        relevant_parameter_count,
        state_source_count: sources.len(),
        weighted_score,
    })
}

/// Measures a body subtree (a `function_body`, `lambda_literal`, or any
/// statement-bearing node).
pub fn measure_body(node: Node<'_>, ctx: &FileContext<'_>) -> BodyMetrics {
    walk(
        node,
        ctx,
        WalkState {
            depth: 0,
            behavioral: false,
        },
    )
}

#[derive(Clone, Copy)]
struct WalkState {
    depth: usize,
    behavioral: bool,
}

fn walk(node: Node<'_>, ctx: &FileContext<'_>, state: WalkState) -> BodyMetrics {
    let mut metrics = BodyMetrics::default();
    let kind = node.kind();

    match kind {
        // Nested named functions are measured on their own, not here.
        "function_declaration" => return metrics,
        // Statements sit directly inside blocks and lambda bodies.
        "block" => {
            metrics.statements += statement_children(node);
        }
        // The entry body is its last child; a braceless one is a single
        // statement, a block counts its own children.
        "when_entry" => {
            metrics.statements += braceless_entry_statement(node);
        }
        "call_expression" => return walk_call(node, ctx, state).merge(metrics),
        "lambda_literal" => {
            metrics.statements += statement_children(node);
            let child_state = WalkState {
                behavioral: state.behavioral || lambda_is_behavioral(node, ctx),
                ..state
            };
            return metrics.merge(descend(node, ctx, child_state));
        }
        _ => {}
    }

    if let Some(construct) = control_construct(kind) {
        return metrics.merge(walk_construct(node, ctx, state, construct));
    }

    metrics.merge(descend(node, ctx, state))
}

fn descend(node: Node<'_>, ctx: &FileContext<'_>, state: WalkState) -> BodyMetrics {
    named_children(node)
        .into_iter()
        .map(|child| walk(child, ctx, state))
        .fold(BodyMetrics::default(), BodyMetrics::merge)
}

fn walk_construct(
    node: Node<'_>,
    ctx: &FileContext<'_>,
    state: WalkState,
    construct: ControlConstruct,
) -> BodyMetrics {
    let mut metrics = BodyMetrics::default();

    // An `else if` link continues a flat decision chain; it still counts a
    // branch but does not nest deeper.
    let chain_link = construct == ControlConstruct::If && is_else_if_link(node);
    let depth_here = if chain_link {
        state.depth.max(1)
    } else {
        state.depth + 1
    };

    metrics.branches += match construct {
        ControlConstruct::If => 1,
        ControlConstruct::When => conditioned_when_entries(node).saturating_sub(1),
        ControlConstruct::For
        | ControlConstruct::While
        | ControlConstruct::DoWhile
        | ControlConstruct::IterationCall => 1,
    };
    if construct.is_loop() {
        metrics.loops += 1;
    }
    if state.behavioral {
        metrics.behavioral_control_flow += 1;
    } else {
        metrics.render_control_flow += 1;
    }
    metrics.max_depth = depth_here;

    metrics.statements += braceless_body_statements(node, construct);

    let child_state = WalkState {
        depth: depth_here,
        ..state
    };
    metrics.merge(descend(node, ctx, child_state))
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "line_comment" | "block_comment")
}

/// Counts the direct statements of a `block` or `lambda_literal`.
fn statement_children(node: Node<'_>) -> usize {
    named_children(node)
        .into_iter()
        .filter(|n| !is_comment(n.kind()) && n.kind() != "lambda_parameters")
        .count()
}

/// Counts the single statement of a braceless `when` entry body.
fn braceless_entry_statement(entry: Node<'_>) -> usize {
    let body = named_children(entry)
        .into_iter()
        .filter(|n| !is_comment(n.kind()))
        .last();
    usize::from(body.is_some_and(|n| n.kind() != "block"))
}

/// Counts the braceless bodies of a keyword construct. A block body counts
/// its own statements; an `else if` link counts through its own bodies.
fn braceless_body_statements(node: Node<'_>, construct: ControlConstruct) -> usize {
    let condition_id = node.child_by_field_name("condition").map(|n| n.id());
    let bodies: Vec<Node<'_>> = named_children(node)
        .into_iter()
        .filter(|n| {
            Some(n.id()) != condition_id
                && !is_comment(n.kind())
                && !matches!(n.kind(), "label" | "annotation")
        })
        .collect();

    match construct {
        ControlConstruct::If | ControlConstruct::While | ControlConstruct::DoWhile => bodies
            .iter()
            .filter(|n| !matches!(n.kind(), "block" | "if_expression"))
            .count(),
        // `for (v in seq) body`: the first two children are the loop
        // variable and the sequence expression.
        ControlConstruct::For => bodies
            .iter()
            .skip(2)
            .filter(|n| n.kind() != "block")
            .count(),
        // Statements live in the entries, handled by [`walk`].
        ControlConstruct::When | ControlConstruct::IterationCall => 0,
    }
}

fn walk_call(node: Node<'_>, ctx: &FileContext<'_>, state: WalkState) -> BodyMetrics {
    let mut metrics = BodyMetrics::default();
    let call = CallExpr { node };
    let callee = call.callee_name(ctx.source).unwrap_or_default();

    // Effect bodies are scored by the effect sub-engine; here the invocation
    // only registers as a launched scope.
    if EFFECT_CONSTRUCTS.contains(&callee.as_str()) {
        metrics.launched_scopes += 1;
        return metrics;
    }

    let has_lambda = call.has_lambda_argument(ctx.source);

    if SCOPE_LAUNCHERS.contains(&callee.as_str()) && has_lambda {
        metrics.launched_scopes += 1;
        let child_state = WalkState {
            behavioral: true,
            ..state
        };
        return metrics.merge(descend(node, ctx, child_state));
    }

    if ITERATION_CALLS.contains(&callee.as_str()) && has_lambda {
        return metrics.merge(walk_construct(node, ctx, state, ControlConstruct::IterationCall));
    }

    metrics.merge(descend(node, ctx, state))
}

/// Classifies the lambda's execution context from its owning call.
pub(crate) fn lambda_is_behavioral(lambda: Node<'_>, ctx: &FileContext<'_>) -> bool {
    let Some((call, label)) = owning_call(lambda) else {
        return false;
    };
    if let Some(label) = label {
        if is_callback_label(&ctx.source[label.byte_range()]) {
            return true;
        }
    }
    let Some(callee) = call.callee_name(ctx.source) else {
        return false;
    };
    // Content slots of UI calls and inline scope/iteration lambdas run
    // during composition; everything else lowercase is a deferred callback
    // (clickable, pointerInput, listener registration, ...).
    !(is_capitalized(&callee)
        || ITERATION_CALLS.contains(&callee.as_str())
        || RENDER_SCOPE_CALLS.contains(&callee.as_str()))
}

/// Finds the call a lambda argument belongs to, plus its named-argument
/// label when the `label = { ... }` form is used.
pub(crate) fn owning_call<'t>(lambda: Node<'t>) -> Option<(CallExpr<'t>, Option<Node<'t>>)> {
    let parent = lambda.parent()?;
    match parent.kind() {
        "annotated_lambda" => {
            let call = parent.parent()?;
            Some((CallExpr::cast(call)?, None))
        }
        "value_argument" => {
            let label = named_children(parent)
                .into_iter()
                .find(|n| n.kind() == "identifier" && n.id() != lambda.id());
            let args = parent.parent()?;
            let call = args.parent()?;
            Some((CallExpr::cast(call)?, label))
        }
        _ => None,
    }
}

fn is_else_if_link(node: Node<'_>) -> bool {
    // The grammar hangs an `else if` directly off the outer `if_expression`.
    node.parent().is_some_and(|p| p.kind() == "if_expression")
}

fn conditioned_when_entries(node: Node<'_>) -> usize {
    named_children(node)
        .into_iter()
        .filter(|n| n.kind() == "when_entry")
        .filter(|entry| entry.child_by_field_name("condition").is_some())
        .count()
}

/// Collects the distinct observed-state sources accessed in a body.
///
/// Keys are the extracted identifier when one is derivable (the property a
/// provider lookup initializes, the receiver of a collect call), else the
/// raw call text.
pub fn state_sources(body: Node<'_>, ctx: &FileContext<'_>) -> FxHashSet<String> {
    let mut sources = FxHashSet::default();
    for call in calls_in(body) {
        let Some(callee) = call.callee_name(ctx.source) else {
            continue;
        };
        if STATE_PROVIDER_CALLS.contains(&callee.as_str()) {
            sources.insert(provider_key(&call, ctx));
        } else if STATE_FACTORIES.contains(&callee.as_str())
            && callee.starts_with("collectAsState")
        {
            let key = call
                .receiver_root(ctx.source)
                .unwrap_or_else(|| ctx.source[call.node.byte_range()].to_string());
            sources.insert(key);
        }
    }
    sources
}

fn provider_key(call: &CallExpr<'_>, ctx: &FileContext<'_>) -> String {
    for ancestor in kotlin_syntax::ancestors(call.node) {
        if let Some(prop) = PropertyDecl::cast(ancestor) {
            if let Some(name) = prop.name(ctx.source) {
                return name;
            }
        }
    }
    ctx.source[call.node.byte_range()].to_string()
}
