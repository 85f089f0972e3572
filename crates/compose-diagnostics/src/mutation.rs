//! Detection of state writes on the render path.
//!
//! A write to observed state while the function body is being composed
//! re-triggers composition of the same body. Writes are only safe from
//! deferred execution contexts: event callbacks and lifecycle effects.

use smol_str::SmolStr;
use tree_sitter::Node;

use kotlin_syntax::{calls_in, descendants_of_kind, named_children, CallExpr, FunctionDecl, Span};

use crate::control_flow::lambda_is_behavioral;
use crate::control_flow::owning_call;
use crate::patterns::{is_reactive_type, EFFECT_CONSTRUCTS, STATE_FACTORIES};
use crate::FileContext;

/// One state write found on the render path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderMutation {
    /// Name of the state variable being written.
    pub target: SmolStr,
    pub kind: MutationKind,
    /// Span of the whole assignment.
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// `state.value = ...` on a state container.
    BackingValue,
    /// `counter = ...` on a variable delegated to a state factory.
    DelegatedVariable,
}

/// Finds assignments to observed state that run during composition of
/// `func`. Writes inside callback lambdas and effect bodies are skipped;
/// writes inside content slots are not, those run on every composition.
pub fn mutations_in_render(
    func: &FunctionDecl<'_>,
    ctx: &FileContext<'_>,
) -> Vec<RenderMutation> {
    let Some(body) = func.body_block() else {
        return Vec::new();
    };

    let reactive_params: Vec<SmolStr> = func
        .parameters(ctx.source)
        .iter()
        .filter(|p| is_reactive_type(&p.type_text))
        .map(|p| SmolStr::new(&p.name))
        .collect();

    let mut found = Vec::new();
    for assignment in descendants_of_kind(body, "assignment") {
        let Some(mutation) = classify_target(assignment, ctx, &reactive_params) else {
            continue;
        };
        if on_render_path(assignment, func.node, ctx) {
            found.push(mutation);
        }
    }
    found
}

/// Decides whether the assignment's left-hand side is observed state.
fn classify_target(
    assignment: Node<'_>,
    ctx: &FileContext<'_>,
    reactive_params: &[SmolStr],
) -> Option<RenderMutation> {
    let lhs = assignment.child_by_field_name("left")?;
    let span = Span::of(assignment);

    if lhs.kind() != "identifier" {
        let (receiver, member) = split_navigation(lhs, ctx)?;
        if member != "value" {
            return None;
        }
        let is_state = reactive_params.iter().any(|p| p == receiver.as_str())
            || ctx
                .symbols
                .resolve(&receiver)
                .is_some_and(|b| binding_creates_state(b.initializer, ctx));
        return is_state.then(|| RenderMutation {
            target: receiver,
            kind: MutationKind::BackingValue,
            span,
        });
    }

    if lhs.kind() == "identifier" {
        let name = SmolStr::new(&ctx.source[lhs.byte_range()]);
        let binding = ctx.symbols.resolve(&name)?;
        if binding.delegated && binding_creates_state(binding.initializer, ctx) {
            return Some(RenderMutation {
                target: name,
                kind: MutationKind::DelegatedVariable,
                span,
            });
        }
    }
    None
}

/// Walks ancestors up to the enclosing function. The nearest lambda decides:
/// callbacks and effect bodies are deferred, everything else (content slots,
/// inline scope functions, iteration lambdas) still runs during composition.
pub(crate) fn on_render_path(assignment: Node<'_>, func_node: Node<'_>, ctx: &FileContext<'_>) -> bool {
    let mut cursor = assignment;
    while let Some(parent) = cursor.parent() {
        if parent.id() == func_node.id() || parent.kind() == "function_declaration" {
            return true;
        }
        if parent.kind() == "lambda_literal" {
            return !legitimizes_mutation(parent, ctx);
        }
        cursor = parent;
    }
    true
}

fn legitimizes_mutation(lambda: Node<'_>, ctx: &FileContext<'_>) -> bool {
    if let Some((call, _)) = owning_call(lambda) {
        if let Some(callee) = call.callee_name(ctx.source) {
            if EFFECT_CONSTRUCTS.contains(&callee.as_str()) {
                return true;
            }
        }
    }
    lambda_is_behavioral(lambda, ctx)
}

/// `receiver.member` split for a single-step `navigation_expression` with
/// an identifier receiver.
fn split_navigation(nav: Node<'_>, ctx: &FileContext<'_>) -> Option<(SmolStr, SmolStr)> {
    if nav.kind() != "navigation_expression" {
        return None;
    }
    let children = named_children(nav);
    let [receiver, member] = children.as_slice() else {
        return None;
    };
    if receiver.kind() != "identifier" || member.kind() != "identifier" {
        return None;
    }
    Some((
        SmolStr::new(&ctx.source[receiver.byte_range()]),
        SmolStr::new(&ctx.source[member.byte_range()]),
    ))
}

fn binding_creates_state(initializer: Option<Node<'_>>, ctx: &FileContext<'_>) -> bool {
    let Some(init) = initializer else {
        return false;
    };
    let direct = CallExpr::cast(init)
        .and_then(|c| c.callee_name(ctx.source))
        .is_some_and(|callee| STATE_FACTORIES.contains(&callee.as_str()));
    direct
        || calls_in(init).iter().any(|c| {
            c.callee_name(ctx.source)
                .is_some_and(|callee| STATE_FACTORIES.contains(&callee.as_str()))
        })
}
