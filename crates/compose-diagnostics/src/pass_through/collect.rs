//! Phase 1: per-function summaries.

use crate::patterns::{is_reactive_type, STATE_FACTORIES};
use crate::FileContext;
use kotlin_syntax::{
    calls_in, descendants_matching, functions_in, named_children, properties_in, CallExpr,
    FunctionDecl, Span,
};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tree_sitter::Node;

/// Identity of a function within one file.
///
/// Same-named overloads get distinct ordinals; the identity is meaningless
/// outside the file it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub usize);

/// One declared parameter, as phase 2 needs it.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    /// The parameter name.
    pub name: SmolStr,
    /// True when the declared type is a reactive container.
    pub reactive_type: bool,
    /// The span of the name token.
    pub span: Span,
}

/// One argument at one call site.
#[derive(Debug, Clone)]
pub struct CallSiteArgument {
    /// The callee's simple name.
    pub callee_name: SmolStr,
    /// Arguments at the call site, trailing lambda included; used for
    /// overload disambiguation.
    pub total_arg_count: usize,
    /// Zero-based position among the parenthesized arguments.
    pub positional_index: usize,
    /// The named-argument label, when present.
    pub named_label: Option<SmolStr>,
    /// The argument's name when it is a bare identifier.
    pub simple_argument_name: Option<SmolStr>,
    /// The argument's location.
    pub span: Span,
}

/// The phase-1 summary of one function.
#[derive(Debug, Clone)]
pub struct CollectedFunctionInfo {
    /// This function's identity.
    pub id: FuncId,
    /// The declared name.
    pub name: SmolStr,
    /// The span of the name token.
    pub name_span: Span,
    /// Declared parameters in order.
    pub params: Vec<ParamInfo>,
    /// Locally declared reactive variables and their declaration spans.
    pub local_reactive: FxHashMap<SmolStr, Span>,
    /// All arguments at all call sites in the body.
    pub call_sites: Vec<CallSiteArgument>,
    /// Names referenced in any position other than bare argument forwarding.
    pub consumed: FxHashSet<SmolStr>,
    /// Per-name count of bare forwarding uses.
    pub forward_counts: FxHashMap<SmolStr, usize>,
}

impl CollectedFunctionInfo {
    /// Index of a parameter by name.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

/// Summarizes every function declared in the file, in declaration order.
pub fn collect_functions(ctx: &FileContext<'_>, root: Node<'_>) -> Vec<CollectedFunctionInfo> {
    functions_in(root)
        .iter()
        .enumerate()
        .filter_map(|(ordinal, func)| collect_one(func, FuncId(ordinal), ctx))
        .collect()
}

fn collect_one(
    func: &FunctionDecl<'_>,
    id: FuncId,
    ctx: &FileContext<'_>,
) -> Option<CollectedFunctionInfo> {
    let name = func.name(ctx.source)?;

    let params: Vec<ParamInfo> = func
        .parameters(ctx.source)
        .iter()
        .map(|p| ParamInfo {
            name: SmolStr::new(&p.name),
            reactive_type: is_reactive_type(&p.type_text),
            span: Span::of(p.name_node),
        })
        .collect();

    let mut info = CollectedFunctionInfo {
        id,
        name: SmolStr::new(&name),
        name_span: func.name_span(),
        params,
        local_reactive: FxHashMap::default(),
        call_sites: Vec::new(),
        consumed: FxHashSet::default(),
        forward_counts: FxHashMap::default(),
    };

    let Some(body) = func.body_block() else {
        // Bodiless declarations still participate as call targets.
        return Some(info);
    };

    collect_local_reactive(body, ctx, &mut info);
    collect_call_sites(body, ctx, &mut info);
    collect_references(body, ctx, &mut info);

    Some(info)
}

/// Local variables bound to observed state, directly or via `remember`.
fn collect_local_reactive(body: Node<'_>, ctx: &FileContext<'_>, info: &mut CollectedFunctionInfo) {
    for prop in properties_in(body) {
        let Some(name) = prop.name(ctx.source) else {
            continue;
        };
        let Some(init) = prop.initializer() else {
            continue;
        };
        let creates_state = calls_in(init).iter().any(|call| {
            call.callee_name(ctx.source)
                .is_some_and(|callee| STATE_FACTORIES.contains(&callee.as_str()))
        }) || CallExpr::cast(init).is_some_and(|call| {
            call.callee_name(ctx.source)
                .is_some_and(|callee| STATE_FACTORIES.contains(&callee.as_str()))
        });
        if creates_state {
            let span = prop
                .name_node()
                .map(Span::of)
                .unwrap_or_else(|| Span::of(prop.node));
            info.local_reactive.insert(SmolStr::new(&name), span);
        }
    }
}

fn collect_call_sites(body: Node<'_>, ctx: &FileContext<'_>, info: &mut CollectedFunctionInfo) {
    for call in calls_in(body) {
        let Some(callee) = call.callee_name(ctx.source) else {
            continue;
        };
        let total = call.total_arg_count(ctx.source);
        for (index, arg) in call.value_arguments(ctx.source).iter().enumerate() {
            let simple = (arg.value.kind() == "identifier")
                .then(|| SmolStr::new(&ctx.source[arg.value.byte_range()]));
            info.call_sites.push(CallSiteArgument {
                callee_name: SmolStr::new(&callee),
                total_arg_count: total,
                positional_index: index,
                named_label: arg.label.as_deref().map(SmolStr::new),
                simple_argument_name: simple,
                span: Span::of(arg.value),
            });
        }
    }
}

/// Classifies every identifier reference in the body as either a bare
/// forwarding use (the whole argument is the identifier) or a consumption.
/// Named-argument labels are neither.
fn collect_references(body: Node<'_>, ctx: &FileContext<'_>, info: &mut CollectedFunctionInfo) {
    let param_names: FxHashSet<&SmolStr> = info.params.iter().map(|p| &p.name).collect();

    for ident in descendants_matching(body, |n| n.kind() == "identifier") {
        let text = &ctx.source[ident.byte_range()];
        if !param_names.iter().any(|p| p.as_str() == text) {
            continue;
        }
        match reference_role(ident) {
            ReferenceRole::Label | ReferenceRole::Declaration => {}
            ReferenceRole::Forwarded => {
                *info.forward_counts.entry(SmolStr::new(text)).or_insert(0) += 1;
            }
            ReferenceRole::Consumed => {
                info.consumed.insert(SmolStr::new(text));
            }
        }
    }
}

enum ReferenceRole {
    /// The value slot of an argument, as a bare identifier.
    Forwarded,
    /// The label of a named argument.
    Label,
    /// A declaration-site name, not a use.
    Declaration,
    /// Any other reference.
    Consumed,
}

fn reference_role(ident: Node<'_>) -> ReferenceRole {
    let Some(parent) = ident.parent() else {
        return ReferenceRole::Consumed;
    };
    match parent.kind() {
        "value_argument" => {
            // The value is the last named child; an identifier before it can
            // only be the named-argument label.
            let children = named_children(parent);
            if children.last().is_some_and(|n| n.id() == ident.id()) {
                ReferenceRole::Forwarded
            } else {
                ReferenceRole::Label
            }
        }
        // `param ->` in a lambda, or a variable declaration re-using the name.
        "lambda_parameters" | "variable_declaration" | "parameter" => ReferenceRole::Declaration,
        _ => ReferenceRole::Consumed,
    }
}
