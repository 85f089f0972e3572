//! Phase 2: derived-reactivity fixpoint and chain detection.
//!
//! Works entirely on the phase-1 summaries. Reactivity is propagated along
//! resolved forwarding edges with a worklist until no (function, parameter)
//! pair is newly derived, then pass-through nodes are linked into chains and
//! every node on a chain of at least `min_chain` hops is flagged.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use kotlin_syntax::Span;

use super::collect::{CallSiteArgument, CollectedFunctionInfo, FuncId};

/// Where a forwarded reactive value was first introduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Function that declared the state.
    pub function: SmolStr,
    /// Name of the locally declared state variable.
    pub variable: SmolStr,
    pub span: Span,
}

/// A parameter that only relays reactive state further down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedParam {
    pub function: SmolStr,
    pub function_id: FuncId,
    pub param: SmolStr,
    /// Span of the parameter name in the declaration.
    pub span: Span,
    /// Number of consecutive pass-through hops on the chain this node sits on.
    pub chain_len: usize,
    /// Callee function and parameter this value is relayed into, when the
    /// callee is declared in the same file.
    pub forwarded_to: Option<(SmolStr, SmolStr)>,
    /// Traced back to the state declaration, when one is visible in-file.
    pub origin: Option<Origin>,
}

/// (function index, parameter index) node in the forwarding graph.
type ParamNode = (usize, usize);

/// What a forwarding edge carries out of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeSource {
    /// Caller parameter by index.
    Param(usize),
    /// Caller-local reactive variable, by index into a side table.
    Local(usize),
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    caller: usize,
    source: EdgeSource,
    target: ParamNode,
}

/// Runs the inter-procedural analysis over one file's function summaries.
///
/// `min_chain` is the shortest run of consecutive pass-through hops worth
/// reporting; a single hop is taken as intentional and never flagged.
pub fn analyze(funcs: &[CollectedFunctionInfo], min_chain: usize) -> Vec<FlaggedParam> {
    if funcs.is_empty() {
        return Vec::new();
    }

    let mut by_name: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (i, f) in funcs.iter().enumerate() {
        by_name.entry(f.name.as_str()).or_default().push(i);
    }

    // Caller-local reactive variables, flattened so edges can index them.
    let mut locals: Vec<(usize, SmolStr, Span)> = Vec::new();
    let mut local_index: FxHashMap<(usize, SmolStr), usize> = FxHashMap::default();
    for (i, f) in funcs.iter().enumerate() {
        let mut names: Vec<_> = f.local_reactive.iter().collect();
        names.sort_by_key(|(name, _)| name.as_str());
        for (name, span) in names {
            local_index.insert((i, name.clone()), locals.len());
            locals.push((i, name.clone(), *span));
        }
    }

    let edges = build_edges(funcs, &by_name, &local_index);

    // Outgoing and incoming edges per target parameter.
    let mut out_by_param: FxHashMap<ParamNode, Vec<usize>> = FxHashMap::default();
    let mut in_edges: FxHashMap<ParamNode, Vec<usize>> = FxHashMap::default();
    for (ei, edge) in edges.iter().enumerate() {
        if let EdgeSource::Param(p) = edge.source {
            out_by_param.entry((edge.caller, p)).or_default().push(ei);
        }
        in_edges.entry(edge.target).or_default().push(ei);
    }

    let reactive = derive_reactive(funcs, &edges, &out_by_param);
    let pt = pass_through_set(funcs, &reactive);

    // Successor of a pass-through node: a parameter forwards at most once,
    // so at most one resolved edge leaves it.
    let succ = |node: ParamNode| -> Option<ParamNode> {
        let ei = *out_by_param.get(&node)?.first()?;
        let target = edges[ei].target;
        pt.contains(&target).then_some(target)
    };
    let preds = |node: ParamNode| -> Vec<ParamNode> {
        let mut found = Vec::new();
        if let Some(ins) = in_edges.get(&node) {
            for &ei in ins {
                if let EdgeSource::Param(p) = edges[ei].source {
                    let src = (edges[ei].caller, p);
                    if pt.contains(&src) {
                        found.push(src);
                    }
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    };

    let mut flagged = Vec::new();
    for (fi, f) in funcs.iter().enumerate() {
        for (pi, param) in f.params.iter().enumerate() {
            let node = (fi, pi);
            if !pt.contains(&node) {
                continue;
            }
            let len = chain_length(node, &succ, &preds);
            if len < min_chain {
                continue;
            }
            let forwarded_to = out_by_param
                .get(&node)
                .and_then(|es| es.first())
                .map(|&ei| {
                    let (ci, cp) = edges[ei].target;
                    (funcs[ci].name.clone(), funcs[ci].params[cp].name.clone())
                });
            let origin = trace_origin(node, funcs, &edges, &in_edges, &pt, &locals);
            flagged.push(FlaggedParam {
                function: f.name.clone(),
                function_id: f.id,
                param: param.name.clone(),
                span: param.span,
                chain_len: len,
                forwarded_to,
                origin,
            });
        }
    }
    flagged
}

/// One edge per call-site argument that is a bare name of either a caller
/// parameter or a caller-local reactive variable, resolved to a declared
/// callee parameter. Unresolvable callees produce no edge.
fn build_edges(
    funcs: &[CollectedFunctionInfo],
    by_name: &FxHashMap<&str, Vec<usize>>,
    local_index: &FxHashMap<(usize, SmolStr), usize>,
) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (fi, f) in funcs.iter().enumerate() {
        for site in &f.call_sites {
            let Some(arg_name) = &site.simple_argument_name else {
                continue;
            };
            let source = if let Some(pi) = f.param_index(arg_name) {
                EdgeSource::Param(pi)
            } else if let Some(&li) = local_index.get(&(fi, arg_name.clone())) {
                EdgeSource::Local(li)
            } else {
                continue;
            };
            let Some(ci) = resolve_callee(funcs, by_name, site) else {
                continue;
            };
            let Some(pi) = target_param(&funcs[ci], site) else {
                continue;
            };
            edges.push(Edge {
                caller: fi,
                source,
                target: (ci, pi),
            });
        }
    }
    edges
}

/// Overload resolution by nearest argument count. A tie keeps the overload
/// declared first in the file.
fn resolve_callee(
    funcs: &[CollectedFunctionInfo],
    by_name: &FxHashMap<&str, Vec<usize>>,
    site: &CallSiteArgument,
) -> Option<usize> {
    let candidates = by_name.get(site.callee_name.as_str())?;
    candidates
        .iter()
        .copied()
        .min_by_key(|&i| (funcs[i].params.len().abs_diff(site.total_arg_count), i))
}

fn target_param(callee: &CollectedFunctionInfo, site: &CallSiteArgument) -> Option<usize> {
    match &site.named_label {
        Some(label) => callee.param_index(label),
        None => (site.positional_index < callee.params.len()).then_some(site.positional_index),
    }
}

/// Least fixpoint of "carries an observed-state value" over parameters.
///
/// Seeds: reactive-typed parameters and targets of local-reactive forwards.
/// Propagation: a derived-reactive parameter makes every parameter it is
/// forwarded into derived-reactive too. Each node enters the worklist at
/// most once, so this terminates without an iteration cap.
fn derive_reactive(
    funcs: &[CollectedFunctionInfo],
    edges: &[Edge],
    out_by_param: &FxHashMap<ParamNode, Vec<usize>>,
) -> FxHashSet<ParamNode> {
    let mut reactive: FxHashSet<ParamNode> = FxHashSet::default();
    let mut worklist: Vec<ParamNode> = Vec::new();

    for (fi, f) in funcs.iter().enumerate() {
        for (pi, p) in f.params.iter().enumerate() {
            if p.reactive_type && reactive.insert((fi, pi)) {
                worklist.push((fi, pi));
            }
        }
    }
    for edge in edges {
        if matches!(edge.source, EdgeSource::Local(_)) && reactive.insert(edge.target) {
            worklist.push(edge.target);
        }
    }

    // Hard cap on pops; the insert guard already bounds the loop, the cap
    // only protects against a modeling bug in edge construction.
    let mut budget = funcs
        .iter()
        .map(|f| f.params.len())
        .sum::<usize>()
        .saturating_add(edges.len())
        .saturating_mul(2)
        .max(64);
    while let Some(node) = worklist.pop() {
        if budget == 0 {
            break;
        }
        budget -= 1;
        if let Some(outs) = out_by_param.get(&node) {
            for &ei in outs {
                let target = edges[ei].target;
                if reactive.insert(target) {
                    worklist.push(target);
                }
            }
        }
    }
    reactive
}

/// A parameter is a pass-through when it carries a reactive value, is never
/// read locally, and appears exactly once in the body, as a bare forwarded
/// argument.
fn pass_through_set(
    funcs: &[CollectedFunctionInfo],
    reactive: &FxHashSet<ParamNode>,
) -> FxHashSet<ParamNode> {
    let mut pt = FxHashSet::default();
    for &(fi, pi) in reactive {
        let f = &funcs[fi];
        let name = &f.params[pi].name;
        let forwards = f.forward_counts.get(name).copied().unwrap_or(0);
        if forwards == 1 && !f.consumed.contains(name) {
            pt.insert((fi, pi));
        }
    }
    pt
}

/// Length of the maximal run of consecutive pass-through nodes through
/// `node`, counted in nodes. Cycles (recursive forwarding) are cut at the
/// revisit point.
fn chain_length(
    node: ParamNode,
    succ: &dyn Fn(ParamNode) -> Option<ParamNode>,
    preds: &dyn Fn(ParamNode) -> Vec<ParamNode>,
) -> usize {
    let mut seen: FxHashSet<ParamNode> = FxHashSet::default();
    seen.insert(node);

    let mut forward = 0usize;
    let mut cur = node;
    while let Some(next) = succ(cur) {
        if !seen.insert(next) {
            break;
        }
        forward += 1;
        cur = next;
    }

    // Longest backward run; forwarding fans in, so take the deepest caller.
    let mut backward = 0usize;
    let mut frontier = vec![node];
    loop {
        let mut next_frontier = Vec::new();
        for n in frontier {
            for p in preds(n) {
                if seen.insert(p) {
                    next_frontier.push(p);
                }
            }
        }
        if next_frontier.is_empty() {
            break;
        }
        backward += 1;
        frontier = next_frontier;
    }

    forward + backward + 1
}

/// Walks backward to the chain root, then to the local state variable the
/// root's caller supplied, if that caller is in the file.
fn trace_origin(
    node: ParamNode,
    funcs: &[CollectedFunctionInfo],
    edges: &[Edge],
    in_edges: &FxHashMap<ParamNode, Vec<usize>>,
    pt: &FxHashSet<ParamNode>,
    locals: &[(usize, SmolStr, Span)],
) -> Option<Origin> {
    let mut seen: FxHashSet<ParamNode> = FxHashSet::default();
    let mut root = node;
    seen.insert(root);
    loop {
        let mut moved = false;
        if let Some(ins) = in_edges.get(&root) {
            for &ei in ins {
                if let EdgeSource::Param(p) = edges[ei].source {
                    let src = (edges[ei].caller, p);
                    if pt.contains(&src) && seen.insert(src) {
                        root = src;
                        moved = true;
                        break;
                    }
                }
            }
        }
        if !moved {
            break;
        }
    }

    // The root is either fed by a caller's local state declaration or is
    // reactive purely by its declared type; only the former has an origin.
    let ins = in_edges.get(&root)?;
    for &ei in ins {
        if let EdgeSource::Local(li) = edges[ei].source {
            let (caller, variable, span) = &locals[li];
            return Some(Origin {
                function: funcs[*caller].name.clone(),
                variable: variable.clone(),
                span: *span,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass_through::collect_functions;
    use crate::test_support::context;
    use kotlin_syntax::SyntaxTree;
    use pretty_assertions::assert_eq;

    fn flags(source: &str) -> Vec<FlaggedParam> {
        let tree = SyntaxTree::parse(source).unwrap();
        let ctx = context(&tree);
        let funcs = collect_functions(&ctx, tree.root());
        analyze(&funcs, 2)
    }

    #[test]
    fn single_hop_is_not_reported() {
        let flagged = flags(
            r#"
            @Composable
            fun Parent() {
                val count by remember { mutableStateOf(0) }
                Child(count)
            }

            @Composable
            fun Child(count: Int) {
                Text("value: $count")
            }
            "#,
        );
        assert_eq!(flagged, vec![]);
    }

    #[test]
    fn two_hop_chain_flags_both_relays() {
        let flagged = flags(
            r#"
            @Composable
            fun Parent() {
                val count by remember { mutableStateOf(0) }
                Middle(count)
            }

            @Composable
            fun Middle(count: Int) {
                Inner(count)
            }

            @Composable
            fun Inner(count: Int) {
                Leaf(count)
            }
            "#,
        );
        let names: Vec<_> = flagged
            .iter()
            .map(|f| (f.function.as_str(), f.param.as_str()))
            .collect();
        assert_eq!(names, vec![("Middle", "count"), ("Inner", "count")]);
        assert!(flagged.iter().all(|f| f.chain_len == 2));
    }

    #[test]
    fn three_hop_chain_traces_one_origin() {
        let flagged = flags(
            r#"
            @Composable
            fun Outer() {
                val items by remember { mutableStateOf(listOf<String>()) }
                A(items)
            }

            @Composable
            fun A(items: List<String>) {
                B(items)
            }

            @Composable
            fun B(items: List<String>) {
                C(items)
            }

            @Composable
            fun C(items: List<String>) {
                D(items)
            }
            "#,
        );
        assert_eq!(flagged.len(), 3);
        for f in &flagged {
            let origin = f.origin.as_ref().expect("origin should trace to Outer");
            assert_eq!(origin.function.as_str(), "Outer");
            assert_eq!(origin.variable.as_str(), "items");
        }
        assert!(flagged.iter().all(|f| f.chain_len == 3));
    }

    #[test]
    fn consumption_breaks_the_chain() {
        let flagged = flags(
            r#"
            @Composable
            fun Parent() {
                val count by remember { mutableStateOf(0) }
                Middle(count)
            }

            @Composable
            fun Middle(count: Int) {
                Text("have $count")
                Inner(count)
            }

            @Composable
            fun Inner(count: Int) {
                Leaf(count)
            }
            "#,
        );
        // Middle reads the value, so no run of two relays exists.
        assert_eq!(flagged, vec![]);
    }

    #[test]
    fn named_argument_matches_positional_resolution() {
        let positional = flags(
            r#"
            @Composable
            fun Parent() {
                val count by remember { mutableStateOf(0) }
                Middle(count)
            }

            @Composable
            fun Middle(count: Int) {
                Inner(count)
            }

            @Composable
            fun Inner(count: Int) {
                Leaf(count)
            }
            "#,
        );
        let named = flags(
            r#"
            @Composable
            fun Parent() {
                val count by remember { mutableStateOf(0) }
                Middle(count = count)
            }

            @Composable
            fun Middle(count: Int) {
                Inner(count = count)
            }

            @Composable
            fun Inner(count: Int) {
                Leaf(count)
            }
            "#,
        );
        let key = |v: &[FlaggedParam]| {
            v.iter()
                .map(|f| (f.function.clone(), f.param.clone(), f.chain_len))
                .collect::<Vec<_>>()
        };
        assert_eq!(key(&positional), key(&named));
    }

    #[test]
    fn overload_resolves_by_argument_count() {
        let flagged = flags(
            r#"
            @Composable
            fun Parent() {
                val state by remember { mutableStateOf("") }
                Widget(state, 1, 2)
            }

            @Composable
            fun Widget(text: String) {
                Text(text)
            }

            @Composable
            fun Widget(text: String, a: Int, b: Int) {
                Inner(text)
            }

            @Composable
            fun Inner(text: String) {
                Leaf(text)
            }
            "#,
        );
        // The three-argument call must reach the three-parameter overload.
        let names: Vec<_> = flagged
            .iter()
            .map(|f| (f.function.as_str(), f.param.as_str()))
            .collect();
        assert_eq!(names, vec![("Widget", "text"), ("Inner", "text")]);
    }

    #[test]
    fn reactive_typed_parameter_is_a_seed() {
        let flagged = flags(
            r#"
            @Composable
            fun Screen(state: MutableState<Int>) {
                Middle(state)
            }

            @Composable
            fun Middle(state: MutableState<Int>) {
                Inner(state)
            }

            @Composable
            fun Inner(state: MutableState<Int>) {
                Text("${state.value}")
            }
            "#,
        );
        let names: Vec<_> = flagged
            .iter()
            .map(|f| (f.function.as_str(), f.param.as_str()))
            .collect();
        assert_eq!(names, vec![("Screen", "state"), ("Middle", "state")]);
        // No in-file state declaration feeds the chain.
        assert!(flagged.iter().all(|f| f.origin.is_none()));
    }

    #[test]
    fn unresolved_callee_stops_the_chain() {
        let flagged = flags(
            r#"
            @Composable
            fun Parent() {
                val count by remember { mutableStateOf(0) }
                Middle(count)
            }

            @Composable
            fun Middle(count: Int) {
                SomewhereElse(count)
            }
            "#,
        );
        assert_eq!(flagged, vec![]);
    }
}
