//! Reactive pass-through analysis.
//!
//! A two-phase, file-scoped, inter-procedural analysis. Phase 1 visits each
//! function once and summarizes it (reactive parameters, locally created
//! state, call sites, locally consumed names). Phase 2 resolves call sites
//! against the file's functions, runs a worklist fixpoint propagating
//! "carries a reactive value" facts along forwarded arguments, and flags
//! parameters that sit in a chain of two or more consecutive unconsumed
//! pass-throughs. A single forwarding hop is legitimate prop-drilling and is
//! never reported.
//!
//! All state lives for exactly one file: the summaries are built inside the
//! analysis call and dropped when it returns.

mod collect;
mod fixpoint;

pub use collect::{collect_functions, CallSiteArgument, CollectedFunctionInfo, FuncId, ParamInfo};
pub use fixpoint::{analyze, FlaggedParam, Origin};
