//! Anti-pattern detectors for Jetpack Compose sources.
//!
//! The crate analyzes one file at a time: [`check_file`] parses the source,
//! builds a [`FileContext`], runs every enabled rule, and returns the
//! diagnostics sorted by position. No state survives the call, so files can
//! be checked independently and in parallel by the caller.

pub mod config;
pub mod const_eval;
pub mod control_flow;
pub mod diagnostic;
pub mod effects;
pub mod mutation;
pub mod pass_through;
pub mod patterns;
pub mod registry;
pub mod rules;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use kotlin_syntax::{functions_in, SymbolTable, SyntaxTree};

pub use config::RuleConfig;
pub use diagnostic::{Diagnostic, RelatedInfo, RuleCode, Severity};
pub use kotlin_syntax::{ParseError, Span};
pub use registry::{all_rules, RuleInfo};

/// Per-file analysis context shared by every detector.
///
/// Holds the source text, the name-keyed symbol table, and the set of
/// `@Composable` functions declared in the file. Built once per file and
/// dropped when the file's analysis finishes.
pub struct FileContext<'t> {
    /// The file's source text.
    pub source: &'t str,
    /// Name-keyed bindings for the whole file.
    pub symbols: SymbolTable<'t>,
    /// Names of `@Composable` functions declared in this file.
    pub composables: FxHashSet<SmolStr>,
}

impl<'t> FileContext<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        let source = tree.source();
        let root = tree.root();
        let composables = functions_in(root)
            .iter()
            .filter(|f| f.is_composable(source))
            .filter_map(|f| f.name(source))
            .map(|name| SmolStr::new(&name))
            .collect();
        Self {
            source,
            symbols: SymbolTable::build(root, source),
            composables,
        }
    }
}

/// Which rules to run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    enabled: FxHashSet<RuleCode>,
}

impl Default for CheckOptions {
    /// Every rule that is enabled by default.
    fn default() -> Self {
        Self {
            enabled: RuleCode::ALL
                .into_iter()
                .filter(RuleCode::enabled_by_default)
                .collect(),
        }
    }
}

impl CheckOptions {
    /// Every rule, including ones disabled by default.
    pub fn all() -> Self {
        Self {
            enabled: RuleCode::ALL.into_iter().collect(),
        }
    }

    /// Exactly the given rules.
    pub fn only(rules: impl IntoIterator<Item = RuleCode>) -> Self {
        Self {
            enabled: rules.into_iter().collect(),
        }
    }

    pub fn enable(&mut self, code: RuleCode) {
        self.enabled.insert(code);
    }

    pub fn disable(&mut self, code: RuleCode) {
        self.enabled.remove(&code);
    }

    pub fn is_enabled(&self, code: RuleCode) -> bool {
        self.enabled.contains(&code)
    }
}

/// Checks one Kotlin source file and returns its diagnostics, ordered by
/// source position.
pub fn check_file(
    source: &str,
    config: &RuleConfig,
    options: &CheckOptions,
) -> Result<Vec<Diagnostic>, ParseError> {
    let tree = SyntaxTree::parse(source)?;
    let ctx = FileContext::new(&tree);
    let root = tree.root();

    let mut diagnostics = Vec::new();
    for func in functions_in(root) {
        if options.is_enabled(RuleCode::ComplexComposable) {
            diagnostics.extend(rules::complexity::check(&func, &ctx, config));
        }
        if options.is_enabled(RuleCode::EffectComplexity) {
            diagnostics.extend(rules::effect_complexity::check(&func, &ctx, config));
        }
        if options.is_enabled(RuleCode::EffectDensity) {
            diagnostics.extend(rules::effect_density::check(&func, &ctx, config));
        }
        if options.is_enabled(RuleCode::MutationInRender) {
            diagnostics.extend(rules::mutation_in_render::check(&func, &ctx));
        }
        if options.is_enabled(RuleCode::UnrememberedConstant) {
            diagnostics.extend(rules::unremembered_constant::check(&func, &ctx));
        }
    }
    if options.is_enabled(RuleCode::StatePassThrough) {
        diagnostics.extend(rules::state_pass_through::check(&ctx, root, config));
    }

    diagnostics.sort_by(|a, b| a.span.cmp(&b.span).then_with(|| a.code.as_str().cmp(b.code.as_str())));
    Ok(diagnostics)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::FileContext;
    use kotlin_syntax::SyntaxTree;

    pub fn context(tree: &SyntaxTree) -> FileContext<'_> {
        FileContext::new(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn diagnostics_come_back_in_source_order() {
        let source = r#"
            @Composable
            fun Screen() {
                var open by remember { mutableStateOf(false) }
                open = true
                val tabs = listOf("Home", "Search")
                Text(tabs.first())
            }
        "#;
        let diags = check_file(source, &RuleConfig::new(), &CheckOptions::default()).unwrap();
        let codes: Vec<_> = diags.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![RuleCode::MutationInRender, RuleCode::UnrememberedConstant]
        );
        assert!(diags[0].span.start < diags[1].span.start);
    }

    #[test]
    fn disabled_rules_do_not_report() {
        let source = r#"
            @Composable
            fun Screen() {
                var open by remember { mutableStateOf(false) }
                open = true
                Text("x")
            }
        "#;
        let options = CheckOptions::only([RuleCode::UnrememberedConstant]);
        let diags = check_file(source, &RuleConfig::new(), &options).unwrap();
        assert_eq!(diags, vec![]);
    }

    #[test]
    fn clean_file_reports_nothing() {
        let source = r#"
            @Composable
            fun Greeting(name: String) {
                Text("Hello $name")
            }
        "#;
        let diags = check_file(source, &RuleConfig::new(), &CheckOptions::default()).unwrap();
        assert_eq!(diags, vec![]);
    }
}
