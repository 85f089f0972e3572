//! State-write-during-composition rule.

use kotlin_syntax::FunctionDecl;

use crate::diagnostic::{Diagnostic, RuleCode};
use crate::mutation::{mutations_in_render, MutationKind};
use crate::FileContext;

pub fn check(func: &FunctionDecl<'_>, ctx: &FileContext<'_>) -> Vec<Diagnostic> {
    if !func.is_composable(ctx.source) {
        return Vec::new();
    }
    mutations_in_render(func, ctx)
        .into_iter()
        .map(|m| {
            let what = match m.kind {
                MutationKind::BackingValue => format!("'{}.value'", m.target),
                MutationKind::DelegatedVariable => format!("state variable '{}'", m.target),
            };
            Diagnostic::new(
                RuleCode::MutationInRender,
                format!(
                    "{what} is assigned during composition, which schedules another \
                     recomposition of the same body; move the write into an event \
                     callback or a LaunchedEffect"
                ),
                m.span,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::test_support::context;
    use kotlin_syntax::{functions_in, SyntaxTree};
    use pretty_assertions::assert_eq;

    #[test]
    fn render_path_write_is_an_error() {
        let source = r#"
            @Composable
            fun Counter() {
                var count by remember { mutableStateOf(0) }
                count = count + 1
                Text("$count")
            }
        "#;
        let tree = SyntaxTree::parse(source).unwrap();
        let ctx = context(&tree);
        let func = functions_in(tree.root()).into_iter().next().unwrap();
        let diags = check(&func, &ctx);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert!(diags[0].message.contains("'count'"));
    }
}
