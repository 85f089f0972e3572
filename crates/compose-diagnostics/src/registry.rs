//! Rule registry for host discovery.

use crate::diagnostic::{RuleCode, Severity};

/// One registered rule: identifier plus its compiled-in defaults.
#[derive(Debug, Clone, Copy)]
pub struct RuleInfo {
    /// The rule identifier.
    pub code: RuleCode,
    /// Default severity.
    pub severity: Severity,
    /// Whether the rule runs by default.
    pub enabled: bool,
    /// One-line description.
    pub description: &'static str,
}

/// Returns the full registry, in stable order.
pub fn all_rules() -> Vec<RuleInfo> {
    RuleCode::ALL
        .into_iter()
        .map(|code| RuleInfo {
            code,
            severity: code.default_severity(),
            enabled: code.enabled_by_default(),
            description: describe(code),
        })
        .collect()
}

fn describe(code: RuleCode) -> &'static str {
    match code {
        RuleCode::ComplexComposable => {
            "composable whose weighted branch/loop/nesting score exceeds the threshold"
        }
        RuleCode::EffectComplexity => "side-effect block doing too much work in one place",
        RuleCode::EffectDensity => "composable dominated by effects rather than emitted UI",
        RuleCode::StatePassThrough => {
            "reactive value drilled through two or more functions without being consumed"
        }
        RuleCode::MutationInRender => "observed state assigned during composition",
        RuleCode::UnrememberedConstant => {
            "invariant allocation rebuilt on every recomposition; hoist or remember it"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_codes() {
        let rules = all_rules();
        assert_eq!(rules.len(), RuleCode::ALL.len());
        for rule in rules {
            assert!(!rule.description.is_empty());
        }
    }
}
