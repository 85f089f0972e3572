//! Diagnostic types.

use kotlin_syntax::Span;
use serde::Serialize;

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The rule that produced this diagnostic.
    pub code: RuleCode,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message, including the metrics behind the decision.
    pub message: String,
    /// The primary source location.
    pub span: Span,
    /// Secondary locations with their own explanatory text.
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Creates a new diagnostic with the rule's default severity.
    pub fn new(code: RuleCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            span,
            related: Vec::new(),
        }
    }

    /// Attaches a secondary location.
    pub fn with_related(mut self, message: impl Into<String>, span: Span) -> Self {
        self.related.push(RelatedInfo {
            message: message.into(),
            span,
        });
        self
    }
}

/// A secondary location attached to a diagnostic (e.g. the declaration a
/// traced reactive value originates from).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    /// Explanatory text for this location.
    pub message: String,
    /// The secondary span.
    pub span: Span,
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A hint or suggestion.
    Hint,
    /// A warning worth fixing.
    Warning,
    /// An error that should block merging.
    Error,
}

/// Stable identifiers for all detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCode {
    /// `complex-composable`: weighted control-flow complexity over threshold.
    ComplexComposable,
    /// `effect-complexity`: a single side-effect block over threshold.
    EffectComplexity,
    /// `effect-density`: too many effects relative to emitted UI.
    EffectDensity,
    /// `state-pass-through`: reactive value forwarded through a chain of
    /// functions without being consumed.
    StatePassThrough,
    /// `mutation-in-render`: observed state written during composition.
    MutationInRender,
    /// `unremembered-constant`: invariant allocation re-created on every
    /// recomposition.
    UnrememberedConstant,
}

impl RuleCode {
    /// All rules, in registry order.
    pub const ALL: [RuleCode; 6] = [
        RuleCode::ComplexComposable,
        RuleCode::EffectComplexity,
        RuleCode::EffectDensity,
        RuleCode::StatePassThrough,
        RuleCode::MutationInRender,
        RuleCode::UnrememberedConstant,
    ];

    /// Returns the default severity for this rule.
    pub fn default_severity(&self) -> Severity {
        match self {
            RuleCode::MutationInRender => Severity::Error,
            RuleCode::ComplexComposable
            | RuleCode::EffectComplexity
            | RuleCode::EffectDensity
            | RuleCode::StatePassThrough => Severity::Warning,
            RuleCode::UnrememberedConstant => Severity::Hint,
        }
    }

    /// Returns whether the rule runs unless explicitly selected against.
    pub fn enabled_by_default(&self) -> bool {
        true
    }

    /// Returns the stable identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::ComplexComposable => "complex-composable",
            RuleCode::EffectComplexity => "effect-complexity",
            RuleCode::EffectDensity => "effect-density",
            RuleCode::StatePassThrough => "state-pass-through",
            RuleCode::MutationInRender => "mutation-in-render",
            RuleCode::UnrememberedConstant => "unremembered-constant",
        }
    }

    /// Parses a stable identifier string.
    pub fn from_str(s: &str) -> Option<RuleCode> {
        RuleCode::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for RuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for code in RuleCode::ALL {
            assert_eq!(RuleCode::from_str(code.as_str()), Some(code));
        }
        assert_eq!(RuleCode::from_str("no-such-rule"), None);
    }

    #[test]
    fn mutation_is_error_by_default() {
        assert_eq!(
            RuleCode::MutationInRender.default_severity(),
            Severity::Error
        );
        assert_eq!(
            RuleCode::ComplexComposable.default_severity(),
            Severity::Warning
        );
    }
}
