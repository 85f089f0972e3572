//! Per-rule threshold configuration.
//!
//! Overrides arrive as JSON (from the CLI config file or any host) keyed by
//! rule id and option name. Malformed values (non-numeric, non-positive)
//! silently fall back to the compiled-in default rather than propagate a
//! broken threshold.

use crate::diagnostic::RuleCode;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Numeric option overrides, keyed by `(rule-id, option-name)`.
#[derive(Debug, Clone, Default)]
pub struct RuleConfig {
    overrides: FxHashMap<(String, String), Value>,
}

impl RuleConfig {
    /// Creates an empty configuration (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from a JSON object of the shape
    /// `{ "<rule-id>": { "<option>": <number>, ... }, ... }`.
    ///
    /// Unknown rules and options are kept; rules simply never ask for them.
    pub fn from_json(value: &Value) -> Self {
        let mut overrides = FxHashMap::default();
        if let Some(rules) = value.as_object() {
            for (rule, options) in rules {
                if let Some(options) = options.as_object() {
                    for (option, v) in options {
                        overrides.insert((rule.clone(), option.clone()), v.clone());
                    }
                }
            }
        }
        Self { overrides }
    }

    /// Sets one override programmatically.
    pub fn set(&mut self, rule: RuleCode, option: &str, value: impl Into<Value>) {
        self.overrides
            .insert((rule.as_str().to_string(), option.to_string()), value.into());
    }

    /// Looks up a float option, falling back to `default` when the override
    /// is absent, non-numeric, or non-positive.
    pub fn threshold_f64(&self, rule: RuleCode, option: &str, default: f64) -> f64 {
        self.numeric(rule, option)
            .filter(|v| *v > 0.0)
            .unwrap_or(default)
    }

    /// Looks up an integer option with the same fallback policy.
    pub fn threshold_usize(&self, rule: RuleCode, option: &str, default: usize) -> usize {
        self.numeric(rule, option)
            .filter(|v| *v > 0.0 && v.fract() == 0.0)
            .map(|v| v as usize)
            .unwrap_or(default)
    }

    fn numeric(&self, rule: RuleCode, option: &str) -> Option<f64> {
        let value = self
            .overrides
            .get(&(rule.as_str().to_string(), option.to_string()))?;
        match value {
            Value::Number(n) => n.as_f64(),
            // Tolerate numbers quoted as strings.
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_option_uses_default() {
        let config = RuleConfig::new();
        assert_eq!(
            config.threshold_f64(RuleCode::ComplexComposable, "threshold", 25.0),
            25.0
        );
    }

    #[test]
    fn override_applies() {
        let config = RuleConfig::from_json(&json!({
            "complex-composable": { "threshold": 40 }
        }));
        assert_eq!(
            config.threshold_f64(RuleCode::ComplexComposable, "threshold", 25.0),
            40.0
        );
    }

    #[test]
    fn malformed_overrides_fall_back() {
        let config = RuleConfig::from_json(&json!({
            "complex-composable": { "threshold": "not a number", "maxLoops": -3 },
            "effect-density": { "density": 0 }
        }));
        assert_eq!(
            config.threshold_f64(RuleCode::ComplexComposable, "threshold", 25.0),
            25.0
        );
        assert_eq!(
            config.threshold_usize(RuleCode::ComplexComposable, "maxLoops", 4),
            4
        );
        assert_eq!(
            config.threshold_f64(RuleCode::EffectDensity, "density", 0.3),
            0.3
        );
    }

    #[test]
    fn quoted_numbers_are_tolerated() {
        let config = RuleConfig::from_json(&json!({
            "effect-complexity": { "threshold": "12" }
        }));
        assert_eq!(
            config.threshold_f64(RuleCode::EffectComplexity, "threshold", 10.0),
            12.0
        );
    }
}
