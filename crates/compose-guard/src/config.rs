//! Configuration loading.

use camino::Utf8Path;
use serde::Deserialize;
use std::fs;

use compose_diagnostics::{CheckOptions, RuleCode, RuleConfig};

/// Project configuration, read from `.composeguard.json`.
#[derive(Debug, Default)]
pub struct GuardConfig {
    /// Per-rule threshold overrides.
    pub rule_config: RuleConfig,
    /// Glob patterns to exclude, merged with the CLI `--ignore` patterns.
    pub exclude: Vec<String>,
    /// Rules disabled in the config file.
    pub disabled: Vec<RuleCode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    rules: serde_json::Value,
    exclude: Vec<String>,
    disable: Vec<String>,
}

impl GuardConfig {
    /// Loads configuration from an explicit path, or discovers
    /// `.composeguard.json` in the workspace root. A missing file yields the
    /// defaults; a malformed file warns and yields the defaults.
    pub fn load(workspace: &Utf8Path, explicit: Option<&Utf8Path>) -> Self {
        let path = match explicit {
            Some(path) => path.to_owned(),
            None => {
                let discovered = workspace.join(".composeguard.json");
                if !discovered.exists() {
                    return Self::default();
                }
                discovered
            }
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Warning: failed to read {}: {}", path, e);
                return Self::default();
            }
        };
        match serde_json::from_str::<RawConfig>(&content) {
            Ok(raw) => Self::from_raw(raw),
            Err(e) => {
                eprintln!("Warning: failed to parse {}: {}", path, e);
                Self::default()
            }
        }
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut disabled = Vec::new();
        for name in &raw.disable {
            match RuleCode::from_str(name) {
                Some(code) => disabled.push(code),
                None => eprintln!("Warning: unknown rule id '{}' in disable list", name),
            }
        }
        Self {
            rule_config: RuleConfig::from_json(&raw.rules),
            exclude: raw.exclude,
            disabled,
        }
    }

    /// Resolves which rules to run. An explicit `--rules` selection wins;
    /// otherwise the defaults minus the config file's disable list.
    pub fn check_options(&self, selection: Option<&[RuleCode]>) -> CheckOptions {
        match selection {
            Some(rules) => CheckOptions::only(rules.iter().copied()),
            None => {
                let mut options = CheckOptions::default();
                for &code in &self.disabled {
                    options.disable(code);
                }
                options
            }
        }
    }
}
