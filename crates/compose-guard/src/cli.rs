//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use compose_diagnostics::RuleCode;

/// Static anti-pattern checker for Jetpack Compose codebases.
#[derive(Debug, Parser)]
#[command(name = "compose-guard")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Working directory for the check
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Path to a .composeguard.json configuration file
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Minimum severity to report
    #[arg(long, value_enum, default_value = "warning")]
    pub threshold: Threshold,

    /// Exit with error on warnings
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Rules to run (comma-separated rule ids; default: all enabled rules)
    #[arg(long)]
    pub rules: Option<String>,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// List all rules with their defaults and exit
    #[arg(long = "list-rules")]
    pub list_rules: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// Human-readable with code snippets
    HumanVerbose,
    /// JSON output
    Json,
    /// Machine-readable (one line per diagnostic)
    Machine,
}

/// Severity threshold.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Threshold {
    /// Only show errors
    Error,
    /// Show errors and warnings (default)
    #[default]
    Warning,
    /// Show everything, hints included
    Hint,
}

impl Args {
    /// The `--rules` selection, resolved against known rule ids.
    pub fn rule_selection(&self) -> Result<Option<Vec<RuleCode>>, String> {
        let Some(spec) = &self.rules else {
            return Ok(None);
        };
        let mut selected = Vec::new();
        for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match RuleCode::from_str(name) {
                Some(code) => selected.push(code),
                None => return Err(format!("unknown rule id '{name}'")),
            }
        }
        Ok(Some(selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["compose-guard"]);
        assert_eq!(args.workspace.as_str(), ".");
        assert!(matches!(args.output, OutputFormat::Human));
        assert!(!args.fail_on_warnings);
    }

    #[test]
    fn test_custom_workspace() {
        let args = Args::parse_from(["compose-guard", "--workspace", "/path/to/project"]);
        assert_eq!(args.workspace.as_str(), "/path/to/project");
    }

    #[test]
    fn test_output_formats() {
        let args = Args::parse_from(["compose-guard", "--output", "json"]);
        assert!(matches!(args.output, OutputFormat::Json));

        let args = Args::parse_from(["compose-guard", "--output", "machine"]);
        assert!(matches!(args.output, OutputFormat::Machine));
    }

    #[test]
    fn test_rule_selection() {
        let args = Args::parse_from([
            "compose-guard",
            "--rules",
            "complex-composable, mutation-in-render",
        ]);
        let selected = args.rule_selection().unwrap().unwrap();
        assert_eq!(
            selected,
            vec![RuleCode::ComplexComposable, RuleCode::MutationInRender]
        );
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let args = Args::parse_from(["compose-guard", "--rules", "no-such-rule"]);
        assert!(args.rule_selection().is_err());
    }
}
