//! Main orchestration logic.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use camino::Utf8PathBuf;
use globset::{Glob, GlobSetBuilder};
use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use compose_diagnostics::{check_file, Severity};

use crate::cli::{Args, Threshold};
use crate::config::GuardConfig;
use crate::output::{CheckSummary, FormattedDiagnostic, Formatter};

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Unknown rule id in `--rules`.
    #[error("{0}")]
    InvalidRule(String),
}

/// Runs the check on all Kotlin files under the workspace.
pub fn run(args: Args) -> Result<CheckSummary, OrchestratorError> {
    let workspace = if args.workspace.is_relative() {
        std::env::current_dir()
            .map(|p| Utf8PathBuf::try_from(p).unwrap_or_default())
            .unwrap_or_default()
            .join(&args.workspace)
    } else {
        args.workspace.clone()
    };

    let config = GuardConfig::load(&workspace, args.config.as_deref());
    let selection = args.rule_selection().map_err(OrchestratorError::InvalidRule)?;
    let options = config.check_options(selection.as_deref());

    // Build ignore glob set
    let mut ignore_builder = GlobSetBuilder::new();
    for pattern in args.ignore.iter().chain(&config.exclude) {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        ignore_builder.add(glob);
    }

    // Add default ignores
    for pattern in ["**/build/**", "**/.gradle/**", "**/generated/**"] {
        if let Ok(glob) = Glob::new(pattern) {
            ignore_builder.add(glob);
        }
    }

    let ignore_set = ignore_builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;

    // Find Kotlin files
    let files: Vec<Utf8PathBuf> = WalkDir::new(&workspace)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| p.extension() == Some("kt"))
        .filter(|p| {
            let relative = p.strip_prefix(&workspace).unwrap_or(p);
            !ignore_set.is_match(relative.as_str())
        })
        .collect();

    let formatter = Formatter::new(args.output);
    let output_json = matches!(args.output, crate::cli::OutputFormat::Json);
    let error_count = AtomicUsize::new(0);
    let warning_count = AtomicUsize::new(0);

    struct FileOutput {
        text: Option<String>,
        json: Vec<FormattedDiagnostic>,
    }

    // Each file is independent; parse and check in parallel.
    let mut outputs: Vec<(Utf8PathBuf, FileOutput)> = files
        .par_iter()
        .filter_map(|file_path| {
            let source = match fs::read_to_string(file_path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Failed to read {}: {}", file_path, e);
                    return None;
                }
            };

            let mut diagnostics = match check_file(&source, &config.rule_config, &options) {
                Ok(diagnostics) => diagnostics,
                Err(e) => {
                    eprintln!("Failed to parse {}: {}", file_path, e);
                    return None;
                }
            };
            diagnostics.retain(|d| include_severity(d.severity, args.threshold));

            for diag in &diagnostics {
                match diag.severity {
                    Severity::Error => {
                        error_count.fetch_add(1, Ordering::Relaxed);
                    }
                    Severity::Warning => {
                        warning_count.fetch_add(1, Ordering::Relaxed);
                    }
                    Severity::Hint => {}
                }
            }

            if diagnostics.is_empty() {
                return None;
            }
            let relative_path = file_path.strip_prefix(&workspace).unwrap_or(file_path);
            let output = FileOutput {
                text: if output_json {
                    None
                } else {
                    Some(formatter.format(&diagnostics, relative_path, &source))
                },
                json: if output_json {
                    Formatter::format_json_diagnostics(&diagnostics, relative_path, &source)
                } else {
                    Vec::new()
                },
            };
            Some((file_path.clone(), output))
        })
        .collect();

    // Parallel collection order is nondeterministic; report by path.
    outputs.sort_by(|a, b| a.0.cmp(&b.0));

    let summary = CheckSummary {
        file_count: files.len(),
        error_count: error_count.load(Ordering::Relaxed),
        warning_count: warning_count.load(Ordering::Relaxed),
        fail_on_warnings: args.fail_on_warnings,
    };

    if output_json {
        let mut json_output = Vec::new();
        for (_, output) in outputs {
            json_output.extend(output.json);
        }
        let json = serde_json::to_string_pretty(&json_output).unwrap_or_else(|_| "[]".to_string());
        println!("{}", json);
    } else {
        for (_, output) in outputs {
            if let Some(text) = output.text {
                print!("{}", text);
            }
        }
        println!("{}", summary.format());
    }

    Ok(summary)
}

fn include_severity(severity: Severity, threshold: Threshold) -> bool {
    match threshold {
        Threshold::Error => severity == Severity::Error,
        Threshold::Warning => severity >= Severity::Warning,
        Threshold::Hint => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_threshold_filters() {
        assert!(include_severity(Severity::Error, Threshold::Warning));
        assert!(include_severity(Severity::Warning, Threshold::Warning));
        assert!(!include_severity(Severity::Hint, Threshold::Warning));
        assert!(!include_severity(Severity::Warning, Threshold::Error));
        assert!(include_severity(Severity::Hint, Threshold::Hint));
    }
}
