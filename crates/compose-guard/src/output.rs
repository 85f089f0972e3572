//! Output formatting.

use camino::Utf8Path;
use serde::Serialize;

use compose_diagnostics::{Diagnostic, Severity};
use kotlin_syntax::{LineCol, LineIndex};

use crate::cli::OutputFormat;

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (Error, Warning, Hint).
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// The file path.
    pub filename: String,
    /// The start position.
    pub start: Position,
    /// The end position.
    pub end: Position,
    /// The message.
    pub message: String,
    /// The rule id.
    pub code: String,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

/// Formats diagnostics for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a collection of diagnostics from one file.
    pub fn format(&self, diagnostics: &[Diagnostic], file_path: &Utf8Path, source: &str) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(diagnostics, file_path, source, false),
            OutputFormat::HumanVerbose => self.format_human(diagnostics, file_path, source, true),
            OutputFormat::Json => {
                let formatted = Self::format_json_diagnostics(diagnostics, file_path, source);
                serde_json::to_string_pretty(&formatted).unwrap_or_default()
            }
            OutputFormat::Machine => self.format_machine(diagnostics, file_path, source),
        }
    }

    fn format_human(
        &self,
        diagnostics: &[Diagnostic],
        file_path: &Utf8Path,
        source: &str,
        with_snippets: bool,
    ) -> String {
        let line_index = LineIndex::new(source);
        let lines: Vec<&str> = source.lines().collect();
        let mut output = String::new();

        for diag in diagnostics {
            let start = line_index.line_col(diag.span.start);

            output.push_str(&format!(
                "{}:{}:{}\n{}: {} ({})\n",
                file_path,
                start.line + 1,
                start.col + 1,
                severity_label(diag.severity),
                diag.message,
                diag.code
            ));

            if with_snippets {
                let line_num = start.line as usize;
                if line_num < lines.len() {
                    output.push_str(&format!("  {} | {}\n", line_num + 1, lines[line_num]));
                    let padding = " ".repeat(start.col as usize);
                    output.push_str(&format!(
                        "  {} | {}^\n",
                        " ".repeat((line_num + 1).to_string().len()),
                        padding
                    ));
                }
            }

            for related in &diag.related {
                let pos = line_index.line_col(related.span.start);
                output.push_str(&format!(
                    "  note: {} ({}:{}:{})\n",
                    related.message,
                    file_path,
                    pos.line + 1,
                    pos.col + 1
                ));
            }

            output.push('\n');
        }

        output
    }

    /// Formats diagnostics into JSON-ready structs.
    pub fn format_json_diagnostics(
        diagnostics: &[Diagnostic],
        file_path: &Utf8Path,
        source: &str,
    ) -> Vec<FormattedDiagnostic> {
        let line_index = LineIndex::new(source);
        diagnostics
            .iter()
            .map(|diag| {
                let start = line_index.line_col(diag.span.start);
                let end = line_index.line_col(diag.span.end);

                FormattedDiagnostic {
                    diagnostic_type: severity_label(diag.severity).to_string(),
                    filename: file_path.to_string(),
                    start: position(start, diag.span.start),
                    end: position(end, diag.span.end),
                    message: diag.message.clone(),
                    code: diag.code.to_string(),
                }
            })
            .collect()
    }

    fn format_machine(
        &self,
        diagnostics: &[Diagnostic],
        file_path: &Utf8Path,
        source: &str,
    ) -> String {
        let line_index = LineIndex::new(source);
        let mut output = String::new();

        for diag in diagnostics {
            let start = line_index.line_col(diag.span.start);
            let end = line_index.line_col(diag.span.end);

            let severity = match diag.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARNING",
                Severity::Hint => "HINT",
            };

            output.push_str(&format!(
                "{} {}:{}:{}:{}:{} {} ({})\n",
                severity,
                file_path,
                start.line + 1,
                start.col + 1,
                end.line + 1,
                end.col + 1,
                diag.message,
                diag.code
            ));
        }

        output
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Error",
        Severity::Warning => "Warning",
        Severity::Hint => "Hint",
    }
}

fn position(line_col: LineCol, offset: u32) -> Position {
    Position {
        line: line_col.line + 1,
        column: line_col.col + 1,
        offset,
    }
}

/// Summary of a check run.
#[derive(Debug, Default)]
pub struct CheckSummary {
    /// Number of files checked.
    pub file_count: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Whether to fail on warnings.
    pub fail_on_warnings: bool,
}

impl CheckSummary {
    /// Formats the summary line.
    pub fn format(&self) -> String {
        let error_word = if self.error_count == 1 {
            "error"
        } else {
            "errors"
        };
        let warning_word = if self.warning_count == 1 {
            "warning"
        } else {
            "warnings"
        };
        let file_word = if self.file_count == 1 {
            "file"
        } else {
            "files"
        };

        format!(
            "====================================\ncompose-guard found {} {} and {} {} in {} {}",
            self.error_count,
            error_word,
            self.warning_count,
            warning_word,
            self.file_count,
            file_word
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compose_diagnostics::{RuleCode, Span};

    fn sample_diag() -> Diagnostic {
        Diagnostic::new(
            RuleCode::MutationInRender,
            "state variable 'count' is assigned during composition",
            Span::new(4, 9),
        )
    }

    #[test]
    fn test_format_human() {
        let formatter = Formatter::new(OutputFormat::Human);
        let output = formatter.format(
            &[sample_diag()],
            Utf8Path::new("Counter.kt"),
            "fun Counter() {}",
        );
        assert!(output.contains("Counter.kt:1:5"));
        assert!(output.contains("Error:"));
        assert!(output.contains("mutation-in-render"));
    }

    #[test]
    fn test_format_json() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format(
            &[sample_diag()],
            Utf8Path::new("Counter.kt"),
            "fun Counter() {}",
        );
        assert!(output.contains("\"filename\""));
        assert!(output.contains("Counter.kt"));
        assert!(output.contains("\"code\": \"mutation-in-render\""));
    }

    #[test]
    fn test_format_machine_positions_are_one_indexed() {
        let formatter = Formatter::new(OutputFormat::Machine);
        let output = formatter.format(
            &[sample_diag()],
            Utf8Path::new("Counter.kt"),
            "fun Counter() {}",
        );
        assert!(output.starts_with("ERROR Counter.kt:1:5:1:10"));
    }

    #[test]
    fn test_summary() {
        let summary = CheckSummary {
            file_count: 5,
            error_count: 2,
            warning_count: 3,
            fail_on_warnings: false,
        };

        let output = summary.format();
        assert!(output.contains("2 errors"));
        assert!(output.contains("3 warnings"));
        assert!(output.contains("5 files"));
    }
}
