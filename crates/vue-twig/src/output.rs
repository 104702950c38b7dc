//! Output formatting for compilation results.

use crate::cli::OutputFormat;
use crate::orchestrator::{CompileFailure, CompileSummary};
use std::path::Path;

/// Formatter for per-file results and the run summary.
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report a template that was written.
    pub fn print_compiled(&self, source: &Path, target: &Path) {
        match self.format {
            OutputFormat::Human => {
                eprintln!(
                    "\x1b[32m✓\x1b[0m {} → {}",
                    source.display(),
                    target.display()
                );
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "type": "compiled",
                    "source": source.to_string_lossy(),
                    "target": target.to_string_lossy(),
                });
                println!("{}", json);
            }
        }
    }

    /// Print a template to stdout.
    pub fn print_template(&self, source: &Path, template: &str) {
        match self.format {
            OutputFormat::Human => {
                println!("{{# {} #}}", source.display());
                println!("{}", template);
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "type": "template",
                    "source": source.to_string_lossy(),
                    "template": template,
                });
                println!("{}", json);
            }
        }
    }

    pub fn print_failure(&self, source: &Path, failure: &CompileFailure) {
        match self.format {
            OutputFormat::Human => {
                let location = failure
                    .location()
                    .map(|loc| format!(":{}", loc))
                    .unwrap_or_default();
                eprintln!(
                    "{}{}: \x1b[31merror\x1b[0m[{}]: {}",
                    source.display(),
                    location,
                    failure.kind(),
                    failure
                );
            }
            OutputFormat::Json => {
                let (line, column) = match failure.location().map(|loc| loc.to_display()) {
                    Some((line, column)) => (Some(line), Some(column)),
                    None => (None, None),
                };
                let json = serde_json::json!({
                    "type": "error",
                    "source": source.to_string_lossy(),
                    "kind": failure.kind(),
                    "message": failure.to_string(),
                    "line": line,
                    "column": column,
                });
                println!("{}", json);
            }
        }
    }

    pub fn print_summary(&self, summary: &CompileSummary) {
        match self.format {
            OutputFormat::Human => self.print_summary_human(summary),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "type": "summary",
                    "files": summary.file_count,
                    "compiled": summary.compiled_count,
                    "errors": summary.error_count,
                    "duration_ms": summary.duration_ms,
                });
                println!("{}", json);
            }
        }
    }

    fn print_summary_human(&self, summary: &CompileSummary) {
        eprintln!();
        if summary.error_count == 0 {
            eprintln!(
                "\x1b[32m✓\x1b[0m Compiled {} file{} ({}ms)",
                summary.compiled_count,
                if summary.compiled_count == 1 { "" } else { "s" },
                summary.duration_ms
            );
        } else {
            eprintln!(
                "\x1b[31m✗\x1b[0m {} of {} file{} failed",
                summary.error_count,
                summary.file_count,
                if summary.file_count == 1 { "" } else { "s" }
            );
            eprintln!("Time: {}ms", summary.duration_ms);
        }
    }
}
