//! Output formatters for batch results
//!
//! Provides table, JSON and summary output formats.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{BatchResult, CaseRecord, TestStatus};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn format_record_table(&self, record: &CaseRecord) -> String {
        let status_str = match (record.status, self.colorize) {
            (TestStatus::Success, true) => "\x1b[32m✓ PASS\x1b[0m",
            (TestStatus::Failure, true) => "\x1b[31m✗ FAIL\x1b[0m",
            (TestStatus::Success, false) => "✓ PASS",
            (TestStatus::Failure, false) => "✗ FAIL",
        };

        format!(
            "{:2}. {:32} {} [{:>6}ms]",
            record.index, record.name, status_str, record.duration_ms
        )
    }

    /// Format a whole batch result
    pub fn format_batch(&self, result: &BatchResult) -> String {
        match self.format {
            OutputFormat::Table => self.format_batch_table(result),
            OutputFormat::Json => serde_json::to_string(result).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Summary => self.format_batch_brief(result),
        }
    }

    fn format_batch_table(&self, result: &BatchResult) -> String {
        let mut output = String::new();

        // Header
        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!("║  Batch: {:52} ║\n", result.batch));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for record in &result.records {
            output.push_str(&format!("║  {}\n", self.format_record_table(record)));
            if let Some(detail) = record.detail.as_deref().filter(|_| !record.passed()) {
                output.push_str(&format!("║      {detail}\n"));
            }
        }

        // Footer
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", result.passed_count())
        } else {
            result.passed_count().to_string()
        };
        let fail_str = if self.colorize && result.failed_count() > 0 {
            format!("\x1b[31m{}\x1b[0m", result.failed_count())
        } else {
            result.failed_count().to_string()
        };

        output.push_str(&format!(
            "║  Total: {:2} | Pass: {} | Fail: {}\n",
            result.total(),
            pass_str,
            fail_str
        ));
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}% | Duration: {:6}ms\n",
            result.pass_rate(),
            result.total_duration_ms
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    fn format_batch_brief(&self, result: &BatchResult) -> String {
        let verdict = if result.passed() { "PASSED" } else { "FAILED" };
        format!(
            "{} batch {}: {}/{} passed ({:.1}%) in {}ms",
            result.batch,
            verdict,
            result.passed_count(),
            result.total(),
            result.pass_rate(),
            result.total_duration_ms
        )
    }
}

/// Write a batch result to a file as pretty JSON
pub fn write_result_to_file(path: impl AsRef<Path>, result: &BatchResult) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write results: {}", path.display()))?;
    Ok(())
}
