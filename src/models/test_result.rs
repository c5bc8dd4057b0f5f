//! Test outcomes and batch results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// What a test case resolves to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub passed: bool,
    pub detail: Option<String>,
}

impl TestOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            detail: None,
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: Some(detail.into()),
        }
    }

    /// Turn a test body's result into an outcome, logging the failure
    /// tagged with the test name.
    pub fn from_result(name: &str, result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => Self::pass(),
            Err(e) => {
                let detail = format!("{e:#}");
                error!("{}: {}", name, detail);
                Self::fail(detail)
            }
        }
    }
}

/// Execution status of a case
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Failure,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Success => "✓",
            TestStatus::Failure => "✗",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Success)
    }
}

impl From<bool> for TestStatus {
    fn from(passed: bool) -> Self {
        if passed {
            TestStatus::Success
        } else {
            TestStatus::Failure
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Success => write!(f, "Success"),
            TestStatus::Failure => write!(f, "Failure"),
        }
    }
}

/// Result of one case within a batch run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseRecord {
    /// 1-based position in the batch
    pub index: usize,
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub detail: Option<String>,
}

impl CaseRecord {
    pub fn new(index: usize, name: impl Into<String>, outcome: TestOutcome, duration_ms: u64) -> Self {
        Self {
            index,
            name: name.into(),
            status: outcome.passed.into(),
            duration_ms,
            detail: outcome.detail,
        }
    }

    pub fn passed(&self) -> bool {
        self.status.is_success()
    }

    /// Line logged by the runner after the case completes
    pub fn log_line(&self) -> String {
        format!("Test [{}-{}]\t{}", self.index, self.status, self.name)
    }
}

impl fmt::Display for CaseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}. {} [{}ms]",
            self.status.symbol(),
            self.index,
            self.name,
            self.duration_ms
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " - {detail}")?;
        }
        Ok(())
    }
}

/// Outcome of a whole batch
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch: String,
    pub started_at: DateTime<Utc>,
    pub total_duration_ms: u64,
    pub records: Vec<CaseRecord>,
}

impl BatchResult {
    pub fn new(
        batch: impl Into<String>,
        started_at: DateTime<Utc>,
        total_duration_ms: u64,
        records: Vec<CaseRecord>,
    ) -> Self {
        Self {
            batch: batch.into(),
            started_at,
            total_duration_ms,
            records,
        }
    }

    /// True iff every case passed
    pub fn passed(&self) -> bool {
        self.records.iter().all(CaseRecord::passed)
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|r| r.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.records.is_empty() {
            0.0
        } else {
            (self.passed_count() as f64 / self.total() as f64) * 100.0
        }
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch {}", self.batch)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for record in &self.records {
            writeln!(f, "  {record}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Success: {} | Failure: {} | Duration: {}ms",
            self.total(),
            self.passed_count(),
            self.failed_count(),
            self.total_duration_ms
        )
    }
}
