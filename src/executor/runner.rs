//! Sequential batch runner
//!
//! Cases run one at a time in batch order; each is awaited to completion
//! before the next starts. A failing case never stops the batch.

use anyhow::{bail, Result};
use chrono::Utc;
use tracing::info;

use crate::models::{BatchResult, CaseRecord, TestBatch, TestCase};
use crate::utils::{Timer, CASE_LOG_TARGET};

/// Runs test batches
#[derive(Clone, Debug, Default)]
pub struct BatchRunner;

impl BatchRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run every case of the batch
    pub async fn run(&self, batch: &TestBatch) -> BatchResult {
        let selected: Vec<_> = batch.cases().iter().enumerate().collect();
        self.run_cases(batch.name(), selected).await
    }

    /// Run only the cases at the given 1-based positions, in batch order
    pub async fn run_selected(&self, batch: &TestBatch, numbers: &[usize]) -> Result<BatchResult> {
        for &number in numbers {
            if batch.case(number).is_none() {
                bail!(
                    "Invalid test number {} for batch '{}' (1-{})",
                    number,
                    batch.name(),
                    batch.len()
                );
            }
        }

        let selected: Vec<_> = batch
            .cases()
            .iter()
            .enumerate()
            .filter(|(i, _)| numbers.contains(&(i + 1)))
            .collect();
        Ok(self.run_cases(batch.name(), selected).await)
    }

    async fn run_cases(&self, batch_name: &str, cases: Vec<(usize, &TestCase)>) -> BatchResult {
        info!("Starting {} batch ({} tests)", batch_name, cases.len());

        let started_at = Utc::now();
        let batch_timer = Timer::start(batch_name);
        let mut records = Vec::with_capacity(cases.len());
        let mut passed = true;

        for (i, case) in cases {
            let timer = Timer::start(case.name());
            let outcome = case.invoke().await;
            let record = CaseRecord::new(i + 1, case.name(), outcome, timer.stop());

            info!(target: CASE_LOG_TARGET, "{}", record.log_line());
            passed = passed && record.passed();
            records.push(record);
        }

        let result = BatchResult::new(batch_name, started_at, batch_timer.stop(), records);
        info!(
            "Batch {} {} - {}/{} passed in {}ms",
            batch_name,
            if passed { "passed" } else { "failed" },
            result.passed_count(),
            result.total(),
            result.total_duration_ms
        );

        result
    }
}

/// Run a batch and reduce it to a single verdict
pub async fn run_batch(batch: &TestBatch) -> bool {
    BatchRunner::new().run(batch).await.passed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn recording_batch(log: Arc<Mutex<Vec<String>>>, failing: &[&'static str]) -> TestBatch {
        let mut builder = TestBatch::builder("demo");
        for name in ["alpha", "beta", "gamma", "delta"] {
            let log = log.clone();
            let fails = failing.contains(&name);
            builder = builder.case(name, move || {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push(name.to_string());
                    if fails {
                        TestOutcome::fail(format!("{name} failed"))
                    } else {
                        TestOutcome::pass()
                    }
                }
            });
        }
        builder.build()
    }

    #[tokio::test]
    async fn test_all_passing_batch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let batch = recording_batch(log.clone(), &[]);

        let result = BatchRunner::new().run(&batch).await;

        assert!(result.passed());
        assert_eq!(result.total(), 4);
        let indexes: Vec<_> = result.records.iter().map(|r| r.index).collect();
        assert_eq!(indexes, [1, 2, 3, 4]);
        assert_eq!(*log.lock().unwrap(), ["alpha", "beta", "gamma", "delta"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let batch = recording_batch(log.clone(), &["beta"]);

        let result = BatchRunner::new().run(&batch).await;

        assert!(!result.passed());
        assert_eq!(log.lock().unwrap().len(), 4);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.records[1].log_line(), "Test [2-Failure]\tbeta");
        assert_eq!(result.records[1].detail.as_deref(), Some("beta failed"));
        assert!(result.records[3].passed());
    }

    #[tokio::test]
    async fn test_first_case_failing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let batch = recording_batch(log, &["alpha"]);
        assert!(!run_batch(&batch).await);
    }

    #[tokio::test]
    async fn test_cases_run_sequentially() {
        let active = Arc::new(AtomicUsize::new(0));
        let overlap = Arc::new(AtomicUsize::new(0));

        let mut builder = TestBatch::builder("sequential");
        for i in 0..3 {
            let active = active.clone();
            let overlap = overlap.clone();
            builder = builder.case(format!("sleep_{i}"), move || {
                let active = active.clone();
                let overlap = overlap.clone();
                async move {
                    if active.fetch_add(1, Ordering::SeqCst) > 0 {
                        overlap.fetch_add(1, Ordering::SeqCst);
                    }
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    TestOutcome::pass()
                }
            });
        }

        assert!(run_batch(&builder.build()).await);
        assert_eq!(overlap.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_passes() {
        let batch = TestBatch::builder("empty").build();
        let result = BatchRunner::new().run(&batch).await;
        assert!(result.passed());
        assert_eq!(result.total(), 0);
    }

    #[tokio::test]
    async fn test_run_selected_keeps_positions() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let batch = recording_batch(log.clone(), &[]);

        let result = BatchRunner::new().run_selected(&batch, &[3, 1]).await.unwrap();

        let indexes: Vec<_> = result.records.iter().map(|r| r.index).collect();
        assert_eq!(indexes, [1, 3]);
        assert_eq!(*log.lock().unwrap(), ["alpha", "gamma"]);
    }

    #[tokio::test]
    async fn test_run_selected_rejects_unknown_number() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let batch = recording_batch(log.clone(), &[]);

        assert!(BatchRunner::new().run_selected(&batch, &[5]).await.is_err());
        assert!(BatchRunner::new().run_selected(&batch, &[0]).await.is_err());
        assert!(log.lock().unwrap().is_empty());
    }

    /// Collects everything the subscriber writes
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_case_lines_logged_at_warn_level() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(crate::utils::log_filter(crate::utils::LogLevel::Warn, None))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let log = Arc::new(Mutex::new(Vec::new()));
        let batch = recording_batch(log, &["beta"]);
        let passed = tracing::subscriber::with_default(subscriber, || {
            tokio_test::block_on(run_batch(&batch))
        });

        assert!(!passed);
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Test [1-Success]\talpha"));
        assert!(output.contains("Test [2-Failure]\tbeta"));
        assert!(output.contains("Test [4-Success]\tdelta"));
        assert!(!output.contains("Starting demo batch"));
    }
}
