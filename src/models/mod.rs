//! Data models for test batches
//!
//! Test cases, batches and the results a run produces.

mod test_case;
mod test_result;

pub use test_case::{TestBatch, TestCase};
pub use test_result::{BatchResult, CaseRecord, TestOutcome, TestStatus};
