//! Test execution engine
//!
//! Sequential, partial-failure tolerant execution of test batches.

mod runner;

pub use runner::{run_batch, BatchRunner};
