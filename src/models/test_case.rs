//! Test cases and batches
//!
//! A [`TestCase`] is a named, zero-argument async operation resolving to a
//! [`TestOutcome`]. A [`TestBatch`] is an ordered list of cases, assembled
//! once through [`TestBatchBuilder`] and never modified afterwards.

use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;

use super::test_result::TestOutcome;

type CaseFn = Box<dyn Fn() -> BoxFuture<'static, TestOutcome> + Send + Sync>;

/// A single named test
pub struct TestCase {
    name: String,
    description: Option<String>,
    run: CaseFn,
}

impl TestCase {
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TestOutcome> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            run: Box::new(move || f().boxed()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Start the test
    pub fn invoke(&self) -> BoxFuture<'static, TestOutcome> {
        (self.run)()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered, immutable list of test cases
#[derive(Debug)]
pub struct TestBatch {
    name: String,
    cases: Vec<TestCase>,
}

impl TestBatch {
    pub fn builder(name: impl Into<String>) -> TestBatchBuilder {
        TestBatchBuilder {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Case at a 1-based position
    pub fn case(&self, number: usize) -> Option<&TestCase> {
        number.checked_sub(1).and_then(|i| self.cases.get(i))
    }
}

/// Builder for [`TestBatch`]
pub struct TestBatchBuilder {
    name: String,
    cases: Vec<TestCase>,
}

impl TestBatchBuilder {
    /// Append a case built from a name and an async function
    pub fn case<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TestOutcome> + Send + 'static,
    {
        self.add(TestCase::new(name, f))
    }

    /// Append a prepared case
    pub fn add(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn build(self) -> TestBatch {
        TestBatch {
            name: self.name,
            cases: self.cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let batch = TestBatch::builder("demo")
            .case("first", || async { TestOutcome::pass() })
            .case("second", || async { TestOutcome::fail("nope") })
            .add(TestCase::new("third", || async { TestOutcome::pass() }).with_description("d"))
            .build();

        assert_eq!(batch.name(), "demo");
        assert_eq!(batch.len(), 3);
        let names: Vec<_> = batch.cases().iter().map(TestCase::name).collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(batch.cases()[2].description(), Some("d"));
    }

    #[test]
    fn test_case_lookup_is_one_based() {
        let batch = TestBatch::builder("demo")
            .case("only", || async { TestOutcome::pass() })
            .build();

        assert!(batch.case(0).is_none());
        assert_eq!(batch.case(1).map(TestCase::name), Some("only"));
        assert!(batch.case(2).is_none());
    }

    #[test]
    fn test_invoke_can_repeat() {
        let case = TestCase::new("flaky", || async { TestOutcome::fail("always") });
        let first = tokio_test::block_on(case.invoke());
        let second = tokio_test::block_on(case.invoke());
        assert_eq!(first, second);
        assert!(!first.passed);
    }
}
