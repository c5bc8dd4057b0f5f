//! Test batches
//!
//! Every batch is a fixed, ordered list of test cases. Cases follow one
//! contract: failures (assertions and collaborator errors alike) are logged
//! under the case name and returned as a failed outcome, never propagated.
//!
//! ## Batches
//!
//! ### substrate
//! - Create account
//! - Import account from private key
//! - Publish aggregate
//! - Encrypt and decrypt


use std::fmt;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::messages::{ItemType, MessageApi};
use crate::models::TestBatch;

/// Names of all registered batches
pub const BATCHES: &[&str] = &[substrate::BATCH_NAME];

/// Shared inputs of the test cases that reach the message store
#[derive(Clone)]
pub struct TestContext {
    pub api: Arc<dyn MessageApi>,
    pub channel: String,
    pub storage_engine: ItemType,
    pub inline_requested: bool,
}

impl TestContext {
    /// Context with the default publishing options
    pub fn new(api: Arc<dyn MessageApi>) -> Self {
        Self::from_config(api, &AppConfig::default())
    }

    pub fn from_config(api: Arc<dyn MessageApi>, config: &AppConfig) -> Self {
        Self {
            api,
            channel: config.channel.clone(),
            storage_engine: config.storage_engine,
            inline_requested: config.inline_requested,
        }
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("server", &self.api.server())
            .field("channel", &self.channel)
            .field("storage_engine", &self.storage_engine)
            .field("inline_requested", &self.inline_requested)
            .finish()
    }
}

/// Build a registered batch by name
pub fn batch_by_name(name: &str, context: TestContext) -> Option<TestBatch> {
    match name.to_lowercase().as_str() {
        substrate::BATCH_NAME => Some(substrate::batch(context)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MemoryApi;

    #[test]
    fn test_batch_lookup() {
        let context = TestContext::new(Arc::new(MemoryApi::new()));
        assert!(batch_by_name("substrate", context.clone()).is_some());
        assert!(batch_by_name("SUBSTRATE", context.clone()).is_some());
        assert!(batch_by_name("ethereum", context).is_none());
    }

    #[test]
    fn test_every_registered_batch_builds() {
        for name in BATCHES {
            let context = TestContext::new(Arc::new(MemoryApi::new()));
            let batch = batch_by_name(name, context).unwrap();
            assert!(!batch.is_empty());
        }
    }

    #[test]
    fn test_context_from_config() {
        let config = AppConfig {
            channel: "OTHER".to_string(),
            inline_requested: false,
            ..Default::default()
        };
        let context = TestContext::from_config(Arc::new(MemoryApi::new()), &config);
        assert_eq!(context.channel, "OTHER");
        assert!(!context.inline_requested);
        assert!(format!("{context:?}").contains("memory://local"));
    }
}
