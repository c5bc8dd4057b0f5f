//! In-process message store
//!
//! Enforces the same acceptance rules as a real node for aggregate messages:
//! valid signature, content matching the item hash, content address equal to
//! the sender. Aggregates are merged per address, key by key.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::aggregate::AggregateContent;
use super::{ApiError, MessageApi};
use super::message::{item_hash, verify_message, BaseMessage, ItemType};

const MEMORY_SERVER: &str = "memory://local";

#[derive(Default)]
struct MemoryState {
    storage: HashMap<String, Value>,
    messages: Vec<BaseMessage>,
    aggregates: HashMap<String, Map<String, Value>>,
}

/// Message store kept in memory
#[derive(Default)]
pub struct MemoryApi {
    state: Mutex<MemoryState>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted messages
    pub async fn message_count(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    fn resolve_content(state: &MemoryState, message: &BaseMessage) -> Result<Value, ApiError> {
        match message.item_type {
            ItemType::Inline => {
                let content = message
                    .item_content
                    .as_deref()
                    .ok_or_else(|| ApiError::Rejected("inline message without content".into()))?;
                if !message.has_valid_item_hash() {
                    return Err(ApiError::Rejected("item hash does not match content".into()));
                }
                Ok(serde_json::from_str(content)?)
            }
            _ => state
                .storage
                .get(&message.item_hash)
                .cloned()
                .ok_or_else(|| {
                    ApiError::Rejected(format!("content {} not found", message.item_hash))
                }),
        }
    }
}

fn merge(existing: &mut Value, update: Value) {
    match (existing, update) {
        (Value::Object(current), Value::Object(fields)) => {
            for (key, value) in fields {
                current.insert(key, value);
            }
        }
        (slot, update) => *slot = update,
    }
}

#[async_trait]
impl MessageApi for MemoryApi {
    fn server(&self) -> &str {
        MEMORY_SERVER
    }

    async fn push_to_storage(&self, engine: ItemType, content: &Value) -> Result<String, ApiError> {
        if !engine.is_storage_engine() {
            return Err(ApiError::Rejected(format!("{engine} is not a storage engine")));
        }

        let hash = item_hash(&serde_json::to_string(content)?);
        self.state
            .lock()
            .await
            .storage
            .insert(hash.clone(), content.clone());
        Ok(hash)
    }

    async fn broadcast(&self, message: &BaseMessage) -> Result<(), ApiError> {
        if !verify_message(message)? {
            return Err(ApiError::Rejected("invalid signature".into()));
        }

        let mut state = self.state.lock().await;
        let content: AggregateContent<Value> =
            serde_json::from_value(Self::resolve_content(&state, message)?)?;

        if content.address != message.sender {
            return Err(ApiError::Rejected(format!(
                "content address {} does not match sender {}",
                content.address, message.sender
            )));
        }

        let aggregate = state.aggregates.entry(content.address.clone()).or_default();
        match aggregate.get_mut(&content.key) {
            Some(existing) => merge(existing, content.content),
            None => {
                aggregate.insert(content.key.clone(), content.content);
            }
        }

        debug!("Accepted aggregate {} for {}", content.key, content.address);
        state.messages.push(message.clone());
        Ok(())
    }

    async fn fetch_aggregate(&self, address: &str, keys: &[String]) -> Result<Value, ApiError> {
        let state = self.state.lock().await;
        let aggregate = state
            .aggregates
            .get(address)
            .ok_or_else(|| ApiError::NotFound(format!("aggregate for {address}")))?;

        if keys.is_empty() {
            return Ok(Value::Object(aggregate.clone()));
        }

        let selected: Map<String, Value> = keys
            .iter()
            .filter_map(|key| aggregate.get(key).map(|v| (key.clone(), v.clone())))
            .collect();
        if selected.is_empty() {
            return Err(ApiError::NotFound(format!(
                "keys {} of aggregate for {address}",
                keys.join(",")
            )));
        }
        Ok(Value::Object(selected))
    }
}
