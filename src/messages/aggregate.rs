//! Aggregate messages
//!
//! An aggregate is a key/value document scoped to an address. Publishing a
//! key updates that key of the sender's aggregate; fetching returns the
//! current value of the requested keys.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiError, MessageApi};
use super::message::{now_timestamp, BaseMessage, ItemType, MessageType};
use crate::accounts::Account;

/// Largest serialized content that may travel inline
pub const MAX_INLINE_SIZE: usize = 50_000;

/// Content record carried by an aggregate message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateContent<T> {
    pub address: String,
    pub key: String,
    pub content: T,
    pub time: f64,
}

/// Parameters of [`publish`]
pub struct PublishOptions<'a, T> {
    pub account: &'a dyn Account,
    pub key: &'a str,
    pub content: T,
    pub channel: &'a str,
    pub storage_engine: ItemType,
    pub inline_requested: bool,
}

/// A published aggregate: the signed envelope and its content
#[derive(Clone, Debug)]
pub struct AggregateMessage<T> {
    pub message: BaseMessage,
    pub content: AggregateContent<T>,
}

/// Sign and broadcast an aggregate update
pub async fn publish<T: Serialize>(
    api: &dyn MessageApi,
    options: PublishOptions<'_, T>,
) -> Result<AggregateMessage<T>, ApiError> {
    let PublishOptions {
        account,
        key,
        content,
        channel,
        storage_engine,
        inline_requested,
    } = options;

    let time = now_timestamp();
    let record = AggregateContent {
        address: account.address().to_string(),
        key: key.to_string(),
        content,
        time,
    };

    let serialized = serde_json::to_string(&record)?;
    let inline = inline_requested || !storage_engine.is_storage_engine();

    let message = BaseMessage::new(
        account.chain(),
        account.address(),
        MessageType::Aggregate,
        channel,
        time,
    );

    let mut message = if inline && serialized.len() <= MAX_INLINE_SIZE {
        message.with_inline_content(serialized)
    } else if storage_engine.is_storage_engine() {
        debug!(
            "Content of {} bytes goes to {} storage",
            serialized.len(),
            storage_engine
        );
        let value = serde_json::to_value(&record)?;
        let hash = api.push_to_storage(storage_engine, &value).await?;
        message.with_stored_content(storage_engine, hash)
    } else {
        return Err(ApiError::Rejected(format!(
            "{} bytes of content exceed the inline limit of {MAX_INLINE_SIZE}",
            serialized.len()
        )));
    };

    message.signature = account.sign_message(&message)?;
    api.broadcast(&message).await?;

    info!(
        "Published aggregate '{}' for {} on {} ({})",
        key,
        account.address(),
        api.server(),
        message.item_type
    );

    Ok(AggregateMessage {
        message,
        content: record,
    })
}

/// Fetch `keys` of the aggregate owned by `address`
pub async fn get<T: DeserializeOwned>(
    api: &dyn MessageApi,
    address: &str,
    keys: &[&str],
) -> Result<T, ApiError> {
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    let data = api.fetch_aggregate(address, &keys).await?;
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::new_account;
    use crate::messages::MemoryApi;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize)]
    struct Cheer {
        cheer: Body,
    }

    #[derive(Debug, Deserialize)]
    struct Body {
        body: String,
    }

    fn options<'a>(account: &'a dyn Account, content: Value, inline: bool) -> PublishOptions<'a, Value> {
        PublishOptions {
            account,
            key: "cheer",
            content,
            channel: "TEST",
            storage_engine: ItemType::Ipfs,
            inline_requested: inline,
        }
    }

    #[tokio::test]
    async fn test_publish_then_get_inline() {
        let api = MemoryApi::new();
        let (account, _) = new_account().unwrap();

        let published = publish(&api, options(&account, json!({"body": "Rust sdk"}), true))
            .await
            .unwrap();
        assert_eq!(published.message.item_type, ItemType::Inline);
        assert_eq!(published.content.address, account.address());

        let fetched: Cheer = get(&api, account.address(), &["cheer"]).await.unwrap();
        assert_eq!(fetched.cheer.body, "Rust sdk");
    }

    #[tokio::test]
    async fn test_publish_through_storage_engine() {
        let api = MemoryApi::new();
        let (account, _) = new_account().unwrap();

        let published = publish(&api, options(&account, json!({"body": "stored"}), false))
            .await
            .unwrap();
        assert_eq!(published.message.item_type, ItemType::Ipfs);
        assert!(published.message.item_content.is_none());

        let fetched: Cheer = get(&api, account.address(), &["cheer"]).await.unwrap();
        assert_eq!(fetched.cheer.body, "stored");
    }

    #[tokio::test]
    async fn test_large_content_leaves_inline() {
        let api = MemoryApi::new();
        let (account, _) = new_account().unwrap();
        let big = "x".repeat(MAX_INLINE_SIZE + 1);

        let published = publish(&api, options(&account, json!({ "body": big }), true))
            .await
            .unwrap();
        assert_eq!(published.message.item_type, ItemType::Ipfs);
    }

    #[tokio::test]
    async fn test_large_inline_only_content_rejected() {
        let api = MemoryApi::new();
        let (account, _) = new_account().unwrap();
        let mut opts = options(&account, json!({ "body": "x".repeat(MAX_INLINE_SIZE) }), true);
        opts.storage_engine = ItemType::Inline;

        assert!(matches!(
            publish(&api, opts).await,
            Err(ApiError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_updates_merge_per_key() {
        let api = MemoryApi::new();
        let (account, _) = new_account().unwrap();

        publish(&api, options(&account, json!({"body": "first", "n": 1}), true))
            .await
            .unwrap();
        publish(&api, options(&account, json!({"body": "second"}), true))
            .await
            .unwrap();

        let fetched: Value = get(&api, account.address(), &["cheer"]).await.unwrap();
        assert_eq!(fetched, json!({"cheer": {"body": "second", "n": 1}}));
        assert_eq!(api.message_count().await, 2);
    }

    #[tokio::test]
    async fn test_missing_key_not_found() {
        let api = MemoryApi::new();
        let (account, _) = new_account().unwrap();
        publish(&api, options(&account, json!({"body": "x"}), true))
            .await
            .unwrap();

        let result: Result<Cheer, _> = get(&api, account.address(), &["other"]).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
