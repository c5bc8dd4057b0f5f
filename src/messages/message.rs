//! Message envelope shared by every message type

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::accounts::{self, AccountError};

/// Chains able to sign messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    #[serde(rename = "DOT")]
    Dot,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Dot => "DOT",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message kinds understood by the aggregation API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "AGGREGATE")]
    Aggregate,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Aggregate => "AGGREGATE",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the message body lives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Serialized in the message itself
    Inline,
    /// Native storage engine of the API node
    Storage,
    /// IPFS
    Ipfs,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Inline => "inline",
            ItemType::Storage => "storage",
            ItemType::Ipfs => "ipfs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inline" => Some(ItemType::Inline),
            "storage" => Some(ItemType::Storage),
            "ipfs" => Some(ItemType::Ipfs),
            _ => None,
        }
    }

    /// Whether content can be pushed to this engine ahead of the message
    pub fn is_storage_engine(&self) -> bool {
        !matches!(self, ItemType::Inline)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed message as sent to the API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseMessage {
    pub chain: Chain,
    pub sender: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub channel: String,
    #[serde(default)]
    pub confirmed: bool,
    pub signature: String,
    #[serde(default)]
    pub size: usize,
    pub time: f64,
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_content: Option<String>,
    pub item_hash: String,
}

impl BaseMessage {
    /// Unsigned message with no content attached yet
    pub fn new(
        chain: Chain,
        sender: impl Into<String>,
        message_type: MessageType,
        channel: impl Into<String>,
        time: f64,
    ) -> Self {
        Self {
            chain,
            sender: sender.into(),
            message_type,
            channel: channel.into(),
            confirmed: false,
            signature: String::new(),
            size: 0,
            time,
            item_type: ItemType::Inline,
            item_content: None,
            item_hash: String::new(),
        }
    }

    /// Attach serialized content inline
    pub fn with_inline_content(mut self, content: String) -> Self {
        self.item_hash = item_hash(&content);
        self.size = content.len();
        self.item_type = ItemType::Inline;
        self.item_content = Some(content);
        self
    }

    /// Reference content previously pushed to a storage engine
    pub fn with_stored_content(mut self, engine: ItemType, hash: impl Into<String>) -> Self {
        self.item_type = engine;
        self.item_hash = hash.into();
        self.item_content = None;
        self
    }

    /// Bytes covered by the signature
    pub fn verification_buffer(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            self.chain, self.sender, self.message_type, self.item_hash
        )
    }

    /// Inline messages must carry the hash of their own content
    pub fn has_valid_item_hash(&self) -> bool {
        match (&self.item_type, &self.item_content) {
            (ItemType::Inline, Some(content)) => item_hash(content) == self.item_hash,
            (ItemType::Inline, None) => false,
            _ => !self.item_hash.is_empty(),
        }
    }
}

/// Hex SHA-256 of inline content
pub fn item_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Check the message signature against its sender
pub fn verify_message(message: &BaseMessage) -> Result<bool, AccountError> {
    match message.chain {
        Chain::Dot => accounts::verify_signature(
            &message.sender,
            message.verification_buffer().as_bytes(),
            &message.signature,
        ),
    }
}

/// Seconds since the epoch with millisecond precision
pub fn now_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
