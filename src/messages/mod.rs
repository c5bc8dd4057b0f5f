//! Messages published to the aggregation API
//!
//! Envelope types, signing rules and the aggregate publish/get operations,
//! plus the HTTP and in-memory backends they run against.

pub mod aggregate;
mod api;
mod memory;
mod message;

pub use api::{ApiError, HttpApi, MessageApi, DEFAULT_API_SERVER};
pub use memory::MemoryApi;
pub use message::{BaseMessage, Chain, ItemType};
