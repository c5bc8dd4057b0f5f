//! HTTP client module
//!
//! Transport used to reach the remote aggregation API.

mod client;

pub use client::{HttpClient, HttpRequest, HttpResponse};
