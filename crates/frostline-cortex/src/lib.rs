//! Blocking clients for the managed services behind a turn.
//!
//! Every client talks through [`HttpTransport`]; [`UreqTransport`] is the real
//! one. Request bodies and response parsing are plain functions so they can be
//! checked without a network.

pub mod analyst;
pub mod complete;
pub mod http;
pub mod search;
pub mod warehouse;

pub use analyst::AnalystClient;
pub use complete::CompletionClient;
pub use http::{HttpTransport, RawResponse, UreqTransport};
pub use search::SearchClient;
pub use warehouse::WarehouseClient;
