//! Seams to the external services. The HTTP implementations live in
//! `frostline-cortex`; tests plug in fakes.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ContentItem, Message, QueryResult};

/// Parsed body of a successful analyst call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalystResponse {
    pub request_id: String,
    pub content: Vec<ContentItem>,
}

/// Natural-language → SQL translation over the whole transcript.
pub trait Analyst {
    fn send(&self, messages: &[Message]) -> Result<AnalystResponse>;
}

/// Best matching prompt template for a raw user query.
pub trait PromptSearch {
    fn best_prompt(&self, query: &str) -> Result<String>;
}

/// Text completion under a named model.
pub trait Completion {
    fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Synchronous SQL execution with the full result materialised.
pub trait Warehouse {
    fn query(&self, sql: &str) -> Result<QueryResult>;
}
