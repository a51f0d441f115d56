//! Fixed identifiers of the customer lifetime value dataset.
//!
//! These are compile-time constants: the assistant is bound to one semantic
//! model and one prompt index, never chosen at runtime.

use std::time::Duration;

pub const DATABASE: &str = "CUSTOMER_LTV_DATA";
pub const SCHEMA: &str = "PUBLIC";
pub const STAGE: &str = "SEMANTIC";
pub const SEMANTIC_MODEL_FILE: &str = "customer_lifetime_value.yaml";

/// Search service holding historical query → prompt template pairs.
pub const PROMPT_SEARCH_SERVICE: &str = "PROMPT_SEARCH_CUSTOMER_LTV";
pub const SEARCH_QUERY_COLUMN: &str = "USER_QUERY";
pub const SEARCH_PROMPT_COLUMN: &str = "LLM_PROMPT";

pub const ANALYST_PATH: &str = "/api/v2/cortex/analyst/message";
pub const ANALYST_TIMEOUT: Duration = Duration::from_millis(30_000);
/// Analyst responses at or above this status are failures.
pub const ANALYST_ERROR_STATUS: u16 = 400;

/// Stage reference handed to the analyst service: `@DB.SCHEMA.STAGE/FILE`.
pub fn semantic_model_ref() -> String {
    format!("@{DATABASE}.{SCHEMA}.{STAGE}/{SEMANTIC_MODEL_FILE}")
}
