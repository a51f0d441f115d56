use frostline_core::dataset::{
    DATABASE, PROMPT_SEARCH_SERVICE, SCHEMA, SEARCH_PROMPT_COLUMN, SEARCH_QUERY_COLUMN,
};
use frostline_core::{FrostlineError, PromptSearch, Result};

use crate::http::{error_message, HttpTransport, RawResponse};

const SERVICE: &str = "search";

/// Client for the prompt-template search index.
pub struct SearchClient<'a> {
    http: &'a dyn HttpTransport,
}

impl<'a> SearchClient<'a> {
    pub fn new(http: &'a dyn HttpTransport) -> Self {
        Self { http }
    }
}

impl PromptSearch for SearchClient<'_> {
    fn best_prompt(&self, query: &str) -> Result<String> {
        let raw = self
            .http
            .post_json(SERVICE, &request_path(), &request_body(query), None)?;
        let prompt = parse_response(raw, query)?;
        tracing::debug!(chars = prompt.len(), "prompt template retrieved");
        Ok(prompt)
    }
}

pub fn request_path() -> String {
    format!(
        "/api/v2/databases/{DATABASE}/schemas/{SCHEMA}/cortex-search-services/{PROMPT_SEARCH_SERVICE}:query"
    )
}

/// Top-1 query scoped to the historical query and its prompt template.
pub fn request_body(query: &str) -> serde_json::Value {
    serde_json::json!({
        "query": query,
        "columns": [SEARCH_QUERY_COLUMN, SEARCH_PROMPT_COLUMN],
        "limit": 1,
    })
}

/// Extract `results[0].LLM_PROMPT`. An empty result list is a miss, not a fault.
pub fn parse_response(raw: RawResponse, query: &str) -> Result<String> {
    if !raw.is_success() {
        return Err(FrostlineError::Service {
            service: SERVICE,
            status: raw.status,
            body: error_message(&raw.body),
        });
    }
    let val: serde_json::Value =
        serde_json::from_str(&raw.body).map_err(|e| FrostlineError::decode(SERVICE, e))?;
    let results = val
        .get("results")
        .and_then(|r| r.as_array())
        .ok_or_else(|| FrostlineError::decode(SERVICE, "missing `results` array"))?;

    let miss = || FrostlineError::SearchMiss {
        query: query.to_string(),
    };
    let first = results.first().and_then(|r| r.as_object()).ok_or_else(miss)?;
    // Column names come back in whatever case the index was built with.
    first
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(SEARCH_PROMPT_COLUMN))
        .and_then(|(_, v)| v.as_str())
        .map(str::to_string)
        .ok_or_else(miss)
}
