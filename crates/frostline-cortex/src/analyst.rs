use serde::Deserialize;

use frostline_core::dataset::{self, ANALYST_ERROR_STATUS, ANALYST_PATH, ANALYST_TIMEOUT};
use frostline_core::{Analyst, AnalystResponse, ContentItem, FrostlineError, Message, Result};

use crate::http::{HttpTransport, RawResponse};

const SERVICE: &str = "analyst";

/// Client for the natural-language → SQL analyst endpoint.
pub struct AnalystClient<'a> {
    http: &'a dyn HttpTransport,
}

impl<'a> AnalystClient<'a> {
    pub fn new(http: &'a dyn HttpTransport) -> Self {
        Self { http }
    }
}

impl Analyst for AnalystClient<'_> {
    fn send(&self, messages: &[Message]) -> Result<AnalystResponse> {
        let body = request_body(messages);
        let raw = self
            .http
            .post_json(SERVICE, ANALYST_PATH, &body, Some(ANALYST_TIMEOUT))?;
        let response = parse_response(raw)?;
        tracing::debug!(
            request_id = %response.request_id,
            items = response.content.len(),
            "analyst responded"
        );
        Ok(response)
    }
}

/// `{messages, semantic_model_file}` with the whole transcript.
pub fn request_body(messages: &[Message]) -> serde_json::Value {
    serde_json::json!({
        "messages": messages,
        "semantic_model_file": dataset::semantic_model_ref(),
    })
}

#[derive(Deserialize)]
struct Body {
    request_id: String,
    message: BodyMessage,
}

#[derive(Deserialize)]
struct BodyMessage {
    content: Vec<ContentItem>,
}

/// Success below the error threshold; anything else carries the raw body.
pub fn parse_response(raw: RawResponse) -> Result<AnalystResponse> {
    if raw.status >= ANALYST_ERROR_STATUS {
        return Err(FrostlineError::AnalystRequest {
            status: raw.status,
            body: raw.body,
        });
    }
    let body: Body =
        serde_json::from_str(&raw.body).map_err(|e| FrostlineError::decode(SERVICE, e))?;
    Ok(AnalystResponse {
        request_id: body.request_id,
        content: body.message.content,
    })
}
