use frostline_core::{Completion, FrostlineError, Result};

use crate::http::{error_message, HttpTransport, RawResponse};

const SERVICE: &str = "completion";

pub const COMPLETE_PATH: &str = "/api/v2/cortex/inference:complete";

/// Client for the hosted text-completion endpoint.
pub struct CompletionClient<'a> {
    http: &'a dyn HttpTransport,
}

impl<'a> CompletionClient<'a> {
    pub fn new(http: &'a dyn HttpTransport) -> Self {
        Self { http }
    }
}

impl Completion for CompletionClient<'_> {
    fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let raw = self
            .http
            .post_json(SERVICE, COMPLETE_PATH, &request_body(model, prompt), None)?;
        let text = parse_response(raw)?;
        tracing::debug!(model, chars = text.len(), "completion received");
        Ok(text)
    }
}

pub fn request_body(model: &str, prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [{"role": "user", "content": prompt}],
        "stream": false,
    })
}

/// Read the reply text. Falls back to event-stream framing when the service
/// streams regardless of `stream: false`.
pub fn parse_response(raw: RawResponse) -> Result<String> {
    if !raw.is_success() {
        return Err(FrostlineError::Completion(format!(
            "status {}: {}",
            raw.status,
            error_message(&raw.body)
        )));
    }
    let body = raw.body.trim_start();
    let text = if body.starts_with("data:") {
        parse_event_stream(body)?
    } else {
        let val: serde_json::Value =
            serde_json::from_str(body).map_err(|e| FrostlineError::decode(SERVICE, e))?;
        let choice = val
            .get("choices")
            .and_then(|c| c.get(0))
            .ok_or_else(|| FrostlineError::decode(SERVICE, "missing `choices`"))?;
        choice
            .get("message")
            .and_then(|m| m.get("content"))
            .or_else(|| choice.get("messages"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| FrostlineError::decode(SERVICE, "missing reply content"))?
    };
    if text.trim().is_empty() {
        return Err(FrostlineError::Completion("empty reply".to_string()));
    }
    Ok(text)
}

fn parse_event_stream(body: &str) -> Result<String> {
    let mut out = String::new();
    for line in body.lines() {
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            continue;
        }
        let chunk: serde_json::Value =
            serde_json::from_str(data).map_err(|e| FrostlineError::decode(SERVICE, e))?;
        let delta = chunk
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("delta"));
        if let Some(piece) = delta
            .and_then(|d| d.get("content").or_else(|| d.get("text")))
            .and_then(|t| t.as_str())
        {
            out.push_str(piece);
        }
    }
    Ok(out)
}
