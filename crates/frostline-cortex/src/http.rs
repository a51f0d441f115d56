use std::time::Duration;

use frostline_core::{FrostlineError, Result};

/// Status and body of a finished HTTP exchange. Non-2xx statuses are data,
/// not errors; each client decides what a status means.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal request surface the service clients need.
pub trait HttpTransport {
    /// POST a JSON body to `path` (relative to the account URL).
    /// `timeout` of `None` waits for as long as the service takes.
    fn post_json(
        &self,
        service: &'static str,
        path: &str,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<RawResponse>;

    /// GET `path` (relative to the account URL), no deadline.
    fn get(&self, service: &'static str, path: &str) -> Result<RawResponse>;
}

/// Bearer-token transport over `ureq`.
pub struct UreqTransport {
    base_url: String,
    token: String,
    token_type: String,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        token_type: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            token_type: token_type.into(),
            user_agent: format!("frostline/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn agent(timeout: Option<Duration>) -> ureq::Agent {
        ureq::Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .new_agent()
    }

    fn finish(
        service: &'static str,
        result: std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<RawResponse> {
        let mut resp = result.map_err(|e| FrostlineError::transport(service, e))?;
        let status = resp.status().as_u16();
        // Result sets are materialised whole, so lift ureq's default body cap.
        let body = resp
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| FrostlineError::transport(service, e))?;
        tracing::debug!(service, status, bytes = body.len(), "response received");
        Ok(RawResponse { status, body })
    }
}

impl HttpTransport for UreqTransport {
    fn post_json(
        &self,
        service: &'static str,
        path: &str,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<RawResponse> {
        let url = self.url(path);
        tracing::debug!(service, %url, timeout_ms = timeout.map(|t| t.as_millis() as u64), "POST");
        let auth = format!("Bearer {}", self.token);
        let result = Self::agent(timeout)
            .post(&url)
            .header("Authorization", auth.as_str())
            .header(
                "X-Snowflake-Authorization-Token-Type",
                self.token_type.as_str(),
            )
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", self.user_agent.as_str())
            .send(body.to_string());
        Self::finish(service, result)
    }

    fn get(&self, service: &'static str, path: &str) -> Result<RawResponse> {
        let url = self.url(path);
        tracing::debug!(service, %url, "GET");
        let auth = format!("Bearer {}", self.token);
        let result = Self::agent(None)
            .get(&url)
            .header("Authorization", auth.as_str())
            .header(
                "X-Snowflake-Authorization-Token-Type",
                self.token_type.as_str(),
            )
            .header("Accept", "application/json")
            .header("User-Agent", self.user_agent.as_str())
            .call();
        Self::finish(service, result)
    }
}

/// Join an account URL and an API path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pull a human readable message out of an error body, if it has one.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Records requests and replays canned responses in order.
    #[derive(Default)]
    pub struct ScriptedTransport {
        pub responses: RefCell<VecDeque<Result<RawResponse>>>,
        pub requests: RefCell<Vec<Recorded>>,
    }

    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: &'static str,
        pub path: String,
        pub body: Option<serde_json::Value>,
        pub timeout: Option<Duration>,
    }

    impl ScriptedTransport {
        pub fn with(responses: Vec<RawResponse>) -> Self {
            Self {
                responses: RefCell::new(responses.into_iter().map(Ok).collect()),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub fn failing(err: FrostlineError) -> Self {
            Self {
                responses: RefCell::new(VecDeque::from([Err(err)])),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn next(&self) -> Result<RawResponse> {
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(RawResponse::new(599, "script exhausted")))
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn post_json(
            &self,
            _service: &'static str,
            path: &str,
            body: &serde_json::Value,
            timeout: Option<Duration>,
        ) -> Result<RawResponse> {
            self.requests.borrow_mut().push(Recorded {
                method: "POST",
                path: path.to_string(),
                body: Some(body.clone()),
                timeout,
            });
            self.next()
        }

        fn get(&self, _service: &'static str, path: &str) -> Result<RawResponse> {
            self.requests.borrow_mut().push(Recorded {
                method: "GET",
                path: path.to_string(),
                body: None,
                timeout: None,
            });
            self.next()
        }
    }
}
