//! Error types for the assistant.

/// Errors surfaced by a turn. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum FrostlineError {
    #[error("Failed request with status {status}: {body}")]
    AnalystRequest { status: u16, body: String },
    #[error("no matching prompt template found for query: {query}")]
    SearchMiss { query: String },
    #[error("SQL execution failed: {0}")]
    SqlExecution(String),
    #[error("completion failed: {0}")]
    Completion(String),
    #[error("{service} returned status {status}: {body}")]
    Service {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
    #[error("malformed {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
    #[error("no summarization model selected")]
    ModelNotSelected,
    #[error("unknown summarization model: {0}")]
    UnknownModel(String),
    #[error("question cannot be empty")]
    EmptyQuery,
    #[error("no suggestion numbered {0}")]
    NoSuchSuggestion(usize),
    #[error("invalid turn transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error("surface error: {0}")]
    Surface(#[from] std::io::Error),
}

impl FrostlineError {
    pub fn transport(service: &'static str, err: impl std::fmt::Display) -> Self {
        FrostlineError::Transport {
            service,
            message: err.to_string(),
        }
    }

    pub fn decode(service: &'static str, err: impl std::fmt::Display) -> Self {
        FrostlineError::Decode {
            service,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrostlineError>;

/// Why a stored message could not be replayed. Caught per message.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("message {index}: user message carries {items} content items, expected one text item")]
    MalformedUserMessage { index: usize, items: usize },
    #[error("message {index}: assistant message has no content")]
    EmptyAssistantContent { index: usize },
    #[error("message {index}: surface write failed: {source}")]
    Surface {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ReplayError {
    /// Stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ReplayError::MalformedUserMessage { .. } => "malformed_user_message",
            ReplayError::EmptyAssistantContent { .. } => "empty_assistant_content",
            ReplayError::Surface { .. } => "surface",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ReplayError::MalformedUserMessage { index, .. }
            | ReplayError::EmptyAssistantContent { index }
            | ReplayError::Surface { index, .. } => *index,
        }
    }
}
