use std::io;

use frostline_core::{QueryResult, Role};

use crate::chart::ResultView;

/// Anything that can show chat output. Every call is a discrete, ordered
/// event; implementations decide how it looks.
pub trait Surface {
    /// Start a new chat bubble.
    fn begin_message(&mut self, role: Role) -> io::Result<()>;
    fn request_id(&mut self, id: &str) -> io::Result<()>;
    fn text(&mut self, text: &str) -> io::Result<()>;
    /// Follow-up questions offered by the message at `message_index`. `first`
    /// is the pick number of the first entry, or `None` when they can no
    /// longer be picked.
    fn suggestions(
        &mut self,
        message_index: usize,
        first: Option<usize>,
        suggestions: &[String],
    ) -> io::Result<()>;
    fn sql(&mut self, statement: &str) -> io::Result<()>;
    /// A freshly executed result with its markdown and chart view.
    fn result(&mut self, result: &QueryResult, markdown: &str, view: &ResultView)
        -> io::Result<()>;
    /// A previously executed result, shown from cache during replay.
    fn cached_result(&mut self, markdown: &str) -> io::Result<()>;
    /// Transient progress line ("Running SQL...").
    fn status(&mut self, status: &str) -> io::Result<()>;
    fn retrieved_prompt(&mut self, prompt: &str) -> io::Result<()>;
    fn summary(&mut self, text: &str) -> io::Result<()>;
    fn placeholder(&mut self, text: &str) -> io::Result<()>;
}

// ── Recording surface ──

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Begin(Role),
    RequestId(String),
    Text(String),
    Suggestions {
        message_index: usize,
        first: Option<usize>,
        suggestions: Vec<String>,
    },
    Sql(String),
    Result {
        markdown: String,
        view: ResultView,
    },
    CachedResult(String),
    Status(String),
    RetrievedPrompt(String),
    Summary(String),
    Placeholder(String),
}

/// Keeps every event in memory instead of drawing it. Used for headless runs
/// and for asserting on what a turn showed.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
    /// When set, the call with this zero-based position fails with a broken pipe.
    pub fail_at: Option<usize>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(call: usize) -> Self {
        Self {
            events: Vec::new(),
            fail_at: Some(call),
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, event: SurfaceEvent) -> io::Result<()> {
        if self.fail_at == Some(self.events.len()) {
            self.fail_at = None;
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "surface closed"));
        }
        self.events.push(event);
        Ok(())
    }

    pub fn count(&self, pred: impl Fn(&SurfaceEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }
}

impl Surface for RecordingSurface {
    fn begin_message(&mut self, role: Role) -> io::Result<()> {
        self.push(SurfaceEvent::Begin(role))
    }

    fn request_id(&mut self, id: &str) -> io::Result<()> {
        self.push(SurfaceEvent::RequestId(id.to_string()))
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        self.push(SurfaceEvent::Text(text.to_string()))
    }

    fn suggestions(
        &mut self,
        message_index: usize,
        first: Option<usize>,
        suggestions: &[String],
    ) -> io::Result<()> {
        self.push(SurfaceEvent::Suggestions {
            message_index,
            first,
            suggestions: suggestions.to_vec(),
        })
    }

    fn sql(&mut self, statement: &str) -> io::Result<()> {
        self.push(SurfaceEvent::Sql(statement.to_string()))
    }

    fn result(
        &mut self,
        _result: &QueryResult,
        markdown: &str,
        view: &ResultView,
    ) -> io::Result<()> {
        self.push(SurfaceEvent::Result {
            markdown: markdown.to_string(),
            view: view.clone(),
        })
    }

    fn cached_result(&mut self, markdown: &str) -> io::Result<()> {
        self.push(SurfaceEvent::CachedResult(markdown.to_string()))
    }

    fn status(&mut self, status: &str) -> io::Result<()> {
        self.push(SurfaceEvent::Status(status.to_string()))
    }

    fn retrieved_prompt(&mut self, prompt: &str) -> io::Result<()> {
        self.push(SurfaceEvent::RetrievedPrompt(prompt.to_string()))
    }

    fn summary(&mut self, text: &str) -> io::Result<()> {
        self.push(SurfaceEvent::Summary(text.to_string()))
    }

    fn placeholder(&mut self, text: &str) -> io::Result<()> {
        self.push(SurfaceEvent::Placeholder(text.to_string()))
    }
}
