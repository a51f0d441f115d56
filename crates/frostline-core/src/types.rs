use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
///
/// The analyst service names its own turns `analyst`; `assistant` is accepted
/// on input so hand-written transcripts still load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "analyst", alias = "assistant")]
    Analyst,
}

impl Role {
    pub fn display_name(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Analyst => "assistant",
        }
    }
}

/// One item of a message body. Rendering dispatches on the variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text { text: String },
    Suggestions { suggestions: Vec<String> },
    Sql { statement: String },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }

    pub fn sql(statement: impl Into<String>) -> Self {
        ContentItem::Sql {
            statement: statement.into(),
        }
    }

    pub fn suggestions<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContentItem::Suggestions {
            suggestions: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single transcript entry, serialized exactly as the analyst service expects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentItem::text(text)],
            request_id: None,
        }
    }

    pub fn analyst(content: Vec<ContentItem>, request_id: impl Into<String>) -> Self {
        Self {
            role: Role::Analyst,
            content,
            request_id: Some(request_id.into()),
        }
    }
}

/// Ordered conversation history for one session.
///
/// Append-only, except for `pop_last`, which undoes an optimistic user append
/// when the analyst call behind it fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn push_analyst(&mut self, content: Vec<ContentItem>, request_id: impl Into<String>) {
        self.messages.push(Message::analyst(content, request_id));
    }

    pub fn pop_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

// ── Query results ──

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Text,
        }
    }
}

/// A fully materialised result set. Cells keep the warehouse's string form;
/// `None` is SQL NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Numeric value of a cell, if the cell is present and parses.
    pub fn number(&self, row: usize, col: usize) -> Option<f64> {
        self.rows
            .get(row)?
            .get(col)?
            .as_deref()?
            .trim()
            .parse::<f64>()
            .ok()
    }
}
