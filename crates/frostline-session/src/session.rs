use std::collections::HashMap;

use frostline_core::{models, FrostlineError, Result, Transcript};

use crate::machine::TurnState;

/// Everything one chat session owns. Passed `&mut` into each step; nothing
/// here outlives the process.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub(crate) transcript: Transcript,
    suggestions: Vec<String>,
    /// Index of the assistant message that offered `suggestions`.
    suggestion_source: Option<usize>,
    active_suggestion: Option<String>,
    selected_model: Option<String>,
    /// Result markdown keyed by the index of the assistant message that ran it.
    results: HashMap<usize, String>,
    pub(crate) state: TurnState,
}

impl SessionContext {
    /// A session summarizing with `model`. `None` leaves the session without
    /// a model, so turns fail until one is selected.
    pub fn new(model: Option<String>) -> Self {
        Self {
            selected_model: model,
            ..Self::default()
        }
    }

    /// A session on the first catalogue model.
    pub fn with_default_model() -> Self {
        Self::new(Some(models::default_model().to_string()))
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    // ── Suggestions ──

    /// Suggestions offered by the latest live turn, in the order `/pick`
    /// numbers them.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Whether the message at `message_index` offered the current suggestions.
    pub fn offers_suggestions(&self, message_index: usize) -> bool {
        self.suggestion_source == Some(message_index)
    }

    /// Make `suggestions` from the message at `message_index` the pickable set.
    pub(crate) fn offer_suggestions(&mut self, message_index: usize, suggestions: Vec<String>) {
        self.suggestions = suggestions;
        self.suggestion_source = Some(message_index);
    }

    pub fn active_suggestion(&self) -> Option<&str> {
        self.active_suggestion.as_deref()
    }

    /// Select a suggestion by its 1-based position. Replaces any pending one.
    pub fn select_suggestion(&mut self, position: usize) -> Result<&str> {
        let text = position
            .checked_sub(1)
            .and_then(|i| self.suggestions.get(i))
            .cloned()
            .ok_or(FrostlineError::NoSuchSuggestion(position))?;
        Ok(self.active_suggestion.insert(text).as_str())
    }

    /// Select a suggestion by its text, as a click on a rendered button would.
    pub fn select_suggestion_text(&mut self, text: impl Into<String>) {
        self.active_suggestion = Some(text.into());
    }

    /// Consume the pending suggestion. A second call yields `None`.
    pub fn take_active_suggestion(&mut self) -> Option<String> {
        self.active_suggestion.take()
    }

    // ── Model ──

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    /// Switch the summarization model; names outside the catalogue are refused.
    pub fn select_model(&mut self, name: &str) -> Result<&str> {
        let name = models::validate_model(name)?;
        Ok(self.selected_model.insert(name).as_str())
    }

    // ── Result cache ──

    pub fn cached_result(&self, message_index: usize) -> Option<&str> {
        self.results.get(&message_index).map(String::as_str)
    }

    pub(crate) fn cache_result(&mut self, message_index: usize, markdown: String) {
        self.results.insert(message_index, markdown);
    }

    /// Start over: transcript, suggestions, pending suggestion and cached
    /// results all go. The selected model stays.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.suggestions.clear();
        self.suggestion_source = None;
        self.active_suggestion = None;
        self.results.clear();
        self.state = TurnState::Idle;
        tracing::debug!("session reset");
    }
}
