use serde::Serialize;

use frostline_core::{
    Analyst, AnalystResponse, Completion, ContentItem, FrostlineError, Message, PromptSearch,
    ReplayError, Result, Role, Warehouse,
};
use frostline_render::{render_content, replay_content, suggestions_in, SqlExecutor, Surface};

use crate::machine::{self, TurnState};
use crate::session::SessionContext;
use crate::summarize;

pub const GENERATING_RESPONSE: &str = "Generating response...";
pub const SUMMARIZING_RESULT: &str = "Summarizing result...";
pub const NO_HISTORY_FOUND: &str = "No history found!";

/// What one completed turn produced.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TurnReport {
    pub query: String,
    pub request_id: String,
    /// Result markdown handed to summarization, or the no-SQL sentinel.
    pub sql_markdown: String,
    pub prompt: String,
    pub summary: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Redraw the whole transcript before handling input.
    pub replay_history: bool,
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub replay: Option<ReplaySummary>,
    pub turns: Vec<TurnReport>,
}

/// Outcome of redrawing the transcript.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub rendered: usize,
    pub failed: Vec<ReplayError>,
}

/// Wires a question through analyst, rendering, prompt search and
/// summarization.
pub struct Orchestrator<'a> {
    analyst: &'a dyn Analyst,
    search: &'a dyn PromptSearch,
    completion: &'a dyn Completion,
    executor: SqlExecutor<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        analyst: &'a dyn Analyst,
        search: &'a dyn PromptSearch,
        completion: &'a dyn Completion,
        warehouse: &'a dyn Warehouse,
    ) -> Self {
        Self {
            analyst,
            search,
            completion,
            executor: SqlExecutor::new(warehouse),
        }
    }

    /// Run one question to a summary. Any failure returns the session to
    /// `Idle`; an analyst failure also drops the question from the transcript.
    pub fn turn(
        &self,
        session: &mut SessionContext,
        surface: &mut dyn Surface,
        query: &str,
    ) -> Result<TurnReport> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FrostlineError::EmptyQuery);
        }
        let model = session
            .selected_model()
            .ok_or(FrostlineError::ModelNotSelected)?
            .to_string();

        let result = self.run_turn(session, surface, query, model);
        if let Err(e) = &result {
            tracing::warn!(state = session.state.name(), error = %e, "turn failed");
            machine::abort(&mut session.state);
        }
        result
    }

    fn run_turn(
        &self,
        session: &mut SessionContext,
        surface: &mut dyn Surface,
        query: &str,
        model: String,
    ) -> Result<TurnReport> {
        machine::advance(&mut session.state, TurnState::AwaitingAnalystResponse)?;
        session.transcript.push_user(query);
        let response = match self.request_analyst(session, surface, query) {
            Ok(r) => r,
            Err(e) => {
                session.transcript.pop_last();
                return Err(e);
            }
        };

        machine::advance(&mut session.state, TurnState::RenderingContent)?;
        let AnalystResponse {
            request_id,
            content,
        } = response;
        session
            .transcript
            .push_analyst(content.clone(), request_id.clone());
        let message_index = session.transcript.len() - 1;
        // `[n]` shown during the render indexes this list.
        session.offer_suggestions(message_index, suggestions_in(&content));

        surface.begin_message(Role::Analyst)?;
        let outcome = render_content(
            surface,
            &content,
            Some(&request_id),
            message_index,
            &self.executor,
        )?;
        if let Some(md) = outcome.markdown() {
            session.cache_result(message_index, md.to_string());
        }

        machine::advance(&mut session.state, TurnState::AwaitingSearchResult)?;
        let prompt = self.search.best_prompt(query)?;
        surface.retrieved_prompt(&prompt)?;

        machine::advance(&mut session.state, TurnState::Summarizing)?;
        surface.status(SUMMARIZING_RESULT)?;
        let sql_markdown = outcome.sql_markdown().to_string();
        let summary =
            summarize::summarize(self.completion, query, &sql_markdown, &prompt, &model)?;
        surface.summary(&summary)?;

        machine::advance(&mut session.state, TurnState::Idle)?;
        tracing::info!(
            request_id = %request_id,
            has_sql = outcome.has_sql(),
            model = %model,
            "turn complete"
        );
        Ok(TurnReport {
            query: query.to_string(),
            request_id,
            sql_markdown,
            prompt,
            summary,
            model,
        })
    }

    fn request_analyst(
        &self,
        session: &SessionContext,
        surface: &mut dyn Surface,
        query: &str,
    ) -> Result<AnalystResponse> {
        surface.begin_message(Role::User)?;
        surface.text(query)?;
        surface.status(GENERATING_RESPONSE)?;
        self.analyst.send(session.transcript.messages())
    }

    /// One interaction: optional full redraw, then the submitted input, then
    /// the pending suggestion. The suggestion is taken before its turn runs,
    /// so it is spent even when that turn fails.
    pub fn run_cycle(
        &self,
        session: &mut SessionContext,
        surface: &mut dyn Surface,
        input: Option<&str>,
        options: CycleOptions,
    ) -> Result<CycleReport> {
        let mut report = CycleReport::default();
        if options.replay_history {
            report.replay = Some(replay_history(session, surface));
        }
        if let Some(query) = input {
            report.turns.push(self.turn(session, surface, query)?);
        }
        if let Some(suggestion) = session.take_active_suggestion() {
            tracing::debug!(suggestion = %suggestion, "running selected suggestion");
            report.turns.push(self.turn(session, surface, &suggestion)?);
        }
        Ok(report)
    }
}

// ── History replay ──

/// Redraw every stored message without calling any service. A message that
/// cannot be shown is logged and replaced by a placeholder; the rest still
/// render.
pub fn replay_history(session: &SessionContext, surface: &mut dyn Surface) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (index, message) in session.transcript().messages().iter().enumerate() {
        match replay_message(session, surface, index, message) {
            Ok(()) => summary.rendered += 1,
            Err(e) => {
                tracing::warn!(index, kind = e.kind(), error = %e, "history replay failed");
                if let Err(io) = surface.placeholder(NO_HISTORY_FOUND) {
                    tracing::warn!(index, error = %io, "placeholder not shown");
                }
                summary.failed.push(e);
            }
        }
    }
    summary
}

fn replay_message(
    session: &SessionContext,
    surface: &mut dyn Surface,
    index: usize,
    message: &Message,
) -> std::result::Result<(), ReplayError> {
    let surface_err = |source| ReplayError::Surface { index, source };
    match message.role {
        Role::User => {
            let [ContentItem::Text { text }] = message.content.as_slice() else {
                return Err(ReplayError::MalformedUserMessage {
                    index,
                    items: message.content.len(),
                });
            };
            surface.begin_message(Role::User).map_err(surface_err)?;
            surface.text(text).map_err(surface_err)?;
        }
        Role::Analyst => {
            if message.content.is_empty() {
                return Err(ReplayError::EmptyAssistantContent { index });
            }
            surface.begin_message(Role::Analyst).map_err(surface_err)?;
            replay_content(
                surface,
                &message.content,
                message.request_id.as_deref(),
                index,
                session.cached_result(index),
                session.offers_suggestions(index),
            )
            .map_err(surface_err)?;
        }
    }
    Ok(())
}
