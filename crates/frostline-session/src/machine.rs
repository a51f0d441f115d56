use serde::Serialize;

use frostline_core::{FrostlineError, Result};

/// Where a turn currently is.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingAnalystResponse,
    RenderingContent,
    AwaitingSearchResult,
    Summarizing,
}

impl TurnState {
    pub fn name(self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::AwaitingAnalystResponse => "awaiting_analyst_response",
            TurnState::RenderingContent => "rendering_content",
            TurnState::AwaitingSearchResult => "awaiting_search_result",
            TurnState::Summarizing => "summarizing",
        }
    }
}

// ── Valid transitions ──

const VALID_TRANSITIONS: &[(TurnState, &[TurnState])] = &[
    (TurnState::Idle, &[TurnState::AwaitingAnalystResponse]),
    (
        TurnState::AwaitingAnalystResponse,
        &[TurnState::RenderingContent, TurnState::Idle],
    ),
    (
        TurnState::RenderingContent,
        &[TurnState::AwaitingSearchResult, TurnState::Idle],
    ),
    (
        TurnState::AwaitingSearchResult,
        &[TurnState::Summarizing, TurnState::Idle],
    ),
    (TurnState::Summarizing, &[TurnState::Idle]),
];

pub fn is_valid_transition(from: TurnState, to: TurnState) -> bool {
    VALID_TRANSITIONS
        .iter()
        .any(|(f, targets)| *f == from && targets.contains(&to))
}

/// Move `state` to `to`, rejecting edges outside the table.
pub fn advance(state: &mut TurnState, to: TurnState) -> Result<()> {
    let from = *state;
    if !is_valid_transition(from, to) {
        return Err(FrostlineError::InvalidTransition {
            from: from.name(),
            to: to.name(),
        });
    }
    tracing::debug!(from = from.name(), to = to.name(), "turn transition");
    *state = to;
    Ok(())
}

/// Drop back to `Idle` after a failure. No-op when already idle.
pub fn abort(state: &mut TurnState) {
    if *state != TurnState::Idle {
        tracing::debug!(from = state.name(), "turn aborted");
        *state = TurnState::Idle;
    }
}
