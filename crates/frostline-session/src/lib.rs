//! One chat session: the context it owns, the turn state machine and the
//! orchestration that drives a question through every service.

pub mod machine;
pub mod orchestrator;
pub mod session;
pub mod summarize;

pub use machine::TurnState;
pub use orchestrator::{
    replay_history, CycleOptions, CycleReport, Orchestrator, ReplaySummary, TurnReport,
    GENERATING_RESPONSE, NO_HISTORY_FOUND, SUMMARIZING_RESULT,
};
pub use session::SessionContext;
