pub mod dataset;
pub mod error;
pub mod models;
pub mod service;
pub mod types;

pub use error::{FrostlineError, ReplayError, Result};
pub use service::{Analyst, AnalystResponse, Completion, PromptSearch, Warehouse};
pub use types::*;
