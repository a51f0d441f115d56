use crate::error::FrostlineError;

/// Models offered for summarization, in selector order. The first entry is
/// the default when nothing else is configured.
pub const SUMMARIZATION_MODELS: &[&str] = &[
    "claude-3-5-sonnet",
    "llama4-maverick",
    "snowflake-llama-3.3-70b",
    "gemma-7b",
    "jamba-1.5-mini",
    "jamba-1.5-large",
    "jamba-instruct",
    "llama2-70b-chat",
    "llama3-8b",
    "llama3-70b",
    "llama3.1-8b",
    "llama3.1-70b",
    "llama3.1-405b",
    "llama3.2-1b",
    "llama3.2-3b",
    "llama3.3-70b",
    "mistral-large",
    "mistral-large2",
    "mistral-7b",
    "mixtral-8x7b",
    "reka-core",
    "reka-flash",
    "snowflake-arctic",
    "snowflake-llama-3.1-405b",
];

pub fn default_model() -> &'static str {
    SUMMARIZATION_MODELS[0]
}

pub fn is_known_model(name: &str) -> bool {
    SUMMARIZATION_MODELS.contains(&name)
}

/// Validate a model name against the catalogue.
pub fn validate_model(name: &str) -> Result<String, FrostlineError> {
    let name = name.trim();
    if is_known_model(name) {
        Ok(name.to_string())
    } else {
        Err(FrostlineError::UnknownModel(name.to_string()))
    }
}
