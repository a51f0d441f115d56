use frostline_core::{Completion, Result};

/// Build the completion prompt. Inputs are passed through whole.
pub fn compose_prompt(template: &str, query: &str, sql_markdown: &str) -> String {
    format!("{template}\nUser query  - {query}\nSql result markdown - {sql_markdown}")
}

/// Summarize a result set for `query` under `model`.
pub fn summarize(
    completion: &dyn Completion,
    query: &str,
    sql_markdown: &str,
    template: &str,
    model: &str,
) -> Result<String> {
    let prompt = compose_prompt(template, query, sql_markdown);
    tracing::debug!(model, prompt_chars = prompt.len(), "summarizing");
    completion.complete(model, &prompt)
}
