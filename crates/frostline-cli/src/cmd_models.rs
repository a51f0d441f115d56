use std::io;

use frostline_store::FrostlineConfig;

use crate::cmd_chat::print_models;

/// `frostline models`: the summarization catalogue, default marked with `*`.
pub fn execute() -> anyhow::Result<()> {
    let config = FrostlineConfig::load_or_default(&frostline_store::config_path())
        .with_env_overrides(|k| std::env::var(k).ok());
    let default = config.initial_model()?;
    print_models(&mut io::stdout().lock(), Some(default.as_str()))?;
    Ok(())
}
