use clap::Subcommand;
use std::path::Path;

use frostline_core::models;
use frostline_store::{mask_secret, KNOWN_KEYS};

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (e.g. account_url, warehouse, default_model)
        key: String,
        /// Config value (true/false for replay_history, text otherwise)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values (token masked)
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    let path = frostline_store::config_path();
    let out = match cmd {
        ConfigCmd::Set { key, value } => set(&path, &key, &value)?,
        ConfigCmd::Get { key } => get(&path, &key)?,
        ConfigCmd::List => list(&path)?,
    };
    println!("{out}");
    Ok(())
}

// ── Command Implementations ──

/// Read `config.json` as a raw map. Returns an empty map if the file doesn't exist.
fn read_config(path: &Path) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    if !path.exists() {
        return Ok(serde_json::Map::new());
    }
    let content = std::fs::read_to_string(path)?;
    let val: serde_json::Value = serde_json::from_str(&content)?;
    match val {
        serde_json::Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}

fn write_config(
    path: &Path,
    config: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&config)?;
    frostline_store::write_atomic(path, json.as_bytes())
}

fn parse_bool(key: &str, s: &str) -> anyhow::Result<serde_json::Value> {
    match s {
        "true" => Ok(serde_json::Value::Bool(true)),
        "false" => Ok(serde_json::Value::Bool(false)),
        _ => anyhow::bail!("{key} must be true or false"),
    }
}

fn check_key(key: &str) -> anyhow::Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        anyhow::bail!("unknown config key `{key}` (known: {})", KNOWN_KEYS.join(", "));
    }
    Ok(())
}

/// Render a stored value for display; the token never prints in full.
fn display_value(key: &str, val: &serde_json::Value) -> String {
    match (key, val) {
        ("token", serde_json::Value::String(s)) => mask_secret(s),
        (_, serde_json::Value::String(s)) => s.clone(),
        _ => val.to_string(),
    }
}

/// `frostline config set <key> <value>`
pub fn set(path: &Path, key: &str, value: &str) -> anyhow::Result<String> {
    check_key(key)?;
    let parsed = match key {
        "default_model" => serde_json::Value::String(models::validate_model(value)?),
        "replay_history" => parse_bool(key, value)?,
        // Everything else is a string, even if it looks numeric.
        _ => serde_json::Value::String(value.to_string()),
    };
    let mut config = read_config(path)?;
    let shown = display_value(key, &parsed);
    config.insert(key.to_string(), parsed);
    write_config(path, &config)?;
    tracing::debug!(key, path = %path.display(), "config updated");
    Ok(format!("{key} = {shown}"))
}

/// `frostline config get <key>`
pub fn get(path: &Path, key: &str) -> anyhow::Result<String> {
    check_key(key)?;
    let config = read_config(path)?;
    Ok(match config.get(key) {
        Some(val) => display_value(key, val),
        None => "(not set)".to_string(),
    })
}

/// `frostline config list`
pub fn list(path: &Path) -> anyhow::Result<String> {
    let config = read_config(path)?;
    if config.is_empty() {
        return Ok("(no config set)".to_string());
    }
    Ok(config
        .iter()
        .map(|(k, v)| format!("{k} = {}", display_value(k, v)))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use frostline_store::FrostlineConfig;

    #[test]
    fn set_then_get_round_trips_through_typed_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        set(&path, "account_url", "https://acme.snowflakecomputing.com").unwrap();
        set(&path, "warehouse", "COMPUTE_WH").unwrap();
        set(&path, "replay_history", "true").unwrap();
        set(&path, "default_model", "reka-flash").unwrap();

        assert_eq!(get(&path, "warehouse").unwrap(), "COMPUTE_WH");
        let config = FrostlineConfig::load(&path).unwrap();
        assert_eq!(config.warehouse.as_deref(), Some("COMPUTE_WH"));
        assert!(config.replay_history);
        assert_eq!(config.default_model.as_deref(), Some("reka-flash"));
    }

    #[test]
    fn numeric_looking_role_stays_a_string() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        set(&path, "role", "1234").unwrap();
        let config = FrostlineConfig::load(&path).unwrap();
        assert_eq!(config.role.as_deref(), Some("1234"));
    }

    #[test]
    fn unknown_key_and_bad_values_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        assert!(set(&path, "database", "OTHER").is_err());
        assert!(set(&path, "default_model", "gpt-x").is_err());
        let err = set(&path, "replay_history", "1").unwrap_err();
        assert_eq!(err.to_string(), "replay_history must be true or false");
        assert!(!path.exists());
    }

    #[test]
    fn token_is_masked_everywhere() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let shown = set(&path, "token", "abcdefgh1234").unwrap();
        assert_eq!(shown, "token = ********1234");
        assert_eq!(get(&path, "token").unwrap(), "********1234");
        assert!(list(&path).unwrap().contains("token = ********1234"));
        assert!(!list(&path).unwrap().contains("abcdefgh"));
    }

    #[test]
    fn empty_config_lists_placeholder() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        assert_eq!(list(&path).unwrap(), "(no config set)");
        assert_eq!(get(&path, "role").unwrap(), "(not set)");
    }
}
