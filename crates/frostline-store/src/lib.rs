mod config;

pub use config::{mask_secret, FrostlineConfig, DEFAULT_TOKEN_TYPE, KNOWN_KEYS};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Return the per-user store root: `<data dir>/frostline/`
/// (falls back to `~/.frostline/`, then `./.frostline-store/`).
pub fn store_root() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("frostline")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".frostline")
    } else {
        PathBuf::from(".frostline-store")
    }
}

/// Return the configuration file path: `store_root/config.json`.
pub fn config_path() -> PathBuf {
    store_root().join("config.json")
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
