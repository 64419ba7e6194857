use anyhow::Result;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "mediation-wizard";
const CONFIG_FILE_NAME: &str = "mediation-wizard.toml";

/// Resolve the application data folder (absolute path)
pub fn resolve_data_folder() -> PathBuf {
    // Prefer the per-user data dir; fall back to the working directory on systems without one.
    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR_NAME);
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Resolve the config file path. The file itself is optional.
pub fn resolve_config_file() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(resolve_data_folder)
        .join(CONFIG_FILE_NAME)
}

/// Resolve log folder (absolute path), creating it if needed.
///
/// `configured` wins over the default `<data>/logs`.
pub fn resolve_log_folder(configured: Option<&Path>) -> Result<PathBuf> {
    let log_dir = match configured {
        Some(p) => p.to_path_buf(),
        None => resolve_data_folder().join("logs"),
    };
    ensure_dir(&log_dir)?;
    Ok(log_dir)
}

/// Resolve session folder (absolute path), creating it if needed.
pub fn resolve_session_folder(configured: Option<&Path>) -> Result<PathBuf> {
    let session_dir = match configured {
        Some(p) => p.to_path_buf(),
        None => resolve_data_folder().join("session"),
    };
    ensure_dir(&session_dir)?;
    Ok(session_dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("Failed to create folder {}: {}", dir.display(), e))
}
