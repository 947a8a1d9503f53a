//! Config file resolution for tfrun
//!
//! # Resolution Priority
//!
//! 1. `--config <path>` (must exist)
//! 2. `TFRUN_CONFIG` environment variable (must exist)
//! 3. `./tfrun.toml` in the current directory
//! 4. `<config dir>/tfrun/config.toml`:
//!    - `XDG_CONFIG_HOME/tfrun` if set
//!    - otherwise the platform config dir (`~/.config` on Linux,
//!      `%APPDATA%` on Windows)
//!
//! When nothing is found the built-in defaults are used.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Environment variable for config file override
pub const ENV_CONFIG: &str = "TFRUN_CONFIG";

/// Config file name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "tfrun.toml";

/// Find the config file to load, if any.
pub fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir()?;
    resolve_config_file(
        explicit,
        std::env::var(ENV_CONFIG).ok().as_deref(),
        &cwd,
        user_config_dir().as_deref(),
    )
}

/// Resolution logic behind [`config_file`], with every input passed in.
pub fn resolve_config_file(
    explicit: Option<&Path>,
    env_value: Option<&str>,
    cwd: &Path,
    user_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    // 1. Explicit flag
    if let Some(path) = explicit {
        let path = expand_path(&path.to_string_lossy());
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }
        log::debug!("Using config from --config: {}", path.display());
        return Ok(Some(path));
    }

    // 2. Environment variable
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        let path = expand_path(value);
        if !path.is_file() {
            bail!("Config file from {} not found: {}", ENV_CONFIG, path.display());
        }
        log::debug!("Using config from {}: {}", ENV_CONFIG, path.display());
        return Ok(Some(path));
    }

    // 3. Project-local file
    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        log::debug!("Using project config: {}", local.display());
        return Ok(Some(local));
    }

    // 4. User config dir
    if let Some(dir) = user_dir {
        let path = dir.join("config.toml");
        if path.is_file() {
            log::debug!("Using user config: {}", path.display());
            return Ok(Some(path));
        }
    }

    log::debug!("No config file found, using defaults");
    Ok(None)
}

/// The tfrun directory inside the user's config dir.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return Some(PathBuf::from(xdg_config).join("tfrun"));
    }

    dirs::config_dir().map(|dir| dir.join("tfrun"))
}

/// Expand `~` and environment variables in a path string.
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(path).into_owned());
    PathBuf::from(expanded)
}
