//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "pulse.db";

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PULSE_ROOT_FOLDER";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. PULSE_ROOT_FOLDER environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Full path of the SQLite database under the given root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    let config_path = if cfg!(target_os = "linux") {
        // Try ~/.config/pulse/config.toml first, then /etc/pulse/config.toml
        let user_config = dirs::config_dir()
            .map(|d| d.join("pulse").join("config.toml"));
        let system_config = PathBuf::from("/etc/pulse/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    } else if cfg!(target_os = "macos") || cfg!(target_os = "windows") {
        dirs::config_dir()
            .map(|d| d.join("pulse").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?
    } else {
        return Err(Error::Config("Unsupported platform".to_string()));
    };

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", config_path)))
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/pulse (or /var/lib/pulse for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("pulse"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/pulse"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/pulse
        dirs::data_dir()
            .map(|d| d.join("pulse"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/pulse"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\pulse
        dirs::data_local_dir()
            .map(|d| d.join("pulse"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\pulse"))
    } else {
        PathBuf::from("./pulse_data")
    }
}
