//! Configuration loading and data directory resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable consulted when no CLI override is given
pub const DATA_DIR_ENV: &str = "SKILLHUB_DATA_DIR";

/// Data directory resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. SKILLHUB_DATA_DIR environment variable
/// 3. TOML config file (`data_dir` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = load_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return PathBuf::from(data_dir);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_dir()
}

/// Database file path inside the resolved data directory
pub fn database_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("skillhub.db")
}

/// Get configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/skillhub/config.toml first, then /etc/skillhub/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("skillhub").join("config.toml"));
        let system_config = PathBuf::from("/etc/skillhub/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("skillhub").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default data directory path
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("skillhub"))
        .unwrap_or_else(|| PathBuf::from("./skillhub_data"))
}

/// Ensure the data directory exists, creating it if necessary
pub fn ensure_data_dir(data_dir: &std::path::Path) -> Result<()> {
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir)?;
        tracing::info!("Created data directory: {}", data_dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let dir = resolve_data_dir(Some("/tmp/skillhub-test"));
        assert_eq!(dir, PathBuf::from("/tmp/skillhub-test"));
    }

    #[test]
    fn database_path_is_under_data_dir() {
        let db = database_path(std::path::Path::new("/var/lib/skillhub"));
        assert_eq!(db, PathBuf::from("/var/lib/skillhub/skillhub.db"));
    }
}
