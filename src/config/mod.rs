pub mod init;
mod schema;
mod validation;

pub use schema::Config;
pub use validation::{config_warnings, validate_config};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    BuiltIn,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Get the config directory path (~/.config/move-quote/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("move-quote"))
}

/// Get the default rate file path (~/.config/move-quote/rates.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("rates.yaml"))
}

/// Load the rate file.
///
/// # Arguments
///
/// * `path` - Optional explicit path. If None, uses the default path and
///   falls back to the built-in tables when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit path does not exist
/// - The file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<LoadedConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        None => {
            let default_path = get_config_path()?;
            if !default_path.exists() {
                return Ok(LoadedConfig {
                    config: Config::default(),
                    source: ConfigSource::BuiltIn,
                });
            }
            default_path
        }
    };

    let config = read_config(&config_path)?;
    Ok(LoadedConfig {
        config,
        source: ConfigSource::File(config_path),
    })
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))
}

/// Parse rate file contents.
pub fn parse_config(yaml: &str) -> Result<Config> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_saphyr::from_str(yaml)?;
    Ok(config)
}

/// Emit non-fatal configuration warnings through the stderr buffer.
/// Returns how many were emitted.
pub fn report_warnings(config: &Config) -> usize {
    let warnings = config_warnings(config);
    for warning in &warnings {
        crate::buffered_eprintln!("Config warning: {}", warning);
    }
    warnings.len()
}
