//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! Only bootstrap concerns live here (storage location, listen address,
//! log level). Nothing can change while the service runs.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable holding the storage connection string
pub const ENV_DATABASE_URL: &str = "MSFORM_DATABASE_URL";
/// Environment variable holding the listen port
pub const ENV_PORT: &str = "MSFORM_PORT";
/// Generic port variable honoured when `MSFORM_PORT` is unset
pub const ENV_PORT_FALLBACK: &str = "PORT";

/// Bootstrap configuration loaded from TOML file
///
/// Every key is optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// sqlx connection string, e.g. `sqlite:///var/lib/msform/msform.db`
    #[serde(default)]
    pub database_url: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Interface to bind (default `0.0.0.0`)
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_url: String,
    pub port: u16,
    pub bind_address: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join("msform"))
            .unwrap_or_else(|| PathBuf::from("./msform_data"));

        Self {
            database_url: format!("sqlite://{}", data_dir.join("msform.db").display()),
            port: 5000,
            bind_address: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub config_file: Option<PathBuf>,
}

/// Fully resolved bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub database_url: String,
    pub port: u16,
    pub bind_address: String,
    pub log_level: String,
}

impl BootstrapConfig {
    /// Resolve configuration from all sources
    ///
    /// A missing TOML file is not an error (warning + defaults).
    /// A TOML file that exists but does not parse is.
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let config_path = cli.config_file.clone().or_else(default_config_path);
        let toml = match config_path {
            Some(path) => load_toml_config(&path)?.unwrap_or_default(),
            None => TomlConfig::default(),
        };

        Self::merge(cli, &toml, CompiledDefaults::for_current_platform())
    }

    /// Merge already-loaded sources (environment is read here)
    pub fn merge(cli: &CliOverrides, toml: &TomlConfig, defaults: CompiledDefaults) -> Result<Self> {
        let database_url = cli
            .database_url
            .clone()
            .or_else(|| non_empty_env(ENV_DATABASE_URL))
            .or_else(|| toml.database_url.clone())
            .unwrap_or(defaults.database_url);

        let port = match cli.port {
            Some(port) => port,
            None => match env_port()? {
                Some(port) => port,
                None => toml.port.unwrap_or(defaults.port),
            },
        };

        Ok(Self {
            database_url,
            port,
            bind_address: toml.bind_address.clone().unwrap_or(defaults.bind_address),
            log_level: toml.logging.level.clone().unwrap_or(defaults.log_level),
        })
    }

    /// `host:port` string for the listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Platform config file location (`<config_dir>/msform/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("msform").join("config.toml"))
}

/// Load a TOML config file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    Ok(Some(config))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_port() -> Result<Option<u16>> {
    let raw = match non_empty_env(ENV_PORT).or_else(|| non_empty_env(ENV_PORT_FALLBACK)) {
        Some(raw) => raw,
        None => return Ok(None),
    };

    raw.trim()
        .parse::<u16>()
        .map(Some)
        .map_err(|_| Error::Config(format!("Invalid port in environment: {}", raw)))
}
