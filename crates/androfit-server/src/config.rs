//! Worker configuration loading from file and environment variables.
//!
//! Host, port, logging, and session tuning come from an optional TOML
//! file with `ANDROFIT_*` environment overrides. Provider credentials are
//! never read from the file; they come from the environment only and are
//! validated before anything connects anywhere.

use androfit_types::SessionOptions;
use androfit_voice::{LiveKitConfig, OpenAiConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level worker configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Network settings for the health/dispatch listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-session capability parameters.
    #[serde(default)]
    pub session: SessionOptions,
}

/// Network configuration for the HTTP listener.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "androfit_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// One or more required environment variables are unset or empty.
    #[error("missing required environment variables: {0}")]
    MissingEnv(String),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Returns the configuration together with whether a file was actually
/// read, so the caller can report a missing file once logging is up.
///
/// Environment variable overrides:
/// - `ANDROFIT_HOST` overrides `server.host`
/// - `PORT` (provided by the hosting platform) overrides `server.port`
/// - `ANDROFIT_PORT` overrides both of the above
/// - `ANDROFIT_LOG_LEVEL` overrides `logging.level`
/// - `ANDROFIT_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<(Config, bool), ConfigError> {
    let (mut config, file_found) = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => (toml::from_str(&contents)?, true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Config::default(), false),
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => (Config::default(), false),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("ANDROFIT_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(port) = std::env::var("ANDROFIT_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(level) = std::env::var("ANDROFIT_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("ANDROFIT_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok((config, file_found))
}

/// Provider credentials assembled from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub openai: OpenAiConfig,
    pub livekit: LiveKitConfig,
}

/// Environment variables that must be set before the worker can start.
const REQUIRED_ENV: [&str; 4] = [
    "OPENAI_API_KEY",
    "LIVEKIT_URL",
    "LIVEKIT_API_KEY",
    "LIVEKIT_API_SECRET",
];

/// Reads provider credentials from the environment.
///
/// All missing variables are reported together so a misconfigured
/// deployment can be fixed in one pass. `OPENAI_BASE_URL` is an optional
/// endpoint override.
pub fn load_credentials() -> Result<Credentials, ConfigError> {
    let missing: Vec<&str> = REQUIRED_ENV
        .iter()
        .copied()
        .filter(|name| {
            std::env::var(name)
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        })
        .collect();

    if !missing.is_empty() {
        return Err(ConfigError::MissingEnv(missing.join(", ")));
    }

    let mut openai = OpenAiConfig::new(std::env::var("OPENAI_API_KEY").unwrap_or_default());
    if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
        if !base_url.trim().is_empty() {
            openai = openai.with_base_url(base_url);
        }
    }

    let livekit = LiveKitConfig::new(
        std::env::var("LIVEKIT_URL").unwrap_or_default(),
        std::env::var("LIVEKIT_API_KEY").unwrap_or_default(),
        std::env::var("LIVEKIT_API_SECRET").unwrap_or_default(),
    );

    Ok(Credentials { openai, livekit })
}
