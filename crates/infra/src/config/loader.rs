//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `SALONBOOK_DB_PATH` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. A `SALONBOOK_TERMINAL_API_TOKEN` in the environment always wins, so the
//!    processor token never has to live in a config file
//!
//! ## Environment Variables
//! - `SALONBOOK_DB_PATH`: Database file path (required; empty = in-memory)
//! - `SALONBOOK_DB_POOL_SIZE`: Connection pool size
//! - `SALONBOOK_FIXTURES`: Seed file for the in-memory stores
//! - `SALONBOOK_BIND_ADDRESS`: HTTP listener address
//! - `SALONBOOK_TIMEZONE`: IANA name of the business timezone
//! - `SALONBOOK_BOOKING_WINDOW_DAYS`: Calendar look-ahead in days
//! - `SALONBOOK_TERMINAL_API_URL`: Payment processor base URL
//! - `SALONBOOK_TERMINAL_API_TOKEN`: Payment processor API token
//! - `SALONBOOK_TERMINAL_DEVICES`: `location=device` pairs, comma separated
//! - `SALONBOOK_LOG_LEVEL`: Default log level
//! - `SALONBOOK_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./salonbook.json` or `./salonbook.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use salonbook_domain::{Config, Result, SalonError};
use serde::de::DeserializeOwned;

const API_TOKEN_VAR: &str = "SALONBOOK_TERMINAL_API_TOKEN";

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `SalonError::Config` if configuration cannot be loaded from either
/// source or the file format is invalid.
pub fn load() -> Result<Config> {
    let mut config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    if let Ok(token) = std::env::var(API_TOKEN_VAR) {
        config.terminal.api_token = Some(token);
    }
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only `SALONBOOK_DB_PATH` is required; everything else keeps its default
/// when unset.
///
/// # Errors
/// Returns `SalonError::Config` if the required variable is missing or a
/// value cannot be parsed.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.database.path = env_var("SALONBOOK_DB_PATH")?;

    if let Some(pool_size) = env_parsed::<u32>("SALONBOOK_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }
    config.database.fixtures = std::env::var("SALONBOOK_FIXTURES").ok();
    if let Ok(bind_address) = std::env::var("SALONBOOK_BIND_ADDRESS") {
        config.server.bind_address = bind_address;
    }
    if let Ok(timezone) = std::env::var("SALONBOOK_TIMEZONE") {
        config.business.timezone = timezone;
    }
    if let Some(window_days) = env_parsed::<u32>("SALONBOOK_BOOKING_WINDOW_DAYS")? {
        config.booking.window_days = window_days;
    }
    if let Ok(api_base_url) = std::env::var("SALONBOOK_TERMINAL_API_URL") {
        config.terminal.api_base_url = api_base_url;
    }
    config.terminal.api_token = std::env::var(API_TOKEN_VAR).ok();
    if let Ok(devices) = std::env::var("SALONBOOK_TERMINAL_DEVICES") {
        config.terminal.devices = parse_devices(&devices)?;
    }
    if let Ok(level) = std::env::var("SALONBOOK_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("SALONBOOK_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SalonError::Config` if the file is missing, unreadable, or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SalonError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SalonError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SalonError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    parse_document(contents, path)
}

/// Deserialize a JSON or TOML document, format chosen by extension.
pub(crate) fn parse_document<T: DeserializeOwned>(contents: &str, path: &Path) -> Result<T> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SalonError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SalonError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SalonError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| {
            [
                root.join("config.json"),
                root.join("config.toml"),
                root.join("salonbook.json"),
                root.join("salonbook.toml"),
                root.join("../config.json"),
                root.join("../config.toml"),
                root.join("../../config.json"),
                root.join("../../config.toml"),
            ]
        })
        .find(|path| path.exists())
}

/// Parse `1=DEV-A,2=DEV-B` into the location → device map.
fn parse_devices(raw: &str) -> Result<HashMap<String, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (location, device) = pair.split_once('=').ok_or_else(|| {
                SalonError::Config(format!("Invalid terminal device mapping: '{pair}'"))
            })?;
            let location = location.trim();
            location.parse::<i64>().map_err(|e| {
                SalonError::Config(format!("Invalid location id '{location}': {e}"))
            })?;
            Ok((location.to_string(), device.trim().to_string()))
        })
        .collect()
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| SalonError::Config(format!("Missing required environment variable: {key}")))
}

fn env_parsed<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SalonError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
