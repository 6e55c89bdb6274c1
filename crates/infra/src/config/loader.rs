//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file if one is present
//! 2. Attempts to load from environment variables
//! 3. If `CARDISSUE_API_URL` is unset, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CARDISSUE_API_URL`: Backend base URL (required for env loading)
//! - `CARDISSUE_REQUEST_TIMEOUT`: Request timeout in seconds
//! - `CARDISSUE_REFRESH_TIMEOUT`: Token refresh timeout in seconds
//! - `CARDISSUE_USER_AGENT`: User agent sent with every request
//! - `CARDISSUE_TOKEN_FILE`: JSON file for persisted tokens
//! - `CARDISSUE_KEYCHAIN_SERVICE`: Keychain service name for persisted tokens
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./cardissue.json` or `./cardissue.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../cardissue.json` or `../cardissue.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use cardissue_domain::{ApiConfig, CardIssueError, ClientConfig, Result, StorageConfig};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the base URL
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `CardIssueError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - An environment value is malformed
pub fn load() -> Result<ClientConfig> {
    load_dotenv();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Like [`load`], but falls back to defaults when no source exists.
///
/// Malformed sources are still reported.
///
/// # Errors
/// Returns `CardIssueError::Config` if a present source is invalid.
pub fn load_or_default() -> Result<ClientConfig> {
    load_dotenv();

    if std::env::var_os("CARDISSUE_API_URL").is_some() {
        return load_from_env();
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration found, using defaults");
            Ok(ClientConfig::default())
        }
    }
}

/// Load a `.env` file from the working directory or its parents, if any.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Could not load .env file"),
    }
}

/// Load configuration from environment variables
///
/// `CARDISSUE_API_URL` must be present; every other variable falls back to
/// its default.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `CardIssueError::Config` if the base URL is missing or a
/// timeout has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let defaults = ApiConfig::default();

    let base_url = env_var("CARDISSUE_API_URL")?;
    let request_timeout_secs = env_secs("CARDISSUE_REQUEST_TIMEOUT")?
        .unwrap_or(defaults.request_timeout_secs);
    let refresh_timeout_secs = env_secs("CARDISSUE_REFRESH_TIMEOUT")?
        .unwrap_or(defaults.refresh_timeout_secs);
    let user_agent = std::env::var("CARDISSUE_USER_AGENT").ok();

    let token_file = std::env::var_os("CARDISSUE_TOKEN_FILE").map(PathBuf::from);
    let keychain_service = std::env::var("CARDISSUE_KEYCHAIN_SERVICE").ok();

    Ok(ClientConfig {
        api: ApiConfig { base_url, request_timeout_secs, refresh_timeout_secs, user_agent },
        storage: StorageConfig { token_file, keychain_service },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `CardIssueError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CardIssueError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CardIssueError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CardIssueError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CardIssueError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CardIssueError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CardIssueError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
#[must_use]
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
        candidates.extend([cwd.join("../cardissue.json"), cwd.join("../cardissue.toml")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("cardissue.json"),
        dir.join("cardissue.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `CardIssueError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CardIssueError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional whole number of seconds
fn env_secs(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| CardIssueError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}
