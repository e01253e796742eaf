use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `session.cookie-session`
pub const COOKIE_SESSION_ENV: &str = "ESAJ_COOKIE_SESSION";

/// Environment variable overriding `session.cookie-pdf-session`
pub const COOKIE_PDF_SESSION_ENV: &str = "ESAJ_COOKIE_PDF_SESSION";

/// Loads and parses a configuration file from the given path
///
/// Cookies found in the environment replace the ones in the file, so
/// secrets can stay out of it.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use esaj_crawler::config::load_config;
///
/// let config = load_config(Path::new("esaj.toml")).unwrap();
/// println!("Deadline: {}s", config.crawler.deadline_secs);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Replaces the session cookies with non-empty values from `lookup`
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(cookie) = non_empty(COOKIE_SESSION_ENV) {
        tracing::debug!("Search cookie taken from {}", COOKIE_SESSION_ENV);
        config.session.cookie_session = cookie;
    }
    if let Some(cookie) = non_empty(COOKIE_PDF_SESSION_ENV) {
        tracing::debug!("Download cookie taken from {}", COOKIE_PDF_SESSION_ENV);
        config.session.cookie_pdf_session = cookie;
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be matched to the configuration they used.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
