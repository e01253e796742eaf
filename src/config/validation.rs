use crate::config::types::{Config, CrawlerConfig, OutputConfig, PortalConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Session cookies are not checked here: commands that need them report a
/// missing cookie when they reach the step that sends it.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_portal_config(&config.portal)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates portal configuration
fn validate_portal_config(config: &PortalConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use HTTP(S)",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.allowed_statuses.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-statuses must list at least one status".to_string(),
        ));
    }

    if let Some(blank) = config
        .allowed_statuses
        .iter()
        .position(|s| s.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "allowed-statuses entry {} is blank",
            blank
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.documents_dir.is_empty() {
        return Err(ConfigError::Validation(
            "documents-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.portal.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.portal.base_url = "ftp://esaj.tjsp.jus.br".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_plain_http_base_url_is_accepted() {
        let mut config = Config::default();
        config.portal.base_url = "http://127.0.0.1:8080".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeouts() {
        let mut config = Config::default();
        config.portal.timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.portal.connect_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_user_agent() {
        let mut config = Config::default();
        config.portal.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_allowed_statuses() {
        let mut config = Config::default();
        config.crawler.allowed_statuses.clear();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.crawler.allowed_statuses = vec!["Decisão".to_string(), " ".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_deadline_is_allowed() {
        let mut config = Config::default();
        config.crawler.deadline_secs = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_output_paths() {
        let mut config = Config::default();
        config.output.database_path.clear();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.output.documents_dir.clear();
        assert!(validate(&config).is_err());
    }
}
