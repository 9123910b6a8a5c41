use super::types::{Config, ConfigError};

/// Validate a loaded configuration, failing fast on values the runtime
/// would otherwise trip over mid-run.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.orchestrator.concurrency_limit < 1 {
        return Err(ConfigError::Invalid(
            "orchestrator.concurrency_limit must be at least 1".to_string(),
        ));
    }

    if config.orchestrator.stop_request_timeout_ms == 0 {
        return Err(ConfigError::Invalid(
            "orchestrator.stop_request_timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.fetcher.ytdlp_path.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "fetcher.ytdlp_path must not be empty".to_string(),
        ));
    }

    if config.downloads.dest_dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(
            "downloads.dest_dir must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = load_config_from_str("[orchestrator]\nconcurrency_limit = 0").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("concurrency_limit"));
    }

    #[test]
    fn test_empty_ytdlp_path_rejected() {
        let config = load_config_from_str("[fetcher]\nytdlp_path = \" \"").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("ytdlp_path"));
    }

    #[test]
    fn test_zero_stop_timeout_rejected() {
        let config =
            load_config_from_str("[orchestrator]\nstop_request_timeout_ms = 0").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_dest_dir_rejected() {
        let config = load_config_from_str("[downloads]\ndest_dir = \"\"").unwrap();
        assert!(validate_config(&config).is_err());
    }
}
