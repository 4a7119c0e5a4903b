//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseMode;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:3000"

            [breaker]
            failure_threshold = 3
            success_threshold = 2
            open_duration_ms = 5000

            [[endpoints]]
            name = "group1_api1"
            path = "/group1/api1"
            url = "https://httpstat.us/500"

            [[endpoints]]
            name = "group2_api1"
            path = "/group2/api1"
            url = "https://jsonplaceholder.typicode.com/posts/1"
            response = "body"

            [endpoints.breaker]
            failure_threshold = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.breaker.open_duration_ms, 5000);
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[0].response, ResponseMode::Status);
        assert_eq!(config.endpoints[1].response, ResponseMode::Body);

        let override_cfg = config.breaker_for(&config.endpoints[1]);
        assert_eq!(override_cfg.failure_threshold, 5);
        assert_eq!(override_cfg.success_threshold, 2);
        assert_eq!(config.breaker_for(&config.endpoints[0]), config.breaker);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.breaker.failure_threshold, 3);
        assert_eq!(config.breaker.success_threshold, 2);
        assert_eq!(config.breaker.open_duration_ms, 10_000);
        assert!(config.endpoints.is_empty());
        assert!(config.admin.enabled);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[breaker]\nfailure_threshold = \"three\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_every_problem() {
        let err = parse_config(
            r#"
            [breaker]
            failure_threshold = 0
            success_threshold = 0
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_request_timeout_shorter_than_upstream_is_rejected() {
        let err = parse_config(
            r#"
            [timeouts]
            request_secs = 1
            upstream_secs = 5

            [breaker]
            failure_threshold = 2
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("request_secs (1) must be greater than upstream_secs (5)"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
