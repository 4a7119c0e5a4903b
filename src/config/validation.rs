//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds > 0, cooldown > 0, timeouts > 0)
//! - Upstream timeout must fire before the inbound request timeout
//! - Check endpoint names and paths are unique and routable
//! - Check upstream URLs are absolute http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{BreakerConfig, GatewayConfig, TimeoutConfig};

/// Paths reserved for gateway-owned routes.
pub const RESERVED_PREFIX: &str = "/admin";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{scope}: {field} must be greater than zero")]
    ZeroValue { scope: String, field: &'static str },

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("timeouts: request_secs ({request_secs}) must be greater than upstream_secs ({upstream_secs})")]
    RequestTimeoutTooShort { request_secs: u64, upstream_secs: u64 },

    #[error("endpoint name must not be empty")]
    EmptyName,

    #[error("duplicate endpoint name '{0}'")]
    DuplicateName(String),

    #[error("endpoint '{name}': path '{path}' must start with '/'")]
    InvalidPath { name: String, path: String },

    #[error("endpoint '{name}': path '{path}' is reserved")]
    ReservedPath { name: String, path: String },

    #[error("duplicate endpoint path '{0}'")]
    DuplicatePath(String),

    #[error("endpoint '{name}': invalid upstream url '{url}': {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    check_timeouts(&config.timeouts, &mut errors);
    check_breaker("breaker", &config.breaker, &mut errors);

    let mut names = HashSet::new();
    let mut paths = HashSet::new();
    for endpoint in &config.endpoints {
        if endpoint.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName);
        } else if !names.insert(endpoint.name.as_str()) {
            errors.push(ValidationError::DuplicateName(endpoint.name.clone()));
        }

        if !endpoint.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                name: endpoint.name.clone(),
                path: endpoint.path.clone(),
            });
        } else if is_reserved(&endpoint.path) {
            errors.push(ValidationError::ReservedPath {
                name: endpoint.name.clone(),
                path: endpoint.path.clone(),
            });
        } else if !paths.insert(endpoint.path.as_str()) {
            errors.push(ValidationError::DuplicatePath(endpoint.path.clone()));
        }

        match Url::parse(&endpoint.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidUrl {
                name: endpoint.name.clone(),
                url: endpoint.url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidUrl {
                name: endpoint.name.clone(),
                url: endpoint.url.clone(),
                reason: e.to_string(),
            }),
        }

        if let Some(breaker) = &endpoint.breaker {
            check_breaker(&format!("endpoint '{}' breaker", endpoint.name), breaker, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_reserved(path: &str) -> bool {
    path == RESERVED_PREFIX || path.starts_with(&format!("{}/", RESERVED_PREFIX))
}

/// A hung upstream call must end as a counted failure, not be cancelled by
/// the inbound request timeout.
fn check_timeouts(timeouts: &TimeoutConfig, errors: &mut Vec<ValidationError>) {
    let fields = [
        ("request_secs", timeouts.request_secs),
        ("upstream_secs", timeouts.upstream_secs),
    ];
    for (field, value) in fields {
        if value == 0 {
            errors.push(ValidationError::ZeroValue {
                scope: "timeouts".to_string(),
                field,
            });
        }
    }

    if timeouts.request_secs <= timeouts.upstream_secs {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs: timeouts.request_secs,
            upstream_secs: timeouts.upstream_secs,
        });
    }
}

fn check_breaker(scope: &str, breaker: &BreakerConfig, errors: &mut Vec<ValidationError>) {
    let fields = [
        ("failure_threshold", breaker.failure_threshold as u64),
        ("success_threshold", breaker.success_threshold as u64),
        ("open_duration_ms", breaker.open_duration_ms),
    ];
    for (field, value) in fields {
        if value == 0 {
            errors.push(ValidationError::ZeroValue {
                scope: scope.to_string(),
                field,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EndpointConfig, ResponseMode};

    fn endpoint(name: &str, path: &str, url: &str) -> EndpointConfig {
        EndpointConfig {
            name: name.into(),
            path: path.into(),
            url: url.into(),
            response: ResponseMode::Status,
            breaker: None,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_valid_endpoints() {
        let mut config = GatewayConfig::default();
        config.endpoints.push(endpoint("a", "/group1/api1", "https://httpstat.us/500"));
        config.endpoints.push(endpoint("b", "/group1/api2", "http://127.0.0.1:8080/x"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.endpoints.push(endpoint("a", "/x", "https://example.com"));
        config.endpoints.push(endpoint("a", "/x", "ftp://example.com"));
        config.endpoints.push(endpoint("", "no-slash", "::nope"));
        config.endpoints.push(endpoint("admin", "/admin/breakers", "http://example.com"));
        let mut bad = endpoint("c", "/c", "http://example.com");
        bad.breaker = Some(BreakerConfig {
            open_duration_ms: 0,
            ..Default::default()
        });
        config.endpoints.push(bad);

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::DuplicateName("a".into())));
        assert!(errors.contains(&ValidationError::DuplicatePath("/x".into())));
        assert!(errors.contains(&ValidationError::EmptyName));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidPath { path, .. } if path == "no-slash")));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ReservedPath { .. })));
        assert!(errors.contains(&ValidationError::ZeroValue {
            scope: "endpoint 'c' breaker".into(),
            field: "open_duration_ms",
        }));
        let url_errors = errors
            .iter()
            .filter(|e| matches!(e, ValidationError::InvalidUrl { .. }))
            .count();
        assert_eq!(url_errors, 2);
    }

    #[test]
    fn test_request_timeout_must_exceed_upstream_timeout() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 1;
        config.timeouts.upstream_secs = 5;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::RequestTimeoutTooShort {
                request_secs: 1,
                upstream_secs: 5,
            }]
        );

        config.timeouts.request_secs = 5;
        assert!(validate_config(&config).is_err());

        config.timeouts.request_secs = 6;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        let mut config = GatewayConfig::default();
        config.timeouts.upstream_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ZeroValue {
                scope: "timeouts".into(),
                field: "upstream_secs",
            }]
        );

        config.timeouts.request_secs = 0;
        config.timeouts.upstream_secs = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroValue {
            scope: "timeouts".into(),
            field: "request_secs",
        }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::RequestTimeoutTooShort { .. })));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidMetricsAddress("nowhere".into())]);

        config.observability.metrics_address = "127.0.0.1:9090".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_admin_lookalike_path_is_allowed() {
        let mut config = GatewayConfig::default();
        config.endpoints.push(endpoint("a", "/administrators", "http://example.com"));
        assert!(validate_config(&config).is_ok());
    }
}
