//! Configuration validation.
//!
//! Serde handles syntax; this module checks values the relay cannot run
//! with. Validation is a pure function returning every problem found, not
//! just the first.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::http::server::HEALTH_ROUTE;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("catalog.upstream_base `{0}` is not an absolute http(s) URL")]
    UpstreamBase(String),

    #[error("{field} `{value}` must start with `/`, not be the root, and hold no `{{`, `}}` or `*`")]
    RoutePath { field: &'static str, value: String },

    #[error("{field} `{value}` collides with another route")]
    RouteConflict { field: &'static str, value: String },

    #[error("image.allowed_hosts must list at least one host")]
    EmptyAllowList,

    #[error("image.allowed_hosts entry `{0}` must be a plain hostname")]
    AllowListPattern(String),

    #[error("{field} is not a valid header value")]
    HeaderValue { field: &'static str },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match Url::parse(&config.catalog.upstream_base) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
        _ => errors.push(ValidationError::UpstreamBase(config.catalog.upstream_base.clone())),
    }

    check_route(&mut errors, "catalog.mount", &config.catalog.mount);
    check_route(&mut errors, "image.route", &config.image.route);

    let mount = config.catalog.mount.as_str();
    let image = config.image.route.as_str();
    if mount == HEALTH_ROUTE {
        errors.push(ValidationError::RouteConflict {
            field: "catalog.mount",
            value: mount.to_string(),
        });
    }
    if image == HEALTH_ROUTE || image == mount || image == format!("{mount}/") {
        errors.push(ValidationError::RouteConflict {
            field: "image.route",
            value: image.to_string(),
        });
    }

    if config.image.allowed_hosts.is_empty() {
        errors.push(ValidationError::EmptyAllowList);
    }
    for host in &config.image.allowed_hosts {
        let plain = !host.is_empty()
            && !host.starts_with('.')
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !plain {
            errors.push(ValidationError::AllowListPattern(host.clone()));
        }
    }

    let headers: [(&'static str, &str); 9] = [
        ("catalog.user_agent", &config.catalog.user_agent),
        ("image.referer", &config.image.referer),
        ("image.accept", &config.image.accept),
        ("image.user_agent", &config.image.user_agent),
        ("image.default_content_type", &config.image.default_content_type),
        ("image.cache_control", &config.image.cache_control),
        ("cors.allow_origin", &config.cors.allow_origin),
        ("cors.allow_methods", &config.cors.allow_methods),
        ("cors.allow_headers", &config.cors.allow_headers),
    ];
    for (field, value) in headers {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::HeaderValue { field });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.client.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("client.connect_secs"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_route(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let reserved = value.contains(['{', '}', '*']);
    if !value.starts_with('/') || value == "/" || value.ends_with('/') || reserved {
        errors.push(ValidationError::RoutePath {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&RelayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.catalog.upstream_base = "ftp://api.mangadex.org".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroTimeout("timeouts.request_secs")));
    }

    #[test]
    fn test_rejects_wildcard_hosts() {
        let mut config = RelayConfig::default();
        config.image.allowed_hosts = vec!["*.mangadex.org".into(), ".mangadex.org".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::AllowListPattern("*.mangadex.org".into()),
                ValidationError::AllowListPattern(".mangadex.org".into()),
            ]
        );
    }

    #[test]
    fn test_rejects_root_mount() {
        let mut config = RelayConfig::default();
        config.catalog.mount = "/".into();
        config.image.route = "api/image-proxy".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_rejects_colliding_image_route() {
        for route in ["/healthz", "/api/mangadex"] {
            let mut config = RelayConfig::default();
            config.image.route = route.into();
            assert_eq!(
                validate_config(&config),
                Err(vec![ValidationError::RouteConflict {
                    field: "image.route",
                    value: route.into(),
                }]),
                "{route}"
            );
        }
    }

    #[test]
    fn test_rejects_mount_on_health_route() {
        let mut config = RelayConfig::default();
        config.catalog.mount = "/healthz".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::RouteConflict {
                field: "catalog.mount",
                value: "/healthz".into(),
            }])
        );
    }

    #[test]
    fn test_rejects_route_pattern_syntax() {
        let mut config = RelayConfig::default();
        config.catalog.mount = "/api/{source}".into();
        config.image.route = "/images/*".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::RoutePath { .. })));
    }

    #[test]
    fn test_empty_allow_list() {
        let mut config = RelayConfig::default();
        config.image.allowed_hosts.clear();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::EmptyAllowList])
        );
    }
}
