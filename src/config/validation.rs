use crate::config::types::{AppConfig, ContextConfig, FreezerConfig, RouteEntry, SeedEntry};
use crate::routing::RoutePattern;
use crate::url::is_external_link;
use crate::ConfigError;
use std::collections::HashSet;

/// Validates the entire configuration
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    validate_freezer_config(&config.freezer)?;
    validate_context_config(&config.context)?;
    validate_routes(&config.routes)?;
    validate_seeds(&config.seeds, &config.routes)?;
    Ok(())
}

/// Validates freezer configuration
fn validate_freezer_config(config: &FreezerConfig) -> Result<(), ConfigError> {
    if config.destination.trim().is_empty() {
        return Err(ConfigError::Validation(
            "destination cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout-secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the request context used for URL generation
fn validate_context_config(config: &ContextConfig) -> Result<(), ConfigError> {
    if config.scheme != "http" && config.scheme != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "scheme must be http or https, got '{}'",
            config.scheme
        )));
    }

    if config.host.is_empty() || config.host.contains('/') {
        return Err(ConfigError::InvalidUrl(format!(
            "invalid host '{}'",
            config.host
        )));
    }

    let base = &config.base_path;
    if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
        return Err(ConfigError::Validation(format!(
            "base-path must start with '/' and not end with '/', got '{}'",
            base
        )));
    }

    Ok(())
}

/// Validates route entries
fn validate_routes(routes: &[RouteEntry]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for route in routes {
        if route.name.is_empty() {
            return Err(ConfigError::Validation(
                "route name cannot be empty".to_string(),
            ));
        }

        if !names.insert(route.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate route name '{}'",
                route.name
            )));
        }

        RoutePattern::parse(&route.path).map_err(|e| ConfigError::Validation(e.to_string()))?;

        if !(100..=599).contains(&route.status) {
            return Err(ConfigError::Validation(format!(
                "route '{}' has invalid status {}",
                route.name, route.status
            )));
        }
    }

    Ok(())
}

/// Validates seed entries against the declared routes
fn validate_seeds(seeds: &[SeedEntry], routes: &[RouteEntry]) -> Result<(), ConfigError> {
    for seed in seeds {
        match (&seed.route, &seed.url) {
            (Some(route), None) => {
                if !routes.iter().any(|r| &r.name == route) {
                    return Err(ConfigError::Validation(format!(
                        "seed references unknown route '{}'",
                        route
                    )));
                }
            }
            (None, Some(url)) => {
                if !url.starts_with('/') || is_external_link(url) {
                    return Err(ConfigError::InvalidUrl(format!(
                        "seed url '{}' must be a local path starting with '/'",
                        url
                    )));
                }
                if !seed.params.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "seed url '{}' cannot carry params",
                        url
                    )));
                }
            }
            _ => {
                return Err(ConfigError::Validation(
                    "each seed needs exactly one of 'route' or 'url'".to_string(),
                ));
            }
        }
    }

    Ok(())
}
