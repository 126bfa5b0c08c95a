//! Site-Freezer: turns a dynamically served application into static files
//!
//! The freezer enumerates an application's routes, requests every page
//! in-process, writes each response to disk under a path derived from its URL,
//! and keeps following local links (and URLs generated while rendering) until
//! nothing new is reachable.

pub mod app;
pub mod config;
pub mod crawler;
pub mod output;
pub mod routing;
pub mod state;
pub mod url;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Run-level error for a freeze
///
/// Only failures that make the whole output untrustworthy end up here.
/// Per-task problems are recorded in the report instead.
#[derive(Debug, Error)]
pub enum FreezeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot create output directory {}: {source}", path.display())]
    Destination {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Seed generator '{generator}' failed: {source}")]
    GeneratorFailure {
        generator: String,
        source: anyhow::Error,
    },

    #[error("Freeze cancelled")]
    Cancelled,

    #[error("Freeze timed out after {elapsed:?}")]
    TimedOut { elapsed: Duration },

    #[error("Invalid task state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Template error: {0}")]
    Template(String),
}

/// Errors raised while turning a route name and parameters into a URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Route not found: {name}")]
    RouteNotFound { name: String },

    #[error("Missing parameter '{parameter}' for route '{route}'")]
    MissingParameter { route: String, parameter: String },

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors persisting a single frozen page
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for freeze operations
pub type Result<T> = std::result::Result<T, FreezeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL generation
pub type RouteResult<T> = std::result::Result<T, RouteError>;

// Re-export commonly used types
pub use app::{Application, ConfiguredSite, Request, Response};
pub use config::AppConfig;
pub use crawler::{CancelHandle, Freezer, FreezerOptions, GenerationTask, SeedGenerator};
pub use output::{FreezeReport, FrozenRecord, OutputWriter};
pub use routing::{Params, RequestContext, RouteDescriptor, UrlBuilder, UrlGenerator, UrlKind};
pub use state::TaskState;
