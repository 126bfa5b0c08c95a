use serde::Deserialize;
use std::collections::BTreeMap;

/// Config file looked up when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "frozen_app.toml";

/// Output directory used when neither the config nor the CLI sets one
pub const DEFAULT_DESTINATION: &str = "build";

/// Main configuration structure for Site-Freezer
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub freezer: FreezerConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteEntry>,
    #[serde(default, rename = "seed")]
    pub seeds: Vec<SeedEntry>,
}

/// Freezer behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FreezerConfig {
    /// Directory the static files are written to
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Whether URLs generated while rendering are queued for freezing
    #[serde(rename = "intercept-url-generation", default = "default_true")]
    pub intercept_url_generation: bool,

    /// Optional upper bound on the duration of a whole run (seconds)
    #[serde(rename = "timeout-secs", default)]
    pub timeout_secs: Option<u64>,
}

impl Default for FreezerConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            intercept_url_generation: true,
            timeout_secs: None,
        }
    }
}

/// Request context used when generating URLs
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default = "default_host")]
    pub host: String,

    /// Path prefix the application is mounted under (e.g. "/blog")
    #[serde(rename = "base-path", default)]
    pub base_path: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            base_path: String::new(),
        }
    }
}

/// A named route of the configured application
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    /// Route name used by `url_for` and seed entries
    pub name: String,

    /// Path pattern, e.g. "/users/{id}"
    pub path: String,

    /// Template rendered as the response body
    #[serde(default)]
    pub body: String,

    /// HTTP status answered for this route
    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(rename = "content-type", default = "default_content_type")]
    pub content_type: String,
}

/// An explicit seed task: either a route with parameters or a raw URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedEntry {
    #[serde(default)]
    pub route: Option<String>,

    #[serde(default)]
    pub params: BTreeMap<String, String>,

    #[serde(default)]
    pub url: Option<String>,
}

fn default_destination() -> String {
    DEFAULT_DESTINATION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_status() -> u16 {
    200
}

fn default_content_type() -> String {
    "text/html; charset=utf-8".to_string()
}
