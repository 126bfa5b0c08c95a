//! Configuration module for Site-Freezer
//!
//! A frozen app config is a TOML file that configures the freezer and declares
//! the application that is served in-process: its routes, their bodies and the
//! extra seed tasks that parameterized routes need.
//!
//! # Example
//!
//! ```no_run
//! use site_freezer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("frozen_app.toml")).unwrap();
//! println!("Freezing into: {}", config.freezer.destination);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AppConfig, ContextConfig, FreezerConfig, RouteEntry, SeedEntry, DEFAULT_CONFIG_FILE,
    DEFAULT_DESTINATION,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
