//! Routing module for Site-Freezer
//!
//! This module provides the read-only route table view, URL generation from
//! route names and parameters, and the intercepting generator that reports
//! every URL built while rendering back to the crawl.

mod generator;
mod pattern;
mod table;

use crate::config::ContextConfig;
use crate::{ConfigError, RouteResult};
use std::collections::BTreeMap;
use url::Url;

pub use generator::{discovery_channel, DiscoverySink, InterceptingUrlGenerator, UrlBuilder};
pub use pattern::RoutePattern;
pub use table::{Route, RouteTable};

/// Route parameters, ordered by name so equal sets compare and encode equally
pub type Params = BTreeMap<String, String>;

/// Read-only description of a named route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub name: String,
    pub parameter_names: Vec<String>,
}

/// Which shape of URL a caller asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlKind {
    /// Site-relative path such as `/users/42`
    #[default]
    Path,
    /// Full URL including scheme and host
    Absolute,
}

impl UrlKind {
    pub fn is_absolute(&self) -> bool {
        matches!(self, Self::Absolute)
    }
}

/// Turns a route name and parameters into a URL
pub trait UrlGenerator: Send + Sync {
    fn generate(&self, name: &str, params: &Params, kind: UrlKind) -> RouteResult<String>;
}

/// Scheme, host and mount point URLs are generated against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    scheme: String,
    host: String,
    base_path: String,
    origin: Url,
}

impl RequestContext {
    /// Builds a context, checking that scheme and host form a valid origin
    ///
    /// # Examples
    ///
    /// ```
    /// use site_freezer::routing::RequestContext;
    ///
    /// let ctx = RequestContext::new("https", "example.com", "/blog").unwrap();
    /// assert_eq!(ctx.base_path(), "/blog");
    /// ```
    pub fn new(scheme: &str, host: &str, base_path: &str) -> Result<Self, ConfigError> {
        let origin = Url::parse(&format!("{}://{}/", scheme, host))
            .map_err(|e| ConfigError::InvalidUrl(format!("{}://{}: {}", scheme, host, e)))?;

        if origin.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(format!(
                "{}://{} cannot be used as a base URL",
                scheme, host
            )));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            base_path: base_path.trim_end_matches('/').to_string(),
            origin,
        })
    }

    pub fn from_config(config: &ContextConfig) -> Result<Self, ConfigError> {
        Self::new(&config.scheme, &config.host, &config.base_path)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Mount point without trailing slash ("" when mounted at the root)
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `scheme://host/` with an empty path
    pub fn origin(&self) -> &Url {
        &self.origin
    }
}
