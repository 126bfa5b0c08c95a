//! Host application seam
//!
//! The freezer never opens a socket. It talks to the application through the
//! `Application` trait: enumerate routes, build URLs, and answer a request
//! in-process. `ConfiguredSite` is the implementation backed by a frozen app
//! config file.

mod site;
mod template;

use crate::routing::{RouteDescriptor, UrlGenerator};
use async_trait::async_trait;
use std::sync::Arc;

pub use site::ConfiguredSite;
pub use template::{Templates, UrlFor};

/// An application the freezer can crawl in-process
#[async_trait]
pub trait Application: Send + Sync {
    /// Lists the application's named routes
    fn routes(&self) -> Vec<RouteDescriptor>;

    /// The application's own URL generator
    fn url_generator(&self) -> Arc<dyn UrlGenerator>;

    /// Answers a request without real network transport
    ///
    /// `urls` is the generator rendering must use for links. The freezer
    /// passes an intercepting generator here when auto-discovery is enabled,
    /// so implementations must not reach for their own generator while
    /// rendering.
    async fn respond(&self, request: Request, urls: Arc<dyn UrlGenerator>) -> Response;
}

/// A synthetic request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub uri: String,
}

impl Request {
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            uri: uri.into(),
        }
    }
}

/// A response produced in-process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: None,
        }
    }

    /// A 200 response with an HTML content type
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200, body).with_content_type("text/html; charset=utf-8")
    }

    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body may contain anchors worth following
    ///
    /// A response without a content type is treated as HTML.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(content_type) => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.contains("html")
            }
            None => true,
        }
    }
}
