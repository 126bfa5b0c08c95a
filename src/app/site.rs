use crate::app::{Application, Request, Response, Templates};
use crate::config::AppConfig;
use crate::routing::{
    Params, RequestContext, Route, RouteDescriptor, RouteTable, UrlBuilder, UrlGenerator,
};
use crate::ConfigError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Status and content type answered by a route
#[derive(Debug, Clone)]
struct PageMeta {
    status: u16,
    content_type: String,
}

/// An application declared entirely in the frozen app config
///
/// Each `[[route]]` entry becomes a named route whose body is a template.
/// Requests are answered in-process by matching the path against the route
/// table and rendering the route's template with the captured parameters.
#[derive(Debug, Clone)]
pub struct ConfiguredSite {
    routes: Arc<RouteTable>,
    pages: HashMap<String, PageMeta>,
    templates: Templates,
    urls: Arc<UrlBuilder>,
}

impl ConfiguredSite {
    /// Builds the site from a validated config
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let mut routes = Vec::with_capacity(config.routes.len());
        let mut pages = HashMap::with_capacity(config.routes.len());

        for entry in &config.routes {
            let route = Route::new(entry.name.clone(), &entry.path)
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
            routes.push(route);
            pages.insert(
                entry.name.clone(),
                PageMeta {
                    status: entry.status,
                    content_type: entry.content_type.clone(),
                },
            );
        }

        let templates = Templates::new(
            config
                .routes
                .iter()
                .map(|entry| (entry.name.clone(), entry.body.clone())),
        )?;

        let routes = Arc::new(RouteTable::new(routes));
        let context = RequestContext::from_config(&config.context)?;
        let urls = Arc::new(UrlBuilder::new(Arc::clone(&routes), context));

        Ok(Self {
            routes,
            pages,
            templates,
            urls,
        })
    }

    pub fn route_table(&self) -> &RouteTable {
        &self.routes
    }

    pub fn context(&self) -> &RequestContext {
        self.urls.context()
    }

    /// Strips the mount point from a request path
    ///
    /// Returns None for paths outside the mount point.
    fn local_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        let base = self.context().base_path();
        if base.is_empty() {
            return Some(path);
        }

        match path.strip_prefix(base) {
            Some("") => Some("/"),
            Some(rest) if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }
}

#[async_trait]
impl Application for ConfiguredSite {
    fn routes(&self) -> Vec<RouteDescriptor> {
        self.routes.descriptors()
    }

    fn url_generator(&self) -> Arc<dyn UrlGenerator> {
        self.urls.clone()
    }

    async fn respond(&self, request: Request, urls: Arc<dyn UrlGenerator>) -> Response {
        if request.method != "GET" && request.method != "HEAD" {
            return Response::new(405, "Method Not Allowed");
        }

        let origin = self.context().origin();
        let target = match origin.join(&request.uri) {
            Ok(target) if target.origin() == origin.origin() => target,
            _ => {
                debug!("Request outside the site: {}", request.uri);
                return Response::not_found();
            }
        };

        let Some(path) = self.local_path(target.path()) else {
            return Response::not_found();
        };
        let Some((route, captured)) = self.routes.match_path(path) else {
            debug!("No route matches {}", path);
            return Response::not_found();
        };
        let Some(page) = self.pages.get(&route.name) else {
            return Response::not_found();
        };

        // Query values are visible to templates; captured path values win
        let mut vars: Params = target
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        vars.extend(captured);

        match self
            .templates
            .render(&route.name, &vars, target.path(), urls)
        {
            Ok(body) => {
                let body = if request.method == "HEAD" {
                    String::new()
                } else {
                    body
                };
                Response::new(page.status, body).with_content_type(page.content_type.clone())
            }
            Err(e) => {
                warn!("Rendering route '{}' failed: {}", route.name, e);
                Response::new(500, "Internal Server Error")
            }
        }
    }
}
