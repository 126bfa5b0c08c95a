//! URL generation
//!
//! `UrlBuilder` is the plain generator backed by a route table. The
//! `InterceptingUrlGenerator` decorates any generator and reports each
//! site-relative URL it hands out to the crawl through a `DiscoverySink`.

use crate::crawler::GenerationTask;
use crate::routing::{Params, RequestContext, RouteTable, UrlGenerator, UrlKind};
use crate::{RouteError, RouteResult};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Generates URLs from a route table and request context
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    routes: Arc<RouteTable>,
    context: RequestContext,
}

impl UrlBuilder {
    pub fn new(routes: Arc<RouteTable>, context: RequestContext) -> Self {
        Self { routes, context }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl UrlGenerator for UrlBuilder {
    /// Expands the named route
    ///
    /// Path parameters are percent-encoded, the base path is prefixed and any
    /// parameter the pattern does not declare is appended as a query string
    /// (sorted by name).
    fn generate(&self, name: &str, params: &Params, kind: UrlKind) -> RouteResult<String> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| RouteError::RouteNotFound {
                name: name.to_string(),
            })?;

        let segments = route.pattern.expand(name, params)?;
        let declared = route.pattern.parameter_names();
        let base: Vec<&str> = self
            .context
            .base_path()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let mut url = self.context.origin().clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| RouteError::InvalidPattern {
                    pattern: route.pattern.as_str().to_string(),
                    reason: "origin cannot carry a path".to_string(),
                })?;
            path.clear();
            path.extend(base.iter().copied());
            path.extend(segments.iter().copied());

            if (!base.is_empty() || !segments.is_empty()) && route.pattern.has_trailing_slash() {
                path.push("");
            }
        }

        let extras: Vec<(&String, &String)> = params
            .iter()
            .filter(|(key, _)| !declared.contains(*key))
            .collect();
        if !extras.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in extras {
                query.append_pair(key, value);
            }
        }

        Ok(match kind {
            UrlKind::Absolute => url.to_string(),
            UrlKind::Path => match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            },
        })
    }
}

/// Creates a connected discovery sink and the receiver the crawl drains
pub fn discovery_channel() -> (DiscoverySink, UnboundedReceiver<GenerationTask>) {
    let (tx, rx) = unbounded_channel();
    (DiscoverySink { tx }, rx)
}

/// Sending half of the discovery channel
#[derive(Debug, Clone)]
pub struct DiscoverySink {
    tx: UnboundedSender<GenerationTask>,
}

impl DiscoverySink {
    /// Reports a discovered task; a closed channel is ignored
    pub fn report(&self, task: GenerationTask) {
        if self.tx.send(task).is_err() {
            tracing::trace!("Discovery channel closed, dropping discovered task");
        }
    }
}

/// Decorates a generator so every site-relative URL it builds is queued
pub struct InterceptingUrlGenerator {
    inner: Arc<dyn UrlGenerator>,
    sink: DiscoverySink,
}

impl InterceptingUrlGenerator {
    pub fn new(inner: Arc<dyn UrlGenerator>, sink: DiscoverySink) -> Self {
        Self { inner, sink }
    }
}

impl UrlGenerator for InterceptingUrlGenerator {
    fn generate(&self, name: &str, params: &Params, kind: UrlKind) -> RouteResult<String> {
        let url = self.inner.generate(name, params, kind)?;

        // Absolute URLs point off-site by intent and are never frozen
        if !kind.is_absolute() {
            self.sink
                .report(GenerationTask::named_route(name, params.clone()));
        }

        Ok(url)
    }
}
