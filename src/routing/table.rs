use crate::routing::{Params, RouteDescriptor, RoutePattern};
use crate::RouteResult;

/// A named route
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub pattern: RoutePattern,
}

impl Route {
    /// Compiles a route from its name and path pattern
    pub fn new(name: impl Into<String>, path: &str) -> RouteResult<Self> {
        Ok(Self {
            name: name.into(),
            pattern: RoutePattern::parse(path)?,
        })
    }

    /// Read-only description of this route
    pub fn descriptor(&self) -> RouteDescriptor {
        RouteDescriptor {
            name: self.name.clone(),
            parameter_names: self.pattern.parameter_names(),
        }
    }
}

/// Ordered, immutable set of compiled routes
///
/// Registration order is kept: it is the order the default seed generator
/// yields routes in, and the order used to resolve ambiguous paths.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Lists every registered route
    pub fn descriptors(&self) -> Vec<RouteDescriptor> {
        self.routes.iter().map(Route::descriptor).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Finds the first route matching `path`, with its captured parameters
    pub fn match_path(&self, path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.match_path(path).map(|params| (route, params)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
