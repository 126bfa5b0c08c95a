use crate::routing::Params;
use std::fmt;
use url::form_urlencoded;

/// A unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationTask {
    /// A route name plus parameters, resolved through the URL generator
    NamedRoute { name: String, params: Params },

    /// A site-relative URL taken verbatim
    RawUrl { url: String },
}

impl GenerationTask {
    pub fn named_route(name: impl Into<String>, params: Params) -> Self {
        Self::NamedRoute {
            name: name.into(),
            params,
        }
    }

    pub fn raw_url(url: impl Into<String>) -> Self {
        Self::RawUrl { url: url.into() }
    }

    /// Deduplication identity of a named route
    ///
    /// The route name followed by its parameters form-encoded in name order,
    /// e.g. `show_user?id=42`. Raw URLs have no route key; they are
    /// deduplicated by URL.
    pub fn route_key(&self) -> Option<String> {
        match self {
            Self::NamedRoute { name, params } => {
                if params.is_empty() {
                    return Some(name.clone());
                }
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params.iter())
                    .finish();
                Some(format!("{}?{}", name, encoded))
            }
            Self::RawUrl { .. } => None,
        }
    }
}

impl fmt::Display for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedRoute { .. } => {
                write!(f, "route {}", self.route_key().unwrap_or_default())
            }
            Self::RawUrl { url } => write!(f, "url {}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_route_key_without_params() {
        let task = GenerationTask::named_route("hello", Params::new());
        assert_eq!(task.route_key().as_deref(), Some("hello"));
    }

    #[test]
    fn test_route_key_is_order_stable() {
        let a = GenerationTask::named_route("list", params(&[("page", "2"), ("sort", "asc")]));
        let b = GenerationTask::named_route("list", params(&[("sort", "asc"), ("page", "2")]));
        assert_eq!(a.route_key(), b.route_key());
        assert_eq!(a.route_key().as_deref(), Some("list?page=2&sort=asc"));
    }

    #[test]
    fn test_route_key_encodes_values() {
        let task = GenerationTask::named_route("search", params(&[("q", "a&b=c")]));
        assert_eq!(task.route_key().as_deref(), Some("search?q=a%26b%3Dc"));
    }

    #[test]
    fn test_raw_url_has_no_route_key() {
        assert_eq!(GenerationTask::raw_url("/hello").route_key(), None);
    }

    #[test]
    fn test_display() {
        let task = GenerationTask::named_route("show_user", params(&[("id", "42")]));
        assert_eq!(task.to_string(), "route show_user?id=42");
        assert_eq!(GenerationTask::raw_url("/a").to_string(), "url /a");
    }
}
