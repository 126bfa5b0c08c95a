use crate::routing::Params;
use crate::{RouteError, RouteResult};
use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// A compiled route path such as `/users/{id}/`
///
/// Patterns are rooted, made of `/`-separated segments where a segment is
/// either literal text or a `{name}` placeholder covering the whole segment.
/// A trailing slash is significant: `/docs/` and `/docs` are different routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    trailing_slash: bool,
}

impl RoutePattern {
    /// Parses a pattern string
    ///
    /// # Examples
    ///
    /// ```
    /// use site_freezer::routing::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("/users/{id}").unwrap();
    /// assert_eq!(pattern.parameter_names(), vec!["id".to_string()]);
    /// assert!(RoutePattern::parse("users").is_err());
    /// ```
    pub fn parse(raw: &str) -> RouteResult<Self> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        if rest.is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                segments: Vec::new(),
                trailing_slash: true,
            });
        }

        let (body, trailing_slash) = match rest.strip_suffix('/') {
            Some(body) => (body, true),
            None => (rest, false),
        };

        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();

        for part in body.split('/') {
            if part.is_empty() {
                return Err(invalid("empty path segment"));
            }

            if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Err(invalid("parameter names must be alphanumeric"));
                }
                if names.contains(&name) {
                    return Err(invalid("duplicate parameter name"));
                }
                names.push(name);
                segments.push(Segment::Param(name.to_string()));
            } else if part.contains('{') || part.contains('}') {
                return Err(invalid("a parameter must span a whole segment"));
            } else {
                segments.push(Segment::Static(part.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            trailing_slash,
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this is the root pattern `/`
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Declared parameter names, in path order
    pub fn parameter_names(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Param(name) => Some(name.clone()),
                Segment::Static(_) => None,
            })
            .collect()
    }

    /// Substitutes parameters, returning raw (unencoded) path segments
    ///
    /// Fails with `MissingParameter` when a declared parameter is absent or
    /// empty. Parameters the pattern does not declare are ignored here.
    pub fn expand<'a>(&'a self, route: &str, params: &'a Params) -> RouteResult<Vec<&'a str>> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(text) => Ok(text.as_str()),
                Segment::Param(name) => params
                    .get(name)
                    .map(String::as_str)
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| RouteError::MissingParameter {
                        route: route.to_string(),
                        parameter: name.clone(),
                    }),
            })
            .collect()
    }

    /// Whether generated paths end with a slash
    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Matches a request path, capturing parameter values
    ///
    /// Segments are percent-decoded before comparison, so the path of a
    /// generated URL matches the pattern it came from and captured values
    /// are returned decoded. Segments that do not decode to UTF-8 never match.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;

        if self.is_root() {
            return rest.is_empty().then(Params::new);
        }

        let (body, trailing_slash) = match rest.strip_suffix('/') {
            Some(body) => (body, true),
            None => (rest, false),
        };
        if trailing_slash != self.trailing_slash {
            return None;
        }

        let parts: Vec<&str> = body.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            let part = percent_decode_str(part).decode_utf8().ok()?;
            match segment {
                Segment::Static(text) if *text == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    params.insert(name.clone(), part.into_owned());
                }
                _ => return None,
            }
        }

        Some(params)
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
    fn test_parse_root() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert!(pattern.is_root());
        assert!(pattern.parameter_names().is_empty());
    }

    #[test]
    fn test_parse_parameters_in_order() {
        let pattern = RoutePattern::parse("/posts/{year}/{slug}/").unwrap();
        assert_eq!(pattern.parameter_names(), vec!["year", "slug"]);
        assert!(pattern.has_trailing_slash());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(RoutePattern::parse("").is_err());
        assert!(RoutePattern::parse("users").is_err());
        assert!(RoutePattern::parse("/a//b").is_err());
        assert!(RoutePattern::parse("/user-{id}").is_err());
        assert!(RoutePattern::parse("/{}").is_err());
        assert!(RoutePattern::parse("/{id}/{id}").is_err());
    }

    #[test]
    fn test_expand() {
        let pattern = RoutePattern::parse("/users/{id}").unwrap();
        let p = params(&[("id", "42")]);
        assert_eq!(pattern.expand("show_user", &p).unwrap(), vec!["users", "42"]);
    }

    #[test]
    fn test_expand_missing_parameter() {
        let pattern = RoutePattern::parse("/users/{id}").unwrap();
        let err = pattern.expand("show_user", &Params::new()).unwrap_err();
        assert_eq!(
            err,
            RouteError::MissingParameter {
                route: "show_user".to_string(),
                parameter: "id".to_string(),
            }
        );

        let empty = params(&[("id", "")]);
        assert!(pattern.expand("show_user", &empty).is_err());
    }

    #[test]
    fn test_match_path() {
        let pattern = RoutePattern::parse("/users/{id}").unwrap();
        assert_eq!(pattern.match_path("/users/42"), Some(params(&[("id", "42")])));
        assert_eq!(pattern.match_path("/users/42/"), None);
        assert_eq!(pattern.match_path("/users"), None);
        assert_eq!(pattern.match_path("/people/42"), None);
    }

    #[test]
    fn test_match_root_and_trailing_slash() {
        let root = RoutePattern::parse("/").unwrap();
        assert_eq!(root.match_path("/"), Some(Params::new()));
        assert_eq!(root.match_path("/hello"), None);

        let docs = RoutePattern::parse("/docs/").unwrap();
        assert!(docs.match_path("/docs/").is_some());
        assert!(docs.match_path("/docs").is_none());
    }

    #[test]
    fn test_match_decodes_segments() {
        let user = RoutePattern::parse("/users/{id}").unwrap();
        assert_eq!(
            user.match_path("/users/a%20b"),
            Some(params(&[("id", "a b")]))
        );
        assert_eq!(
            user.match_path("/users/50%25"),
            Some(params(&[("id", "50%")]))
        );
        assert_eq!(user.match_path("/users/%FF"), None);

        let cafe = RoutePattern::parse("/café").unwrap();
        assert!(cafe.match_path("/caf%C3%A9").is_some());
        assert!(cafe.match_path("/café").is_some());
        assert!(cafe.match_path("/cafe").is_none());
    }
}
