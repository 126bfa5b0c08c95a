//! Route body templates
//!
//! Bodies are Tera templates. Each render registers a `url_for` function bound
//! to the generator the freezer injected for that request, which is how links
//! written in templates reach the crawl queue.

use crate::routing::{Params, UrlGenerator, UrlKind};
use crate::ConfigError;
use std::collections::HashMap;
use std::sync::Arc;
use tera::{Context, Tera, Value};

/// Compiled route templates, keyed by route name
#[derive(Debug, Clone)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compiles `(name, body)` pairs
    pub fn new<I>(templates: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tera = Tera::default();
        // Escape every template's variables; url_for output is marked safe
        tera.autoescape_on(vec![""]);
        tera.add_raw_templates(templates)
            .map_err(|e| ConfigError::Template(error_chain(&e)))?;

        Ok(Self { tera })
    }

    /// Renders template `name` with `vars` and a `url_for` bound to `urls`
    pub fn render(
        &self,
        name: &str,
        vars: &Params,
        request_path: &str,
        urls: Arc<dyn UrlGenerator>,
    ) -> Result<String, String> {
        let mut tera = self.tera.clone();
        tera.register_function("url_for", UrlFor::new(urls));

        let mut context = Context::new();
        for (key, value) in vars {
            context.insert(key.as_str(), value);
        }
        context.insert("request_path", request_path);

        tera.render(name, &context).map_err(|e| error_chain(&e))
    }
}

/// `url_for(route="name", absolute=false, **params)`
pub struct UrlFor {
    urls: Arc<dyn UrlGenerator>,
}

impl UrlFor {
    pub fn new(urls: Arc<dyn UrlGenerator>) -> Self {
        Self { urls }
    }
}

impl tera::Function for UrlFor {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let route = match args.get("route") {
            Some(Value::String(route)) => route.clone(),
            Some(_) => return Err(tera::Error::msg("url_for: `route` must be a string")),
            None => return Err(tera::Error::msg("url_for: missing `route` argument")),
        };

        let kind = match args.get("absolute") {
            None | Some(Value::Bool(false)) => UrlKind::Path,
            Some(Value::Bool(true)) => UrlKind::Absolute,
            Some(_) => return Err(tera::Error::msg("url_for: `absolute` must be a boolean")),
        };

        let mut params = Params::new();
        for (key, value) in args {
            if key == "route" || key == "absolute" {
                continue;
            }
            params.insert(key.clone(), param_value(key, value)?);
        }

        self.urls
            .generate(&route, &params, kind)
            .map(Value::String)
            .map_err(|e| tera::Error::msg(format!("url_for: {}", e)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

fn param_value(key: &str, value: &Value) -> tera::Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(tera::Error::msg(format!(
            "url_for: parameter `{}` must be a string, number or boolean",
            key
        ))),
    }
}

/// Flattens an error and its sources into one line
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
