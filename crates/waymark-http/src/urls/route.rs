//! Named routes.

use std::collections::HashMap;
use std::fmt;

use crate::handler::{Handler, IntoHandler};
use crate::method::Method;

/// A named binding of a pattern and method to a handler.
///
/// A route may carry child routes; they are kept for callers that build
/// their own hierarchies and are not registered automatically.
///
/// # Examples
///
/// ```
/// use waymark_http::{Method, RequestContext, Route};
///
/// let route = Route::new("health", "/health", |_ctx: RequestContext| async { "ok" }, Method::Get);
/// assert_eq!(route.name(), "health");
/// assert_eq!(route.pattern(), "/health");
/// ```
#[derive(Clone)]
pub struct Route {
    name: String,
    pattern: String,
    method: Method,
    handler: Handler,
    children: HashMap<String, Route>,
}

impl Route {
    /// Creates a route.
    pub fn new<M>(
        name: impl Into<String>,
        pattern: impl Into<String>,
        handler: impl IntoHandler<M>,
        method: Method,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            method,
            handler: handler.into_handler(),
            children: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub const fn method(&self) -> Method {
        self.method
    }

    pub const fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Attaches a child route under its name, replacing any previous child
    /// with the same name.
    pub fn add_child(&mut self, child: Self) -> &mut Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    /// Looks up a child route by name.
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.get(name)
    }

    pub const fn children(&self) -> &HashMap<String, Self> {
        &self.children
    }

    /// Returns a copy of this route bound to a different pattern.
    pub(crate) fn with_pattern(&self, pattern: String) -> Self {
        Self {
            pattern,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("method", &self.method)
            .field("handler", &self.handler)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}
