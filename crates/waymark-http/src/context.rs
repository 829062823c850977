//! The per-request context handed to route handlers.
//!
//! [`RequestContext`] owns the request head, the buffered body, the raw path
//! parameters and a description of the route that matched. It also holds a
//! shared handle to the frozen route registry so handlers can build URLs for
//! other routes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::request::Parts;
use http::{Extensions, HeaderMap, Uri};

use waymark_core::WaymarkResult;

use crate::method::Method;
use crate::urls::registry::RouteRegistry;

/// The route a request was dispatched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// The registered route name.
    pub name: String,
    /// The full pattern, including any prefixes.
    pub pattern: String,
    /// The method the route was registered for.
    pub method: Method,
}

/// Everything a handler receives about the current request.
///
/// # Examples
///
/// ```
/// use waymark_http::RequestContext;
///
/// async fn show(ctx: RequestContext) -> String {
///     format!("{} {} via {}", ctx.method(), ctx.path(), ctx.route_name())
/// }
/// ```
pub struct RequestContext {
    parts: Parts,
    body: Bytes,
    params: Vec<(String, String)>,
    route: Arc<RouteInfo>,
    registry: Arc<RouteRegistry>,
}

impl RequestContext {
    pub(crate) fn new(
        parts: Parts,
        body: Bytes,
        params: Vec<(String, String)>,
        route: Arc<RouteInfo>,
        registry: Arc<RouteRegistry>,
    ) -> Self {
        Self {
            parts,
            body,
            params,
            route,
            registry,
        }
    }

    /// Returns the request method.
    pub const fn method(&self) -> &http::Method {
        &self.parts.method
    }

    /// Returns the request URI.
    pub const fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Returns the request path, without the query string.
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Returns the raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the request extensions.
    pub const fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// Returns the value bound to a placeholder, percent-decoded.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns all placeholder bindings in pattern order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Returns the placeholder bindings as a map.
    pub fn params_map(&self) -> HashMap<&str, &str> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Returns the buffered request body.
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the matched route.
    pub fn route(&self) -> &RouteInfo {
        &self.route
    }

    /// Returns the name of the matched route.
    pub fn route_name(&self) -> &str {
        &self.route.name
    }

    /// Returns the full pattern of the matched route.
    pub fn route_pattern(&self) -> &str {
        &self.route.pattern
    }

    /// Returns the frozen route registry.
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Builds the URL of a named route.
    ///
    /// # Errors
    ///
    /// Fails if no route has that name or a placeholder has no value.
    pub fn url_for<V: fmt::Display>(
        &self,
        name: &str,
        params: &HashMap<&str, V>,
    ) -> WaymarkResult<String> {
        self.registry.generate_url_by_name(name, params)
    }

    pub(crate) fn parts_mut(&mut self) -> &mut Parts {
        &mut self.parts
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("params", &self.params)
            .field("route", &self.route)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(uri: &str, params: &[(&str, &str)]) -> RequestContext {
        let (parts, ()) = http::Request::builder()
            .method(http::Method::POST)
            .uri(uri)
            .header("x-locale", "cs")
            .body(())
            .unwrap()
            .into_parts();
        let route = RouteInfo {
            name: "product".to_string(),
            pattern: "/:locale/products/:id".to_string(),
            method: Method::Post,
        };
        RequestContext::new(
            parts,
            Bytes::from_static(br#"{"qty": 3}"#),
            params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            Arc::new(route),
            Arc::new(RouteRegistry::default()),
        )
    }

    #[test]
    fn test_request_head() {
        let ctx = context("/cs/products/42?page=2", &[]);
        assert_eq!(ctx.method(), http::Method::POST);
        assert_eq!(ctx.path(), "/cs/products/42");
        assert_eq!(ctx.query(), Some("page=2"));
        assert_eq!(ctx.header("x-locale"), Some("cs"));
        assert_eq!(ctx.header("missing"), None);
    }

    #[test]
    fn test_params() {
        let ctx = context("/cs/products/42", &[("locale", "cs"), ("id", "42")]);
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.param("nope"), None);
        assert_eq!(ctx.params().len(), 2);
        assert_eq!(ctx.params_map().get("locale"), Some(&"cs"));
    }

    #[test]
    fn test_route_info() {
        let ctx = context("/cs/products/42", &[]);
        assert_eq!(ctx.route_name(), "product");
        assert_eq!(ctx.route_pattern(), "/:locale/products/:id");
        assert_eq!(ctx.route().method, Method::Post);
    }

    #[test]
    fn test_raw_body() {
        let ctx = context("/", &[]);
        assert_eq!(ctx.body().as_ref(), br#"{"qty": 3}"#);
    }

    #[test]
    fn test_url_for_unknown_route() {
        let ctx = context("/", &[]);
        let params: HashMap<&str, &str> = HashMap::new();
        assert!(ctx.url_for("nowhere", &params).is_err());
    }
}
