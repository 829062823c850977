//! Route trees with path prefixes.
//!
//! A [`RouteList`] groups routes under a common prefix and may nest other
//! lists. [`RouteList::flatten`] walks the tree depth-first and yields every
//! route with its absolute pattern.
//!
//! # Examples
//!
//! ```
//! use waymark_http::{RequestContext, RouteList};
//!
//! let mut users = RouteList::with_prefix("/users");
//! users.get("user:list", "/", |_ctx: RequestContext| async { "all" });
//! users.get("user:detail", "/:id", |_ctx: RequestContext| async { "one" });
//!
//! let mut api = RouteList::with_prefix("/api");
//! api.add_child(users);
//!
//! let patterns: Vec<String> = api.flatten().into_iter().map(|(p, _)| p).collect();
//! assert_eq!(patterns, ["/api/users/", "/api/users/:id"]);
//! ```

use crate::handler::IntoHandler;
use crate::method::Method;

use super::pattern::join;
use super::route::Route;

/// An ordered group of routes and child groups sharing a path prefix.
#[derive(Debug, Clone, Default)]
pub struct RouteList {
    pattern: String,
    routes: Vec<Route>,
    children: Vec<RouteList>,
}

macro_rules! verb_helpers {
    ($($fn_name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Adds a `", stringify!($method), "` route.")]
            pub fn $fn_name<M>(
                &mut self,
                name: &str,
                pattern: &str,
                handler: impl IntoHandler<M>,
            ) -> &mut Self {
                self.add(name, pattern, handler, Method::$method)
            }
        )*
    };
}

impl RouteList {
    /// Creates a list with an empty prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list whose routes all live under `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            pattern: prefix.into(),
            ..Self::default()
        }
    }

    /// Adds a route built from its parts.
    pub fn add<M>(
        &mut self,
        name: &str,
        pattern: &str,
        handler: impl IntoHandler<M>,
        method: Method,
    ) -> &mut Self {
        self.add_route(Route::new(name, pattern, handler, method))
    }

    verb_helpers! {
        get => Get,
        post => Post,
        put => Put,
        patch => Patch,
        delete => Delete,
        head => Head,
        options => Options,
        connect => Connect,
        trace => Trace,
    }

    /// Appends an existing route.
    pub fn add_route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    /// Appends a nested list.
    pub fn add_child(&mut self, child: Self) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns every route in the tree paired with its absolute pattern.
    ///
    /// Each node's routes come before its children, in insertion order. The
    /// returned routes carry the absolute pattern as well.
    pub fn flatten(&self) -> Vec<(String, Route)> {
        let mut flat = Vec::new();
        self.flatten_into("", &mut flat);
        flat
    }

    fn flatten_into(&self, parent: &str, flat: &mut Vec<(String, Route)>) {
        let prefix = join(parent, &self.pattern);

        for route in &self.routes {
            let pattern = join(&prefix, route.pattern());
            flat.push((pattern.clone(), route.with_pattern(pattern)));
        }

        for child in &self.children {
            child.flatten_into(&prefix, flat);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;

    fn names_and_patterns(list: &RouteList) -> Vec<(String, String)> {
        list.flatten()
            .into_iter()
            .map(|(pattern, route)| (route.name().to_string(), pattern))
            .collect()
    }

    #[test]
    fn test_empty_prefix_adds_no_segment() {
        let mut root = RouteList::new();
        root.get("home", "/", |_ctx: RequestContext| async { "" })
            .get("about", "/about", |_ctx: RequestContext| async { "" });

        assert_eq!(
            names_and_patterns(&root),
            vec![
                ("home".to_string(), "/".to_string()),
                ("about".to_string(), "/about".to_string()),
            ]
        );
    }

    #[test]
    fn test_three_levels_of_nesting() {
        let mut items = RouteList::with_prefix("/items");
        items.get("item", "/:id", |_ctx: RequestContext| async { "" });

        let mut v2 = RouteList::with_prefix("/v2/");
        v2.get("status", "/status", |_ctx: RequestContext| async { "" })
            .add_child(items);

        let mut api = RouteList::with_prefix("/api");
        api.get("root", "/", |_ctx: RequestContext| async { "" })
            .add_child(v2);

        assert_eq!(
            names_and_patterns(&api),
            vec![
                ("root".to_string(), "/api/".to_string()),
                ("status".to_string(), "/api/v2/status".to_string()),
                ("item".to_string(), "/api/v2/items/:id".to_string()),
            ]
        );
    }

    #[test]
    fn test_routes_before_children() {
        let mut child = RouteList::with_prefix("/c");
        child.post("child", "/x", |_ctx: RequestContext| async { "" });

        let mut parent = RouteList::with_prefix("/p");
        parent.add_child(child);
        parent.delete("late", "/y", |_ctx: RequestContext| async { "" });

        let flat = parent.flatten();
        assert_eq!(flat[0].0, "/p/y");
        assert_eq!(flat[0].1.method(), Method::Delete);
        assert_eq!(flat[1].0, "/p/c/x");
    }

    #[test]
    fn test_flattened_routes_carry_absolute_pattern() {
        let mut list = RouteList::with_prefix("/v1");
        list.get("product", "/:locale/products/:id", |_ctx: RequestContext| async { "" });

        let (pattern, route) = list.flatten().remove(0);
        assert_eq!(pattern, "/v1/:locale/products/:id");
        assert_eq!(route.pattern(), pattern);
    }

    #[test]
    fn test_same_route_under_two_prefixes() {
        let shared = Route::new("shared", "/ping", |_ctx: RequestContext| async { "pong" }, Method::Get);

        let mut v1 = RouteList::with_prefix("/v1");
        v1.add_route(shared.clone());
        let mut root = RouteList::new();
        root.add_route(shared).add_child(v1);

        let patterns: Vec<String> = root.flatten().into_iter().map(|(p, _)| p).collect();
        assert_eq!(patterns, ["/ping", "/v1/ping"]);
    }

    #[test]
    fn test_accessors() {
        let mut list = RouteList::with_prefix("/x");
        list.add_child(RouteList::new());
        assert_eq!(list.pattern(), "/x");
        assert!(list.routes().is_empty());
        assert_eq!(list.children().len(), 1);
    }
}
