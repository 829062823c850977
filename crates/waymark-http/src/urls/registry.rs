//! The name-to-route registry.

use std::borrow::Borrow;
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use waymark_core::{WaymarkError, WaymarkResult};

use super::reverse::generate_url_by_pattern;
use super::route::Route;

/// Registered routes, keyed by name.
///
/// The router owns a mutable registry while routes are being registered and
/// shares it read-only once built.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: HashMap<String, Route>,
}

impl RouteRegistry {
    /// Looks up a route by name.
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over `(name, route)` pairs in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Route> {
        self.routes.iter()
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the URL of the route registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::RouteNotFound`] if no route has that name, or
    /// [`WaymarkError::MissingParameter`] if a placeholder has no value.
    pub fn generate_url_by_name<K, V, S>(
        &self,
        name: &str,
        params: &HashMap<K, V, S>,
    ) -> WaymarkResult<String>
    where
        K: Borrow<str> + Hash + Eq,
        V: fmt::Display,
        S: BuildHasher,
    {
        let route = self
            .get(name)
            .ok_or_else(|| WaymarkError::RouteNotFound(name.to_string()))?;
        generate_url_by_pattern(route.pattern(), params)
    }

    /// Stores `route` under `name`, returning the route it replaced.
    pub(crate) fn insert(&mut self, name: String, route: Route) -> Option<Route> {
        self.routes.insert(name, route)
    }
}

impl<'a> IntoIterator for &'a RouteRegistry {
    type Item = (&'a String, &'a Route);
    type IntoIter = hash_map::Iter<'a, String, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
