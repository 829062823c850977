//! Routes, route trees and URL generation.
//!
//! - [`pattern`]: the `:name` / `*name` pattern syntax
//! - [`route`]: named routes
//! - [`route_list`]: prefixed route trees and their flattening
//! - [`registry`]: the name-to-route registry
//! - [`reverse`]: URL generation from patterns
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use waymark_http::urls::reverse::generate_url_by_pattern;
//! use waymark_http::{RequestContext, RouteList};
//!
//! let mut v1 = RouteList::with_prefix("/v1");
//! v1.get("product", "/:locale/products/:id", |_ctx: RequestContext| async { "ok" });
//!
//! let (pattern, _route) = v1.flatten().remove(0);
//! let params = HashMap::from([("locale", "cs"), ("id", "42")]);
//! assert_eq!(generate_url_by_pattern(&pattern, &params).unwrap(), "/v1/cs/products/42");
//! ```

pub mod pattern;
pub mod registry;
pub mod reverse;
pub mod route;
pub mod route_list;
