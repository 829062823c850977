//! # waymark-http
//!
//! Named-route registration and dispatch on top of axum. Routes are
//! registered by name with `:name` / `*name` patterns, grouped into prefixed
//! route trees, bound to handlers that optionally decode their path
//! parameters into a struct, and served through an error-interception stage
//! that renders every error status.
//!
//! ## Modules
//!
//! - [`method`] - HTTP verbs
//! - [`urls`] - Patterns, routes, route trees, the registry and URL generation
//! - [`handler`] - The handler adapter
//! - [`decode`] - Path parameter decoding
//! - [`context`] - The per-request context
//! - [`errors`] - Error statuses and error interception
//! - [`router`] - The build-phase router and the frozen router

pub mod context;
pub mod decode;
pub mod errors;
pub mod handler;
pub mod method;
pub mod router;
pub mod urls;

// Re-export the most commonly used types at the crate root.
pub use context::{RequestContext, RouteInfo};
pub use decode::DecodeError;
pub use errors::{Abort, ErrorContext, ErrorHandler};
pub use handler::{BoxFuture, Handler, IntoHandler, ParamShape};
pub use method::Method;
pub use router::{FrozenRouter, Router};
pub use urls::registry::RouteRegistry;
pub use urls::reverse::generate_url_by_pattern;
pub use urls::route::Route;
pub use urls::route_list::RouteList;
