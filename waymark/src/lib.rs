//! # waymark
//!
//! Named, nestable routes with typed path parameters and centralized error
//! pages on top of axum.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `waymark` to get everything, or on the individual
//! crates for finer-grained control.
//!
//! ```
//! use waymark::prelude::*;
//!
//! let mut router = Router::new();
//! router.get("home", "/", |_ctx: RequestContext| async { "welcome" });
//! let frozen = router.build().unwrap();
//! assert!(frozen.routes().contains("home"));
//! ```

/// Errors, settings, and logging.
pub use waymark_core as core;

/// Routes, route lists, handlers, URL generation, and error interception.
#[cfg(feature = "http")]
pub use waymark_http as http;

/// Test client and live server.
#[cfg(feature = "testing")]
pub use waymark_test as test;

/// Third-party crates re-exported for convenience.
pub use axum;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tower_http;
pub use tracing;
pub use tracing_subscriber;

/// The most commonly used items.
pub mod prelude {
    pub use waymark_core::logging::setup_logging;
    pub use waymark_core::{DuplicatePolicy, Mode, Settings, WaymarkError, WaymarkResult};

    #[cfg(feature = "http")]
    pub use waymark_http::{
        errors::Abort, ErrorContext, FrozenRouter, Handler, Method, RequestContext, Route,
        RouteList, Router,
    };

    #[cfg(feature = "testing")]
    pub use waymark_test::{LiveServer, TestClient, TestResponse};
}
