//! Core error types for waymark.
//!
//! [`WaymarkError`] covers URL generation failures, configuration errors
//! detected while routes are registered or the router is built, and listener
//! failures at serve time. Per-request failures (path-parameter decoding,
//! error statuses returned by handlers) never surface as a `WaymarkError`;
//! they are converted into HTTP responses inside the request task.

use thiserror::Error;

/// The primary error type for waymark.
///
/// Configuration variants (see [`WaymarkError::is_configuration`]) indicate a
/// contract violation in the application's route table and are meant to abort
/// startup. The remaining variants are returned to the caller as ordinary
/// values.
#[derive(Error, Debug)]
pub enum WaymarkError {
    // ── URL generation ───────────────────────────────────────────────

    /// No route is registered under the requested name.
    #[error("Route not found: route with name {0} not found")]
    RouteNotFound(String),

    /// A placeholder in the pattern has no value in the supplied parameters.
    #[error("Missing parameter '{name}' for pattern '{pattern}'")]
    MissingParameter {
        /// The pattern being expanded.
        pattern: String,
        /// The placeholder name that had no value.
        name: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A route pattern was rejected while building the router.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern, as registered.
        pattern: String,
        /// Why the pattern was rejected.
        reason: String,
    },

    /// A route name was registered twice while duplicates are rejected.
    #[error("Duplicate route name: {0}")]
    DuplicateRouteName(String),

    /// Two differently named routes claim the same method and pattern.
    #[error("Duplicate endpoint: {method} {pattern} is already registered")]
    DuplicateEndpoint {
        /// The HTTP method token.
        method: String,
        /// The absolute pattern.
        pattern: String,
    },

    /// A parameterized handler's decode target is not a struct-like type.
    #[error("Handler parameter must be a struct, got {found} for {target}")]
    HandlerShape {
        /// The Rust type name of the decode target.
        target: String,
        /// A description of the shape that was found instead.
        found: String,
    },

    /// An HTTP method token is unknown or cannot be routed.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// A settings value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serving ──────────────────────────────────────────────────────

    /// The listener could not be bound.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// The address that was requested.
        address: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with a transport error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WaymarkError {
    /// Returns `true` for errors that describe a broken route table or broken
    /// settings rather than a transient condition.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::DuplicateRouteName(_)
                | Self::DuplicateEndpoint { .. }
                | Self::HandlerShape { .. }
                | Self::UnsupportedMethod(_)
                | Self::ConfigurationError(_)
        )
    }
}

/// A convenience type alias for `Result<T, WaymarkError>`.
pub type WaymarkResult<T> = Result<T, WaymarkError>;
