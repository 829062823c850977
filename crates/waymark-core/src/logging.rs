//! Logging integration for waymark.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-dispatch spans.

use crate::settings::{Mode, Settings};

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level`; an unparsable directive falls
/// back to `info`. Debug mode uses a pretty, human-readable format, release
/// mode uses structured JSON, and test mode writes compact lines through the
/// test harness so output is captured per test.
///
/// Installing a subscriber twice is not an error; the second call is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match settings.mode {
        Mode::Debug => {
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .try_init()
                .ok();
        }
        Mode::Release => {
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(true)
                .json()
                .try_init()
                .ok();
        }
        Mode::Test => {
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .compact()
                .with_test_writer()
                .try_init()
                .ok();
        }
    }
}

/// Creates a tracing span for one dispatch of a named route.
///
/// # Examples
///
/// ```
/// use waymark_core::logging::route_span;
///
/// let span = route_span("user:detail", "GET", "/users/:id");
/// let _guard = span.enter();
/// tracing::info!("handling request");
/// ```
pub fn route_span(name: &str, method: &str, pattern: &str) -> tracing::Span {
    tracing::debug_span!("route", name = name, method = method, pattern = pattern)
}
