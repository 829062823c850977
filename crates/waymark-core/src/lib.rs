//! # waymark-core
//!
//! Core types shared by every waymark crate. This crate has no HTTP
//! dependencies and provides the foundation the router is built on.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and result alias
//! - [`settings`] - Router settings and run modes
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{WaymarkError, WaymarkResult};
pub use settings::{DuplicatePolicy, Mode, Settings};
