//! Settings for waymark.
//!
//! [`Settings`] holds everything the router reads at build time and the
//! logging setup reads at startup. All fields have defaults so a settings file
//! only needs to name what it changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WaymarkError;

/// The run mode of the application.
///
/// Debug mode logs in a human-readable format; release mode logs JSON; test
/// mode writes compact output through the test harness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Development mode.
    #[default]
    Debug,
    /// Production mode.
    Release,
    /// Mode used under `cargo test`.
    Test,
}

impl Mode {
    /// Returns the lowercase name of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = WaymarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "test" => Ok(Self::Test),
            other => Err(WaymarkError::ConfigurationError(format!(
                "unknown mode '{other}' (expected debug, release, or test)"
            ))),
        }
    }
}

/// What happens when a route name is registered a second time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The latest registration replaces the earlier one, including the
    /// earlier one's dispatch entries.
    #[default]
    Overwrite,
    /// A second registration is a configuration error reported by `build()`.
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = WaymarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject" => Ok(Self::Reject),
            other => Err(WaymarkError::ConfigurationError(format!(
                "unknown duplicate policy '{other}' (expected overwrite or reject)"
            ))),
        }
    }
}

/// The complete set of waymark settings.
///
/// # Examples
///
/// ```
/// use waymark_core::settings::{DuplicatePolicy, Mode, Settings};
///
/// let settings = Settings::default();
/// assert_eq!(settings.mode, Mode::Debug);
/// assert_eq!(settings.duplicate_names, DuplicatePolicy::Overwrite);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The run mode.
    pub mode: Mode,
    /// The log filter directive (e.g. "info", "waymark_http=debug").
    pub log_level: String,
    /// The address `run` binds to when none is given explicitly.
    pub bind_address: String,
    /// How repeated route names are treated.
    pub duplicate_names: DuplicatePolicy,
    /// The maximum request body size buffered for handlers, in bytes.
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Debug,
            log_level: "info".to_string(),
            bind_address: "127.0.0.1:8080".to_string(),
            duplicate_names: DuplicatePolicy::Overwrite,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Settings {
    /// Returns `true` in debug mode.
    pub fn is_debug(&self) -> bool {
        self.mode == Mode::Debug
    }
}
