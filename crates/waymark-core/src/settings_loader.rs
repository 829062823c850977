//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `WAYMARK_MODE` | `mode` |
//! | `WAYMARK_LOG_LEVEL` | `log_level` |
//! | `WAYMARK_BIND_ADDRESS` | `bind_address` |
//! | `WAYMARK_DUPLICATE_NAMES` | `duplicate_names` |
//! | `WAYMARK_MAX_BODY_BYTES` | `max_body_bytes` |
//!
//! Values that fail to parse are ignored and the previous value is kept.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use waymark_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("waymark.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::WaymarkError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, WaymarkError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| WaymarkError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, WaymarkError> {
    from_toml_str(&read_file(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, WaymarkError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, WaymarkError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| WaymarkError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, WaymarkError> {
    from_json_str(&read_file(path.as_ref(), "JSON")?)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `WAYMARK_*` environment variable overrides to a settings struct.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_from(settings, |key| std::env::var(key).ok());
}

/// Applies overrides using `lookup` to resolve `WAYMARK_*` keys.
///
/// [`apply_env_overrides`] calls this with the process environment; tests
/// and embedders can supply any other source.
pub fn apply_overrides_from<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("WAYMARK_MODE") {
        if let Ok(mode) = val.parse() {
            settings.mode = mode;
        }
    }

    if let Some(val) = lookup("WAYMARK_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("WAYMARK_BIND_ADDRESS") {
        settings.bind_address = val;
    }

    if let Some(val) = lookup("WAYMARK_DUPLICATE_NAMES") {
        if let Ok(policy) = val.parse() {
            settings.duplicate_names = policy;
        }
    }

    if let Some(val) = lookup("WAYMARK_MAX_BODY_BYTES") {
        if let Ok(limit) = val.trim().parse::<usize>() {
            settings.max_body_bytes = limit;
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_file(path: &Path, format: &str) -> Result<String, WaymarkError> {
    std::fs::read_to_string(path).map_err(|e| {
        WaymarkError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

/// Deep-merges `value` over the serialized defaults and deserializes the result.
fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, WaymarkError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        WaymarkError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        WaymarkError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::settings::{DuplicatePolicy, Mode};

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            mode = "release"
            duplicate_names = "reject"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.mode, Mode::Release);
        assert_eq!(settings.duplicate_names, DuplicatePolicy::Reject);
        // Defaults preserved
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = from_toml_str("mode = ").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_from_toml_str_unknown_mode() {
        let err = from_toml_str(r#"mode = "turbo""#).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_address = \"0.0.0.0:9000\"").unwrap();
        writeln!(file, "max_body_bytes = 1024").unwrap();

        let settings = from_toml_file(file.path()).unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:9000");
        assert_eq!(settings.max_body_bytes, 1024);
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str() {
        let settings = from_json_str(r#"{"log_level": "debug", "mode": "test"}"#).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.mode, Mode::Test);
        assert_eq!(settings.duplicate_names, DuplicatePolicy::Overwrite);
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    // ── Overrides ───────────────────────────────────────────────────

    #[test]
    fn test_apply_overrides_from() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("WAYMARK_MODE", "release"),
            ("WAYMARK_LOG_LEVEL", "warn"),
            ("WAYMARK_BIND_ADDRESS", "0.0.0.0:80"),
            ("WAYMARK_DUPLICATE_NAMES", "reject"),
            ("WAYMARK_MAX_BODY_BYTES", "4096"),
        ]);

        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, |key| vars.get(key).map(ToString::to_string));

        assert_eq!(settings.mode, Mode::Release);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.bind_address, "0.0.0.0:80");
        assert_eq!(settings.duplicate_names, DuplicatePolicy::Reject);
        assert_eq!(settings.max_body_bytes, 4096);
    }

    #[test]
    fn test_apply_overrides_ignores_unparsable_values() {
        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, |key| match key {
            "WAYMARK_MODE" => Some("loud".to_string()),
            "WAYMARK_MAX_BODY_BYTES" => Some("lots".to_string()),
            _ => None,
        });

        assert_eq!(settings, Settings::default());
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"b": 1, "c": 2}, "d": 3});
        let over = serde_json::json!({"a": {"b": 10}});
        let merged = merge_json(base, over);
        assert_eq!(merged, serde_json::json!({"a": {"b": 10, "c": 2}, "d": 3}));
    }
}
