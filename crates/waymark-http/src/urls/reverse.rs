//! URL generation from patterns.
//!
//! [`generate_url_by_pattern`] substitutes parameter values into the
//! placeholders of a pattern. Name-based generation lives on the route
//! registry, which looks the pattern up first.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::hash::{BuildHasher, Hash};

use waymark_core::{WaymarkError, WaymarkResult};

use super::pattern::{segments, Segment};

/// Builds a URL by replacing each `:name` and `*name` placeholder in
/// `pattern` with the matching entry of `params`.
///
/// Values are written verbatim through their `Display` impl; no escaping is
/// applied. Entries that name no placeholder are ignored.
///
/// # Errors
///
/// Returns [`WaymarkError::MissingParameter`] if a placeholder has no entry
/// in `params`.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use waymark_http::urls::reverse::generate_url_by_pattern;
///
/// let params = HashMap::from([("locale", "cs"), ("id", "42")]);
/// let url = generate_url_by_pattern("/:locale/products/:id", &params).unwrap();
/// assert_eq!(url, "/cs/products/42");
/// ```
pub fn generate_url_by_pattern<K, V, S>(
    pattern: &str,
    params: &HashMap<K, V, S>,
) -> WaymarkResult<String>
where
    K: Borrow<str> + Hash + Eq,
    V: fmt::Display,
    S: BuildHasher,
{
    let mut url = String::with_capacity(pattern.len());

    for segment in segments(pattern) {
        match segment {
            Segment::Literal(text) => url.push_str(text),
            Segment::Param(name) | Segment::CatchAll(name) => {
                let value = params
                    .get(name)
                    .ok_or_else(|| WaymarkError::MissingParameter {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    })?;
                write!(url, "{value}").ok();
            }
        }
    }

    Ok(url)
}
