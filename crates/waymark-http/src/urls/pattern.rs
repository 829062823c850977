//! Route pattern syntax.
//!
//! Patterns use `:name` placeholders that match a single path segment and an
//! optional trailing `*name` catch-all that matches the rest of the path:
//!
//! ```text
//! /users/:id
//! /:locale/products/:id
//! /static/*path
//! ```
//!
//! The engine underneath (axum) spells placeholders as `{name}` and
//! `{*name}`; [`to_engine_path`] performs the translation and rejects
//! patterns the engine would refuse.

use std::collections::HashSet;
use std::fmt::Write as _;

use waymark_core::{WaymarkError, WaymarkResult};

/// One lexical piece of a route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text, copied verbatim.
    Literal(&'a str),
    /// A `:name` placeholder.
    Param(&'a str),
    /// A `*name` catch-all.
    CatchAll(&'a str),
}

impl<'a> Segment<'a> {
    /// Returns the placeholder name, or `None` for literal text.
    pub const fn name(&self) -> Option<&'a str> {
        match self {
            Self::Literal(_) => None,
            Self::Param(name) | Self::CatchAll(name) => Some(name),
        }
    }
}

/// Splits a pattern into literal text and placeholders.
///
/// A placeholder starts at `:` or `*` and its name runs to the next `/` or the
/// end of the pattern.
///
/// # Examples
///
/// ```
/// use waymark_http::urls::pattern::{segments, Segment};
///
/// assert_eq!(
///     segments("/users/:id"),
///     vec![Segment::Literal("/users/"), Segment::Param("id")]
/// );
/// ```
pub fn segments(pattern: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut remaining = pattern;

    while !remaining.is_empty() {
        let Some(start) = remaining.find(|c| c == ':' || c == '*') else {
            out.push(Segment::Literal(remaining));
            break;
        };

        if start > 0 {
            out.push(Segment::Literal(&remaining[..start]));
        }

        let catch_all = remaining[start..].starts_with('*');
        let after = &remaining[start + 1..];
        let end = after.find('/').unwrap_or(after.len());
        let name = &after[..end];

        out.push(if catch_all {
            Segment::CatchAll(name)
        } else {
            Segment::Param(name)
        });
        remaining = &after[end..];
    }

    out
}

/// Returns the placeholder names of a pattern, in order of appearance.
pub fn placeholders(pattern: &str) -> Vec<&str> {
    segments(pattern).iter().filter_map(Segment::name).collect()
}

/// Joins a path prefix and a pattern with exactly one `/` at the seam.
///
/// An empty prefix contributes nothing, so the pattern is returned unchanged.
/// A trailing slash on the pattern is preserved.
///
/// # Examples
///
/// ```
/// use waymark_http::urls::pattern::join;
///
/// assert_eq!(join("/v1", "/users/:id"), "/v1/users/:id");
/// assert_eq!(join("/v1/", "users/"), "/v1/users/");
/// assert_eq!(join("", "/users"), "/users");
/// ```
pub fn join(prefix: &str, pattern: &str) -> String {
    if prefix.is_empty() {
        return pattern.to_string();
    }
    if pattern.is_empty() {
        return prefix.to_string();
    }

    let head = prefix.trim_end_matches('/');
    let tail = pattern.trim_start_matches('/');
    format!("{head}/{tail}")
}

/// Translates a pattern into the engine's path syntax.
///
/// # Errors
///
/// Returns [`WaymarkError::InvalidPattern`] if the pattern does not start with
/// `/`, has a placeholder without a valid name, repeats a placeholder name, or
/// has a catch-all anywhere but at the end.
///
/// # Examples
///
/// ```
/// use waymark_http::urls::pattern::to_engine_path;
///
/// assert_eq!(to_engine_path("/:locale/products/:id").unwrap(), "/{locale}/products/{id}");
/// assert_eq!(to_engine_path("/static/*path").unwrap(), "/static/{*path}");
/// assert!(to_engine_path("users/:id").is_err());
/// ```
pub fn to_engine_path(pattern: &str) -> WaymarkResult<String> {
    let invalid = |reason: String| WaymarkError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };

    if !pattern.starts_with('/') {
        return Err(invalid("patterns must start with '/'".to_string()));
    }

    let parts = segments(pattern);
    let mut seen = HashSet::new();
    let mut path = String::with_capacity(pattern.len() + 2 * parts.len());

    for (index, segment) in parts.iter().enumerate() {
        match *segment {
            Segment::Literal(text) => {
                for c in text.chars() {
                    match c {
                        '{' => path.push_str("{{"),
                        '}' => path.push_str("}}"),
                        c => path.push(c),
                    }
                }
            }
            Segment::Param(name) | Segment::CatchAll(name) => {
                if name.is_empty() {
                    return Err(invalid("placeholder without a name".to_string()));
                }
                if name.contains([':', '*', '{', '}']) {
                    return Err(invalid(format!("invalid character in placeholder '{name}'")));
                }
                if !seen.insert(name) {
                    return Err(invalid(format!("placeholder '{name}' appears more than once")));
                }

                if matches!(segment, Segment::CatchAll(_)) {
                    if index + 1 != parts.len() {
                        return Err(invalid(format!(
                            "catch-all '*{name}' must be the last segment"
                        )));
                    }
                    write!(path, "{{*{name}}}").ok();
                } else {
                    write!(path, "{{{name}}}").ok();
                }
            }
        }
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_mixed() {
        assert_eq!(
            segments("/:locale/products/:id"),
            vec![
                Segment::Literal("/"),
                Segment::Param("locale"),
                Segment::Literal("/products/"),
                Segment::Param("id"),
            ]
        );
    }

    #[test]
    fn test_segments_catch_all_and_trailing_slash() {
        assert_eq!(
            segments("/files/*path"),
            vec![Segment::Literal("/files/"), Segment::CatchAll("path")]
        );
        assert_eq!(
            segments("/users/:id/"),
            vec![
                Segment::Literal("/users/"),
                Segment::Param("id"),
                Segment::Literal("/"),
            ]
        );
    }

    #[test]
    fn test_segments_literal_only() {
        assert_eq!(segments("/about"), vec![Segment::Literal("/about")]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders("/:locale/products/:id"), vec!["locale", "id"]);
        assert_eq!(placeholders("/static/*path"), vec!["path"]);
        assert!(placeholders("/health").is_empty());
    }

    #[test]
    fn test_join_separators() {
        assert_eq!(join("/v1", "/:locale/products/:id"), "/v1/:locale/products/:id");
        assert_eq!(join("/v1/", "/users"), "/v1/users");
        assert_eq!(join("/v1", "users"), "/v1/users");
        assert_eq!(join("/", "/users"), "/users");
        assert_eq!(join("/v1", ""), "/v1");
        assert_eq!(join("", ""), "");
    }

    #[test]
    fn test_join_nested() {
        let api = join("", "/api");
        let v2 = join(&api, "/v2/");
        assert_eq!(join(&v2, "/items/:id"), "/api/v2/items/:id");
    }

    #[test]
    fn test_to_engine_path_translation() {
        assert_eq!(to_engine_path("/").unwrap(), "/");
        assert_eq!(to_engine_path("/users/:id").unwrap(), "/users/{id}");
        assert_eq!(to_engine_path("/users/:id/").unwrap(), "/users/{id}/");
        assert_eq!(to_engine_path("/a/*rest").unwrap(), "/a/{*rest}");
    }

    #[test]
    fn test_to_engine_path_escapes_braces() {
        assert_eq!(to_engine_path("/raw/{x}").unwrap(), "/raw/{{x}}");
    }

    #[test]
    fn test_to_engine_path_rejections() {
        let cases = [
            "",
            "users/:id",
            "/users/:",
            "/users/:id/:id",
            "/files/*path/edit",
            "/odd/:a:b",
        ];
        for pattern in cases {
            let err = to_engine_path(pattern).unwrap_err();
            assert!(
                matches!(err, WaymarkError::InvalidPattern { .. }),
                "expected InvalidPattern for {pattern:?}, got {err:?}"
            );
        }
    }
}
