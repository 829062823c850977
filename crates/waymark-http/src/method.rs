//! HTTP methods a route can be bound to.

use std::fmt;
use std::str::FromStr;

use axum::routing::MethodFilter;
use serde::{Deserialize, Serialize};

use waymark_core::{WaymarkError, WaymarkResult};

/// An HTTP verb.
///
/// Serializes to and parses from its wire token (`"GET"`, `"POST"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Connect,
    Trace,
}

impl Method {
    /// Every supported verb, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Connect,
        Self::Trace,
    ];

    /// Returns the wire-protocol token for this verb.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
        }
    }

    /// Returns the equivalent [`http::Method`].
    pub fn to_http(self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
            Self::Put => http::Method::PUT,
            Self::Patch => http::Method::PATCH,
            Self::Delete => http::Method::DELETE,
            Self::Head => http::Method::HEAD,
            Self::Options => http::Method::OPTIONS,
            Self::Connect => http::Method::CONNECT,
            Self::Trace => http::Method::TRACE,
        }
    }

    /// Returns the engine's method filter for this verb.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::UnsupportedMethod`] if the engine cannot route
    /// this verb.
    pub fn filter(self) -> WaymarkResult<MethodFilter> {
        MethodFilter::try_from(self.to_http())
            .map_err(|_| WaymarkError::UnsupportedMethod(self.as_str().to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = WaymarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WaymarkError::UnsupportedMethod(s.to_string()))
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        method.to_http()
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = WaymarkError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}
