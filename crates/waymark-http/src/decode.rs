//! Path parameter decoding for typed handlers.

use axum::extract::path::ErrorKind;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::context::RequestContext;
use crate::errors::Abort;

/// Why path parameters could not be decoded into a handler's type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A required field has no placeholder value.
    #[error("missing required path parameter '{0}'")]
    MissingField(String),

    /// A placeholder value does not convert to the field's type.
    #[error("path parameter '{key}' has value '{value}', expected {expected}")]
    Conversion {
        key: String,
        value: String,
        expected: String,
    },

    /// Any other decoding failure.
    #[error("cannot decode path parameters: {0}")]
    Malformed(String),
}

impl From<PathRejection> for DecodeError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => match err.into_kind() {
                ErrorKind::ParseErrorAtKey {
                    key,
                    value,
                    expected_type,
                } => Self::Conversion {
                    key,
                    value,
                    expected: expected_type.to_string(),
                },
                ErrorKind::ParseErrorAtIndex {
                    index,
                    value,
                    expected_type,
                } => Self::Conversion {
                    key: index.to_string(),
                    value,
                    expected: expected_type.to_string(),
                },
                ErrorKind::Message(message) => match missing_field(&message) {
                    Some(field) => Self::MissingField(field.to_string()),
                    None => Self::Malformed(message),
                },
                other => Self::Malformed(other.to_string()),
            },
            other => Self::Malformed(other.body_text()),
        }
    }
}

impl IntoResponse for DecodeError {
    fn into_response(self) -> Response {
        Abort::with_detail(StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Extracts the field name from serde's "missing field `name`" message.
fn missing_field(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
}

/// Decodes the matched path parameters of `ctx` into `T`.
pub(crate) async fn path_params<T>(ctx: &mut RequestContext) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Send,
{
    let Path(value) = Path::<T>::from_request_parts(ctx.parts_mut(), &()).await?;
    Ok(value)
}
