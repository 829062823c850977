//! Error statuses and error interception.
//!
//! Responses are produced in two stages. A route handler only decides the
//! status: it returns a bare [`StatusCode`] or an [`Abort`], optionally with
//! a detail message. Every response with a status of 400 or above then passes
//! through the interception stage, which hands it to the handler registered
//! for that exact status, or to the default handler, and that handler writes
//! the final response.
//!
//! The built-in default handler answers with a JSON body:
//!
//! ```json
//! {"error": "An error occurred", "description": "No specific handler defined for this status"}
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::{StatusCode, Uri};

use waymark_core::WaymarkError;

use crate::handler::BoxFuture;

/// Description used by the default handler when a response carries no detail.
pub const NO_SPECIFIC_HANDLER: &str = "No specific handler defined for this status";

/// A detail message attached to an error response as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail(pub String);

impl ErrorDetail {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An error status decided by a handler, rendered later by the interception
/// stage.
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use waymark_http::errors::Abort;
///
/// let abort = Abort::with_detail(StatusCode::NOT_FOUND, "no product 42");
/// assert_eq!(abort.status(), StatusCode::NOT_FOUND);
/// assert_eq!(abort.detail(), Some("no product 42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    status: StatusCode,
    detail: Option<String>,
}

impl Abort {
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            detail: None,
        }
    }

    pub fn with_detail(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: Some(detail.into()),
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self.status),
            None => write!(f, "{}", self.status),
        }
    }
}

impl std::error::Error for Abort {}

impl From<StatusCode> for Abort {
    fn from(status: StatusCode) -> Self {
        Self::new(status)
    }
}

impl From<WaymarkError> for Abort {
    fn from(err: WaymarkError) -> Self {
        Self::with_detail(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl IntoResponse for Abort {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        if let Some(detail) = self.detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

/// What an error handler receives.
pub struct ErrorContext {
    status: StatusCode,
    method: http::Method,
    uri: Uri,
    detail: Option<String>,
    response: Response,
}

impl ErrorContext {
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn method(&self) -> &http::Method {
        &self.method
    }

    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the detail attached by [`Abort::with_detail`], if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the response the route produced.
    pub const fn response(&self) -> &Response {
        &self.response
    }

    /// Gives back the response the route produced, unchanged.
    pub fn into_response(self) -> Response {
        self.response
    }
}

impl fmt::Debug for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorContext")
            .field("status", &self.status)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("detail", &self.detail)
            .finish_non_exhaustive()
    }
}

type ErrorCall = Arc<dyn Fn(ErrorContext) -> BoxFuture<Response> + Send + Sync>;

/// A handler that renders error responses.
#[derive(Clone)]
pub struct ErrorHandler {
    call: ErrorCall,
}

impl ErrorHandler {
    /// Wraps an async closure taking an [`ErrorContext`].
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(ErrorContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let call: ErrorCall = Arc::new(move |ctx: ErrorContext| -> BoxFuture<Response> {
            let fut = f(ctx);
            Box::pin(async move { fut.await.into_response() })
        });
        Self { call }
    }

    /// The built-in handler writing the JSON error body.
    pub fn builtin() -> Self {
        Self::new(default_error_response)
    }

    pub async fn call(&self, ctx: ErrorContext) -> Response {
        (self.call)(ctx).await
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler").finish_non_exhaustive()
    }
}

async fn default_error_response(ctx: ErrorContext) -> Response {
    let description = ctx.detail().unwrap_or(NO_SPECIFIC_HANDLER);
    let body = serde_json::json!({
        "error": "An error occurred",
        "description": description,
    });
    (ctx.status(), Json(body)).into_response()
}

/// The per-status error handler table plus the default handler.
#[derive(Debug, Clone)]
pub(crate) struct ErrorHandlers {
    by_status: HashMap<StatusCode, ErrorHandler>,
    default: ErrorHandler,
}

impl Default for ErrorHandlers {
    fn default() -> Self {
        Self {
            by_status: HashMap::new(),
            default: ErrorHandler::builtin(),
        }
    }
}

impl ErrorHandlers {
    pub(crate) fn set(&mut self, status: StatusCode, handler: ErrorHandler) {
        self.by_status.insert(status, handler);
    }

    pub(crate) fn set_default(&mut self, handler: ErrorHandler) {
        self.default = handler;
    }

    pub(crate) fn resolve(&self, status: StatusCode) -> &ErrorHandler {
        self.by_status.get(&status).unwrap_or(&self.default)
    }
}

/// Returns `true` for statuses the interception stage renders.
pub fn is_error_status(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

/// Middleware passing every error response through the error handlers.
pub(crate) async fn intercept(
    State(handlers): State<Arc<ErrorHandlers>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();
    if !is_error_status(status) {
        return response;
    }

    let detail = response
        .extensions()
        .get::<ErrorDetail>()
        .map(|d| d.0.clone());
    tracing::debug!(%status, %method, path = uri.path(), "rendering error response");

    let ctx = ErrorContext {
        status,
        method,
        uri,
        detail,
        response,
    };
    handlers.resolve(status).call(ctx).await
}

/// Fallback for requests that match no route.
pub(crate) async fn no_route() -> Abort {
    Abort::new(StatusCode::NOT_FOUND)
}
