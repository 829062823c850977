//! The handler adapter.
//!
//! A route handler has one of two shapes:
//!
//! - **raw**: `Fn(RequestContext) -> impl Future<Output = impl IntoResponse>`
//! - **with params**: `Fn(RequestContext, T) -> impl Future<Output = impl IntoResponse>`
//!   where `T` is a struct (or map) decoded from the path placeholders.
//!
//! Both are normalized into one erased invoker at registration time, so the
//! dispatch path never inspects handler shapes.
//!
//! ```
//! use serde::Deserialize;
//! use waymark_http::{Handler, RequestContext};
//!
//! #[derive(Deserialize)]
//! struct UserParams {
//!     id: u32,
//! }
//!
//! let raw = Handler::raw(|_ctx: RequestContext| async { "pong" });
//! let typed = Handler::with_params(|_ctx: RequestContext, p: UserParams| async move {
//!     format!("user {}", p.id)
//! });
//! assert!(!raw.takes_params());
//! assert!(typed.takes_params());
//! ```

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};

use waymark_core::{WaymarkError, WaymarkResult};

use crate::context::RequestContext;
use crate::decode;
use crate::urls::pattern::placeholders;

/// A boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// The normalized form every handler is adapted into.
pub(crate) type Invoke = Arc<dyn Fn(RequestContext) -> BoxFuture<Response> + Send + Sync>;

/// A route handler in one of the two accepted shapes.
///
/// Handlers are reference counted, so cloning a `Handler` (or a `Route`
/// holding one) is cheap.
#[derive(Clone)]
pub enum Handler {
    /// Receives only the request context.
    Raw(RawHandler),
    /// Receives the request context and a value decoded from the path.
    Params(ParamHandler),
}

/// A handler that takes only the request context.
#[derive(Clone)]
pub struct RawHandler {
    call: Invoke,
}

/// A handler that takes a decoded parameter value.
#[derive(Clone)]
pub struct ParamHandler {
    target: &'static str,
    shape: fn() -> ParamShape,
    call: Invoke,
}

impl ParamHandler {
    /// Returns the type name of the decoded parameter value.
    pub const fn target(&self) -> &'static str {
        self.target
    }

    /// Returns how the parameter type deserializes.
    pub fn shape(&self) -> ParamShape {
        (self.shape)()
    }
}

impl Handler {
    /// Creates a handler from a closure taking only the request context.
    pub fn raw<F, Fut, R>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let call: Invoke = Arc::new(move |ctx: RequestContext| -> BoxFuture<Response> {
            let fut = f(ctx);
            Box::pin(async move { fut.await.into_response() })
        });
        Self::Raw(RawHandler { call })
    }

    /// Creates a handler whose second argument is decoded from the path.
    ///
    /// Decoding happens before the closure runs. If it fails the request is
    /// answered with `400 Bad Request` and the closure is not called.
    pub fn with_params<T, F, Fut, R>(f: F) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(RequestContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let f = Arc::new(f);
        let call: Invoke = Arc::new(move |mut ctx: RequestContext| -> BoxFuture<Response> {
            let f = Arc::clone(&f);
            Box::pin(async move {
                match decode::path_params::<T>(&mut ctx).await {
                    Ok(params) => f(ctx, params).await.into_response(),
                    Err(err) => {
                        tracing::debug!(
                            route = ctx.route_name(),
                            error = %err,
                            "path parameter decoding failed"
                        );
                        err.into_response()
                    }
                }
            })
        });

        Self::Params(ParamHandler {
            target: std::any::type_name::<T>(),
            shape: probe::<T>,
            call,
        })
    }

    /// Returns `true` if this handler decodes path parameters.
    pub const fn takes_params(&self) -> bool {
        matches!(self, Self::Params(_))
    }

    /// Produces the invoker registered for `pattern`.
    ///
    /// Parameter types are checked once here: they must deserialize as a
    /// struct or a map.
    pub(crate) fn adapt(&self, pattern: &str) -> WaymarkResult<Invoke> {
        match self {
            Self::Raw(raw) => Ok(Arc::clone(&raw.call)),
            Self::Params(typed) => {
                match typed.shape() {
                    ParamShape::Struct { name, fields } => {
                        let names = placeholders(pattern);
                        for field in fields.iter().filter(|f| !names.contains(*f)) {
                            tracing::warn!(
                                pattern,
                                params = name,
                                field,
                                "parameter field has no matching placeholder"
                            );
                        }
                    }
                    ParamShape::Map => {}
                    ParamShape::Other(found) => {
                        return Err(WaymarkError::HandlerShape {
                            target: typed.target.to_string(),
                            found,
                        });
                    }
                }
                Ok(Arc::clone(&typed.call))
            }
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(_) => f.debug_struct("RawHandler").finish_non_exhaustive(),
            Self::Params(typed) => f
                .debug_struct("ParamHandler")
                .field("target", &typed.target)
                .finish_non_exhaustive(),
        }
    }
}

/// Conversion into a [`Handler`].
///
/// Implemented for [`Handler`] itself and for closures of either accepted
/// shape. The `Marker` parameter only disambiguates the implementations and
/// is inferred from the closure's arity.
pub trait IntoHandler<Marker>: Sized {
    /// Performs the conversion.
    fn into_handler(self) -> Handler;
}

impl IntoHandler<Self> for Handler {
    fn into_handler(self) -> Handler {
        self
    }
}

impl<F, Fut, R> IntoHandler<(RequestContext,)> for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn into_handler(self) -> Handler {
        Handler::raw(self)
    }
}

impl<F, Fut, R, T> IntoHandler<(RequestContext, T)> for F
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(RequestContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn into_handler(self) -> Handler {
        Handler::with_params(self)
    }
}

// ============================================================
// Shape probe
// ============================================================

/// How a parameter type deserializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamShape {
    /// A struct with named fields.
    Struct {
        name: &'static str,
        fields: &'static [&'static str],
    },
    /// A map keyed by placeholder name.
    Map,
    /// Anything else, described for error messages.
    Other(String),
}

/// Runs `T`'s `Deserialize` impl against a deserializer that records the
/// first request it receives and then aborts.
pub fn probe<T: DeserializeOwned>() -> ParamShape {
    let found = Cell::new(None);
    let _ = T::deserialize(ShapeProbe { found: &found });
    found
        .take()
        .unwrap_or_else(|| ParamShape::Other("an unknown type".to_string()))
}

struct ShapeProbe<'a> {
    found: &'a Cell<Option<ParamShape>>,
}

impl ShapeProbe<'_> {
    fn record<V>(&self, shape: ParamShape) -> Result<V, de::value::Error> {
        if let Some(previous) = self.found.take() {
            self.found.set(Some(previous));
        } else {
            self.found.set(Some(shape));
        }
        Err(de::Error::custom("shape probe"))
    }

    fn other<V>(&self, found: &str) -> Result<V, de::value::Error> {
        self.record(ParamShape::Other(found.to_string()))
    }
}

macro_rules! probe_other {
    ($($method:ident => $found:literal,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
                self.other($found)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ShapeProbe<'_> {
    type Error = de::value::Error;

    probe_other! {
        deserialize_any => "a self-describing value",
        deserialize_bool => "a bool",
        deserialize_i8 => "an integer",
        deserialize_i16 => "an integer",
        deserialize_i32 => "an integer",
        deserialize_i64 => "an integer",
        deserialize_u8 => "an integer",
        deserialize_u16 => "an integer",
        deserialize_u32 => "an integer",
        deserialize_u64 => "an integer",
        deserialize_f32 => "a float",
        deserialize_f64 => "a float",
        deserialize_char => "a char",
        deserialize_str => "a string",
        deserialize_string => "a string",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_option => "an option",
        deserialize_unit => "a unit",
        deserialize_seq => "a sequence",
        deserialize_identifier => "an identifier",
        deserialize_ignored_any => "an ignored value",
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.other("a unit struct")
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.other("a tuple")
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.other("a tuple struct")
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        self.record(ParamShape::Map)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.record(ParamShape::Struct { name, fields })
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.other("an enum")
    }
}
