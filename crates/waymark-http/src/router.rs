//! The route registration builder and the frozen, servable router.
//!
//! Routing has two phases. During the build phase a [`Router`] collects
//! routes, route lists and error handlers. [`Router::build`] consumes it and
//! returns a [`FrozenRouter`]: an immutable value holding the route registry
//! and the engine router, ready to be served. Nothing can be registered once
//! a router is frozen.
//!
//! # Examples
//!
//! ```
//! use serde::Deserialize;
//! use waymark_http::{RequestContext, Router};
//!
//! #[derive(Deserialize)]
//! struct UserParams {
//!     id: u32,
//! }
//!
//! let mut router = Router::new();
//! router
//!     .get("home", "/", |_ctx: RequestContext| async { "welcome" })
//!     .get("user", "/users/:id", |_ctx: RequestContext, p: UserParams| async move {
//!         format!("user {}", p.id)
//!     });
//!
//! let frozen = router.build().unwrap();
//! assert_eq!(frozen.routes().len(), 2);
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use axum::body::{to_bytes, HttpBody};
use bytes::Bytes;
use axum::extract::{FromRequestParts, RawPathParams, Request};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use http::StatusCode;
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use waymark_core::logging::route_span;
use waymark_core::{DuplicatePolicy, Settings, WaymarkError, WaymarkResult};

use crate::context::{RequestContext, RouteInfo};
use crate::errors::{self, Abort, ErrorContext, ErrorHandler, ErrorHandlers};
use crate::handler::{Handler, IntoHandler, Invoke};
use crate::method::Method;
use crate::urls::pattern::to_engine_path;
use crate::urls::registry::RouteRegistry;
use crate::urls::reverse;
use crate::urls::route::Route;
use crate::urls::route_list::RouteList;

/// One (method, pattern) registration waiting to be handed to the engine.
struct Endpoint {
    name: String,
    method: Method,
    pattern: String,
    engine_path: String,
    invoke: Invoke,
    /// The registration call that created the endpoint. Every route of one
    /// route list shares a batch.
    batch: usize,
}

/// The build-phase router.
///
/// Registration methods return `&mut Self` so calls can be chained. A
/// registration that cannot be honored (a malformed pattern, a parameter type
/// that is not a struct, a rejected duplicate name) is recorded and reported
/// by [`build`](Self::build).
pub struct Router {
    settings: Settings,
    registry: RouteRegistry,
    endpoints: Vec<Endpoint>,
    error_handlers: ErrorHandlers,
    errors: Vec<WaymarkError>,
    batch: usize,
}

macro_rules! verb_helpers {
    ($($fn_name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers a `", stringify!($method), "` route.")]
            pub fn $fn_name<M>(
                &mut self,
                name: &str,
                pattern: &str,
                handler: impl IntoHandler<M>,
            ) -> &mut Self {
                self.add_route(name, pattern, handler, Method::$method)
            }
        )*
    };
}

impl Router {
    /// Creates a router with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Creates a router configured by `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            registry: RouteRegistry::default(),
            endpoints: Vec::new(),
            error_handlers: ErrorHandlers::default(),
            errors: Vec::new(),
            batch: 0,
        }
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sets how a repeated route name is treated.
    pub fn duplicate_policy(&mut self, policy: DuplicatePolicy) -> &mut Self {
        self.settings.duplicate_names = policy;
        self
    }

    /// Registers `handler` for `method` on `pattern` under `name`.
    ///
    /// The handler may take only a [`RequestContext`], or a context and a
    /// parameter struct decoded from the path.
    pub fn add_route<M>(
        &mut self,
        name: &str,
        pattern: &str,
        handler: impl IntoHandler<M>,
        method: Method,
    ) -> &mut Self {
        self.register_one(name, pattern, handler.into_handler(), &[method]);
        self
    }

    /// Registers a handler whose parameter type is named explicitly.
    ///
    /// ```
    /// use serde::Deserialize;
    /// use waymark_http::{Method, RequestContext, Router};
    ///
    /// #[derive(Deserialize)]
    /// struct Item {
    ///     id: u64,
    /// }
    ///
    /// let mut router = Router::new();
    /// router.add_typed_route::<Item, _, _, _>("item", "/items/:id", |_ctx, item| async move {
    ///     item.id.to_string()
    /// }, Method::Get);
    /// assert!(router.build().is_ok());
    /// ```
    pub fn add_typed_route<T, F, Fut, R>(
        &mut self,
        name: &str,
        pattern: &str,
        handler: F,
        method: Method,
    ) -> &mut Self
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(RequestContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.register_one(name, pattern, Handler::with_params(handler), &[method]);
        self
    }

    /// Registers a prebuilt route. Its children are not registered.
    pub fn add_route_object(&mut self, route: Route) -> &mut Self {
        self.register_one(
            route.name(),
            route.pattern(),
            route.handler().clone(),
            &[route.method()],
        );
        self
    }

    /// Registers one handler for several methods as a single registration.
    ///
    /// The registry keeps the route under the last method in `methods`.
    pub fn add_multi_methods_route<M>(
        &mut self,
        name: &str,
        pattern: &str,
        handler: impl IntoHandler<M>,
        methods: &[Method],
    ) -> &mut Self {
        self.register_one(name, pattern, handler.into_handler(), methods);
        self
    }

    verb_helpers! {
        get => Get,
        post => Post,
        put => Put,
        patch => Patch,
        delete => Delete,
        head => Head,
        options => Options,
        connect => Connect,
        trace => Trace,
    }

    /// Registers every route of a route tree under its absolute pattern.
    ///
    /// The tree counts as one registration: a route mounted under several
    /// prefixes of the same tree is routed under all of them, and the
    /// registry keeps the last flattened entry for its name.
    pub fn add_route_list(&mut self, list: &RouteList) -> &mut Self {
        self.batch += 1;
        for (pattern, route) in list.flatten() {
            self.register(
                route.name(),
                &pattern,
                route.handler().clone(),
                &[route.method()],
            );
        }
        self
    }

    /// Installs the error handler for one status.
    ///
    /// A handler for `404 Not Found` also renders requests that match no
    /// route.
    pub fn set_error_handler<F, Fut, R>(&mut self, status: StatusCode, handler: F) -> &mut Self
    where
        F: Fn(ErrorContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.error_handlers.set(status, ErrorHandler::new(handler));
        self
    }

    /// Replaces the handler used for error statuses without a specific one.
    pub fn set_default_error_handler<F, Fut, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(ErrorContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.error_handlers.set_default(ErrorHandler::new(handler));
        self
    }

    /// Returns the routes registered so far.
    pub const fn routes(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Looks up a registered route by name.
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.registry.get(name)
    }

    /// Builds the URL of a named route.
    ///
    /// # Errors
    ///
    /// Fails if no route has that name or a placeholder has no value.
    pub fn generate_url_by_name<K, V, S>(
        &self,
        name: &str,
        params: &HashMap<K, V, S>,
    ) -> WaymarkResult<String>
    where
        K: Borrow<str> + Hash + Eq,
        V: fmt::Display,
        S: BuildHasher,
    {
        self.registry.generate_url_by_name(name, params)
    }

    /// Builds a URL from a pattern.
    ///
    /// # Errors
    ///
    /// Fails if a placeholder has no value.
    pub fn generate_url_by_pattern<K, V, S>(
        &self,
        pattern: &str,
        params: &HashMap<K, V, S>,
    ) -> WaymarkResult<String>
    where
        K: Borrow<str> + Hash + Eq,
        V: fmt::Display,
        S: BuildHasher,
    {
        reverse::generate_url_by_pattern(pattern, params)
    }

    /// Freezes the router.
    ///
    /// # Errors
    ///
    /// Returns the first registration error, if any was recorded, followed by
    /// [`WaymarkError::DuplicateEndpoint`] when two different routes claim
    /// the same method and pattern, [`WaymarkError::InvalidPattern`] when the
    /// engine rejects a pattern, and [`WaymarkError::UnsupportedMethod`] when
    /// the engine cannot route a verb.
    pub fn build(self) -> WaymarkResult<FrozenRouter> {
        let Self {
            settings,
            registry,
            endpoints,
            error_handlers,
            errors,
            batch: _,
        } = self;

        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }

        // Distinct engine paths in registration order, each with its methods.
        let mut paths: Vec<(String, String, Vec<Endpoint>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for endpoint in endpoints {
            let slot = *index.entry(endpoint.engine_path.clone()).or_insert_with(|| {
                paths.push((endpoint.engine_path.clone(), endpoint.pattern.clone(), Vec::new()));
                paths.len() - 1
            });
            let group = &mut paths[slot].2;

            match group.iter().find(|e| e.method == endpoint.method) {
                Some(existing) if existing.name == endpoint.name => continue,
                Some(_) => {
                    return Err(WaymarkError::DuplicateEndpoint {
                        method: endpoint.method.to_string(),
                        pattern: endpoint.pattern,
                    });
                }
                None => group.push(endpoint),
            }
        }

        let mut matcher = matchit::Router::new();
        for (engine_path, pattern, _) in &paths {
            matcher
                .insert(engine_path.as_str(), ())
                .map_err(|e| WaymarkError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
        }

        let registry = Arc::new(registry);
        let mut service = axum::Router::new();
        for (engine_path, _, group) in paths {
            let mut method_router: MethodRouter = MethodRouter::new();
            for endpoint in group {
                let filter = endpoint.method.filter()?;
                let dispatch = Dispatch {
                    route: Arc::new(RouteInfo {
                        name: endpoint.name,
                        pattern: endpoint.pattern,
                        method: endpoint.method,
                    }),
                    invoke: endpoint.invoke,
                    registry: Arc::clone(&registry),
                    max_body_bytes: settings.max_body_bytes,
                };
                method_router =
                    method_router.on(filter, move |request: Request| dispatch.clone().handle(request));
            }
            service = service.route(&engine_path, method_router);
        }

        let service = service
            .fallback(errors::no_route)
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(error_handlers),
                errors::intercept,
            ))
            .layer(TraceLayer::new_for_http());

        tracing::debug!(routes = registry.len(), mode = %settings.mode, "router built");
        Ok(FrozenRouter { registry, service })
    }

    /// Builds the router and serves it on `addr`.
    ///
    /// # Errors
    ///
    /// Returns the build error, or a bind or serve failure.
    pub async fn run(self, addr: &str) -> WaymarkResult<()> {
        self.build()?.run(addr).await
    }

    fn register_one(&mut self, name: &str, pattern: &str, handler: Handler, methods: &[Method]) {
        self.batch += 1;
        self.register(name, pattern, handler, methods);
    }

    fn register(&mut self, name: &str, pattern: &str, handler: Handler, methods: &[Method]) {
        let Some(&last) = methods.last() else {
            self.fail(WaymarkError::ConfigurationError(format!(
                "route '{name}' was registered without any method"
            )));
            return;
        };

        let engine_path = match to_engine_path(pattern) {
            Ok(path) => path,
            Err(err) => return self.fail(err),
        };
        let invoke = match handler.adapt(pattern) {
            Ok(invoke) => invoke,
            Err(err) => return self.fail(err),
        };

        let batch = self.batch;
        let same_batch = self
            .endpoints
            .iter()
            .any(|e| e.name == name && e.batch == batch);

        if same_batch {
            tracing::debug!(name, pattern, "route mounted again within one route list");
        } else if let Some(previous) = self.registry.get(name) {
            match self.settings.duplicate_names {
                DuplicatePolicy::Reject => {
                    return self.fail(WaymarkError::DuplicateRouteName(name.to_string()));
                }
                DuplicatePolicy::Overwrite => {
                    tracing::warn!(
                        name,
                        previous = previous.pattern(),
                        pattern,
                        "route name re-registered; replacing the earlier route"
                    );
                    self.endpoints.retain(|e| e.name != name);
                }
            }
        }

        for &method in methods {
            tracing::debug!(name, %method, pattern, "registered route");
            self.endpoints.push(Endpoint {
                name: name.to_string(),
                method,
                pattern: pattern.to_string(),
                engine_path: engine_path.clone(),
                invoke: Arc::clone(&invoke),
                batch,
            });
        }

        self.registry
            .insert(name.to_string(), Route::new(name, pattern, handler, last));
    }

    fn fail(&mut self, err: WaymarkError) {
        tracing::error!(error = %err, "route registration failed");
        self.errors.push(err);
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.registry.len())
            .field("endpoints", &self.endpoints.len())
            .field("errors", &self.errors)
            .field("mode", &self.settings.mode)
            .finish_non_exhaustive()
    }
}

/// The engine handler for one endpoint.
#[derive(Clone)]
struct Dispatch {
    route: Arc<RouteInfo>,
    invoke: Invoke,
    registry: Arc<RouteRegistry>,
    max_body_bytes: usize,
}

impl Dispatch {
    async fn handle(self, request: Request) -> Response {
        let span = route_span(
            &self.route.name,
            self.route.method.as_str(),
            &self.route.pattern,
        );

        async move {
            let (mut parts, body) = request.into_parts();

            let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
                Ok(raw) => raw
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
                Err(rejection) => {
                    return Abort::with_detail(StatusCode::BAD_REQUEST, rejection.body_text())
                        .into_response();
                }
            };

            // Bodiless requests (most GETs) skip the buffering step.
            let body = if body.is_end_stream() {
                Bytes::new()
            } else {
                match to_bytes(body, self.max_body_bytes).await {
                    Ok(bytes) => bytes,
                    Err(err) => return body_error(err).into_response(),
                }
            };

            let ctx = RequestContext::new(parts, body, params, self.route, self.registry);
            (self.invoke)(ctx).await
        }
        .instrument(span)
        .await
    }
}

fn body_error(err: axum::Error) -> Abort {
    let inner = err.into_inner();
    if inner.downcast_ref::<LengthLimitError>().is_some() {
        Abort::with_detail(
            StatusCode::PAYLOAD_TOO_LARGE,
            "request body exceeds the configured limit",
        )
    } else {
        Abort::with_detail(
            StatusCode::BAD_REQUEST,
            format!("failed to read request body: {inner}"),
        )
    }
}

/// A built router, ready to serve.
///
/// Cloning is cheap: the registry is shared and the engine router is
/// reference counted internally.
#[derive(Clone)]
pub struct FrozenRouter {
    registry: Arc<RouteRegistry>,
    service: axum::Router,
}

impl FrozenRouter {
    /// Returns the route registry.
    pub fn routes(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Builds the URL of a named route.
    ///
    /// # Errors
    ///
    /// Fails if no route has that name or a placeholder has no value.
    pub fn generate_url_by_name<K, V, S>(
        &self,
        name: &str,
        params: &HashMap<K, V, S>,
    ) -> WaymarkResult<String>
    where
        K: Borrow<str> + Hash + Eq,
        V: fmt::Display,
        S: BuildHasher,
    {
        self.registry.generate_url_by_name(name, params)
    }

    /// Builds a URL from a pattern.
    ///
    /// # Errors
    ///
    /// Fails if a placeholder has no value.
    pub fn generate_url_by_pattern<K, V, S>(
        &self,
        pattern: &str,
        params: &HashMap<K, V, S>,
    ) -> WaymarkResult<String>
    where
        K: Borrow<str> + Hash + Eq,
        V: fmt::Display,
        S: BuildHasher,
    {
        reverse::generate_url_by_pattern(pattern, params)
    }

    /// Returns the underlying engine router.
    pub const fn axum_router(&self) -> &axum::Router {
        &self.service
    }

    /// Converts into the underlying engine router.
    pub fn into_axum_router(self) -> axum::Router {
        self.service
    }

    /// Transforms the underlying engine router, e.g. to add layers.
    pub fn map_native(self, f: impl FnOnce(axum::Router) -> axum::Router) -> Self {
        Self {
            registry: self.registry,
            service: f(self.service),
        }
    }

    /// Serves on `addr` until the server fails.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::Bind`] if the address cannot be bound and
    /// [`WaymarkError::Serve`] if serving fails.
    pub async fn run(self, addr: &str) -> WaymarkResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| WaymarkError::Bind {
                address: addr.to_string(),
                source,
            })?;

        tracing::info!("Starting server at http://{addr}/");
        self.serve(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::Serve`] if serving fails.
    pub async fn serve(self, listener: TcpListener) -> WaymarkResult<()> {
        axum::serve(listener, self.service)
            .await
            .map_err(WaymarkError::Serve)
    }

    /// Serves on `listener` until `signal` resolves, then drains connections.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::Serve`] if serving fails.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> WaymarkResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.service)
            .with_graceful_shutdown(signal)
            .await
            .map_err(WaymarkError::Serve)
    }
}

impl fmt::Debug for FrozenRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenRouter")
            .field("routes", &self.registry.names())
            .finish_non_exhaustive()
    }
}
