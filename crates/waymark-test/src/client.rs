//! In-process HTTP test client.
//!
//! [`TestClient`] drives an axum application (usually a
//! [`FrozenRouter`](waymark_http::FrozenRouter)) through `tower::ServiceExt::oneshot`
//! without opening a socket, and [`TestResponse`] holds what came back.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use waymark_http::{RequestContext, Router};
//! use waymark_test::client::TestClient;
//!
//! async fn example() {
//!     let mut router = Router::new();
//!     router.get("hello", "/hello", |_ctx: RequestContext| async { "Hello, World!" });
//!
//!     let client = TestClient::from_router(router.build().unwrap());
//!     let response = client.get("/hello").await;
//!     assert_eq!(response.status_code(), 200);
//!     assert_eq!(response.text(), "Hello, World!");
//! }
//! ```

use axum::body::Body;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use waymark_http::FrozenRouter;

/// A test client for making simulated HTTP requests against an axum application.
#[derive(Debug, Clone)]
pub struct TestClient {
    app: axum::Router,
}

impl TestClient {
    /// Creates a test client wrapping an axum router.
    pub const fn new(app: axum::Router) -> Self {
        Self { app }
    }

    /// Creates a test client serving a frozen router.
    pub fn from_router(router: FrozenRouter) -> Self {
        Self::new(router.into_axum_router())
    }

    /// Sends a GET request to the given path.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path).await
    }

    /// Sends a POST request with a plain-text body.
    pub async fn post(&self, path: &str, body: impl Into<Bytes>) -> TestResponse {
        self.request_with_body(Method::POST, path, body.into(), "text/plain")
            .await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post_json(&self, path: &str, value: &serde_json::Value) -> TestResponse {
        let body = Bytes::from(value.to_string());
        self.request_with_body(Method::POST, path, body, "application/json")
            .await
    }

    /// Sends a PUT request with a plain-text body.
    pub async fn put(&self, path: &str, body: impl Into<Bytes>) -> TestResponse {
        self.request_with_body(Method::PUT, path, body.into(), "text/plain")
            .await
    }

    /// Sends a PATCH request with a plain-text body.
    pub async fn patch(&self, path: &str, body: impl Into<Bytes>) -> TestResponse {
        self.request_with_body(Method::PATCH, path, body.into(), "text/plain")
            .await
    }

    /// Sends a DELETE request to the given path.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path).await
    }

    /// Sends a HEAD request to the given path.
    pub async fn head(&self, path: &str) -> TestResponse {
        self.request(Method::HEAD, path).await
    }

    /// Sends an OPTIONS request to the given path.
    pub async fn options(&self, path: &str) -> TestResponse {
        self.request(Method::OPTIONS, path).await
    }

    /// Sends a bodiless request with any method.
    pub async fn request(&self, method: Method, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("request builder should not fail");

        self.send(req).await
    }

    /// Sends a request with a body and content type.
    async fn request_with_body(
        &self,
        method: Method,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(http::header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("request builder should not fail");

        self.send(req).await
    }

    /// Sends a prebuilt request through the application.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(req)
            .await
            .expect("router should not error");

        let status = response.status();
        let headers = response.headers().clone();

        let body_bytes = response
            .into_body()
            .collect()
            .await
            .map_or_else(|_| Bytes::new(), http_body_util::Collected::to_bytes);

        TestResponse {
            status,
            headers,
            body: body_bytes.to_vec(),
        }
    }
}

/// The response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body as raw bytes.
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Returns the response body as a UTF-8 string.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Deserializes the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Returns the numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the value of a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns `true` if the response has the specified header.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Returns `true` if the response body contains the given text.
    pub fn contains(&self, text: &str) -> bool {
        self.text().contains(text)
    }
}
