//! End-to-end router tests.
//!
//! These tests exercise the complete path:
//!   HTTP request -> engine match -> handler adapter -> handler -> error interception -> response
//!
//! They build a `FrozenRouter` and drive it with `TestClient`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use http::StatusCode;
use serde::{Deserialize, Serialize};

use waymark_core::{DuplicatePolicy, WaymarkError};
use waymark_http::errors::Abort;
use waymark_http::{ErrorContext, Method, RequestContext, Route, RouteList, Router};
use waymark_test::client::TestClient;

#[derive(Debug, Deserialize, Serialize)]
struct ProductParams {
    locale: String,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct UserParams {
    id: u32,
}

async fn show_product(_ctx: RequestContext, params: ProductParams) -> axum::Json<ProductParams> {
    axum::Json(params)
}

fn client(router: Router) -> TestClient {
    TestClient::from_router(router.build().unwrap())
}

// ============================================================================
// URL generation
// ============================================================================

/// Generating by name substitutes every placeholder of the registered pattern.
#[test]
fn test_generate_url_by_name_for_all_routes() {
    let mut router = Router::new();
    router
        .get("home", "/", |_ctx: RequestContext| async { "" })
        .get("user", "/users/:id", |_ctx: RequestContext| async { "" })
        .get("product", "/:locale/products/:id", |_ctx: RequestContext| async { "" })
        .get("asset", "/static/*path", |_ctx: RequestContext| async { "" });
    let frozen = router.build().unwrap();

    let params = HashMap::from([
        ("id", "42"),
        ("locale", "cs"),
        ("path", "css/site.css"),
    ]);
    let cases = [
        ("home", "/"),
        ("user", "/users/42"),
        ("product", "/cs/products/42"),
        ("asset", "/static/css/site.css"),
    ];
    for (name, expected) in cases {
        assert_eq!(frozen.generate_url_by_name(name, &params).unwrap(), expected);
    }
}

/// A placeholder without a value is an error, never a half-built URL.
#[test]
fn test_generate_url_missing_parameter() {
    let mut router = Router::new();
    router.get("product", "/:locale/products/:id", |_ctx: RequestContext| async { "" });
    let frozen = router.build().unwrap();

    let params = HashMap::from([("locale", "cs")]);
    assert!(matches!(
        frozen.generate_url_by_name("product", &params),
        Err(WaymarkError::MissingParameter { name, .. }) if name == "id"
    ));
    assert!(matches!(
        frozen.generate_url_by_name("nope", &params),
        Err(WaymarkError::RouteNotFound(name)) if name == "nope"
    ));
}

// ============================================================================
// Route lists
// ============================================================================

/// Nested lists register each route under the join of all ancestor prefixes.
#[tokio::test]
async fn test_nested_route_lists_dispatch_and_generate() {
    let mut items = RouteList::with_prefix("/items");
    items.get("item", "/:id", |ctx: RequestContext| async move {
        format!("item {}", ctx.param("id").unwrap_or("?"))
    });

    let mut v2 = RouteList::with_prefix("/v2");
    v2.get("status", "/status", |_ctx: RequestContext| async { "up" })
        .add_child(items);

    let mut api = RouteList::with_prefix("/api");
    api.add_child(v2);

    let mut router = Router::new();
    router.add_route_list(&api);
    let frozen = router.build().unwrap();

    assert_eq!(frozen.routes().get("item").unwrap().pattern(), "/api/v2/items/:id");
    let params = HashMap::from([("id", 9)]);
    assert_eq!(
        frozen.generate_url_by_name("item", &params).unwrap(),
        "/api/v2/items/9"
    );

    let client = TestClient::from_router(frozen);
    assert_eq!(client.get("/api/v2/status").await.text(), "up");
    assert_eq!(client.get("/api/v2/items/9").await.text(), "item 9");
}

/// The same handler serves the root pattern and the `/v1` prefixed pattern.
#[tokio::test]
async fn test_product_scenario_root_and_prefixed() {
    let mut v1 = RouteList::with_prefix("/v1");
    v1.get("v1:product", "/:locale/products/:id", show_product);

    let mut root = RouteList::new();
    root.get("product", "/:locale/products/:id", show_product)
        .add_child(v1);

    let mut router = Router::new();
    router.add_route_list(&root);
    let client = client(router);

    let expected = serde_json::json!({"locale": "cs", "id": 42});

    let response = client.get("/cs/products/42").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<serde_json::Value>().unwrap(), expected);

    let response = client.get("/v1/cs/products/42").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<serde_json::Value>().unwrap(), expected);
}

/// One `Route` value mounted at the root and under `/v1` of a single tree.
#[tokio::test]
async fn test_shared_route_object_under_root_and_v1() {
    let product = Route::new("product", "/:locale/products/:id", show_product, Method::Get);

    let mut v1 = RouteList::with_prefix("/v1");
    v1.add_route(product.clone());
    let mut root = RouteList::new();
    root.add_route(product).add_child(v1);

    let mut router = Router::new();
    router.add_route_list(&root);
    let client = client(router);

    let expected = serde_json::json!({"locale": "cs", "id": 42});
    for path in ["/cs/products/42", "/v1/cs/products/42"] {
        let response = client.get(path).await;
        assert_eq!(response.status_code(), 200, "{path}");
        assert_eq!(response.json::<serde_json::Value>().unwrap(), expected);
    }
}

// ============================================================================
// Path parameter decoding
// ============================================================================

/// The decoded struct carries the integer before the handler body runs.
#[tokio::test]
async fn test_param_handler_receives_integer() {
    let mut router = Router::new();
    router.get("user", "/users/:id", |_ctx: RequestContext, p: UserParams| async move {
        assert_eq!(p.id, 42);
        format!("{}", p.id + 1)
    });

    let response = client(router).get("/users/42").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "43");
}

/// A required field with no placeholder value stops the request with 400.
#[tokio::test]
async fn test_missing_required_field_is_400_and_handler_skipped() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);

    let mut router = Router::new();
    router.get("user", "/people/:name", move |_ctx: RequestContext, _p: UserParams| {
        flag.store(true, Ordering::SeqCst);
        async { "ran" }
    });

    let response = client(router).get("/people/ada").await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["description"], "missing required path parameter 'id'");
    assert!(!ran.load(Ordering::SeqCst));
}

/// Parameters decode into a map as well as a struct.
#[tokio::test]
async fn test_map_params() {
    let mut router = Router::new();
    router.get(
        "pair",
        "/pair/:left/:right",
        |_ctx: RequestContext, p: HashMap<String, String>| async move {
            format!("{}+{}", p["left"], p["right"])
        },
    );

    assert_eq!(client(router).get("/pair/a/b").await.text(), "a+b");
}

/// The generic-typed registration names the parameter type explicitly.
#[tokio::test]
async fn test_typed_route() {
    let mut router = Router::new();
    router.add_typed_route::<ProductParams, _, _, _>(
        "product",
        "/:locale/products/:id",
        |_ctx, p| async move { format!("{}:{}", p.locale, p.id) },
        Method::Get,
    );

    assert_eq!(client(router).get("/en/products/7").await.text(), "en:7");
}

/// A parameter type that is not a struct or map fails the build.
#[test]
fn test_non_struct_params_fail_build() {
    let mut router = Router::new();
    router.get("ids", "/ids/:id", |_ctx: RequestContext, _ids: Vec<u32>| async { "" });
    assert!(matches!(
        router.build(),
        Err(WaymarkError::HandlerShape { found, .. }) if found == "a sequence"
    ));
}

// ============================================================================
// Error handlers
// ============================================================================

/// A 404 handler renders unmatched paths verbatim.
#[tokio::test]
async fn test_custom_404_handler() {
    let mut router = Router::new();
    router
        .get("home", "/", |_ctx: RequestContext| async { "home" })
        .set_error_handler(StatusCode::NOT_FOUND, |ctx: ErrorContext| async move {
            (StatusCode::NOT_FOUND, format!("Custom 404: {}", ctx.path()))
        });

    let response = client(router).get("/nowhere").await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.text(), "Custom 404: /nowhere");
}

/// Without a 404 handler, the default handler renders unmatched paths.
#[tokio::test]
async fn test_default_404_body() {
    let mut router = Router::new();
    router.get("home", "/", |_ctx: RequestContext| async { "home" });

    let response = client(router).get("/nowhere").await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(
        response.json::<serde_json::Value>().unwrap(),
        serde_json::json!({
            "error": "An error occurred",
            "description": "No specific handler defined for this status",
        })
    );
}

/// A specific 404 handler wins over the default whichever is set first.
#[tokio::test]
async fn test_404_handler_wins_regardless_of_order() {
    let mut router = Router::new();
    router
        .set_error_handler(StatusCode::NOT_FOUND, |_ctx: ErrorContext| async {
            (StatusCode::NOT_FOUND, "specific")
        })
        .set_default_error_handler(|ctx: ErrorContext| async move { (ctx.status(), "default") });

    let client = client(router);
    assert_eq!(client.get("/missing").await.text(), "specific");
}

/// Route handlers decide the status; the 500 handler writes the body.
#[tokio::test]
async fn test_500_handler_renders_aborted_route() {
    let mut router = Router::new();
    router
        .get("boom", "/boom", |_ctx: RequestContext| async {
            Abort::with_detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
        })
        .set_error_handler(StatusCode::INTERNAL_SERVER_ERROR, |ctx: ErrorContext| async move {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Custom 500: {}", ctx.detail().unwrap_or("")),
            )
        });

    let response = client(router).get("/boom").await;
    assert_eq!(response.status_code(), 500);
    assert_eq!(response.text(), "Custom 500: database unavailable");
}

/// Statuses without a handler, including 405, go to the default handler.
#[tokio::test]
async fn test_default_handler_for_405_and_custom_statuses() {
    let mut router = Router::new();
    router
        .get("home", "/", |_ctx: RequestContext| async { "home" })
        .get("teapot", "/teapot", |_ctx: RequestContext| async {
            StatusCode::IM_A_TEAPOT
        })
        .set_default_error_handler(|ctx: ErrorContext| async move {
            (ctx.status(), format!("default {}", ctx.status().as_u16()))
        });
    let client = client(router);

    let response = client.request(http::Method::DELETE, "/").await;
    assert_eq!(response.status_code(), 405);
    assert_eq!(response.text(), "default 405");

    let response = client.get("/teapot").await;
    assert_eq!(response.status_code(), 418);
    assert_eq!(response.text(), "default 418");
}

// ============================================================================
// Re-registration
// ============================================================================

/// Overwrite keeps only the latest registration, in the registry and in dispatch.
#[tokio::test]
async fn test_overwrite_keeps_latest_registration() {
    let mut router = Router::new();
    router
        .get("page", "/old-page", |_ctx: RequestContext| async { "old" })
        .get("page", "/new-page", |_ctx: RequestContext| async { "new" });
    let frozen = router.build().unwrap();

    assert_eq!(frozen.routes().len(), 1);
    assert_eq!(frozen.routes().get("page").unwrap().pattern(), "/new-page");

    let client = TestClient::from_router(frozen);
    assert_eq!(client.get("/new-page").await.text(), "new");
    assert_eq!(client.get("/old-page").await.status_code(), 404);
}

/// Reject turns a repeated name into a build error.
#[test]
fn test_reject_policy() {
    let mut router = Router::new();
    router
        .duplicate_policy(DuplicatePolicy::Reject)
        .get("page", "/a", |_ctx: RequestContext| async { "" })
        .get("page", "/b", |_ctx: RequestContext| async { "" });

    assert!(matches!(
        router.build(),
        Err(WaymarkError::DuplicateRouteName(name)) if name == "page"
    ));
}

// ============================================================================
// Registration variants
// ============================================================================

/// Every per-verb helper routes its own method.
#[tokio::test]
async fn test_verb_helpers() {
    let echo = |ctx: RequestContext| async move {
        ([("x-method", ctx.method().to_string())], ctx.method().to_string())
    };

    let mut router = Router::new();
    router
        .get("get", "/r", echo)
        .post("post", "/r", echo)
        .put("put", "/r", echo)
        .patch("patch", "/r", echo)
        .delete("delete", "/r", echo)
        .head("head", "/r", echo)
        .options("options", "/r", echo)
        .connect("connect", "/tunnel", echo)
        .trace("trace", "/r", echo);

    assert_eq!(router.route("head").unwrap().method(), Method::Head);
    assert_eq!(router.route("connect").unwrap().method(), Method::Connect);
    assert_eq!(router.route("connect").unwrap().pattern(), "/tunnel");

    let client = client(router);

    for method in ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "TRACE"] {
        let method = http::Method::from_bytes(method.as_bytes()).unwrap();
        let response = client.request(method.clone(), "/r").await;
        assert_eq!(response.text(), method.as_str());
    }

    // HEAD has its own route instead of falling back to GET.
    let response = client.head("/r").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("x-method"), Some("HEAD"));

    let response = client.get("/tunnel").await;
    assert_eq!(response.status_code(), 405);
}

/// A prebuilt route object, with the URL built from inside another handler.
#[tokio::test]
async fn test_route_object_and_url_for() {
    let mut router = Router::new();
    router
        .add_route_object(Route::new(
            "product",
            "/:locale/products/:id",
            show_product,
            Method::Get,
        ))
        .get("latest", "/latest", |ctx: RequestContext| async move {
            let params = HashMap::from([("locale", "en"), ("id", "1")]);
            ctx.url_for("product", &params).map_err(Abort::from)
        });

    let client = client(router);
    assert_eq!(client.get("/latest").await.text(), "/en/products/1");
    assert_eq!(client.get("/en/products/1").await.status_code(), 200);
}
