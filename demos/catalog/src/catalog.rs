//! Catalog routes and handlers.

use std::collections::{BTreeMap, HashMap};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use waymark_core::settings::Settings;
use waymark_http::{Abort, ErrorContext, Method, RequestContext, RouteList, Router};

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    pub price_cents: u32,
}

const PRODUCTS: &[Product] = &[
    Product { id: 7, name: "Compass", price_cents: 2_450 },
    Product { id: 42, name: "Trail map", price_cents: 990 },
    Product { id: 108, name: "Waymark paint", price_cents: 1_275 },
];

fn find_product(id: u32) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

#[derive(Debug, Deserialize)]
pub struct ProductParams {
    pub locale: String,
    pub id: u32,
}

async fn show_product(_ctx: RequestContext, params: ProductParams) -> Json<serde_json::Value> {
    Json(json!({ "locale": params.locale, "id": params.id }))
}

async fn product_details(
    ctx: RequestContext,
    params: ProductParams,
) -> Result<Json<serde_json::Value>, Abort> {
    let product = find_product(params.id).ok_or_else(|| {
        Abort::with_detail(StatusCode::NOT_FOUND, format!("no product with id {}", params.id))
    })?;

    let mut link = HashMap::new();
    link.insert("locale", params.locale.clone());
    link.insert("id", product.id.to_string());
    let canonical = ctx.url_for("product", &link)?;

    Ok(Json(json!({
        "locale": params.locale,
        "product": product,
        "canonical": canonical,
    })))
}

async fn list_products(ctx: RequestContext) -> Result<Json<serde_json::Value>, Abort> {
    let locale = ctx.param("locale").unwrap_or("en").to_string();
    let detail_route = if ctx.route_name().starts_with("v1:") {
        "v1:product"
    } else {
        "product"
    };

    let mut items = Vec::with_capacity(PRODUCTS.len());
    for product in PRODUCTS {
        let mut link = HashMap::new();
        link.insert("locale", locale.clone());
        link.insert("id", product.id.to_string());
        let url = ctx.url_for(detail_route, &link)?;
        items.push(json!({ "name": product.name, "url": url }));
    }
    Ok(Json(json!({ "locale": locale, "products": items })))
}

async fn route_table(ctx: RequestContext) -> Json<BTreeMap<String, serde_json::Value>> {
    let table = ctx
        .registry()
        .iter()
        .map(|(name, route)| {
            (
                name.clone(),
                json!({ "method": route.method().as_str(), "pattern": route.pattern() }),
            )
        })
        .collect();
    Json(table)
}

async fn health(_ctx: RequestContext) -> &'static str {
    "ok"
}

async fn fail(_ctx: RequestContext) -> Abort {
    Abort::with_detail(StatusCode::INTERNAL_SERVER_ERROR, "the demo failed on purpose")
}

async fn not_found(ctx: ErrorContext) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Custom 404",
            "path": ctx.path(),
            "description": ctx.detail(),
        })),
    )
}

async fn server_error(ctx: ErrorContext) -> (StatusCode, Json<serde_json::Value>) {
    tracing::error!(path = ctx.path(), detail = ?ctx.detail(), "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Custom 500", "description": ctx.detail() })),
    )
}

/// Builds the catalog router. Registration errors surface from `build`.
pub fn router(settings: Settings) -> Router {
    let mut router = Router::with_settings(settings);

    router
        .get("product", "/:locale/products/:id", show_product)
        .get("product-details", "/:locale/products/:id/details", product_details)
        .get("products", "/:locale/products", list_products)
        .add_multi_methods_route("health", "/health", health, &[Method::Head, Method::Get])
        .get("routes", "/routes", route_table)
        .get("boom", "/boom", fail);

    let mut v1 = RouteList::with_prefix("/v1");
    v1.get("v1:product", "/:locale/products/:id", show_product)
        .get("v1:product-details", "/:locale/products/:id/details", product_details)
        .get("v1:products", "/:locale/products", list_products);

    router
        .add_route_list(&v1)
        .set_error_handler(StatusCode::NOT_FOUND, not_found)
        .set_error_handler(StatusCode::INTERNAL_SERVER_ERROR, server_error);

    router
}
