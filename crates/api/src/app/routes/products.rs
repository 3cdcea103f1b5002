use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::ProductId;
use stockroom_products::ProductDraft;

use crate::app::{
    dto,
    errors,
    services::AppServices,
};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(add_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/history", get(product_history))
}

async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.products.list_products().await {
        Ok(products) => {
            Json(products.iter().map(dto::product_to_json).collect::<Vec<_>>()).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn add_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(draft): Json<ProductDraft>,
) -> axum::response::Response {
    match services.products.add_product(draft).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.products.get_product(id).await {
        Ok(product) => Json(dto::product_to_json(&product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.products.update_product(id, draft).await {
        Ok(product) => Json(dto::product_to_json(&product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.products.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn product_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.products.product_history(id).await {
        Ok(entries) => {
            Json(entries.iter().map(dto::history_to_json).collect::<Vec<_>>()).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
