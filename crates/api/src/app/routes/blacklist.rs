use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use stockroom_core::BlacklistWordId;

use crate::app::{
    dto::{self, AddWordRequest},
    errors,
    services::AppServices,
};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_words).post(add_word))
        .route("/:id", delete(delete_word))
}

async fn list_words(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.blacklist.list_words().await {
        Ok(words) => Json(words.iter().map(dto::word_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn add_word(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<AddWordRequest>,
) -> axum::response::Response {
    match services.blacklist.add_word(&body.word).await {
        Ok(word) => (StatusCode::CREATED, Json(dto::word_to_json(&word))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn delete_word(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: BlacklistWordId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.blacklist.delete_word(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
