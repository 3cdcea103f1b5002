use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::InvalidName(_)
        | DomainError::InvalidCategory { .. }
        | DomainError::PriceOutOfRange { .. }
        | DomainError::NegativeQuantity { .. }
        | DomainError::ForbiddenWord { .. }
        | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::DuplicateName { .. } | DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Storage(msg) => {
            tracing::error!(error = %msg, "storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, answering `400 invalid_id` on failure.
pub fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid id"))
}
