//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router around already-constructed services.
pub fn build_app(services: Arc<AppServices>) -> Router {
    routes::router().layer(ServiceBuilder::new().layer(Extension(services)))
}
