//! Infrastructure layer: storage adapters and the services that orchestrate them.

pub mod service;
pub mod store;

pub use service::{BlacklistService, ProductService};
