//! Application services composing the domain rules with the stores.

pub mod blacklist_service;
pub mod product_service;

pub use blacklist_service::BlacklistService;
pub use product_service::ProductService;
