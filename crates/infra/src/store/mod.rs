//! Storage collaborators: product table, history log, blacklist.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryBlacklistStore, InMemoryHistoryStore, InMemoryProductStore};
pub use postgres::{ensure_schema, PostgresBlacklistStore, PostgresHistoryStore, PostgresProductStore};
pub use r#trait::{
    BlacklistStore, HistoryStore, ProductStore, StoreError, BLACKLIST_WORD_CONSTRAINT,
    PRODUCT_NAME_CONSTRAINT,
};
