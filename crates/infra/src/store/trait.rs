use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{BlacklistWordId, DomainError, ProductId};
use stockroom_products::{BlacklistWord, Product, ProductDraft, ProductHistory};

/// Unique constraint guarding live product names (case-insensitive).
pub const PRODUCT_NAME_CONSTRAINT: &str = "products_name_live_idx";

/// Unique constraint guarding blacklist words (case-insensitive).
pub const BLACKLIST_WORD_CONSTRAINT: &str = "blacklist_words_word_idx";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// The addressed record does not exist (or is soft-deleted).
    #[error("record not found")]
    NotFound,

    /// Anything else: connectivity, lock poisoning, decoding, ...
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn is_violation_of(&self, constraint: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint: c } if c == constraint)
    }
}

/// Generic mapping. Callers that know which unique constraint matters (product
/// names) translate `UniqueViolation` themselves before falling back to this.
impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => DomainError::NotFound,
            StoreError::UniqueViolation { constraint } => {
                DomainError::conflict(format!("unique constraint violated: {constraint}"))
            }
            StoreError::Backend(msg) => DomainError::Storage(msg),
        }
    }
}

/// Product persistence.
///
/// Reads never return soft-deleted records. Name lookups are case-insensitive.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// All live products, oldest first.
    async fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Insert a new product; the store assigns id and timestamps.
    async fn create(&self, draft: ProductDraft) -> Result<Product, StoreError>;

    /// Overwrite a live product and bump `updated_at`.
    async fn update(&self, product: &Product) -> Result<Product, StoreError>;

    async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError>;
}

/// Append-only product change history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: ProductHistory) -> Result<(), StoreError>;

    /// Entries for a product in the order they were changed.
    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<ProductHistory>, StoreError>;
}

/// Banned words for product names.
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    /// Every word, ordered by word.
    async fn list_all(&self) -> Result<Vec<BlacklistWord>, StoreError>;

    async fn add(&self, word: String) -> Result<BlacklistWord, StoreError>;

    async fn delete(&self, id: BlacklistWordId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        (**self).get_by_name(name).await
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_all().await
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        (**self).create(draft).await
    }

    async fn update(&self, product: &Product) -> Result<Product, StoreError> {
        (**self).update(product).await
    }

    async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).soft_delete(id).await
    }
}

#[async_trait]
impl<S> HistoryStore for Arc<S>
where
    S: HistoryStore + ?Sized,
{
    async fn append(&self, entry: ProductHistory) -> Result<(), StoreError> {
        (**self).append(entry).await
    }

    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<ProductHistory>, StoreError> {
        (**self).list_by_product(product_id).await
    }
}

#[async_trait]
impl<S> BlacklistStore for Arc<S>
where
    S: BlacklistStore + ?Sized,
{
    async fn list_all(&self) -> Result<Vec<BlacklistWord>, StoreError> {
        (**self).list_all().await
    }

    async fn add(&self, word: String) -> Result<BlacklistWord, StoreError> {
        (**self).add(word).await
    }

    async fn delete(&self, id: BlacklistWordId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
