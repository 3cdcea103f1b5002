use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{BlacklistWordId, Entity, ProductId};
use stockroom_products::{BlacklistWord, Product, ProductDraft, ProductHistory};

use super::r#trait::{
    BlacklistStore, HistoryStore, ProductStore, StoreError, BLACKLIST_WORD_CONSTRAINT,
    PRODUCT_NAME_CONSTRAINT,
};

fn poisoned() -> StoreError {
    StoreError::backend("lock poisoned")
}

/// In-memory product table for tests/dev.
///
/// Soft-deleted rows are kept but hidden from every read. Live names are unique
/// case-insensitively, mirroring the Postgres partial index.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    rows: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_taken(rows: &HashMap<ProductId, Product>, name: &str, except: Option<ProductId>) -> bool {
        let wanted = name.to_lowercase();
        rows.values().any(|p| {
            !p.is_deleted() && Some(p.id) != except && p.name.to_lowercase() == wanted
        })
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.get(&id).filter(|p| !p.is_deleted()).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let wanted = name.to_lowercase();
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows
            .values()
            .find(|p| !p.is_deleted() && p.name.to_lowercase() == wanted)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let mut live: Vec<Product> = rows.values().filter(|p| !p.is_deleted()).cloned().collect();
        live.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(live)
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        if Self::name_taken(&rows, &draft.name, None) {
            return Err(StoreError::UniqueViolation {
                constraint: PRODUCT_NAME_CONSTRAINT.to_string(),
            });
        }

        let product = Product::from_draft(ProductId::new(), draft, Utc::now());
        rows.insert(product.id(), product.clone());
        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<Product, StoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        match rows.get(&product.id()) {
            Some(current) if !current.is_deleted() => {}
            _ => return Err(StoreError::NotFound),
        }
        if Self::name_taken(&rows, &product.name, Some(product.id())) {
            return Err(StoreError::UniqueViolation {
                constraint: PRODUCT_NAME_CONSTRAINT.to_string(),
            });
        }

        let updated = Product {
            updated_at: Utc::now(),
            ..product.clone()
        };
        rows.insert(updated.id(), updated.clone());
        Ok(updated)
    }

    async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        match rows.get_mut(&id) {
            Some(p) if !p.is_deleted() => {
                p.deleted_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }
}

/// In-memory append-only history log.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    entries: RwLock<Vec<ProductHistory>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, entry: ProductHistory) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.push(entry);
        Ok(())
    }

    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<ProductHistory>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .iter()
            .filter(|e| e.product_id == product_id)
            .cloned()
            .collect())
    }
}

/// In-memory blacklist.
#[derive(Debug, Default)]
pub struct InMemoryBlacklistStore {
    words: RwLock<HashMap<BlacklistWordId, BlacklistWord>>,
}

impl InMemoryBlacklistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlacklistStore for InMemoryBlacklistStore {
    async fn list_all(&self) -> Result<Vec<BlacklistWord>, StoreError> {
        let words = self.words.read().map_err(|_| poisoned())?;
        let mut all: Vec<BlacklistWord> = words.values().cloned().collect();
        all.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(all)
    }

    async fn add(&self, word: String) -> Result<BlacklistWord, StoreError> {
        let mut words = self.words.write().map_err(|_| poisoned())?;
        let wanted = word.to_lowercase();
        if words.values().any(|w| w.word.to_lowercase() == wanted) {
            return Err(StoreError::UniqueViolation {
                constraint: BLACKLIST_WORD_CONSTRAINT.to_string(),
            });
        }

        let entry = BlacklistWord::new(word);
        words.insert(entry.id(), entry.clone());
        Ok(entry)
    }

    async fn delete(&self, id: BlacklistWordId) -> Result<(), StoreError> {
        let mut words = self.words.write().map_err(|_| poisoned())?;
        words.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
