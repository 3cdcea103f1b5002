use std::sync::Arc;

use tracing::{info, instrument};

use stockroom_core::{BlacklistWordId, DomainError, DomainResult};
use stockroom_products::{normalize_word, BlacklistWord};

use crate::store::{BlacklistStore, BLACKLIST_WORD_CONSTRAINT};

/// Administrative operations on the word blacklist.
#[derive(Clone)]
pub struct BlacklistService {
    store: Arc<dyn BlacklistStore>,
}

impl BlacklistService {
    pub fn new(store: Arc<dyn BlacklistStore>) -> Self {
        Self { store }
    }

    pub async fn list_words(&self) -> DomainResult<Vec<BlacklistWord>> {
        Ok(self.store.list_all().await?)
    }

    #[instrument(skip(self), err)]
    pub async fn add_word(&self, raw: &str) -> DomainResult<BlacklistWord> {
        let word = normalize_word(raw)?;
        let added = self.store.add(word).await.map_err(|e| {
            if e.is_violation_of(BLACKLIST_WORD_CONSTRAINT) {
                DomainError::conflict(format!("'{}' is already blacklisted", raw.trim()))
            } else {
                e.into()
            }
        })?;

        info!(word_id = %added.id, word = %added.word, "blacklist word added");
        Ok(added)
    }

    #[instrument(skip(self), fields(word_id = %id), err)]
    pub async fn delete_word(&self, id: BlacklistWordId) -> DomainResult<()> {
        self.store.delete(id).await?;
        info!("blacklist word removed");
        Ok(())
    }
}
