//! Product lifecycle orchestration.
//!
//! ```text
//! AddProduct(draft)
//!   1. load blacklist, reject a forbidden name
//!   2. look up the live product holding the name, validate
//!   3. create (store assigns id + timestamps)
//!
//! UpdateProduct(id, draft)
//!   1. load the live product (NotFound otherwise)
//!   2. look up the live product holding the name, validate (own name allowed)
//!   3. check the price against the stored category (category is never changed)
//!   4. load blacklist, reject a forbidden name
//!   5. diff stored vs candidate, append one history entry per change (best-effort)
//!   6. apply name/description/price/quantity and persist
//! ```
//!
//! Every write re-reads the blacklist; nothing is cached between calls.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use stockroom_core::{DomainError, DomainResult, ProductId};
use stockroom_products::{
    diff, find_blacklisted_word, validate, validate_price, Product, ProductDraft, ProductHistory,
};

use crate::store::{BlacklistStore, HistoryStore, ProductStore, StoreError, PRODUCT_NAME_CONSTRAINT};

/// Map a product write failure, turning a name-index violation into `DuplicateName`.
fn product_write_error(err: StoreError, name: &str) -> DomainError {
    if err.is_violation_of(PRODUCT_NAME_CONSTRAINT) {
        return DomainError::DuplicateName {
            name: name.to_string(),
        };
    }
    err.into()
}

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    history: Arc<dyn HistoryStore>,
    blacklist: Arc<dyn BlacklistStore>,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        history: Arc<dyn HistoryStore>,
        blacklist: Arc<dyn BlacklistStore>,
    ) -> Self {
        Self {
            products,
            history,
            blacklist,
        }
    }

    async fn ensure_not_blacklisted(&self, name: &str) -> DomainResult<()> {
        let words = self.blacklist.list_all().await?;
        if let Some(hit) = find_blacklisted_word(name, &words) {
            warn!(name, word = %hit.word, "rejected blacklisted product name");
            return Err(DomainError::ForbiddenWord {
                word: hit.word.clone(),
            });
        }
        Ok(())
    }

    async fn validate_candidate(
        &self,
        draft: &ProductDraft,
        candidate_id: Option<ProductId>,
    ) -> DomainResult<()> {
        let holder = self.products.get_by_name(&draft.name).await?;
        validate(draft, candidate_id, holder.as_ref())
    }

    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    pub async fn add_product(&self, draft: ProductDraft) -> DomainResult<Product> {
        self.ensure_not_blacklisted(&draft.name).await?;
        self.validate_candidate(&draft, None).await?;

        let name = draft.name.clone();
        let product = self
            .products
            .create(draft)
            .await
            .map_err(|e| product_write_error(e, &name))?;

        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[instrument(skip(self, draft), fields(product_id = %id, name = %draft.name), err)]
    pub async fn update_product(&self, id: ProductId, draft: ProductDraft) -> DomainResult<Product> {
        let existing = self
            .products
            .get_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)?;

        self.validate_candidate(&draft, Some(existing.id)).await?;
        validate_price(&existing.category, draft.price)?;
        self.ensure_not_blacklisted(&draft.name).await?;

        let candidate = existing.with_changes(&draft);
        let changes = diff(&existing, &candidate);
        debug!(changed_fields = changes.len(), "computed product diff");

        let changed_at = Utc::now();
        let mut recorded = 0usize;
        for change in changes {
            let field = change.field;
            let entry = ProductHistory::record(id, change, changed_at);
            match self.history.append(entry).await {
                Ok(()) => recorded += 1,
                Err(e) => warn!(%field, error = %e, "failed to record product history entry"),
            }
        }

        let updated = self
            .products
            .update(&candidate)
            .await
            .map_err(|e| {
                if recorded > 0 {
                    warn!(recorded, error = %e, "product write failed; history entries were kept");
                }
                product_write_error(e, &candidate.name)
            })?;

        info!("product updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        self.products.soft_delete(id).await?;
        info!("product deleted");
        Ok(())
    }

    /// History of a product; empty when nothing was recorded or the id is unknown.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn product_history(&self, id: ProductId) -> DomainResult<Vec<ProductHistory>> {
        Ok(self.history.list_by_product(id).await?)
    }

    pub async fn get_product(&self, id: ProductId) -> DomainResult<Product> {
        self.products.get_by_id(id).await?.ok_or(DomainError::NotFound)
    }

    pub async fn list_products(&self) -> DomainResult<Vec<Product>> {
        Ok(self.products.list_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use stockroom_core::NameViolation;
    use stockroom_products::TrackedField;

    use crate::store::{InMemoryBlacklistStore, InMemoryHistoryStore, InMemoryProductStore};

    struct Fixture {
        service: ProductService,
        products: Arc<InMemoryProductStore>,
        blacklist: Arc<InMemoryBlacklistStore>,
    }

    fn fixture() -> Fixture {
        let products = Arc::new(InMemoryProductStore::new());
        let blacklist = Arc::new(InMemoryBlacklistStore::new());
        let service = ProductService::new(
            products.clone(),
            Arc::new(InMemoryHistoryStore::new()),
            blacklist.clone(),
        );
        Fixture {
            service,
            products,
            blacklist,
        }
    }

    fn draft(name: &str, price: f64, quantity: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: "Elektronika".to_string(),
            description: "desc".to_string(),
            price,
            quantity,
        }
    }

    /// History store that fails the first `fail_first` appends, then delegates.
    struct FlakyHistoryStore {
        inner: InMemoryHistoryStore,
        fail_first: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HistoryStore for FlakyHistoryStore {
        async fn append(&self, entry: ProductHistory) -> Result<(), StoreError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.fail_first {
                return Err(StoreError::backend("history table unavailable"));
            }
            self.inner.append(entry).await
        }

        async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<ProductHistory>, StoreError> {
            self.inner.list_by_product(product_id).await
        }
    }

    #[tokio::test]
    async fn add_product_creates_without_history() {
        let f = fixture();
        let created = f.service.add_product(draft("Widget1", 120.0, 3)).await.unwrap();

        assert_eq!(f.service.get_product(created.id).await.unwrap(), created);
        assert!(f.service.product_history(created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_product_rejects_duplicate_name_in_any_case() {
        let f = fixture();
        f.service.add_product(draft("Widget1", 120.0, 3)).await.unwrap();

        for name in ["Widget1", "WIDGET1", "widget1"] {
            let err = f.service.add_product(draft(name, 120.0, 3)).await.unwrap_err();
            assert!(matches!(err, DomainError::DuplicateName { .. }), "name {name}");
        }
    }

    #[tokio::test]
    async fn add_product_rejects_blacklisted_name_regardless_of_case() {
        let f = fixture();
        f.blacklist.add("BLOKUJ".to_string()).await.unwrap();

        let err = f
            .service
            .add_product(draft("SuperBlokujPhone", 120.0, 1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::ForbiddenWord {
                word: "BLOKUJ".to_string()
            }
        );
        assert!(f.products.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blacklist_is_reread_on_every_write() {
        let f = fixture();
        f.service.add_product(draft("SpamPhone1", 120.0, 1)).await.unwrap();

        f.blacklist.add("spam".to_string()).await.unwrap();

        let err = f.service.add_product(draft("SpamPhone2", 120.0, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::ForbiddenWord { .. }));
    }

    #[tokio::test]
    async fn add_product_reports_validation_failures() {
        let f = fixture();

        let err = f.service.add_product(draft("ab", 120.0, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidName(NameViolation::Length { .. })));

        let err = f.service.add_product(draft("Phone1", 49.99, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::PriceOutOfRange { .. }));

        let err = f.service.add_product(draft("Phone1", 100.0, -2)).await.unwrap_err();
        assert_eq!(err, DomainError::NegativeQuantity { quantity: -2 });
    }

    #[tokio::test]
    async fn update_records_only_changed_fields() {
        let f = fixture();
        let created = f.service.add_product(draft("Phone1", 500.0, 2)).await.unwrap();

        let updated = f
            .service
            .update_product(created.id, draft("Phone1", 750.0, 5))
            .await
            .unwrap();
        assert_eq!(updated.price, 750.0);
        assert_eq!(updated.quantity, 5);

        let history = f.service.product_history(created.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].field, TrackedField::Price);
        assert_eq!(history[0].old_value, "500.00");
        assert_eq!(history[0].new_value, "750.00");
        assert_eq!(history[1].field, TrackedField::Quantity);
        assert_eq!(history[1].old_value, "2");
        assert_eq!(history[1].new_value, "5");
        assert!(history.iter().all(|h| h.product_id == created.id));
    }

    #[tokio::test]
    async fn update_may_keep_own_name_but_not_take_another() {
        let f = fixture();
        let first = f.service.add_product(draft("Widget1", 100.0, 1)).await.unwrap();
        f.service.add_product(draft("Widget2", 100.0, 1)).await.unwrap();

        f.service
            .update_product(first.id, draft("Widget1", 200.0, 1))
            .await
            .unwrap();

        let err = f
            .service
            .update_product(first.id, draft("widget2", 200.0, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateName { .. }));
    }

    #[tokio::test]
    async fn update_rejects_blacklisted_name_without_mutation() {
        let f = fixture();
        let created = f.service.add_product(draft("Phone1", 100.0, 1)).await.unwrap();
        f.blacklist.add("blokuj".to_string()).await.unwrap();

        let err = f
            .service
            .update_product(created.id, draft("BlokujPhone", 300.0, 7))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ForbiddenWord { .. }));

        assert_eq!(f.service.get_product(created.id).await.unwrap(), created);
        assert!(f.service.product_history(created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_stored_category() {
        let f = fixture();
        let created = f.service.add_product(draft("Phone1", 100.0, 1)).await.unwrap();

        let update = ProductDraft {
            category: "ODZIEŻ".to_string(),
            ..draft("Phone1", 100.0, 1)
        };
        let updated = f.service.update_product(created.id, update).await.unwrap();

        assert_eq!(updated.category, "Elektronika");
        assert!(f.service.product_history(created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_product_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .update_product(ProductId::new(), draft("Phone1", 100.0, 1))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn deleted_product_cannot_be_updated_or_deleted_again() {
        let f = fixture();
        let created = f.service.add_product(draft("Phone1", 100.0, 1)).await.unwrap();

        f.service.delete_product(created.id).await.unwrap();

        let err = f
            .service
            .update_product(created.id, draft("Phone1", 200.0, 1))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
        assert_eq!(f.service.delete_product(created.id).await, Err(DomainError::NotFound));
        assert_eq!(f.service.get_product(created.id).await, Err(DomainError::NotFound));
    }

    #[tokio::test]
    async fn deleted_name_can_be_reused() {
        let f = fixture();
        let created = f.service.add_product(draft("Phone1", 100.0, 1)).await.unwrap();
        f.service.delete_product(created.id).await.unwrap();

        let again = f.service.add_product(draft("Phone1", 100.0, 1)).await.unwrap();
        assert_ne!(again.id, created.id);
    }

    #[tokio::test]
    async fn history_of_unknown_product_is_empty() {
        let f = fixture();
        assert!(f.service.product_history(ProductId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_survives_product_deletion() {
        let f = fixture();
        let created = f.service.add_product(draft("Phone1", 100.0, 1)).await.unwrap();
        f.service
            .update_product(created.id, draft("Phone2", 100.0, 1))
            .await
            .unwrap();
        f.service.delete_product(created.id).await.unwrap();

        let history = f.service.product_history(created.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].field, TrackedField::Name);
    }

    #[tokio::test]
    async fn failed_history_append_does_not_block_the_update() {
        let products = Arc::new(InMemoryProductStore::new());
        let history = Arc::new(FlakyHistoryStore {
            inner: InMemoryHistoryStore::new(),
            fail_first: 1,
            calls: AtomicUsize::new(0),
        });
        let service = ProductService::new(
            products,
            history.clone(),
            Arc::new(InMemoryBlacklistStore::new()),
        );

        let created = service.add_product(draft("Phone1", 500.0, 2)).await.unwrap();
        let updated = service
            .update_product(created.id, draft("Phone9", 750.0, 5))
            .await
            .unwrap();

        assert_eq!(updated.name, "Phone9");
        assert_eq!(history.calls.load(Ordering::SeqCst), 3);

        // The Name entry was lost; Price and Quantity were still written.
        let fields: Vec<_> = service
            .product_history(created.id)
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.field)
            .collect();
        assert_eq!(fields, vec![TrackedField::Price, TrackedField::Quantity]);
    }

    #[tokio::test]
    async fn list_products_excludes_deleted() {
        let f = fixture();
        let a = f.service.add_product(draft("Phone1", 100.0, 1)).await.unwrap();
        let b = f.service.add_product(draft("Phone2", 100.0, 1)).await.unwrap();
        f.service.delete_product(a.id).await.unwrap();

        let ids: Vec<_> = f
            .service
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![b.id]);
    }

    #[tokio::test]
    async fn update_price_must_fit_the_stored_category() {
        let f = fixture();
        let novel = ProductDraft {
            category: "Książki".to_string(),
            ..draft("Novel1", 100.0, 1)
        };
        let created = f.service.add_product(novel).await.unwrap();

        let update = ProductDraft {
            category: "Elektronika".to_string(),
            ..draft("Novel1", 40000.0, 1)
        };
        let err = f.service.update_product(created.id, update).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::PriceOutOfRange {
                category: "Książki".to_string(),
                price: 40000.0,
                min: 5.0,
                max: 500.0,
            }
        );

        assert_eq!(f.service.get_product(created.id).await.unwrap(), created);
        assert!(f.service.product_history(created.id).await.unwrap().is_empty());
    }

    /// Product store whose name lookup misses a concurrent writer: reads see no
    /// holder, writes fail on the given unique constraint.
    struct RacingProductStore {
        inner: InMemoryProductStore,
        constraint: &'static str,
    }

    impl RacingProductStore {
        fn violation(&self) -> StoreError {
            StoreError::UniqueViolation {
                constraint: self.constraint.to_string(),
            }
        }
    }

    #[async_trait]
    impl ProductStore for RacingProductStore {
        async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
            self.inner.get_by_id(id).await
        }

        async fn get_by_name(&self, _name: &str) -> Result<Option<Product>, StoreError> {
            Ok(None)
        }

        async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
            ProductStore::list_all(&self.inner).await
        }

        async fn create(&self, _draft: ProductDraft) -> Result<Product, StoreError> {
            Err(self.violation())
        }

        async fn update(&self, _product: &Product) -> Result<Product, StoreError> {
            Err(self.violation())
        }

        async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError> {
            self.inner.soft_delete(id).await
        }
    }

    async fn racing_service(constraint: &'static str) -> (ProductService, Product) {
        let inner = InMemoryProductStore::new();
        let existing = inner.create(draft("Phone1", 100.0, 1)).await.unwrap();
        let service = ProductService::new(
            Arc::new(RacingProductStore { inner, constraint }),
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(InMemoryBlacklistStore::new()),
        );
        (service, existing)
    }

    #[tokio::test]
    async fn name_index_violation_on_create_is_duplicate_name() {
        let (service, _) = racing_service(PRODUCT_NAME_CONSTRAINT).await;
        let err = service.add_product(draft("Phone2", 100.0, 1)).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateName {
                name: "Phone2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn name_index_violation_on_update_is_duplicate_name() {
        let (service, existing) = racing_service(PRODUCT_NAME_CONSTRAINT).await;
        let err = service
            .update_product(existing.id, draft("Phone2", 100.0, 1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateName {
                name: "Phone2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn other_unique_violations_are_conflicts() {
        let (service, existing) = racing_service("products_sku_idx").await;
        let err = service.add_product(draft("Phone2", 100.0, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let err = service
            .update_product(existing.id, draft("Phone3", 100.0, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
