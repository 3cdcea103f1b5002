//! Postgres-backed stores.
//!
//! All three stores share one `PgPool`. Schema is created idempotently by
//! [`ensure_schema`]; live product names are kept unique by a partial index on
//! `lower(name)`, so concurrent creates with the same name cannot both commit.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation { constraint }` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed, Io, Tls, ... | N/A | `Backend` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockroom_core::{BlacklistWordId, HistoryEntryId, ProductId};
use stockroom_products::{BlacklistWord, Product, ProductDraft, ProductHistory, TrackedField};

use super::r#trait::{
    BlacklistStore, HistoryStore, ProductStore, StoreError, BLACKLIST_WORD_CONSTRAINT,
    PRODUCT_NAME_CONSTRAINT,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          UUID PRIMARY KEY,
        name        VARCHAR(255) NOT NULL,
        category    VARCHAR(50) NOT NULL,
        description VARCHAR(1000) NOT NULL DEFAULT '',
        price       DOUBLE PRECISION NOT NULL,
        quantity    BIGINT NOT NULL DEFAULT 0,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL,
        deleted_at  TIMESTAMPTZ NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS products_name_live_idx
        ON products (lower(name))
        WHERE deleted_at IS NULL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_history (
        id          UUID PRIMARY KEY,
        product_id  UUID NOT NULL,
        field       VARCHAR(50) NOT NULL,
        old_value   TEXT NOT NULL,
        new_value   TEXT NOT NULL,
        changed_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS product_history_product_idx
        ON product_history (product_id, changed_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blacklist_words (
        id   UUID PRIMARY KEY,
        word VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS blacklist_words_word_idx
        ON blacklist_words (lower(word))
    "#,
];

/// Create tables and indexes if they do not exist yet.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                // Older servers may omit the constraint name; fall back to the operation's index.
                let constraint = db_err
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| default_constraint(operation).to_string());
                return StoreError::UniqueViolation { constraint };
            }
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

fn default_constraint(operation: &str) -> &'static str {
    if operation.starts_with("blacklist") {
        BLACKLIST_WORD_CONSTRAINT
    } else {
        PRODUCT_NAME_CONSTRAINT
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    name: String,
    category: String,
    description: String,
    price: f64,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            category: row.category,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug)]
struct HistoryRow {
    id: Uuid,
    product_id: Uuid,
    field: String,
    old_value: String,
    new_value: String,
    changed_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for HistoryRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(HistoryRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            field: row.try_get("field")?,
            old_value: row.try_get("old_value")?,
            new_value: row.try_get("new_value")?,
            changed_at: row.try_get("changed_at")?,
        })
    }
}

impl TryFrom<HistoryRow> for ProductHistory {
    type Error = StoreError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let field = TrackedField::parse(&row.field)
            .ok_or_else(|| StoreError::backend(format!("unknown history field '{}'", row.field)))?;
        Ok(ProductHistory {
            id: HistoryEntryId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            field,
            old_value: row.old_value,
            new_value: row.new_value,
            changed_at: row.changed_at,
        })
    }
}

fn decode_product(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    ProductRow::from_row(row)
        .map(Product::from)
        .map_err(|e| StoreError::backend(format!("failed to decode product row: {e}")))
}

const PRODUCT_COLUMNS: &str =
    "id, name, category, description, price, quantity, created_at, updated_at, deleted_at";

/// Postgres product table.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        row.as_ref().map(decode_product).transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE lower(name) = lower($1) AND deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product_by_name", e))?;
        row.as_ref().map(decode_product).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE deleted_at IS NULL ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(decode_product).collect()
    }

    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    async fn create(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let product = Product::from_draft(ProductId::new(), draft, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, description, price, quantity, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn update(&self, product: &Product) -> Result<Product, StoreError> {
        let sql = format!(
            r#"
            UPDATE products
            SET name = $2, category = $3, description = $4, price = $5, quantity = $6,
                updated_at = $7
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(product.id.as_uuid())
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.quantity)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?;

        match row {
            Some(row) => decode_product(&row),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Postgres product history table.
#[derive(Debug, Clone)]
pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PostgresHistoryStore {
    #[instrument(skip(self, entry), fields(product_id = %entry.product_id, field = %entry.field), err)]
    async fn append(&self, entry: ProductHistory) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO product_history (id, product_id, field, old_value, new_value, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.product_id.as_uuid())
        .bind(entry.field.as_str())
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .bind(entry.changed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_history", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<ProductHistory>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, field, old_value, new_value, changed_at
            FROM product_history
            WHERE product_id = $1
            ORDER BY changed_at ASC, id ASC
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_history", e))?;

        rows.iter()
            .map(|row| {
                HistoryRow::from_row(row)
                    .map_err(|e| StoreError::backend(format!("failed to decode history row: {e}")))
                    .and_then(ProductHistory::try_from)
            })
            .collect()
    }
}

/// Postgres blacklist table.
#[derive(Debug, Clone)]
pub struct PostgresBlacklistStore {
    pool: PgPool,
}

impl PostgresBlacklistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistStore for PostgresBlacklistStore {
    #[instrument(skip(self), err)]
    async fn list_all(&self) -> Result<Vec<BlacklistWord>, StoreError> {
        let rows = sqlx::query("SELECT id, word FROM blacklist_words ORDER BY word ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("blacklist_list", e))?;

        rows.iter()
            .map(|row| {
                let id: Uuid = row
                    .try_get("id")
                    .map_err(|e| StoreError::backend(format!("failed to decode blacklist row: {e}")))?;
                let word: String = row
                    .try_get("word")
                    .map_err(|e| StoreError::backend(format!("failed to decode blacklist row: {e}")))?;
                Ok(BlacklistWord {
                    id: BlacklistWordId::from_uuid(id),
                    word,
                })
            })
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn add(&self, word: String) -> Result<BlacklistWord, StoreError> {
        let entry = BlacklistWord::new(word);
        sqlx::query("INSERT INTO blacklist_words (id, word) VALUES ($1, $2)")
            .bind(entry.id.as_uuid())
            .bind(&entry.word)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("blacklist_add", e))?;
        Ok(entry)
    }

    #[instrument(skip(self), fields(word_id = %id), err)]
    async fn delete(&self, id: BlacklistWordId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM blacklist_words WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("blacklist_delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
