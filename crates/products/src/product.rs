use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Entity, ProductId};

/// Candidate product state sent by a client (create or update).
///
/// Carries no identity: on create the store assigns one, on update the id comes
/// from the addressed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
}

/// Stored product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Label as submitted (case-preserving).
    pub category: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Materialize a new record from a draft. Used by stores on create.
    pub fn from_draft(id: ProductId, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            category: draft.category,
            description: draft.description,
            price: draft.price,
            quantity: draft.quantity,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Copy of this record with the draft's name, description, price and quantity.
    ///
    /// Identity, category and timestamps are kept from `self`.
    pub fn with_changes(&self, draft: &ProductDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            quantity: draft.quantity,
            ..self.clone()
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
