//! Field-level change history.
//!
//! `diff` compares two product snapshots and yields one [`FieldChange`] per
//! tracked field that differs. It never persists anything; the service turns
//! changes into [`ProductHistory`] records and appends them one by one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Entity, HistoryEntryId, ProductId};

use crate::product::Product;

/// Product fields whose changes are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedField {
    Name,
    Price,
    Quantity,
    Description,
}

impl TrackedField {
    /// Comparison (and therefore emission) order.
    pub const ORDER: [TrackedField; 4] = [
        TrackedField::Name,
        TrackedField::Price,
        TrackedField::Quantity,
        TrackedField::Description,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedField::Name => "Name",
            TrackedField::Price => "Price",
            TrackedField::Quantity => "Quantity",
            TrackedField::Description => "Description",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|f| f.as_str() == s)
    }
}

impl core::fmt::Display for TrackedField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed field, values rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: TrackedField,
    pub old_value: String,
    pub new_value: String,
}

/// Persisted audit record. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductHistory {
    pub id: HistoryEntryId,
    /// Lookup-only reference; the product may be deleted independently.
    pub product_id: ProductId,
    pub field: TrackedField,
    pub old_value: String,
    pub new_value: String,
    pub changed_at: DateTime<Utc>,
}

impl ProductHistory {
    pub fn record(product_id: ProductId, change: FieldChange, changed_at: DateTime<Utc>) -> Self {
        Self {
            id: HistoryEntryId::new(),
            product_id,
            field: change.field,
            old_value: change.old_value,
            new_value: change.new_value,
            changed_at,
        }
    }
}

impl Entity for ProductHistory {
    type Id = HistoryEntryId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Price as text: always two decimal digits.
pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// Compare name, price, quantity and description (in that order).
///
/// Equality is exact for every field, price included.
pub fn diff(old: &Product, new: &Product) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for field in TrackedField::ORDER {
        let change = match field {
            TrackedField::Name if old.name != new.name => {
                Some((old.name.clone(), new.name.clone()))
            }
            TrackedField::Price if old.price != new.price => {
                Some((format_price(old.price), format_price(new.price)))
            }
            TrackedField::Quantity if old.quantity != new.quantity => {
                Some((old.quantity.to_string(), new.quantity.to_string()))
            }
            TrackedField::Description if old.description != new.description => {
                Some((old.description.clone(), new.description.clone()))
            }
            _ => None,
        };

        if let Some((old_value, new_value)) = change {
            changes.push(FieldChange {
                field,
                old_value,
                new_value,
            });
        }
    }

    changes
}
