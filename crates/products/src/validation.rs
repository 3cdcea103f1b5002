//! Product validation engine.
//!
//! Rules run in a fixed order and the first violation wins:
//! 1. name length (3-20 characters)
//! 2. name charset (ASCII letters and digits only)
//! 3. name uniqueness against the record currently holding that name
//! 4. category is one of the known labels
//! 5. price inside the category's inclusive bounds
//! 6. quantity is not negative
//!
//! Validation is pure: the caller looks up the product currently holding the
//! candidate's name and passes it in.

use stockroom_core::{DomainError, DomainResult, NameViolation, ProductId};

use crate::category::Category;
use crate::product::{Product, ProductDraft};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 20;

/// Validate a candidate product.
///
/// `candidate_id` is `None` on create. On update it is the id of the record
/// being changed, which is allowed to keep its own name.
pub fn validate(
    candidate: &ProductDraft,
    candidate_id: Option<ProductId>,
    existing_by_name: Option<&Product>,
) -> DomainResult<()> {
    validate_name(&candidate.name)?;
    ensure_unique_name(&candidate.name, candidate_id, existing_by_name)?;
    let category = resolve_category(&candidate.category)?;
    ensure_price_in_range(category, &candidate.category, candidate.price)?;
    ensure_non_negative_quantity(candidate.quantity)
}

/// Length and charset rules for a product name.
pub fn validate_name(name: &str) -> DomainResult<()> {
    let len = name.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(DomainError::InvalidName(NameViolation::Length {
            len,
            min: NAME_MIN_LEN,
            max: NAME_MAX_LEN,
        }));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::InvalidName(NameViolation::Charset));
    }

    Ok(())
}

fn ensure_unique_name(
    name: &str,
    candidate_id: Option<ProductId>,
    existing_by_name: Option<&Product>,
) -> DomainResult<()> {
    match existing_by_name {
        Some(existing) if !existing.is_deleted() && Some(existing.id) != candidate_id => {
            Err(DomainError::DuplicateName {
                name: name.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn resolve_category(label: &str) -> DomainResult<Category> {
    Category::parse(label).ok_or_else(|| DomainError::InvalidCategory {
        category: label.to_string(),
    })
}

/// Price rule alone, against the category named by `label`.
pub fn validate_price(label: &str, price: f64) -> DomainResult<()> {
    let category = resolve_category(label)?;
    ensure_price_in_range(category, label, price)
}

fn ensure_price_in_range(category: Category, label: &str, price: f64) -> DomainResult<()> {
    let range = category.price_range();
    if range.contains(price) {
        return Ok(());
    }
    Err(DomainError::PriceOutOfRange {
        category: label.to_string(),
        price,
        min: range.min,
        max: range.max,
    })
}

fn ensure_non_negative_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::NegativeQuantity { quantity });
    }
    Ok(())
}
