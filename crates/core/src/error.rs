//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Which name rule a candidate product name broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameViolation {
    /// Name is shorter or longer than the allowed range (character count).
    Length { len: usize, min: usize, max: usize },
    /// Name contains something other than ASCII letters and digits.
    Charset,
}

impl core::fmt::Display for NameViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NameViolation::Length { len, min, max } => {
                write!(f, "name must be {min}-{max} characters long (got {len})")
            }
            NameViolation::Charset => f.write_str("name may only contain letters and digits"),
        }
    }
}

/// Domain-level error.
///
/// Every variant is terminal for the current call. Variants carry enough context
/// (offending value, bounds, matched word) for a caller to render a message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid name: {0}")]
    InvalidName(NameViolation),

    #[error("a product named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("category must be one of: Elektronika, Książki, Odzież (got '{category}')")]
    InvalidCategory { category: String },

    #[error("price {price:.2} in category {category} must be between {min:.2} and {max:.2}")]
    PriceOutOfRange {
        category: String,
        price: f64,
        min: f64,
        max: f64,
    },

    #[error("quantity cannot be negative (got {quantity})")]
    NegativeQuantity { quantity: i64 },

    #[error("product name contains a forbidden word: {word}")]
    ForbiddenWord { word: String },

    /// A requested resource was not found (or is soft-deleted).
    #[error("not found")]
    NotFound,

    /// Malformed input outside the product rules (e.g. an empty blacklist word).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A uniqueness conflict outside the product name (e.g. duplicate blacklist word).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Opaque storage failure (connectivity, unexpected constraint, ...).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Short machine-readable code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidName(_) => "invalid_name",
            DomainError::DuplicateName { .. } => "duplicate_name",
            DomainError::InvalidCategory { .. } => "invalid_category",
            DomainError::PriceOutOfRange { .. } => "price_out_of_range",
            DomainError::NegativeQuantity { .. } => "negative_quantity",
            DomainError::ForbiddenWord { .. } => "forbidden_word",
            DomainError::NotFound => "not_found",
            DomainError::Validation(_) => "validation_error",
            DomainError::Conflict(_) => "conflict",
            DomainError::Storage(_) => "storage_failure",
        }
    }
}
