//! Products domain module.
//!
//! Business rules for the product catalog, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage): the product record, category
//! price bands, the validation engine, the blacklist filter and the field diff
//! that feeds the change history.

pub mod blacklist;
pub mod category;
pub mod history;
pub mod product;
pub mod validation;

pub use blacklist::{find_blacklisted_word, normalize_word, BlacklistWord};
pub use category::{Category, PriceRange};
pub use history::{diff, format_price, FieldChange, ProductHistory, TrackedField};
pub use product::{Product, ProductDraft};
pub use validation::{validate, validate_name, validate_price, NAME_MAX_LEN, NAME_MIN_LEN};
