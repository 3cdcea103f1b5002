use serde::{Deserialize, Serialize};

use stockroom_core::ValueObject;

/// Inclusive price bounds for a category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both bounds are inclusive. NaN is never contained.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl ValueObject for PriceRange {}

/// The fixed set of product categories.
///
/// Products store the category label as the client sent it; this enum is only
/// the resolved form used for rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// "Elektronika"
    Electronics,
    /// "Książki"
    Books,
    /// "Odzież"
    Clothing,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Electronics, Category::Books, Category::Clothing];

    /// Resolve a category label, case-insensitively.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "elektronika" => Some(Category::Electronics),
            "książki" => Some(Category::Books),
            "odzież" => Some(Category::Clothing),
            _ => None,
        }
    }

    /// Canonical label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Electronics => "Elektronika",
            Category::Books => "Książki",
            Category::Clothing => "Odzież",
        }
    }

    pub fn price_range(&self) -> PriceRange {
        match self {
            Category::Electronics => PriceRange::new(50.0, 50_000.0),
            Category::Books => PriceRange::new(5.0, 500.0),
            Category::Clothing => PriceRange::new(10.0, 5_000.0),
        }
    }
}

impl ValueObject for Category {}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
