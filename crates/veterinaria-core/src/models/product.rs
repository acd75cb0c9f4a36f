//! Catalog models: categories and products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock at or below this level (and above zero) counts as low.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Local UUID
    pub id: String,
    pub name: String,
    pub description: String,
    /// Inactive categories are hidden from the catalog and cannot take new products
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl Category {
    /// Create a new, active category.
    pub fn new(name: String, description: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Kind of product sold or offered by the clinic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProductType {
    Medication,
    Food,
    Service,
    Accessory,
    Equipment,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Medication => "medication",
            ProductType::Food => "food",
            ProductType::Service => "service",
            ProductType::Accessory => "accessory",
            ProductType::Equipment => "equipment",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "medication" => Some(ProductType::Medication),
            "food" => Some(ProductType::Food),
            "service" => Some(ProductType::Service),
            "accessory" => Some(ProductType::Accessory),
            "equipment" => Some(ProductType::Equipment),
            _ => None,
        }
    }

    /// Medications must name their active ingredient, concentration and laboratory.
    pub fn is_medication(&self) -> bool {
        matches!(self, ProductType::Medication)
    }
}

/// Raw product submission as parsed from a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductInput {
    pub id: Option<String>,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub product_type: Option<ProductType>,
    pub price: Option<Decimal>,
    pub code: String,
    /// Missing stock is treated as zero
    pub stock: Option<i64>,
    pub active_ingredient: String,
    pub concentration: String,
    pub laboratory: String,
}

/// A validated product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Local UUID
    pub id: String,
    /// Category reference
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub product_type: ProductType,
    /// Unit price (CLP)
    pub price: Decimal,
    /// Uppercase product code, unique across all products
    pub code: String,
    pub stock: u32,
    // Medication-only fields
    pub active_ingredient: Option<String>,
    pub concentration: Option<String>,
    pub laboratory: Option<String>,
    /// Cleared on soft delete
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Product {
    /// Create a new product with required fields.
    pub fn new(
        category_id: String,
        name: String,
        product_type: ProductType,
        code: String,
        price: Decimal,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category_id,
            name,
            description: None,
            product_type,
            price,
            code,
            stock: 0,
            active_ingredient: None,
            concentration: None,
            laboratory: None,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Stock is positive but at or below [`LOW_STOCK_THRESHOLD`].
    pub fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock <= LOW_STOCK_THRESHOLD
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// Aggregate figures for the active products of one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventorySummary {
    pub category_id: String,
    pub product_count: u32,
    /// Sum of listed prices
    pub total_value: Decimal,
    pub low_stock_count: u32,
    pub in_stock_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_levels() {
        let mut product = Product::new(
            "cat-1".into(),
            "Collar antipulgas".into(),
            ProductType::Accessory,
            "COL-01".into(),
            Decimal::from(12990),
        );
        assert!(!product.in_stock());
        assert!(!product.is_low_stock());

        product.stock = 5;
        assert!(product.in_stock());
        assert!(product.is_low_stock());

        product.stock = 6;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_product_type_codes() {
        assert_eq!(ProductType::from_code("medication"), Some(ProductType::Medication));
        assert_eq!(ProductType::from_code("medicamento"), None);
        assert_eq!(ProductType::Equipment.as_str(), "equipment");
        assert!(ProductType::Medication.is_medication());
        assert!(!ProductType::Food.is_medication());
    }
}
