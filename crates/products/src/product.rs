use serde::{Deserialize, Serialize};

use vivalife_core::{Entity, Money, ProductId};

/// Storefront category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    Medicines,
    Vitamins,
    Cosmetics,
    PersonalCare,
    BabyCare,
    MedicalDevices,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Medicines => "medicines",
            ProductCategory::Vitamins => "vitamins",
            ProductCategory::Cosmetics => "cosmetics",
            ProductCategory::PersonalCare => "personal-care",
            ProductCategory::BabyCare => "baby-care",
            ProductCategory::MedicalDevices => "medical-devices",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        [
            ProductCategory::Medicines,
            ProductCategory::Vitamins,
            ProductCategory::Cosmetics,
            ProductCategory::PersonalCare,
            ProductCategory::BabyCare,
            ProductCategory::MedicalDevices,
        ]
        .into_iter()
        .find(|c| c.as_str() == slug)
    }
}

/// How much stock a catalog entry declares on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredStock {
    /// An explicit on-hand count.
    Count(u32),
    /// Only an in-stock flag, no count.
    InStock,
    OutOfStock,
}

/// A product as the storefront lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: ProductCategory,
    /// Icon reference (e.g. `fas fa-pills`).
    pub image: String,
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<u32>,
    pub prescription: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl Product {
    pub fn declared_stock(&self) -> DeclaredStock {
        match self.current_stock {
            // An explicit zero is a count, not a missing value: it must not
            // fall through to the in-stock flag.
            Some(count) => DeclaredStock::Count(count),
            None if self.in_stock => DeclaredStock::InStock,
            None => DeclaredStock::OutOfStock,
        }
    }

    pub fn requires_prescription(&self) -> bool {
        self.prescription
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
