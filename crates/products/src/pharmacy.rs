//! Pharmacy-system inventory records and their conversion to storefront products.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use vivalife_core::{Money, ProductId};

use crate::product::{Product, ProductCategory};

/// Pharmacy whose stock the storefront sells when none is configured.
pub const DEFAULT_PHARMACY_ID: &str = "PHARM001";

const UNSUITABLE_CATEGORIES: &[&str] = &["controlled-substances", "refrigerated-high-risk"];
const SPECIAL_HANDLING_KEYWORDS: &[&str] = &["insulin", "vaccine", "injection"];
const PRESCRIPTION_KEYWORDS: &[&str] = &[
    "insulin",
    "antibiotic",
    "steroid",
    "controlled",
    "prescription",
    "rx",
    "morphine",
    "codeine",
];

/// A pharmacy branch record (`pharmacy_pharmacies`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One product row of the pharmacy inventory snapshot (`pharmacy_products`).
///
/// Every field is optional on the wire; the pharmacy system is not strict
/// about what it writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pharmacy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

impl PharmacyProduct {
    /// Whether this row answers to `product_id`, by id or by SKU.
    pub fn matches(&self, product_id: &str) -> bool {
        self.id.as_deref() == Some(product_id) || self.sku.as_deref() == Some(product_id)
    }

    /// On-hand stock, with missing or negative counts read as zero.
    pub fn stock(&self) -> u32 {
        self.current_stock
            .map(|s| s.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0)
    }

    /// The id the storefront lists this row under: its id, else its SKU.
    pub fn catalog_id(&self) -> Option<ProductId> {
        self.id
            .as_deref()
            .and_then(|id| ProductId::new(id).ok())
            .or_else(|| self.sku.as_deref().and_then(|sku| ProductId::new(sku).ok()))
    }

    fn lower_name(&self) -> String {
        self.name.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Controlled categories and cold-chain items are never sold online.
    pub fn is_suitable_for_online_sale(&self) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| !UNSUITABLE_CATEGORIES.contains(&c));
        let name = self.lower_name();
        let special_handling = SPECIAL_HANDLING_KEYWORDS.iter().any(|k| name.contains(k));
        category_ok && !special_handling
    }

    /// Name-based prescription detection.
    pub fn requires_prescription(&self) -> bool {
        let name = self.lower_name();
        PRESCRIPTION_KEYWORDS.iter().any(|k| name.contains(k))
    }

    /// Convert to a storefront product. `None` when the row has no usable id.
    pub fn to_catalog_product(&self, today: NaiveDate) -> Option<Product> {
        let id = self.catalog_id()?;
        let name = self.name.clone().unwrap_or_default();
        let stock = self.stock();

        Some(Product {
            id,
            description: describe(self, today),
            price: self.price.unwrap_or(Money::ZERO),
            category: map_category(self.category.as_deref()),
            image: product_icon(self.category.as_deref(), &name).to_string(),
            in_stock: stock > 0,
            current_stock: Some(stock),
            prescription: self.requires_prescription(),
            sku: self.sku.clone(),
            name,
        })
    }
}

/// Map a pharmacy-system category onto a storefront category.
pub fn map_category(raw: Option<&str>) -> ProductCategory {
    match raw {
        Some("medicines") | Some("refrigerated") => ProductCategory::Medicines,
        Some("cosmetics") => ProductCategory::Cosmetics,
        Some("diaber") => ProductCategory::MedicalDevices,
        Some("milk") => ProductCategory::BabyCare,
        Some("vitamins") | Some("supplements") => ProductCategory::Vitamins,
        _ => ProductCategory::PersonalCare,
    }
}

/// Icon reference chosen from the product name first, then the raw category.
pub fn product_icon(raw_category: Option<&str>, name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("insulin") || name.contains("syringe") {
        return "fas fa-syringe";
    }
    if name.contains("thermometer") {
        return "fas fa-thermometer-half";
    }
    if name.contains("pressure") || name.contains("monitor") {
        return "fas fa-heartbeat";
    }
    match raw_category {
        Some("medicines") if name.contains("syrup") || name.contains("liquid") => {
            "fas fa-prescription-bottle"
        }
        Some("medicines") => "fas fa-pills",
        Some("vitamins") | Some("supplements") => "fas fa-capsules",
        Some("cosmetics") => "fas fa-spa",
        Some("baby-care") | Some("milk") => "fas fa-baby",
        _ => "fas fa-prescription-bottle-alt",
    }
}

fn describe(record: &PharmacyProduct, today: NaiveDate) -> String {
    let mut description = String::from(match record.category.as_deref() {
        Some("medicines") => "Effective medication for therapeutic use. ",
        Some("vitamins") => "Essential supplement for health and wellness. ",
        Some("cosmetics") => "Quality cosmetic product for personal care. ",
        _ => "High-quality health and wellness product. ",
    });

    if let Some(batch) = record.batch_number.as_deref().filter(|b| !b.is_empty()) {
        description.push_str(&format!("Batch: {batch}. "));
    }

    if let Some(expiry) = record.expiry_date.as_deref().and_then(parse_expiry) {
        let days = (expiry - today).num_days();
        // Ceiling of days / 30.
        let months = (days + 29).div_euclid(30);
        if months > 12 {
            description.push_str("Long shelf life.");
        } else if months > 6 {
            description.push_str("Fresh stock available.");
        }
    }

    description.trim().to_string()
}

fn parse_expiry(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn record(name: &str, category: &str) -> PharmacyProduct {
        PharmacyProduct {
            id: Some("MED-1".to_string()),
            sku: Some("SKU-1".to_string()),
            name: Some(name.to_string()),
            price: Some(Money::riyals(20)),
            category: Some(category.to_string()),
            current_stock: Some(12),
            pharmacy_id: Some(DEFAULT_PHARMACY_ID.to_string()),
            ..PharmacyProduct::default()
        }
    }

    #[test]
    fn parses_pharmacy_rows_with_camel_case_fields() {
        let json = r#"{"id":"MED-1","sku":"PAR500","name":"Panadol","price":12.5,
            "category":"medicines","currentStock":40,"pharmacyId":"PHARM001",
            "batchNumber":"B-77","expiryDate":"2026-06-30"}"#;
        let row: PharmacyProduct = serde_json::from_str(json).unwrap();
        assert_eq!(row.current_stock, Some(40));
        assert_eq!(row.pharmacy_id.as_deref(), Some("PHARM001"));
        assert_eq!(row.price, Some(Money::halalas(1250)));
        assert!(row.matches("PAR500"));
        assert!(row.matches("MED-1"));
        assert!(!row.matches("OTHER"));
    }

    #[test]
    fn negative_or_missing_stock_reads_as_zero() {
        let mut row = record("Panadol", "medicines");
        row.current_stock = Some(-3);
        assert_eq!(row.stock(), 0);
        row.current_stock = None;
        assert_eq!(row.stock(), 0);
    }

    #[test]
    fn catalog_id_falls_back_to_sku() {
        let mut row = record("Panadol", "medicines");
        row.id = None;
        assert_eq!(row.catalog_id().unwrap(), "SKU-1");
        row.sku = None;
        assert!(row.catalog_id().is_none());
        assert!(row.to_catalog_product(today()).is_none());
    }

    #[test]
    fn cold_chain_and_controlled_items_are_not_sold_online() {
        assert!(!record("Flu Vaccine", "medicines").is_suitable_for_online_sale());
        assert!(!record("Insulin Glargine", "refrigerated").is_suitable_for_online_sale());
        assert!(!record("Tramadol", "controlled-substances").is_suitable_for_online_sale());
        assert!(record("Vitamin C", "vitamins").is_suitable_for_online_sale());
    }

    #[test]
    fn prescription_is_detected_from_the_name() {
        assert!(record("Amoxicillin Antibiotic", "medicines").requires_prescription());
        assert!(record("Codeine Linctus", "medicines").requires_prescription());
        assert!(!record("Vitamin D3", "vitamins").requires_prescription());
    }

    #[test]
    fn conversion_maps_category_icon_and_stock() {
        let product = record("Cough Syrup", "medicines")
            .to_catalog_product(today())
            .unwrap();
        assert_eq!(product.id, "MED-1");
        assert_eq!(product.category, ProductCategory::Medicines);
        assert_eq!(product.image, "fas fa-prescription-bottle");
        assert_eq!(product.current_stock, Some(12));
        assert!(product.in_stock);
        assert_eq!(product.price, Money::riyals(20));

        let milk = record("Infant Milk", "milk").to_catalog_product(today()).unwrap();
        assert_eq!(milk.category, ProductCategory::BabyCare);
        assert_eq!(milk.image, "fas fa-baby");

        let misc = record("Bandage", "wound-care").to_catalog_product(today()).unwrap();
        assert_eq!(misc.category, ProductCategory::PersonalCare);
        assert_eq!(misc.image, "fas fa-prescription-bottle-alt");
    }

    #[test]
    fn description_mentions_batch_and_shelf_life() {
        let mut row = record("Vitamin C", "vitamins");
        row.batch_number = Some("B-12".to_string());
        row.expiry_date = Some("2025-12-31".to_string());
        let product = row.to_catalog_product(today()).unwrap();
        assert_eq!(
            product.description,
            "Essential supplement for health and wellness. Batch: B-12. Long shelf life."
        );

        row.expiry_date = Some("2024-09-15T00:00:00Z".to_string());
        let product = row.to_catalog_product(today()).unwrap();
        assert!(product.description.ends_with("Fresh stock available."));

        row.expiry_date = Some("2024-02-01".to_string());
        let product = row.to_catalog_product(today()).unwrap();
        assert!(product.description.ends_with("Batch: B-12."));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: a prescription keyword anywhere in the name, in any
            /// case, flags the product.
            #[test]
            fn keyword_anywhere_flags_prescription(
                prefix in "[A-Za-z ]{0,12}",
                suffix in "[A-Za-z ]{0,12}",
                idx in 0usize..PRESCRIPTION_KEYWORDS.len(),
                upper in any::<bool>(),
            ) {
                let keyword = if upper {
                    PRESCRIPTION_KEYWORDS[idx].to_uppercase()
                } else {
                    PRESCRIPTION_KEYWORDS[idx].to_string()
                };
                let name = format!("{prefix}{keyword}{suffix}");
                prop_assert!(record(&name, "medicines").requires_prescription());
            }

            /// Property: stock is never negative and never exceeds the record.
            #[test]
            fn stock_is_clamped_to_non_negative(raw in any::<i64>()) {
                let mut row = record("Panadol", "medicines");
                row.current_stock = Some(raw);
                let stock = i64::from(row.stock());
                prop_assert!(stock >= 0);
                prop_assert!(stock <= raw.max(0));
            }
        }
    }
}
