//! Built-in catalog used when no pharmacy inventory is available (standalone mode).

use vivalife_core::{Money, ProductId};

use crate::product::{Product, ProductCategory};

struct SampleRow {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: u32,
    category: ProductCategory,
    image: &'static str,
    current_stock: Option<u32>,
    prescription: bool,
    sku: Option<&'static str>,
}

const SAMPLE_ROWS: &[SampleRow] = &[
    SampleRow {
        id: "PROD001",
        name: "Paracetamol 500mg",
        description: "Pain relief and fever reducer. Pack of 20 tablets.",
        price: 15,
        category: ProductCategory::Medicines,
        image: "fas fa-pills",
        current_stock: Some(50),
        prescription: false,
        sku: Some("PAR500"),
    },
    SampleRow {
        id: "PROD002",
        name: "Vitamin D3 1000IU",
        description: "Essential vitamin for bone health and immunity. 60 capsules.",
        price: 45,
        category: ProductCategory::Vitamins,
        image: "fas fa-capsules",
        current_stock: Some(30),
        prescription: false,
        sku: Some("VIT1000"),
    },
    SampleRow {
        id: "PROD003",
        name: "Ibuprofen 400mg",
        description: "Anti-inflammatory pain relief. Pack of 30 tablets.",
        price: 25,
        category: ProductCategory::Medicines,
        image: "fas fa-pills",
        current_stock: Some(25),
        prescription: false,
        sku: Some("IBU400"),
    },
    SampleRow {
        id: "PROD004",
        name: "Multivitamin Complex",
        description: "Complete daily nutrition support. 90 tablets.",
        price: 65,
        category: ProductCategory::Vitamins,
        image: "fas fa-capsules",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD005",
        name: "Omega-3 Fish Oil",
        description: "Heart and brain health support. 60 softgels.",
        price: 55,
        category: ProductCategory::Vitamins,
        image: "fas fa-capsules",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD006",
        name: "Cough Syrup 100ml",
        description: "Effective cough relief for adults and children.",
        price: 35,
        category: ProductCategory::Medicines,
        image: "fas fa-prescription-bottle",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD007",
        name: "Antiseptic Cream",
        description: "Wound care and infection prevention. 50g tube.",
        price: 20,
        category: ProductCategory::PersonalCare,
        image: "fas fa-prescription-bottle-alt",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD008",
        name: "Baby Formula 400g",
        description: "Nutritious infant formula for healthy growth.",
        price: 85,
        category: ProductCategory::BabyCare,
        image: "fas fa-baby",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD009",
        name: "Sunscreen SPF 50",
        description: "Broad spectrum UV protection. 100ml.",
        price: 40,
        category: ProductCategory::Cosmetics,
        image: "fas fa-sun",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD010",
        name: "Hand Sanitizer 250ml",
        description: "70% alcohol-based hand sanitizer.",
        price: 18,
        category: ProductCategory::PersonalCare,
        image: "fas fa-pump-soap",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD011",
        name: "Calcium + Magnesium",
        description: "Bone and muscle health supplement. 120 tablets.",
        price: 50,
        category: ProductCategory::Vitamins,
        image: "fas fa-capsules",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD012",
        name: "Throat Lozenges",
        description: "Soothing relief for sore throat. Pack of 24.",
        price: 12,
        category: ProductCategory::Medicines,
        image: "fas fa-pills",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD013",
        name: "Insulin Pen",
        description: "Diabetes management insulin delivery system.",
        price: 120,
        category: ProductCategory::Medicines,
        image: "fas fa-syringe",
        current_stock: None,
        prescription: true,
        sku: None,
    },
    SampleRow {
        id: "PROD014",
        name: "Blood Pressure Monitor",
        description: "Digital automatic blood pressure monitor.",
        price: 180,
        category: ProductCategory::MedicalDevices,
        image: "fas fa-heartbeat",
        current_stock: None,
        prescription: false,
        sku: None,
    },
    SampleRow {
        id: "PROD015",
        name: "Thermometer Digital",
        description: "Fast and accurate digital thermometer.",
        price: 35,
        category: ProductCategory::MedicalDevices,
        image: "fas fa-thermometer-half",
        current_stock: None,
        prescription: false,
        sku: None,
    },
];

/// The standalone sample catalog, in display order.
pub fn sample_catalog() -> Vec<Product> {
    SAMPLE_ROWS
        .iter()
        .filter_map(|row| {
            let id = ProductId::new(row.id).ok()?;
            Some(Product {
                id,
                name: row.name.to_string(),
                description: row.description.to_string(),
                price: Money::riyals(row.price),
                category: row.category,
                image: row.image.to_string(),
                in_stock: true,
                current_stock: row.current_stock,
                prescription: row.prescription,
                sku: row.sku.map(str::to_string),
            })
        })
        .collect()
}
