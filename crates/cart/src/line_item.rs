use serde::{Deserialize, Serialize};

use vivalife_core::{Entity, Money, ProductId};
use vivalife_products::Product;

/// One product entry in the cart.
///
/// Field names match the persisted cart snapshot (`id`, `price`, `image`,
/// `prescription`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Money,
    #[serde(rename = "image")]
    pub image_ref: String,
    pub quantity: u32,
    #[serde(rename = "prescription")]
    pub requires_prescription: bool,
}

impl LineItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image_ref: product.image.clone(),
            quantity,
            requires_prescription: product.prescription,
        }
    }

    /// `unit_price × quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

impl Entity for LineItem {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}
