use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vivalife_core::{Aggregate, AggregateRoot, DomainError, Entity, Money, ProductId};
use vivalife_events::Event;
use vivalife_products::Product;

use crate::line_item::LineItem;

/// Aggregate root: the shopper's cart.
///
/// Identified by the storage key it persists under. Line items are unique per
/// product and keep insertion order. `version` counts the events applied
/// since the cart was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    key: String,
    items: Vec<LineItem>,
    version: u64,
}

impl Cart {
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            items: Vec::new(),
            version: 0,
        }
    }

    /// Rebuild a cart from a persisted snapshot.
    ///
    /// Duplicate rows for one product are merged into the first and
    /// zero-quantity rows are dropped.
    pub fn restore(key: impl Into<String>, rows: Vec<LineItem>) -> Self {
        let mut items: Vec<LineItem> = Vec::with_capacity(rows.len());
        for row in rows {
            if row.quantity == 0 {
                tracing::debug!(product_id = %row.product_id, "dropping zero-quantity cart row");
                continue;
            }
            match items.iter_mut().find(|i| i.product_id == row.product_id) {
                Some(existing) => {
                    tracing::warn!(product_id = %row.product_id, "merging duplicate cart row");
                    existing.quantity = existing.quantity.saturating_add(row.quantity);
                }
                None => items.push(row),
            }
        }
        Self {
            key: key.into(),
            items,
            version: 0,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id() == product_id)
    }

    /// Units of `product_id` already in the cart.
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |i| i.quantity)
    }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Lines that need a prescription before checkout.
    pub fn prescription_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|i| i.requires_prescription)
    }
}

impl AggregateRoot for Cart {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.key
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem.
///
/// Carries the catalog entry and the stock level read just before the
/// command was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub product: Product,
    pub quantity: u32,
    pub available: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetQuantity. Zero or less removes the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetQuantity {
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReconcileStock.
///
/// Current stock per product; products missing from `levels` count as having
/// none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStock {
    pub levels: BTreeMap<ProductId, u32>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(AddItem),
    RemoveItem(RemoveItem),
    SetQuantity(SetQuantity),
    ClearCart(ClearCart),
    ReconcileStock(ReconcileStock),
}

/// Event: ItemAdded. Merges into an existing line for the same product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub image_ref: String,
    pub requires_prescription: bool,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantitySet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantitySet {
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemWithdrawn (stock ran out while the item sat in the cart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWithdrawn {
    pub product_id: ProductId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityClamped (stock dropped below the cart quantity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityClamped {
    pub product_id: ProductId,
    pub name: String,
    pub from: u32,
    pub to: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
    QuantitySet(QuantitySet),
    CartCleared(CartCleared),
    ItemWithdrawn(ItemWithdrawn),
    QuantityClamped(QuantityClamped),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item.added",
            CartEvent::ItemRemoved(_) => "cart.item.removed",
            CartEvent::QuantitySet(_) => "cart.item.quantity_set",
            CartEvent::CartCleared(_) => "cart.cleared",
            CartEvent::ItemWithdrawn(_) => "cart.item.withdrawn",
            CartEvent::QuantityClamped(_) => "cart.item.quantity_clamped",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ItemAdded(e) => e.occurred_at,
            CartEvent::ItemRemoved(e) => e.occurred_at,
            CartEvent::QuantitySet(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
            CartEvent::ItemWithdrawn(e) => e.occurred_at,
            CartEvent::QuantityClamped(e) => e.occurred_at,
        }
    }
}

/// Why the cart refused an add.
///
/// Expected storefront outcomes; the shopper sees a notice and the cart is
/// left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartRejection {
    #[error("{name} is out of stock")]
    OutOfStock { product_id: ProductId, name: String },

    #[error("only {available} of {name} available, {in_cart} already in cart")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: u32,
        in_cart: u32,
    },

    #[error("{name} requires a prescription")]
    PrescriptionRequired { product_id: ProductId, name: String },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = CartRejection;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ItemAdded(e) => {
                match self.items.iter_mut().find(|i| i.product_id == e.product_id) {
                    Some(line) => line.quantity = line.quantity.saturating_add(e.quantity),
                    None => self.items.push(LineItem {
                        product_id: e.product_id.clone(),
                        name: e.name.clone(),
                        unit_price: e.unit_price,
                        image_ref: e.image_ref.clone(),
                        quantity: e.quantity,
                        requires_prescription: e.requires_prescription,
                    }),
                }
            }
            CartEvent::ItemRemoved(ItemRemoved { product_id, .. })
            | CartEvent::ItemWithdrawn(ItemWithdrawn { product_id, .. }) => {
                self.items.retain(|i| &i.product_id != product_id);
            }
            CartEvent::QuantitySet(QuantitySet {
                product_id,
                quantity,
                ..
            })
            | CartEvent::QuantityClamped(QuantityClamped {
                product_id,
                to: quantity,
                ..
            }) => {
                if let Some(line) = self.items.iter_mut().find(|i| &i.product_id == product_id) {
                    line.quantity = *quantity;
                }
            }
            CartEvent::CartCleared(_) => self.items.clear(),
        }

        // +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => self.handle_add(cmd),
            CartCommand::RemoveItem(cmd) => Ok(self.handle_remove(cmd)),
            CartCommand::SetQuantity(cmd) => Ok(self.handle_set_quantity(cmd)),
            CartCommand::ClearCart(cmd) => Ok(self.handle_clear(cmd)),
            CartCommand::ReconcileStock(cmd) => Ok(self.handle_reconcile(cmd)),
        }
    }
}

impl Cart {
    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<CartEvent>, CartRejection> {
        let product = &cmd.product;
        if cmd.quantity == 0 {
            return Err(DomainError::validation("quantity must be positive").into());
        }

        let in_cart = self.quantity_of(&product.id);
        if cmd.available == 0 {
            return Err(CartRejection::OutOfStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
            });
        }
        if u64::from(in_cart) + u64::from(cmd.quantity) > u64::from(cmd.available) {
            return Err(CartRejection::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: cmd.available,
                in_cart,
            });
        }
        if product.requires_prescription() {
            return Err(CartRejection::PrescriptionRequired {
                product_id: product.id.clone(),
                name: product.name.clone(),
            });
        }

        Ok(vec![CartEvent::ItemAdded(ItemAdded {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image_ref: product.image.clone(),
            requires_prescription: product.prescription,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveItem) -> Vec<CartEvent> {
        if self.line(&cmd.product_id).is_none() {
            return Vec::new();
        }
        vec![CartEvent::ItemRemoved(ItemRemoved {
            product_id: cmd.product_id.clone(),
            occurred_at: cmd.occurred_at,
        })]
    }

    fn handle_set_quantity(&self, cmd: &SetQuantity) -> Vec<CartEvent> {
        let Some(line) = self.line(&cmd.product_id) else {
            return Vec::new();
        };
        if cmd.quantity <= 0 {
            return vec![CartEvent::ItemRemoved(ItemRemoved {
                product_id: cmd.product_id.clone(),
                occurred_at: cmd.occurred_at,
            })];
        }

        let quantity = u32::try_from(cmd.quantity).unwrap_or(u32::MAX);
        if quantity == line.quantity {
            return Vec::new();
        }
        vec![CartEvent::QuantitySet(QuantitySet {
            product_id: cmd.product_id.clone(),
            quantity,
            occurred_at: cmd.occurred_at,
        })]
    }

    fn handle_clear(&self, cmd: &ClearCart) -> Vec<CartEvent> {
        if self.items.is_empty() {
            return Vec::new();
        }
        vec![CartEvent::CartCleared(CartCleared {
            occurred_at: cmd.occurred_at,
        })]
    }

    fn handle_reconcile(&self, cmd: &ReconcileStock) -> Vec<CartEvent> {
        self.items
            .iter()
            .filter_map(|line| {
                let available = cmd.levels.get(&line.product_id).copied().unwrap_or(0);
                if available == 0 {
                    Some(CartEvent::ItemWithdrawn(ItemWithdrawn {
                        product_id: line.product_id.clone(),
                        name: line.name.clone(),
                        occurred_at: cmd.occurred_at,
                    }))
                } else if line.quantity > available {
                    Some(CartEvent::QuantityClamped(QuantityClamped {
                        product_id: line.product_id.clone(),
                        name: line.name.clone(),
                        from: line.quantity,
                        to: available,
                        occurred_at: cmd.occurred_at,
                    }))
                } else {
                    None
                }
            })
            .collect()
    }
}
