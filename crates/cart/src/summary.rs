//! Order summary: subtotal, delivery fee, total.

use serde::{Deserialize, Serialize};

use vivalife_core::Money;

use crate::line_item::LineItem;

/// Flat delivery fee, waived from a subtotal threshold upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPolicy {
    /// Subtotals at or above this ship free.
    pub free_threshold: Money,
    pub fee: Money,
}

impl DeliveryPolicy {
    pub fn fee_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_threshold {
            Money::ZERO
        } else {
            self.fee
        }
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Money::riyals(100),
            fee: Money::riyals(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Sum of quantities (the cart badge).
    pub item_count: u64,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    /// Whether the delivery line shows "Free".
    pub free_delivery: bool,
}

impl OrderSummary {
    pub fn of(items: &[LineItem], policy: &DeliveryPolicy) -> Self {
        let subtotal: Money = items.iter().map(LineItem::line_total).sum();
        let delivery_fee = policy.fee_for(subtotal);
        Self {
            item_count: items.iter().map(|i| u64::from(i.quantity)).sum(),
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            free_delivery: delivery_fee.is_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(id: &str, halalas: u64, quantity: u32) -> LineItem {
        LineItem {
            product_id: id.parse().unwrap(),
            name: id.to_string(),
            unit_price: Money::halalas(halalas),
            image_ref: String::new(),
            quantity,
            requires_prescription: false,
        }
    }

    #[test]
    fn fee_is_waived_from_exactly_one_hundred() {
        let policy = DeliveryPolicy::default();
        assert_eq!(policy.fee_for(Money::riyals(100)), Money::ZERO);
        assert_eq!(policy.fee_for(Money::halalas(9999)), Money::riyals(15));
        assert_eq!(policy.fee_for(Money::ZERO), Money::riyals(15));
    }

    #[test]
    fn summary_adds_fee_below_threshold() {
        let summary = OrderSummary::of(
            &[item("PROD001", 1500, 2), item("PROD012", 1200, 1)],
            &DeliveryPolicy::default(),
        );
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, Money::riyals(42));
        assert_eq!(summary.delivery_fee, Money::riyals(15));
        assert_eq!(summary.total, Money::riyals(57));
        assert!(!summary.free_delivery);
    }

    #[test]
    fn empty_cart_still_quotes_delivery() {
        let summary = OrderSummary::of(&[], &DeliveryPolicy::default());
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.total, Money::riyals(15));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: subtotal is Σ(price × qty) and does not depend on order.
        #[test]
        fn subtotal_is_order_independent(
            lines in prop::collection::vec((1u64..50_000, 1u32..20), 0..12),
            seed in any::<u64>(),
        ) {
            let items: Vec<LineItem> = lines
                .iter()
                .enumerate()
                .map(|(n, (price, qty))| item(&format!("P{n}"), *price, *qty))
                .collect();
            let expected: u64 = lines.iter().map(|(p, q)| p * u64::from(*q)).sum();

            let mut shuffled = items.clone();
            if !shuffled.is_empty() {
                let len = shuffled.len();
                shuffled.rotate_left((seed as usize) % len);
                shuffled.reverse();
            }

            let policy = DeliveryPolicy::default();
            let a = OrderSummary::of(&items, &policy);
            let b = OrderSummary::of(&shuffled, &policy);
            prop_assert_eq!(a.subtotal, Money::halalas(expected));
            prop_assert_eq!(a, b);
        }

        /// Property: the fee is exactly 0 or exactly 15, split at 100.
        #[test]
        fn fee_is_zero_or_flat(halalas in 0u64..100_000) {
            let subtotal = Money::halalas(halalas);
            let fee = DeliveryPolicy::default().fee_for(subtotal);
            if halalas >= 10_000 {
                prop_assert_eq!(fee, Money::ZERO);
            } else {
                prop_assert_eq!(fee, Money::riyals(15));
            }
        }
    }
}
