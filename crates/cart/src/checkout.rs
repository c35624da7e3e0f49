use serde::{Deserialize, Serialize};

use vivalife_core::ProductId;

use crate::summary::OrderSummary;

/// Checkout collaborator: takes over once the cart passes the checkout gate.
pub trait Checkout {
    fn open_checkout(&mut self, summary: &OrderSummary);
}

impl<F> Checkout for F
where
    F: FnMut(&OrderSummary),
{
    fn open_checkout(&mut self, summary: &OrderSummary) {
        self(summary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutOutcome {
    /// The checkout collaborator was opened with this summary.
    HandedOff(OrderSummary),
    EmptyCart,
    /// These lines need a prescription first.
    PrescriptionRequired(Vec<ProductId>),
}

impl CheckoutOutcome {
    pub fn is_handed_off(&self) -> bool {
        matches!(self, CheckoutOutcome::HandedOff(_))
    }
}
