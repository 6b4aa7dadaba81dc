//! Cart totals and the shipping rule.

use serde::Serialize;

use pocket_shop_core::Money;

use crate::models::CartItem;

/// Flat shipping fee, optionally waived above a subtotal threshold.
///
/// An empty cart ships for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Fee charged on any non-empty cart.
    pub base: Money,
    /// Subtotals strictly greater than this ship free. `None` never waives.
    pub free_over: Option<Money>,
}

impl ShippingPolicy {
    /// Default flat fee.
    pub const DEFAULT_BASE: u64 = 5_000;
    /// Default free-shipping threshold.
    pub const DEFAULT_FREE_OVER: u64 = 100_000;

    /// A fee that is never waived.
    #[must_use]
    pub const fn flat(base: Money) -> Self {
        Self {
            base,
            free_over: None,
        }
    }

    /// Shipping due on a cart with this subtotal and line count.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Money, is_empty: bool) -> Money {
        if is_empty {
            return Money::ZERO;
        }
        match self.free_over {
            Some(threshold) if subtotal > threshold => Money::ZERO,
            _ => self.base,
        }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            base: Money::from_units(Self::DEFAULT_BASE),
            free_over: Some(Money::from_units(Self::DEFAULT_FREE_OVER)),
        }
    }
}

/// Derived figures for a list of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Shipping due.
    pub shipping: Money,
    /// `subtotal + shipping`.
    pub grand_total: Money,
}

impl CartTotals {
    /// Compute totals for `items` under `policy`.
    #[must_use]
    pub fn compute(items: &[CartItem], policy: &ShippingPolicy) -> Self {
        let item_count = items
            .iter()
            .map(|item| u64::from(item.quantity().get()))
            .sum();
        let subtotal: Money = items.iter().map(CartItem::total).sum();
        let shipping = policy.shipping_for(subtotal, items.is_empty());

        Self {
            item_count,
            subtotal,
            shipping,
            grand_total: subtotal + shipping,
        }
    }
}
