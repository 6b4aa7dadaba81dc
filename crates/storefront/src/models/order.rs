//! Order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pocket_shop_core::{Money, OrderId};

use super::cart::CartItem;

/// Buyer details captured at checkout. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub payment_method: Option<String>,
}

impl BuyerInfo {
    /// Blank fields become `None`; the rest are trimmed.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(field: Option<String>) -> Option<String> {
            field
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        }

        Self {
            name: clean(self.name),
            email: clean(self.email),
            address: clean(self.address),
            payment_method: clean(self.payment_method),
        }
    }
}

/// An immutable snapshot of the cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `ORD-<unix millis>`, suffixed when that id is already taken.
    pub order_id: OrderId,
    /// When checkout committed.
    pub created_at: DateTime<Utc>,
    /// Buyer details as entered.
    #[serde(default)]
    pub buyer: BuyerInfo,
    /// The cart lines at checkout, in cart order.
    pub items: Vec<CartItem>,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Shipping charged.
    pub shipping_cost: Money,
    /// `subtotal + shipping_cost`.
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_normalized_drops_blanks() {
        let buyer = BuyerInfo {
            name: Some("  Ana ".to_string()),
            email: Some(String::new()),
            address: Some("   ".to_string()),
            payment_method: None,
        }
        .normalized();

        assert_eq!(buyer.name.as_deref(), Some("Ana"));
        assert_eq!(buyer.email, None);
        assert_eq!(buyer.address, None);
        assert_eq!(buyer.payment_method, None);
    }
}
