//! Checkout and order history.
//!
//! Checkout runs `Validating -> Building -> Committed`, or stops at
//! `Validating` when the cart is empty. The commit is a single store batch:
//! the extended history, the last order, and both emptied lists land
//! together or not at all.

use chrono::Utc;
use serde_json::Value;
use tracing::instrument;

use pocket_shop_core::OrderId;

use crate::cart::CartState;
use crate::error::{Result, ShopError};
use crate::models::{BuyerInfo, Order, keys};
use crate::store::{Batch, JsonStore, StoreError};

/// Turn the current cart into an order.
///
/// On success the order is appended to the history, stored as the last
/// order, and the cart and saved lists are emptied.
///
/// # Errors
///
/// Returns `ShopError::EmptyCart` when the cart has no lines (nothing is
/// written), or `ShopError::Store` if the commit fails (nothing changes).
#[instrument(skip(cart, buyer))]
pub fn checkout(cart: &mut CartState, buyer: BuyerInfo) -> Result<Order> {
    tracing::debug!(stage = "validating", "Checkout");
    if cart.is_empty() {
        tracing::info!("Checkout rejected: cart is empty");
        return Err(ShopError::EmptyCart);
    }

    tracing::debug!(stage = "building", "Checkout");
    // Entries that do not parse as an `Order` are carried over untouched.
    let mut history: Vec<Value> = cart.store().load(keys::ORDERS, Vec::new());
    let taken: Vec<&str> = history
        .iter()
        .filter_map(|entry| entry.get("orderId").and_then(Value::as_str))
        .collect();

    let totals = cart.totals();
    let order = Order {
        order_id: next_order_id(&taken),
        created_at: Utc::now(),
        buyer: buyer.normalized(),
        items: cart.items().to_vec(),
        subtotal: totals.subtotal,
        shipping_cost: totals.shipping,
        total: totals.grand_total,
    };
    history.push(serde_json::to_value(&order).map_err(StoreError::from)?);

    let batch = Batch::new()
        .set(keys::ORDERS, &history)?
        .set(keys::LAST_ORDER, &order)?;
    cart.commit_checkout(batch, order.order_id.clone())?;

    tracing::info!(
        stage = "committed",
        order_id = %order.order_id,
        lines = order.items.len(),
        total = %order.total,
        "Order placed"
    );
    Ok(order)
}

/// `ORD-<unix millis>`, with `-<n>` appended if that id is already used.
fn next_order_id(existing: &[&str]) -> OrderId {
    let base = format!("ORD-{}", Utc::now().timestamp_millis());
    let taken = |candidate: &str| existing.contains(&candidate);

    if !taken(&base) {
        return OrderId::new(base);
    }
    (2u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .map_or_else(|| OrderId::new(base.clone()), OrderId::new)
}

/// Read access to placed orders.
#[derive(Debug, Clone)]
pub struct OrderHistory {
    store: JsonStore,
}

impl OrderHistory {
    /// Create an order history reader over `store`.
    #[must_use]
    pub const fn new(store: JsonStore) -> Self {
        Self { store }
    }

    /// Every placed order, oldest first. Unreadable entries are skipped.
    #[must_use]
    pub fn all(&self) -> Vec<Order> {
        let raw: Vec<Value> = self.store.load(keys::ORDERS, Vec::new());
        raw.into_iter()
            .filter_map(|value| match serde_json::from_value::<Order>(value) {
                Ok(order) => Some(order),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable stored order");
                    None
                }
            })
            .collect()
    }

    /// The order shown on the confirmation view.
    #[must_use]
    pub fn last(&self) -> Option<Order> {
        self.store.load(keys::LAST_ORDER, None)
    }

    /// Find an order by id.
    #[must_use]
    pub fn find(&self, order_id: &OrderId) -> Option<Order> {
        self.all().into_iter().find(|o| &o.order_id == order_id)
    }
}
