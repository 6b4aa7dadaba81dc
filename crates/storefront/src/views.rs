//! Read-only display snapshots.
//!
//! Views hold preformatted strings so renderers never touch `Money` or the
//! cart lists directly. Line numbers are 1-based.

use serde::Serialize;

use crate::account::Account;
use crate::cart::CartState;
use crate::models::{CartItem, Order, Product, keys};
use crate::store::StorageEvent;

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub position: usize,
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Saved-for-later line display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedItemView {
    pub position: usize,
    pub name: String,
    pub quantity: u32,
    pub price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub saved: Vec<SavedItemView>,
    pub item_count: u64,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl CartView {
    /// Whether the cart has no lines. Saved lines don't count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        let totals = cart.totals();
        Self {
            items: cart
                .items()
                .iter()
                .enumerate()
                .map(|(i, line)| CartItemView::new(i + 1, line))
                .collect(),
            saved: cart
                .saved()
                .iter()
                .enumerate()
                .map(|(i, line)| SavedItemView {
                    position: i + 1,
                    name: line.name().to_string(),
                    quantity: line.quantity().get(),
                    price: line.unit_price().to_string(),
                })
                .collect(),
            item_count: totals.item_count,
            subtotal: totals.subtotal.to_string(),
            shipping: totals.shipping.to_string(),
            total: totals.grand_total.to_string(),
        }
    }
}

impl CartItemView {
    fn new(position: usize, line: &CartItem) -> Self {
        Self {
            position,
            id: line.id().to_string(),
            name: line.name().to_string(),
            quantity: line.quantity().get(),
            price: line.unit_price().to_string(),
            line_price: line.total().to_string(),
            image: line.image().map(str::to_string),
        }
    }
}

/// Catalog entry display data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub description: String,
    pub stock: u32,
    pub rating: f32,
    pub review_count: u32,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            stock: product.stock,
            rating: product.rating,
            review_count: product.review_count,
        }
    }
}

/// Order confirmation display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub order_id: String,
    pub placed_at: String,
    pub buyer_name: Option<String>,
    pub lines: Vec<CartItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            placed_at: order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            buyer_name: order.buyer.name.clone(),
            lines: order
                .items
                .iter()
                .enumerate()
                .map(|(i, line)| CartItemView::new(i + 1, line))
                .collect(),
            subtotal: order.subtotal.to_string(),
            shipping: order.shipping_cost.to_string(),
            total: order.total.to_string(),
        }
    }
}

/// Header badge and greeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub cart_count: u64,
    pub greeting: String,
    pub logged_in: bool,
}

impl HeaderView {
    /// Derive the header from the current cart and user.
    #[must_use]
    pub fn build(cart: &CartState, account: &Account) -> Self {
        let user = account.current_user();
        Self {
            cart_count: cart.item_count(),
            greeting: user
                .as_ref()
                .map_or_else(|| "Sign in".to_string(), |u| format!("Hello, {}", u.name)),
            logged_in: user.is_some(),
        }
    }

    /// Whether a storage change should trigger a header rebuild.
    #[must_use]
    pub fn is_relevant(event: &StorageEvent) -> bool {
        event.key == keys::CART || event.key == keys::USER
    }
}
