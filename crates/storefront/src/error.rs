//! Unified error handling.
//!
//! Provides a unified `ShopError` type for every fallible storefront
//! operation. Invalid operation input is not an error here: cart operations
//! ignore it and report `Outcome::Unchanged` instead.

use thiserror::Error;

use pocket_shop_core::{MoneyError, ProductId};

use crate::config::ConfigError;
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The store backend failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A price given by the user does not parse.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] MoneyError),

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// No catalog product has this id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
}

impl ShopError {
    /// Whether this is a rejection the user caused and can fix, as opposed
    /// to an environment failure.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::EmptyCart | Self::ProductNotFound(_) | Self::InvalidPrice(_)
        )
    }

    /// Message suitable for showing to a shopper.
    ///
    /// Environment failures are not described in detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => {
                "Your cart is empty. Add some products before checking out.".to_string()
            }
            Self::ProductNotFound(id) => format!("There is no product with id {id}."),
            Self::InvalidPrice(err) => format!("That price is not valid: {err}."),
            Self::Store(_) => "Could not save your changes. Please try again.".to_string(),
            Self::Config(_) => "The shop is not configured correctly.".to_string(),
        }
    }
}

/// Result type alias for `ShopError`.
pub type Result<T> = std::result::Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_error_display() {
        assert_eq!(ShopError::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(
            ShopError::ProductNotFound(ProductId::new(42)).to_string(),
            "Product not found: 42"
        );
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(ShopError::EmptyCart.is_user_facing());
        assert!(ShopError::ProductNotFound(ProductId::new(1)).is_user_facing());
        assert!(!ShopError::Store(StoreError::Poisoned).is_user_facing());
    }

    #[test]
    fn test_store_failures_hide_details() {
        let message = ShopError::Store(StoreError::Poisoned).user_message();
        assert!(!message.contains("poisoned"));
    }
}
