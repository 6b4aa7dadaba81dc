//! Domain models for the storefront.
//!
//! Every persisted model serializes with camelCase field names; those names
//! are the on-store format and stay stable across sessions.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod suggestion;

pub use cart::{CartItem, NewCartItem};
pub use order::{BuyerInfo, Order};
pub use product::Product;
pub use session::{SessionUser, keys};
pub use suggestion::Suggestion;
