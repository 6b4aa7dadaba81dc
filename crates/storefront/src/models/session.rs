//! Session-related types.
//!
//! The simulated logged-in user and the store keys every component shares.

use serde::{Deserialize, Serialize};

/// Simulated logged-in user.
///
/// There is no authentication; whoever "logs in" is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Display name shown in the header greeting.
    pub name: String,
    /// Optional contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Store keys for persisted state.
///
/// These names form the persisted layout and must not change.
pub mod keys {
    /// Ordered array of cart line items.
    pub const CART: &str = "cart";

    /// Ordered array of saved-for-later line items.
    pub const SAVED_ITEMS: &str = "savedItems";

    /// Append-only array of placed orders.
    pub const ORDERS: &str = "orders";

    /// The most recent order, for the confirmation view.
    pub const LAST_ORDER: &str = "lastOrder";

    /// The simulated logged-in user, or `null`.
    pub const USER: &str = "user";

    /// Append-only array of feedback submissions.
    pub const SUGGESTIONS: &str = "suggestions";
}
