//! Session state bundling every storefront component.

use std::sync::Arc;

use pocket_shop_core::ProductId;

use crate::account::Account;
use crate::cart::{CartState, Outcome};
use crate::catalog::Catalog;
use crate::config::ShopConfig;
use crate::error::{Result, ShopError};
use crate::feedback::FeedbackBox;
use crate::models::{BuyerInfo, NewCartItem, Order};
use crate::orders::{self, OrderHistory};
use crate::store::{FileStore, JsonStore, KeyValueStore};
use crate::views::{CartView, HeaderView};

/// One browsing context: a catalog plus cart, orders, account and feedback,
/// all bound to the same store context.
///
/// Several `Storefront`s may share one backend; each sees the others'
/// writes on [`Storefront::sync`]. Dropping it ends the session.
#[derive(Debug)]
pub struct Storefront {
    config: ShopConfig,
    catalog: Catalog,
    cart: CartState,
    orders: OrderHistory,
    account: Account,
    feedback: FeedbackBox,
}

impl Storefront {
    /// Open a session on the file store at `config.data_file`.
    #[must_use]
    pub fn open(config: ShopConfig) -> Self {
        let backend = Arc::new(FileStore::new(config.data_file.clone()));
        Self::with_backend(config, backend)
    }

    /// Open a session on an arbitrary backend.
    #[must_use]
    pub fn with_backend(config: ShopConfig, backend: Arc<dyn KeyValueStore>) -> Self {
        let store = JsonStore::new(backend);
        tracing::debug!(origin = ?store.origin(), "Opening storefront session");

        Self {
            cart: CartState::hydrate(store.clone(), config.shipping),
            orders: OrderHistory::new(store.clone()),
            account: Account::new(store.clone()),
            feedback: FeedbackBox::new(store),
            catalog: Catalog::demo(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ShopConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartState {
        &mut self.cart
    }

    #[must_use]
    pub const fn orders(&self) -> &OrderHistory {
        &self.orders
    }

    #[must_use]
    pub const fn account(&self) -> &Account {
        &self.account
    }

    #[must_use]
    pub const fn feedback(&self) -> &FeedbackBox {
        &self.feedback
    }

    /// Add `quantity` units of a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::ProductNotFound` for an unknown id, or
    /// `ShopError::Store` if the write fails.
    pub fn add_product(&mut self, id: ProductId, quantity: i64) -> Result<Outcome> {
        let product = self
            .catalog
            .get(id)
            .ok_or(ShopError::ProductNotFound(id))?;
        let item = NewCartItem::from(product).with_quantity(quantity);
        self.cart.add_item(item)
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// See [`orders::checkout`].
    pub fn checkout(&mut self, buyer: BuyerInfo) -> Result<Order> {
        orders::checkout(&mut self.cart, buyer)
    }

    /// Pick up writes made by other contexts. Returns whether the cart
    /// was reloaded.
    pub fn sync(&mut self) -> bool {
        self.cart.sync_external()
    }

    #[must_use]
    pub fn cart_view(&self) -> CartView {
        CartView::from(&self.cart)
    }

    #[must_use]
    pub fn header(&self) -> HeaderView {
        HeaderView::build(&self.cart, &self.account)
    }
}
