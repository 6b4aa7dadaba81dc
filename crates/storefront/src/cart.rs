//! Cart state: the cart list, the saved-for-later list, and every mutation
//! on them.
//!
//! [`CartState`] is an explicit session object. It is hydrated from the store
//! when constructed and writes both lists through to the store on every
//! mutation, before the mutation becomes visible in memory. Once a write has
//! landed, subscribers receive a [`CartEvent`] so views can re-render.
//!
//! Invalid input (blank names, out-of-range indices) is ignored and reported
//! as [`Outcome::Unchanged`]; only backend failures are errors.
//!
//! Indices refer to current list positions. Removing or moving a line shifts
//! every later line down by one, so callers must not hold indices across
//! mutations.

use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::instrument;

use pocket_shop_core::{LineId, OrderId, Quantity};

use crate::error::Result;
use crate::models::{CartItem, NewCartItem, keys};
use crate::pricing::{CartTotals, ShippingPolicy};
use crate::store::{Batch, JsonStore, StorageEvent};

/// How many unread cart events a subscriber may lag behind.
const EVENT_CAPACITY: usize = 32;

/// Whether an operation changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed and was persisted.
    Changed,
    /// The input was ignored; nothing was written.
    Unchanged,
}

impl Outcome {
    /// `true` for [`Outcome::Changed`].
    #[must_use]
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Notification sent to views after state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A mutation was persisted; carries the new totals.
    Updated(CartTotals),
    /// Both lists were re-read from the store.
    Reloaded(CartTotals),
    /// Checkout committed the given order and emptied both lists.
    CheckedOut(OrderId),
}

/// The cart and saved-for-later lists of one session.
#[derive(Debug)]
pub struct CartState {
    store: JsonStore,
    shipping: ShippingPolicy,
    items: Vec<CartItem>,
    saved: Vec<CartItem>,
    events: broadcast::Sender<CartEvent>,
    storage: broadcast::Receiver<StorageEvent>,
}

impl CartState {
    /// Create the cart state for a session and hydrate it from `store`.
    ///
    /// Missing or corrupt lists hydrate as empty; malformed lines are dropped.
    #[must_use]
    pub fn hydrate(store: JsonStore, shipping: ShippingPolicy) -> Self {
        let storage = store.subscribe();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let items = load_list(&store, keys::CART);
        let saved = load_list(&store, keys::SAVED_ITEMS);

        tracing::debug!(
            cart_lines = items.len(),
            saved_lines = saved.len(),
            "Cart hydrated"
        );

        Self {
            store,
            shipping,
            items,
            saved,
            events,
            storage,
        }
    }

    /// Subscribe to [`CartEvent`]s.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Lines in the cart, in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Lines saved for later, in display order.
    #[must_use]
    pub fn saved(&self) -> &[CartItem] {
        &self.saved
    }

    /// The shipping rule in effect.
    #[must_use]
    pub const fn shipping_policy(&self) -> &ShippingPolicy {
        &self.shipping
    }

    pub(crate) const fn store(&self) -> &JsonStore {
        &self.store
    }

    /// Totals for the current cart.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.items, &self.shipping)
    }

    /// Sum of quantities in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.totals().item_count
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item, merging with an existing line of the same identity.
    ///
    /// An item with an id merges only into the line with that id; without an
    /// id it merges into the line with the same name. New lines without an
    /// id are given a generated one.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails; state is unchanged.
    #[instrument(skip(self, item), fields(name = %item.name))]
    pub fn add_item(&mut self, item: NewCartItem) -> Result<Outcome> {
        let Some(item) = item.normalized() else {
            tracing::debug!("Ignoring cart item without a name");
            return Ok(Outcome::Unchanged);
        };

        self.apply(|items, saved| {
            if let Some(line) = items.iter_mut().find(|line| line.matches(&item)) {
                line.add_quantity(item.quantity);
            } else {
                let id = match item.id.clone() {
                    Some(id) => id,
                    None => generate_line_id(items, saved),
                };
                items.push(CartItem::from_new(item, id));
            }
            true
        })
    }

    /// Set the quantity of the line at `index`, clamped to at least one.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails; state is unchanged.
    #[instrument(skip(self))]
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> Result<Outcome> {
        self.apply(|items, _| {
            items.get_mut(index).is_some_and(|line| {
                line.set_quantity(Quantity::new(quantity));
                true
            })
        })
    }

    /// Remove the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails; state is unchanged.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, index: usize) -> Result<Outcome> {
        self.apply(|items, _| {
            if index < items.len() {
                items.remove(index);
                true
            } else {
                false
            }
        })
    }

    /// Move the cart line at `index` to the end of the saved list.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails; state is unchanged.
    #[instrument(skip(self))]
    pub fn save_for_later(&mut self, index: usize) -> Result<Outcome> {
        self.apply(|items, saved| move_line(items, saved, index))
    }

    /// Move the saved line at `index` to the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails; state is unchanged.
    #[instrument(skip(self))]
    pub fn restore_from_saved(&mut self, index: usize) -> Result<Outcome> {
        self.apply(|items, saved| move_line(saved, items, index))
    }

    /// Empty the cart. The saved list is kept.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails; state is unchanged.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<Outcome> {
        self.apply(|items, _| {
            let had_lines = !items.is_empty();
            items.clear();
            had_lines
        })
    }

    /// Empty the saved list. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails; state is unchanged.
    #[instrument(skip(self))]
    pub fn clear_saved(&mut self) -> Result<Outcome> {
        self.apply(|_, saved| {
            let had_lines = !saved.is_empty();
            saved.clear();
            had_lines
        })
    }

    /// Re-read both lists from the store, discarding in-memory state.
    pub fn reload(&mut self) {
        self.drain_storage_events();
        self.items = load_list(&self.store, keys::CART);
        self.saved = load_list(&self.store, keys::SAVED_ITEMS);
        self.notify(CartEvent::Reloaded(self.totals()));
    }

    /// Reload if another context wrote the cart or saved list since the
    /// last check. Returns whether a reload happened.
    pub fn sync_external(&mut self) -> bool {
        if self.drain_storage_events() {
            tracing::debug!("Cart changed in another context, reloading");
            self.reload();
            true
        } else {
            false
        }
    }

    /// Commit `batch` together with emptied lists, then clear memory.
    pub(crate) fn commit_checkout(&mut self, batch: Batch, order_id: OrderId) -> Result<()> {
        let empty: &[CartItem] = &[];
        let batch = batch
            .set(keys::CART, empty)?
            .set(keys::SAVED_ITEMS, empty)?;
        self.store.commit(batch)?;

        self.items.clear();
        self.saved.clear();
        self.notify(CartEvent::CheckedOut(order_id));
        Ok(())
    }

    /// Run `mutate` on copies of both lists; persist and publish only when it
    /// reports a change.
    fn apply<F>(&mut self, mutate: F) -> Result<Outcome>
    where
        F: FnOnce(&mut Vec<CartItem>, &mut Vec<CartItem>) -> bool,
    {
        let mut items = self.items.clone();
        let mut saved = self.saved.clone();
        if !mutate(&mut items, &mut saved) {
            tracing::debug!("Cart operation ignored");
            return Ok(Outcome::Unchanged);
        }

        let batch = Batch::new()
            .set(keys::CART, &items)?
            .set(keys::SAVED_ITEMS, &saved)?;
        self.store.commit(batch)?;

        self.items = items;
        self.saved = saved;
        self.notify(CartEvent::Updated(self.totals()));
        Ok(Outcome::Changed)
    }

    fn notify(&self, event: CartEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Drain pending storage events; `true` if any foreign write touched a
    /// cart list (or events were lost).
    fn drain_storage_events(&mut self) -> bool {
        let own = self.store.origin();
        let mut relevant = false;
        loop {
            match self.storage.try_recv() {
                Ok(event) => {
                    relevant |= event.origin != own
                        && (event.key == keys::CART || event.key == keys::SAVED_ITEMS);
                }
                Err(TryRecvError::Lagged(_)) => relevant = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        relevant
    }
}

/// Move `from[index]` to the end of `to`, merging into a line with the same
/// id if `to` already has one.
fn move_line(from: &mut Vec<CartItem>, to: &mut Vec<CartItem>, index: usize) -> bool {
    if index >= from.len() {
        return false;
    }
    let line = from.remove(index);
    if let Some(existing) = to.iter_mut().find(|other| other.id() == line.id()) {
        existing.add_quantity(line.quantity());
    } else {
        to.push(line);
    }
    true
}

/// `<unix millis>-<0..999>`, regenerated until unused in either list.
fn generate_line_id(items: &[CartItem], saved: &[CartItem]) -> LineId {
    let mut rng = rand::rng();
    loop {
        let candidate = LineId::new(format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            rng.random_range(0..1000)
        ));
        if !items.iter().chain(saved).any(|line| line.id() == &candidate) {
            return candidate;
        }
    }
}

/// Hydrate one list, dropping malformed lines and repairing missing or
/// duplicate ids.
fn load_list(store: &JsonStore, key: &str) -> Vec<CartItem> {
    let raw: Vec<Value> = store.load(key, Vec::new());
    let mut lines: Vec<CartItem> = Vec::with_capacity(raw.len());

    for value in raw {
        let item = match serde_json::from_value::<NewCartItem>(value) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(key, error = %e, "Dropping malformed stored cart line");
                continue;
            }
        };
        let Some(mut item) = item.normalized() else {
            tracing::warn!(key, "Dropping stored cart line without a name");
            continue;
        };

        let id = match item.id.take() {
            Some(id) if !lines.iter().any(|line| line.id() == &id) => id,
            _ => generate_line_id(&lines, &[]),
        };
        lines.push(CartItem::from_new(item, id));
    }

    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use serde_json::json;

    use pocket_shop_core::Money;

    use super::*;
    use crate::error::ShopError;
    use crate::store::testing::FailingWrites;
    use crate::store::{KeyValueStore, MemoryStore};

    fn cart() -> CartState {
        cart_on(Arc::new(MemoryStore::new()))
    }

    fn cart_on(backend: Arc<dyn KeyValueStore>) -> CartState {
        CartState::hydrate(JsonStore::new(backend), ShippingPolicy::default())
    }

    fn item(id: &str, price: u64) -> NewCartItem {
        NewCartItem::new(format!("Item {id}"), Money::from_units(price)).with_id(id)
    }

    fn names(lines: &[CartItem]) -> Vec<&str> {
        lines.iter().map(CartItem::name).collect()
    }

    #[test]
    fn test_add_appends_new_lines_in_order() {
        let mut cart = cart();
        assert!(cart.add_item(item("a", 10)).unwrap().is_changed());
        assert!(cart.add_item(item("b", 20)).unwrap().is_changed());
        assert_eq!(names(cart.items()), vec!["Item a", "Item b"]);
    }

    #[test]
    fn test_add_merges_same_id() {
        let mut cart = cart();
        cart.add_item(item("a", 1000).with_quantity(2)).unwrap();
        cart.add_item(item("a", 1000).with_quantity(3)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity().get(), 5);
        assert_eq!(cart.items()[0].total(), Money::from_units(5000));
    }

    #[test]
    fn test_add_without_id_merges_by_name_and_generates_id() {
        let mut cart = cart();
        cart.add_item(NewCartItem::new("Bonsai", Money::from_units(35_000)))
            .unwrap();
        cart.add_item(NewCartItem::new("Bonsai", Money::from_units(35_000)))
            .unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity().get(), 2);
        assert!(!cart.items()[0].id().as_str().is_empty());
    }

    #[test]
    fn test_add_with_different_id_does_not_merge_by_name() {
        let mut cart = cart();
        cart.add_item(NewCartItem::new("Roses", Money::from_units(1)).with_id("x"))
            .unwrap();
        cart.add_item(NewCartItem::new("Roses", Money::from_units(2)).with_id("y"))
            .unwrap();
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_add_blank_name_is_noop() {
        let mut cart = cart();
        let outcome = cart
            .add_item(NewCartItem::new("  ", Money::from_units(10)))
            .unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_clamps_and_recomputes() {
        let mut cart = cart();
        cart.add_item(item("a", 250)).unwrap();

        cart.set_quantity(0, 4).unwrap();
        assert_eq!(cart.items()[0].total(), Money::from_units(1000));

        cart.set_quantity(0, 0).unwrap();
        assert_eq!(cart.items()[0].quantity().get(), 1);
        assert_eq!(cart.items()[0].total(), Money::from_units(250));

        assert_eq!(cart.set_quantity(5, 3).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn test_remove_shifts_later_lines() {
        let mut cart = cart();
        for id in ["a", "b", "c"] {
            cart.add_item(item(id, 1)).unwrap();
        }

        assert!(cart.remove_item(1).unwrap().is_changed());
        assert_eq!(names(cart.items()), vec!["Item a", "Item c"]);

        assert_eq!(cart.remove_item(2).unwrap(), Outcome::Unchanged);
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_save_then_restore_round_trips() {
        let mut cart = cart();
        for id in ["a", "b", "c"] {
            cart.add_item(item(id, 1)).unwrap();
        }

        cart.save_for_later(0).unwrap();
        assert_eq!(names(cart.items()), vec!["Item b", "Item c"]);
        assert_eq!(names(cart.saved()), vec!["Item a"]);

        let last = cart.saved().len() - 1;
        cart.restore_from_saved(last).unwrap();
        assert_eq!(names(cart.items()), vec!["Item b", "Item c", "Item a"]);
        assert!(cart.saved().is_empty());
    }

    #[test]
    fn test_move_out_of_range_is_noop() {
        let mut cart = cart();
        assert_eq!(cart.save_for_later(0).unwrap(), Outcome::Unchanged);
        assert_eq!(cart.restore_from_saved(0).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn test_restore_merges_into_line_with_same_id() {
        let mut cart = cart();
        cart.add_item(item("a", 10)).unwrap();
        cart.save_for_later(0).unwrap();
        cart.add_item(item("a", 10).with_quantity(2)).unwrap();

        cart.restore_from_saved(0).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity().get(), 3);
        assert_eq!(cart.items()[0].total(), Money::from_units(30));
    }

    #[test]
    fn test_clear_keeps_saved() {
        let mut cart = cart();
        cart.add_item(item("a", 1)).unwrap();
        cart.add_item(item("b", 1)).unwrap();
        cart.save_for_later(1).unwrap();

        assert!(cart.clear().unwrap().is_changed());
        assert!(cart.is_empty());
        assert_eq!(cart.saved().len(), 1);
        assert_eq!(cart.clear().unwrap(), Outcome::Unchanged);

        assert!(cart.clear_saved().unwrap().is_changed());
        assert!(cart.saved().is_empty());
    }

    #[test]
    fn test_mutations_write_through() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut cart = cart_on(Arc::clone(&backend));
        cart.add_item(item("a", 1000).with_quantity(2)).unwrap();
        cart.add_item(item("b", 5)).unwrap();
        cart.save_for_later(1).unwrap();

        let raw = backend.get(keys::CART).unwrap().unwrap();
        let stored: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            stored,
            json!([{"id": "a", "name": "Item a", "unitPrice": 1000, "quantity": 2, "total": 2000}])
        );

        let reopened = cart_on(backend);
        assert_eq!(reopened.items(), cart.items());
        assert_eq!(reopened.saved(), cart.saved());
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let backend = Arc::new(FailingWrites::new());
        let mut cart = cart_on(Arc::clone(&backend) as Arc<dyn KeyValueStore>);
        cart.add_item(item("a", 10).with_quantity(2)).unwrap();
        cart.add_item(item("b", 20)).unwrap();
        cart.save_for_later(1).unwrap();
        let items = cart.items().to_vec();
        let saved = cart.saved().to_vec();
        let mut events = cart.subscribe();

        backend.fail();
        assert!(matches!(cart.add_item(item("c", 30)), Err(ShopError::Store(_))));
        assert!(matches!(cart.add_item(item("a", 10)), Err(ShopError::Store(_))));
        assert!(matches!(cart.set_quantity(0, 9), Err(ShopError::Store(_))));
        assert!(matches!(cart.remove_item(0), Err(ShopError::Store(_))));
        assert!(matches!(cart.save_for_later(0), Err(ShopError::Store(_))));
        assert!(matches!(cart.clear(), Err(ShopError::Store(_))));

        assert_eq!(cart.items(), items.as_slice());
        assert_eq!(cart.saved(), saved.as_slice());
        assert!(events.try_recv().is_err());

        // The backend still holds the last good state.
        let reopened = cart_on(backend);
        assert_eq!(reopened.items(), items.as_slice());
        assert_eq!(reopened.saved(), saved.as_slice());
    }

    #[test]
    fn test_hydrate_corrupt_cart_is_empty() {
        let backend = Arc::new(MemoryStore::with_entries([
            (keys::CART, "{{{{"),
            (keys::SAVED_ITEMS, "\"not a list\""),
        ]));
        let cart = cart_on(backend);
        assert!(cart.items().is_empty());
        assert!(cart.saved().is_empty());
    }

    #[test]
    fn test_hydrate_repairs_lines() {
        let stored = json!([
            {"id": "a", "name": "Kept", "unitPrice": 1000, "quantity": 2, "total": 1},
            {"name": "No id", "unitPrice": "15", "quantity": 1},
            {"id": "a", "name": "Duplicate id", "unitPrice": 1, "quantity": 1},
            {"id": "z", "unitPrice": 3},
            42
        ]);
        let backend = Arc::new(MemoryStore::with_entries([(keys::CART, stored.to_string())]));
        let cart = cart_on(backend);

        assert_eq!(names(cart.items()), vec!["Kept", "No id", "Duplicate id"]);
        assert_eq!(cart.items()[0].total(), Money::from_units(2000));
        assert_ne!(cart.items()[2].id().as_str(), "a");
        assert_ne!(cart.items()[1].id(), cart.items()[2].id());
    }

    #[test]
    fn test_events_follow_persisted_mutations() {
        let mut cart = cart();
        let mut events = cart.subscribe();

        cart.add_item(item("a", 100).with_quantity(3)).unwrap();
        cart.remove_item(9).unwrap();

        match events.try_recv().unwrap() {
            CartEvent::Updated(totals) => {
                assert_eq!(totals.item_count, 3);
                assert_eq!(totals.subtotal, Money::from_units(300));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_sync_external_ignores_own_writes() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut first = cart_on(Arc::clone(&backend));
        let mut second = cart_on(backend);

        first.add_item(item("a", 1)).unwrap();
        assert!(!first.sync_external());

        assert!(second.items().is_empty());
        assert!(second.sync_external());
        assert_eq!(second.items().len(), 1);
        assert!(!second.sync_external());
    }

    #[test]
    fn test_totals_are_idempotent() {
        let mut cart = cart();
        cart.add_item(item("a", 700).with_quantity(2)).unwrap();
        assert_eq!(cart.totals(), cart.totals());
        assert_eq!(cart.item_count(), 2);
    }

    proptest! {
        #[test]
        fn prop_same_id_adds_merge_into_one_line(
            price in 0u64..1_000_000,
            quantities in proptest::collection::vec(1i64..50, 1..20),
        ) {
            let mut cart = cart();
            for quantity in &quantities {
                cart.add_item(item("same", price).with_quantity(*quantity)).unwrap();
            }

            prop_assert_eq!(cart.items().len(), 1);
            let line = &cart.items()[0];
            let expected: i64 = quantities.iter().sum();
            prop_assert_eq!(i64::from(line.quantity().get()), expected);
            prop_assert_eq!(line.total(), line.unit_price().times(line.quantity()));
        }

        #[test]
        fn prop_totals_always_match_lines(
            ops in proptest::collection::vec((0u8..5, 0usize..6, 0i64..6), 0..40),
        ) {
            let mut cart = cart();
            for (op, index, n) in ops {
                match op {
                    0 => { cart.add_item(item(&index.to_string(), 100)).unwrap(); }
                    1 => { cart.set_quantity(index, n).unwrap(); }
                    2 => { cart.remove_item(index).unwrap(); }
                    3 => { cart.save_for_later(index).unwrap(); }
                    _ => { cart.restore_from_saved(index).unwrap(); }
                }
                for line in cart.items().iter().chain(cart.saved()) {
                    prop_assert_eq!(line.total(), line.unit_price().times(line.quantity()));
                }
            }
        }
    }
}
