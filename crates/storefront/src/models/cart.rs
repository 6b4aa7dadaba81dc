//! Cart line items.
//!
//! [`NewCartItem`] is the loose input shape: everything optional, numbers
//! coerced. [`CartItem`] is what lives in a list: it always has an id, a
//! non-empty name and a `total` that matches `unit_price * quantity`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use pocket_shop_core::{LineId, Money, Quantity};

/// A line item as offered to the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    /// Stable identity; when absent the name is used for merging.
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<LineId>,
    /// Display name. Blank names are rejected by the cart.
    #[serde(default)]
    pub name: String,
    /// Price per unit.
    #[serde(default)]
    pub unit_price: Money,
    /// How many units to add.
    #[serde(default)]
    pub quantity: Quantity,
    /// Image path or URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCartItem {
    /// Create an item with a name and unit price, quantity one.
    #[must_use]
    pub fn new(name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            unit_price,
            ..Self::default()
        }
    }

    /// Set an explicit identity.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<LineId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the quantity, clamped to at least one.
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Quantity::new(quantity);
        self
    }

    /// Set the image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trim the name and drop empty ids. Returns `None` when the name is blank.
    pub(crate) fn normalized(mut self) -> Option<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        self.name = name.to_owned();
        self.id = self.id.filter(|id| !id.as_str().trim().is_empty());
        Some(self)
    }
}

/// Ids are strings, but numbers are accepted and kept in their decimal form.
fn loose_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<LineId>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(LineId::new(s)),
        Value::Number(n) => Some(LineId::new(n.to_string())),
        _ => None,
    })
}

/// One line in the cart or the saved-for-later list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "NewCartItem")]
pub struct CartItem {
    id: LineId,
    name: String,
    unit_price: Money,
    quantity: Quantity,
    total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl CartItem {
    /// Build a line from a normalized input and the id it will live under.
    pub(crate) fn from_new(item: NewCartItem, id: LineId) -> Self {
        Self {
            id,
            total: item.unit_price.times(item.quantity),
            name: item.name,
            unit_price: item.unit_price,
            quantity: item.quantity,
            image: item.image,
            description: item.description,
        }
    }

    /// Line identity, unique within its list.
    #[must_use]
    pub const fn id(&self) -> &LineId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price per unit.
    #[must_use]
    pub const fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Number of units.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// Image path or URL.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Short description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.total = self.unit_price.times(quantity);
    }

    pub(crate) fn add_quantity(&mut self, quantity: Quantity) {
        self.set_quantity(self.quantity.saturating_add(quantity));
    }

    /// Whether an incoming item refers to this line.
    ///
    /// An incoming id only ever matches an equal id; without one, the
    /// name decides.
    pub(crate) fn matches(&self, incoming: &NewCartItem) -> bool {
        incoming
            .id
            .as_ref()
            .map_or_else(|| self.name == incoming.name, |id| &self.id == id)
    }
}

impl TryFrom<NewCartItem> for CartItem {
    type Error = String;

    fn try_from(item: NewCartItem) -> Result<Self, Self::Error> {
        let item = item
            .normalized()
            .ok_or_else(|| "cart item has no name".to_owned())?;
        let id = item
            .id
            .clone()
            .ok_or_else(|| format!("cart item '{}' has no id", item.name))?;
        Ok(Self::from_new(item, id))
    }
}
