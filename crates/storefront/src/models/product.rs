//! Catalog product records.

use serde::Serialize;

use pocket_shop_core::{LineId, Money, ProductId};

use super::cart::NewCartItem;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Short description, searched alongside the name.
    pub description: String,
    /// Long description for the detail view.
    pub long_description: String,
    /// Image path.
    pub image: String,
    /// Units in stock (display only; never decremented).
    pub stock: u32,
    /// Average rating out of five.
    pub rating: f32,
    /// Number of reviews behind the rating.
    pub review_count: u32,
}

impl Product {
    /// The cart line id used for this product.
    #[must_use]
    pub fn line_id(&self) -> LineId {
        LineId::new(format!("product-{}", self.id))
    }
}

impl From<&Product> for NewCartItem {
    fn from(product: &Product) -> Self {
        Self::new(product.name.clone(), product.price)
            .with_id(product.line_id())
            .with_image(product.image.clone())
            .with_description(product.description.clone())
    }
}
