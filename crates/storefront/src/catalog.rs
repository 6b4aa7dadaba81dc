//! Read-only product catalog.
//!
//! The catalog is a fixed, small list held in memory. Lookups never fail:
//! an unknown id is simply `None`.

use pocket_shop_core::{Money, ProductId};

use crate::models::Product;

/// The product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from products in display order.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The demo store's garden catalog.
    #[must_use]
    pub fn demo() -> Self {
        let product = |id: i32,
                       name: &str,
                       price: u64,
                       description: &str,
                       long_description: &str,
                       image: &str,
                       stock: u32,
                       rating: f32,
                       review_count: u32| Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: Money::from_units(price),
            description: description.to_owned(),
            long_description: long_description.to_owned(),
            image: image.to_owned(),
            stock,
            rating,
            review_count,
        };

        Self::new(vec![
            product(
                1,
                "Planters",
                20_000,
                "Decorative planters for indoors and outdoors.",
                "Premium decorative planters for indoor and outdoor plants. Available in several sizes and colours. Tough, long-lasting material.",
                "assets/images/product1.png",
                100,
                4.5,
                150,
            ),
            product(
                2,
                "Bonsai",
                35_000,
                "Miniature decorative plant.",
                "Professionally grown bonsai, ready to brighten any space. Comes with a pot and a care guide.",
                "assets/images/product2.png",
                50,
                4.8,
                280,
            ),
            product(
                3,
                "Organic fertilizer",
                15_000,
                "Natural fertilizer for your plants.",
                "100% organic fertilizer with no harsh chemicals. Suitable for every kind of plant.",
                "assets/images/product3.png",
                200,
                4.3,
                95,
            ),
            product(
                4,
                "Gardening kit",
                50_000,
                "Everything you need to start a garden at home.",
                "Complete gardening kit with basic tools, selected seeds and a detailed growing guide. Perfect for beginners.",
                "assets/images/featured_product.png",
                30,
                4.7,
                320,
            ),
            product(
                5,
                "Yellow sunflowers",
                30_000,
                "High quality sunflowers for decoration.",
                "High quality yellow sunflowers with firm 50-70 cm stems. Ideal for flower arrangements. Last 5-7 days.",
                "assets/images/items/sunflowers.png",
                75,
                4.6,
                400,
            ),
            product(
                6,
                "Red roses",
                35_000,
                "Premium roses for special occasions.",
                "First-class red roses. Perfect for gifts and special occasions. Guaranteed fresh.",
                "assets/images/items/roses.png",
                60,
                4.9,
                520,
            ),
            product(
                7,
                "White daisies",
                18_000,
                "Simple, elegant wildflowers.",
                "Natural white daisies. Simple but elegant flowers for any arrangement. Excellent value.",
                "assets/images/items/daisies.png",
                90,
                4.2,
                175,
            ),
            product(
                8,
                "Assorted tulips",
                28_000,
                "Fresh tulips in several colours.",
                "Fresh tulips in red, pink, yellow and white. Spring flowers, perfect for decorating.",
                "assets/images/items/tulips.png",
                80,
                4.4,
                210,
            ),
        ])
    }

    /// Every product, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Look up a product by an id given as text (`" 3 "` works).
    #[must_use]
    pub fn get_str(&self, raw: &str) -> Option<&Product> {
        raw.parse::<ProductId>().ok().and_then(|id| self.get(id))
    }

    /// Case-insensitive substring search over name and short description.
    ///
    /// A missing or blank term returns the whole catalog. Results keep
    /// catalog order.
    #[must_use]
    pub fn search(&self, term: Option<&str>) -> Vec<&Product> {
        let needle = term.map(str::trim).unwrap_or_default().to_lowercase();
        if needle.is_empty() {
            return self.products.iter().collect();
        }

        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}
