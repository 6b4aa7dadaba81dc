//! Catalog browsing.

use std::fmt::Write as _;

use pocket_shop_core::ProductId;
use pocket_shop_storefront::views::ProductView;
use pocket_shop_storefront::{Result, ShopError, Storefront};

use crate::output::Output;

/// List products, optionally filtered by a search term.
pub fn list(shop: &Storefront, search: Option<&str>, out: Output) {
    let products: Vec<ProductView> = shop
        .catalog()
        .search(search)
        .into_iter()
        .map(ProductView::from)
        .collect();

    out.emit(&products, || {
        if products.is_empty() {
            return "No products match your search.".to_string();
        }
        let mut text = String::new();
        for p in &products {
            let _ = writeln!(
                text,
                "{:>3}  {:<20} {:>10}  {}",
                p.id, p.name, p.price, p.description
            );
        }
        text.trim_end().to_string()
    });
}

/// Show one product in detail.
pub fn show(shop: &Storefront, id: ProductId, out: Output) -> Result<()> {
    let product = shop
        .catalog()
        .get(id)
        .ok_or(ShopError::ProductNotFound(id))?;
    let view = ProductView::from(product);

    out.emit(&view, || {
        format!(
            "{} ({})\n{}\n\n{}\nRated {:.1} from {} reviews, {} in stock",
            product.name,
            view.price,
            product.description,
            product.long_description,
            product.rating,
            product.review_count,
            product.stock,
        )
    });
    Ok(())
}
