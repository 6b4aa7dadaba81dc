//! Cart commands. Line numbers on the command line start at 1.

use std::fmt::Write as _;

use pocket_shop_core::{Money, ProductId};
use pocket_shop_storefront::models::NewCartItem;
use pocket_shop_storefront::views::CartView;
use pocket_shop_storefront::{Result, Storefront};

use super::report;
use crate::output::Output;

/// Convert a 1-based line number to a list index. Line 0 maps past any
/// list so the operation is ignored.
const fn index(line: usize) -> usize {
    match line.checked_sub(1) {
        Some(i) => i,
        None => usize::MAX,
    }
}

pub fn show(shop: &mut Storefront, out: Output) {
    shop.sync();
    let view = shop.cart_view();
    out.emit(&view, || render(&view));
}

pub fn add(shop: &mut Storefront, id: ProductId, quantity: i64, out: Output) -> Result<()> {
    let outcome = shop.add_product(id, quantity)?;
    report(out, outcome, "Added to cart.", "Nothing added.");
    Ok(())
}

pub fn add_custom(
    shop: &mut Storefront,
    name: &str,
    price: &str,
    quantity: i64,
    out: Output,
) -> Result<()> {
    let item = NewCartItem::new(name, Money::parse(price)?).with_quantity(quantity);
    let outcome = shop.cart_mut().add_item(item)?;
    report(out, outcome, "Added to cart.", "Nothing added: the name is blank.");
    Ok(())
}

pub fn set_quantity(shop: &mut Storefront, line: usize, quantity: i64, out: Output) -> Result<()> {
    let outcome = shop.cart_mut().set_quantity(index(line), quantity)?;
    report(out, outcome, "Quantity updated.", &no_line(line));
    Ok(())
}

pub fn remove(shop: &mut Storefront, line: usize, out: Output) -> Result<()> {
    let outcome = shop.cart_mut().remove_item(index(line))?;
    report(out, outcome, "Removed from cart.", &no_line(line));
    Ok(())
}

pub fn save(shop: &mut Storefront, line: usize, out: Output) -> Result<()> {
    let outcome = shop.cart_mut().save_for_later(index(line))?;
    report(out, outcome, "Saved for later.", &no_line(line));
    Ok(())
}

pub fn restore(shop: &mut Storefront, line: usize, out: Output) -> Result<()> {
    let outcome = shop.cart_mut().restore_from_saved(index(line))?;
    report(out, outcome, "Moved back to cart.", &format!("There is no saved line {line}."));
    Ok(())
}

pub fn clear(shop: &mut Storefront, out: Output) -> Result<()> {
    let outcome = shop.cart_mut().clear()?;
    report(out, outcome, "Cart emptied.", "The cart is already empty.");
    Ok(())
}

fn no_line(line: usize) -> String {
    format!("There is no cart line {line}.")
}

fn render(view: &CartView) -> String {
    let mut text = String::new();

    if view.is_empty() {
        text.push_str("Your cart is empty.\n");
    } else {
        for line in &view.items {
            let _ = writeln!(
                text,
                "{:>2}. {:<24} {:>3} x {:>10} = {:>10}",
                line.position, line.name, line.quantity, line.price, line.line_price
            );
        }
        let _ = writeln!(text, "\n    Items:    {}", view.item_count);
        let _ = writeln!(text, "    Subtotal: {}", view.subtotal);
        let _ = writeln!(text, "    Shipping: {}", view.shipping);
        let _ = writeln!(text, "    Total:    {}", view.total);
    }

    if !view.saved.is_empty() {
        text.push_str("\nSaved for later:\n");
        for line in &view.saved {
            let _ = writeln!(
                text,
                "{:>2}. {:<24} {:>3} x {:>10}",
                line.position, line.name, line.quantity, line.price
            );
        }
    }

    text.trim_end().to_string()
}
