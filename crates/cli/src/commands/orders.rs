//! Checkout and order history.

use std::fmt::Write as _;

use pocket_shop_storefront::models::{BuyerInfo, Order};
use pocket_shop_storefront::views::OrderView;
use pocket_shop_storefront::{Result, Storefront};

use crate::output::Output;

pub fn checkout(
    shop: &mut Storefront,
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    payment_method: Option<String>,
    out: Output,
) -> Result<()> {
    shop.sync();

    // Fall back to the signed-in user for missing contact details.
    let user = shop.account().current_user();
    let buyer = BuyerInfo {
        name: name.or_else(|| user.as_ref().map(|u| u.name.clone())),
        email: email.or_else(|| user.and_then(|u| u.email)),
        address,
        payment_method,
    };

    let order = shop.checkout(buyer)?;
    let view = OrderView::from(&order);
    out.emit(&view, || format!("Thank you for your order!\n\n{}", render(&view)));
    Ok(())
}

pub fn list(shop: &Storefront, last_only: bool, out: Output) {
    let orders: Vec<Order> = if last_only {
        shop.orders().last().into_iter().collect()
    } else {
        shop.orders().all()
    };
    let views: Vec<OrderView> = orders.iter().map(OrderView::from).collect();

    out.emit(&views, || {
        if views.is_empty() {
            return "No orders yet.".to_string();
        }
        views
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join("\n\n")
    });
}

fn render(order: &OrderView) -> String {
    let mut text = format!("Order {} placed {}", order.order_id, order.placed_at);
    if let Some(name) = &order.buyer_name {
        let _ = write!(text, " for {name}");
    }
    text.push('\n');

    for line in &order.lines {
        let _ = writeln!(
            text,
            "  {:<24} {:>3} x {:>10} = {:>10}",
            line.name, line.quantity, line.price, line.line_price
        );
    }
    let _ = writeln!(text, "  Subtotal: {}", order.subtotal);
    let _ = writeln!(text, "  Shipping: {}", order.shipping);
    let _ = write!(text, "  Total:    {}", order.total);
    text
}
