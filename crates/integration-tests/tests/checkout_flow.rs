//! End-to-end shopping session: browse, fill the cart, check out.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use pocket_shop_core::{Money, ProductId};
use pocket_shop_integration_tests::TestContext;
use pocket_shop_storefront::models::{BuyerInfo, NewCartItem, keys};
use pocket_shop_storefront::{Outcome, ShopError};

#[test]
fn test_browse_add_and_check_out() {
    let ctx = TestContext::new();
    let mut shop = ctx.session();

    let roses = shop.catalog().search(Some("roses"));
    assert_eq!(roses.len(), 1);
    let roses_id = roses[0].id;

    shop.add_product(roses_id, 1).unwrap();
    shop.add_product(ProductId::new(3), 2).unwrap();
    shop.add_product(roses_id, 1).unwrap();

    let totals = shop.cart().totals();
    // 2 x 35000 + 2 x 15000
    assert_eq!(totals.item_count, 4);
    assert_eq!(totals.subtotal, Money::from_units(100_000));
    assert_eq!(totals.shipping, Money::from_units(5_000));
    assert_eq!(totals.grand_total, Money::from_units(105_000));

    shop.account().login("Ana", Some("ana@example.com")).unwrap();
    let order = shop
        .checkout(BuyerInfo {
            name: Some("Ana".to_string()),
            payment_method: Some("card".to_string()),
            ..BuyerInfo::default()
        })
        .unwrap();

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total, Money::from_units(105_000));
    assert!(shop.cart().is_empty());
    assert_eq!(shop.header().cart_count, 0);
    assert_eq!(shop.header().greeting, "Hello, Ana");

    let stored = ctx.raw(keys::LAST_ORDER).unwrap();
    assert_eq!(stored["orderId"], order.order_id.as_str());
    assert_eq!(stored["shippingCost"], 5000);
    assert_eq!(stored["buyer"]["paymentMethod"], "card");
    assert_eq!(ctx.raw(keys::CART).unwrap(), serde_json::json!([]));
}

#[test]
fn test_empty_checkout_writes_nothing() {
    let ctx = TestContext::new();
    let mut shop = ctx.session();

    let err = shop.checkout(BuyerInfo::default()).unwrap_err();
    assert!(matches!(err, ShopError::EmptyCart));
    assert!(err.is_user_facing());
    assert!(ctx.raw(keys::ORDERS).is_none());
    assert!(ctx.raw(keys::LAST_ORDER).is_none());
}

#[test]
fn test_saved_items_are_cleared_by_checkout() {
    let ctx = TestContext::new();
    let mut shop = ctx.session();

    shop.add_product(ProductId::new(1), 1).unwrap();
    shop.add_product(ProductId::new(2), 1).unwrap();
    assert_eq!(shop.cart_mut().save_for_later(0).unwrap(), Outcome::Changed);
    assert_eq!(shop.cart().saved().len(), 1);

    shop.checkout(BuyerInfo::default()).unwrap();
    assert!(shop.cart().saved().is_empty());
    assert_eq!(ctx.raw(keys::SAVED_ITEMS).unwrap(), serde_json::json!([]));
}

#[test]
fn test_free_shipping_above_threshold() {
    let ctx = TestContext::new();
    let mut shop = ctx.session();

    shop.cart_mut()
        .add_item(NewCartItem::new("Greenhouse", Money::from_units(100_001)))
        .unwrap();
    let order = shop.checkout(BuyerInfo::default()).unwrap();
    assert_eq!(order.shipping_cost, Money::ZERO);
    assert_eq!(order.total, Money::from_units(100_001));
}

#[test]
fn test_orders_accumulate() {
    let ctx = TestContext::new();
    let mut shop = ctx.session();

    let mut placed = Vec::new();
    for id in 1..=3 {
        shop.add_product(ProductId::new(id), 1).unwrap();
        placed.push(shop.checkout(BuyerInfo::default()).unwrap());
    }

    let history = shop.orders().all();
    assert_eq!(history, placed);
    assert_eq!(shop.orders().last().as_ref(), placed.last());
    assert_eq!(shop.orders().find(&placed[1].order_id), Some(placed[1].clone()));
}
