//! Sessions on the file store surviving a restart.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::fs;

use pocket_shop_core::{Money, ProductId};
use pocket_shop_storefront::Storefront;
use pocket_shop_storefront::config::ShopConfig;
use pocket_shop_storefront::models::{BuyerInfo, NewCartItem};

fn config_at(path: &std::path::Path) -> ShopConfig {
    ShopConfig {
        data_file: path.to_path_buf(),
        ..ShopConfig::default()
    }
}

#[test]
fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_at(&dir.path().join("shop.json"));

    {
        let mut shop = Storefront::open(config.clone());
        shop.add_product(ProductId::new(7), 3).unwrap();
        shop.cart_mut()
            .add_item(NewCartItem::new("Gift wrap", Money::parse("12.50").unwrap()))
            .unwrap();
        shop.cart_mut().save_for_later(1).unwrap();
        shop.account().login("Ana", None).unwrap();
    }

    let shop = Storefront::open(config);
    let items = shop.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name(), "White daisies");
    assert_eq!(items[0].total(), Money::from_units(54_000));
    assert_eq!(shop.cart().saved()[0].unit_price(), Money::parse("12.5").unwrap());
    assert_eq!(shop.header().greeting, "Hello, Ana");
}

#[test]
fn test_stale_totals_are_recomputed_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.json");
    let cart = r#"[{"id":"a","name":"Bonsai","unitPrice":"35000","quantity":"2","total":1},{"name":""},7]"#;
    let document = serde_json::json!({ "cart": cart });
    fs::write(&path, document.to_string()).unwrap();

    let shop = Storefront::open(config_at(&path));
    let items = shop.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity().get(), 2);
    assert_eq!(items[0].total(), Money::from_units(70_000));
}

#[test]
fn test_corrupt_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.json");
    fs::write(&path, "not json at all").unwrap();

    let mut shop = Storefront::open(config_at(&path));
    assert!(shop.cart().is_empty());
    assert!(shop.orders().all().is_empty());

    shop.add_product(ProductId::new(1), 1).unwrap();
    let order = shop.checkout(BuyerInfo::default()).unwrap();

    let reopened = Storefront::open(config_at(&path));
    assert_eq!(reopened.orders().all(), vec![order]);
}

#[test]
fn test_two_sessions_on_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_at(&dir.path().join("shop.json"));

    let mut first = Storefront::open(config.clone());
    first.add_product(ProductId::new(4), 1).unwrap();

    // A second process opening the same file sees the write on hydration.
    let second = Storefront::open(config);
    assert_eq!(second.cart().item_count(), 1);
}
