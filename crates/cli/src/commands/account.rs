//! Sign-in, header and feedback commands.

use pocket_shop_storefront::{Result, Storefront};

use super::report;
use crate::output::Output;

pub fn login(shop: &Storefront, name: &str, email: Option<&str>, out: Output) -> Result<()> {
    let outcome = shop.account().login(name, email)?;
    report(
        out,
        outcome,
        &format!("Hello, {}", name.trim()),
        "A name is required to sign in.",
    );
    Ok(())
}

pub fn logout(shop: &Storefront, out: Output) -> Result<()> {
    let outcome = shop.account().logout()?;
    report(out, outcome, "Signed out.", "Nobody is signed in.");
    Ok(())
}

pub fn whoami(shop: &mut Storefront, out: Output) {
    shop.sync();
    let header = shop.header();
    out.emit(&header, || {
        format!("{} | Cart ({})", header.greeting, header.cart_count)
    });
}

pub fn suggest(
    shop: &Storefront,
    name: &str,
    email: &str,
    message: &str,
    out: Output,
) -> Result<()> {
    let suggestion = shop.feedback().submit(name, email, message)?;
    out.emit(&suggestion, || "Thanks! Your message was received.".to_string());
    Ok(())
}
