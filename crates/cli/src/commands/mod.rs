//! Command implementations.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;

use pocket_shop_storefront::Outcome;

use crate::output::Output;

/// Report an operation result: `done` if it changed something, `ignored`
/// otherwise.
fn report(out: Output, outcome: Outcome, done: &str, ignored: &str) {
    if outcome.is_changed() {
        out.message(done);
    } else {
        out.message(ignored);
    }
}
