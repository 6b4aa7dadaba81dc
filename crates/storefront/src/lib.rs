//! Pocket Shop storefront library.
//!
//! Catalog, cart state, checkout and the persistent store adapter of the
//! demo shop. Every component is an explicit value bound to a [`JsonStore`]
//! context; [`Storefront`] bundles them into one browsing session.
//!
//! [`JsonStore`]: store::JsonStore
//! [`Storefront`]: state::Storefront

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feedback;
pub mod models;
pub mod orders;
pub mod pricing;
pub mod state;
pub mod store;
pub mod views;

pub use cart::{CartEvent, CartState, Outcome};
pub use error::{Result, ShopError};
pub use state::Storefront;
