//! Pocket Shop Core - Shared types library.
//!
//! This crate provides common types used across all Pocket Shop components:
//! - `storefront` - Catalog, cart state, orders and the persistent store adapter
//! - `cli` - Command-line front end over a file-backed store
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and money amounts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
