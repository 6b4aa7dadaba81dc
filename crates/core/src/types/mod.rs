//! Core types for Pocket Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod quantity;

pub use id::*;
pub use money::{Money, MoneyError};
pub use quantity::Quantity;
