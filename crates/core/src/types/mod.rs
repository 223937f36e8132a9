//! Core types for the marketplace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod identity;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{IdentityKey, Principal, UserSnapshot};
pub use price::{CurrencyCode, Price};
pub use product::{Category, ProductImage, ProductView, Variant};
