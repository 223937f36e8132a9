//! Marketplace Core - Shared types and the storage seam.
//!
//! This crate provides common types used across all marketplace components:
//! - `storefront` - Per-user persistence (session, cart, profile, ratings)
//!   and the catalog backend client
//! - `admin` - Moderation override state and the product overlay
//!
//! # Architecture
//!
//! The core crate contains types, traits, and the local key-value storage
//! primitives - no network I/O, no HTTP clients. Stores in the downstream
//! crates receive a [`storage::KeyValueStore`] backend as an explicit
//! dependency rather than reaching for an ambient singleton, which keeps
//! every store testable against [`storage::MemoryStore`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, prices, and the catalog
//!   view models shared by the storefront and admin crates
//! - [`storage`] - The `KeyValueStore` trait and its in-memory and (with the
//!   `fs` feature) file-backed implementations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod storage;
pub mod types;

pub use types::*;
