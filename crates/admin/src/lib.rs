//! Marketplace Admin library.
//!
//! Moderation state for the storefront: which products are hidden, which
//! statuses are overridden, which admin-authored products are injected,
//! and which brands are verified. The state is one process-wide document
//! (no per-user partitioning, last write wins); every listing page runs
//! its fetched products through [`overlay::apply_overrides`] before
//! rendering.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod overlay;
pub mod overrides;

pub use error::AdminError;
pub use overlay::apply_overrides;
pub use overrides::{ADMIN_STATE_KEY, AdminStateStore, CustomProductForm, OverrideDocument};
