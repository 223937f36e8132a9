//! Per-identity persistent stores.
//!
//! Each store namespaces its physical key with the identity key it was
//! resolved for, so two users on the same device never see each other's
//! state. The backing medium is injected; see
//! [`marketplace_core::storage`].

pub mod cart;
pub mod profile;
pub mod ratings;

pub use cart::{CartItem, CartLineInput, CartStore};
pub use profile::{ProfileCompletion, ProfileForm, ProfileRecord, ProfileStore};
pub use ratings::{Rating, RatingEntry, RatingSummary, RatingsStore};
