//! Catalog response normalization.
//!
//! The backend answers some endpoints with a bare JSON payload and others
//! with an `{ "value": ... }` envelope. Both shapes resolve through one
//! tagged union at the boundary so callers never probe response shapes
//! themselves. A response matching neither shape normalizes to
//! nothing (`None` / empty) rather than an error.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// A catalog response body: bare payload or `value` envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ApiPayload<T> {
    /// The payload directly in the body.
    Bare(T),
    /// The payload wrapped in a `value` field.
    Enveloped { value: T },
}

impl<T> ApiPayload<T> {
    /// Unwrap to the payload regardless of shape.
    pub fn into_inner(self) -> T {
        match self {
            Self::Bare(value) | Self::Enveloped { value } => value,
        }
    }
}

/// Normalize a response body to a sequence.
///
/// Accepts a bare array or an enveloped array; anything else (including
/// elements that fail to deserialize) normalizes to empty.
#[must_use]
pub fn unwrap_list<T: DeserializeOwned>(body: serde_json::Value) -> Vec<T> {
    match serde_json::from_value::<ApiPayload<Vec<T>>>(body) {
        Ok(payload) => payload.into_inner(),
        Err(error) => {
            debug!(%error, "response body matched neither list shape");
            Vec::new()
        }
    }
}

/// Normalize a response body to a single item.
///
/// Accepts a bare object or an enveloped object; anything else normalizes
/// to `None`.
#[must_use]
pub fn unwrap_item<T: DeserializeOwned>(body: serde_json::Value) -> Option<T> {
    match serde_json::from_value::<ApiPayload<T>>(body) {
        Ok(payload) => Some(payload.into_inner()),
        Err(error) => {
            debug!(%error, "response body matched neither item shape");
            None
        }
    }
}
