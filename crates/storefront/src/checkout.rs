//! Checkout validation and completion.
//!
//! No payment processing happens here - the form is validated, the order
//! summary is assembled from the cart, and completion empties the cart.
//! Validation failures reject before any store mutation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marketplace_core::storage::{KeyValueStore, StorageError};
use marketplace_core::{Email, EmailError, IdentityKey};

use crate::stores::cart::{CartItem, CartStore};

/// How the buyer intends to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Cash,
}

/// Shipping and payment details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub payment: PaymentMethod,
}

/// Errors rejecting a checkout before the cart is touched.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Name, email, or address is blank.
    #[error("fill in all required fields")]
    MissingFields,

    /// The email address does not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Nothing to check out.
    #[error("your cart is empty")]
    EmptyCart,

    /// The local storage medium failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The completed order as shown on the confirmation screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub payment: PaymentMethod,
    pub placed_at: DateTime<Utc>,
}

/// Validate the form and complete checkout for the identity.
///
/// On success the cart is emptied and the order summary returned. Any
/// validation failure leaves the cart exactly as it was.
///
/// # Errors
///
/// Returns [`CheckoutError`] for blank required fields, an unparseable
/// email, an empty cart, or a storage medium failure.
pub fn complete<S: KeyValueStore>(
    cart: &CartStore<S>,
    identity: &IdentityKey,
    form: &CheckoutForm,
) -> Result<OrderSummary, CheckoutError> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.address.trim().is_empty()
    {
        return Err(CheckoutError::MissingFields);
    }
    let email = Email::parse(form.email.trim())?;

    let items = cart.items(identity)?;
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let total: Decimal = items.iter().map(|item| item.price).sum();
    cart.clear(identity)?;

    Ok(OrderSummary {
        items,
        total,
        name: form.name.trim().to_owned(),
        email,
        address: form.address.trim().to_owned(),
        payment: form.payment,
        placed_at: Utc::now(),
    })
}
