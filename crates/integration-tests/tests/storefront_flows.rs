//! Storefront flows across session, identity, and the per-user stores.

use rust_decimal::Decimal;
use secrecy::SecretString;

use marketplace_core::storage::{KeyValueStore, MemoryStore};
use marketplace_core::{IdentityKey, ProductId, UserSnapshot};
use marketplace_storefront::checkout::{self, CheckoutForm, PaymentMethod};
use marketplace_storefront::identity::{AnonymousScope, IdentityResolver};
use marketplace_storefront::session::SessionStore;
use marketplace_storefront::stores::cart::{CartLineInput, CartStore};
use marketplace_storefront::stores::profile::{ProfileForm, ProfileStore};
use marketplace_storefront::stores::ratings::{Rating, RatingsStore};

use marketplace_integration_tests::init_tracing;

fn user(id: &str) -> UserSnapshot {
    UserSnapshot {
        id: Some(id.to_owned()),
        email: Some(format!("{id}@example.com")),
        ..UserSnapshot::default()
    }
}

fn line(id: &str, price: i64) -> CartLineInput {
    CartLineInput {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Decimal::new(price, 0),
        image_url: None,
        category_name: None,
    }
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn test_identity_is_stable_across_page_loads() {
    init_tracing();
    let store = MemoryStore::new();
    let session = SessionStore::new(&store);
    session
        .sign_in(&user("u-42"), &SecretString::from("tok"), None)
        .expect("sign in");

    // Every page constructs its own resolver; the key must not drift
    let first = IdentityResolver::new(&session)
        .resolve(None, AnonymousScope::Guest)
        .expect("resolve");
    let second = IdentityResolver::new(&session)
        .resolve(None, AnonymousScope::Device)
        .expect("resolve");
    assert_eq!(first, second);
    assert_eq!(first, IdentityKey::from("u-42"));
}

#[test]
fn test_signed_out_pages_fall_back_to_sentinels() {
    init_tracing();
    let store = MemoryStore::new();
    let session = SessionStore::new(&store);
    let resolver = IdentityResolver::new(&session);

    assert_eq!(
        resolver.resolve(None, AnonymousScope::Guest).expect("resolve"),
        IdentityKey::guest()
    );
    assert_eq!(resolver.resolve_user(None).expect("resolve"), None);
}

// =============================================================================
// Cart
// =============================================================================

#[test]
fn test_cart_line_entries_and_removal() {
    init_tracing();
    let store = MemoryStore::new();
    let cart = CartStore::new(&store);
    let buyer = IdentityKey::from("u-1");

    // Adding the same product twice yields two distinct line entries
    cart.add(&buyer, line("p-1", 1000)).expect("add");
    let items = cart.add(&buyer, line("p-1", 1000)).expect("add");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, items[1].id);

    // Removing with a stamp takes only the matching entry
    let remaining = cart
        .remove(&buyer, &ProductId::new("p-1"), Some(items[0].added_at))
        .expect("remove");
    assert_eq!(remaining.len(), 1);

    // Removing without a stamp takes every entry for the product
    cart.add(&buyer, line("p-1", 1000)).expect("add");
    let remaining = cart
        .remove(&buyer, &ProductId::new("p-1"), None)
        .expect("remove");
    assert!(remaining.is_empty());
}

#[test]
fn test_cart_is_isolated_per_identity() {
    init_tracing();
    let store = MemoryStore::new();
    let cart = CartStore::new(&store);

    cart.add(&IdentityKey::from("u-1"), line("p-1", 1000))
        .expect("add");
    cart.add(&IdentityKey::guest(), line("p-2", 2000))
        .expect("add");

    assert_eq!(cart.count(&IdentityKey::from("u-1")).expect("count"), 1);
    assert_eq!(cart.count(&IdentityKey::guest()).expect("count"), 1);
    assert_eq!(cart.count(&IdentityKey::from("u-2")).expect("count"), 0);
}

#[test]
fn test_checkout_clears_only_the_buyers_cart() {
    init_tracing();
    let store = MemoryStore::new();
    let cart = CartStore::new(&store);
    let buyer = IdentityKey::from("u-1");
    let other = IdentityKey::from("u-2");

    cart.add(&buyer, line("p-1", 1500)).expect("add");
    cart.add(&buyer, line("p-2", 2500)).expect("add");
    cart.add(&other, line("p-3", 9000)).expect("add");

    let order = checkout::complete(
        &cart,
        &buyer,
        &CheckoutForm {
            name: "Aliya".to_owned(),
            email: "aliya@example.com".to_owned(),
            address: "12 Abay Ave".to_owned(),
            payment: PaymentMethod::Card,
        },
    )
    .expect("checkout");

    assert_eq!(order.total, Decimal::new(4000, 0));
    assert_eq!(cart.count(&buyer).expect("count"), 0);
    assert_eq!(cart.count(&other).expect("count"), 1);
}

// =============================================================================
// Ratings
// =============================================================================

#[test]
fn test_rating_upsert_and_average() {
    init_tracing();
    let store = MemoryStore::new();
    let ratings = RatingsStore::new(&store);
    let product = ProductId::new("p-1");
    let alice = IdentityKey::from("u-1");
    let bob = IdentityKey::from("u-2");

    // Re-rating replaces, never appends
    ratings
        .set_rating(&product, Some(&alice), Rating::new(3).expect("rating"))
        .expect("set");
    let entries = ratings
        .set_rating(&product, Some(&alice), Rating::new(5).expect("rating"))
        .expect("set");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].rating.value(), 5);

    ratings
        .set_rating(&product, Some(&bob), Rating::new(2).expect("rating"))
        .expect("set");
    let entries = ratings
        .set_rating(&product, Some(&bob), Rating::new(2).expect("rating"))
        .expect("set");
    assert_eq!(entries.len(), 2);

    // [2, 5] averages to 3.5 over 2 entries
    let summary = ratings.average(&product).expect("average");
    assert_eq!(summary.count, 2);
    assert!((summary.average - 3.5).abs() < f64::EPSILON);

    // Unrated products never divide by zero
    let empty = ratings.average(&ProductId::new("unrated")).expect("average");
    assert_eq!(empty.count, 0);
    assert!((empty.average - 0.0).abs() < f64::EPSILON);
}

#[test]
fn test_anonymous_visitors_cannot_rate() {
    init_tracing();
    let store = MemoryStore::new();
    let session = SessionStore::new(&store);
    let resolver = IdentityResolver::new(&session);
    let ratings = RatingsStore::new(&store);
    let product = ProductId::new("p-1");

    // No session, no principal: resolve_user yields None, the mutator
    // degrades to a no-op, and nothing was persisted
    let user_key = resolver.resolve_user(None).expect("resolve");
    let entries = ratings
        .set_rating(&product, user_key.as_ref(), Rating::new(4).expect("rating"))
        .expect("set");
    assert!(entries.is_empty());
    assert_eq!(ratings.average(&product).expect("average").count, 0);
}

// =============================================================================
// Profile
// =============================================================================

#[test]
fn test_profile_follows_the_resolved_identity() {
    init_tracing();
    let store = MemoryStore::new();
    let session = SessionStore::new(&store);
    session
        .sign_in(&user("u-7"), &SecretString::from("tok"), Some("seller"))
        .expect("sign in");

    let identity = IdentityResolver::new(&session)
        .resolve(None, AnonymousScope::Device)
        .expect("resolve");
    let profiles = ProfileStore::new(&store);

    let saved = profiles
        .save(
            &identity,
            ProfileForm {
                full_name: "Aliya".to_owned(),
                phone: "707 123 4567".to_owned(),
                city: "Almaty".to_owned(),
                address: "12 Abay Ave".to_owned(),
                ..ProfileForm::default()
            },
        )
        .expect("save");
    assert_eq!(saved.phone, "7071234567");

    // A different identity sees no profile
    assert_eq!(
        profiles.load(&IdentityKey::from("someone-else")).expect("load"),
        None
    );

    // Signing out then resolving again lands on the device sentinel,
    // which also has no profile
    session.sign_out().expect("sign out");
    let anonymous = IdentityResolver::new(&session)
        .resolve(None, AnonymousScope::Device)
        .expect("resolve");
    assert_eq!(anonymous, IdentityKey::device());
    assert_eq!(profiles.load(&anonymous).expect("load"), None);
}

// =============================================================================
// Corrupt-data resilience
// =============================================================================

#[test]
fn test_corrupt_records_read_as_defaults_and_recover() {
    init_tracing();
    let store = MemoryStore::new();
    let buyer = IdentityKey::from("u-1");

    // Poison every store's physical key
    store.set("marketplace_cart_u-1", "{{{{").expect("set");
    store.set("marketplace_profile:u-1", "][").expect("set");
    store.set("marketplace_ratings", "null-ish").expect("set");

    let cart = CartStore::new(&store);
    let profiles = ProfileStore::new(&store);
    let ratings = RatingsStore::new(&store);

    assert!(cart.items(&buyer).expect("items").is_empty());
    assert_eq!(profiles.load(&buyer).expect("load"), None);
    assert_eq!(
        ratings.average(&ProductId::new("p-1")).expect("average").count,
        0
    );

    // Subsequent writes succeed normally
    let items = cart.add(&buyer, line("p-1", 500)).expect("add");
    assert_eq!(items.len(), 1);
    let entries = ratings
        .set_rating(
            &ProductId::new("p-1"),
            Some(&buyer),
            Rating::new(4).expect("rating"),
        )
        .expect("set");
    assert_eq!(entries.len(), 1);
}
