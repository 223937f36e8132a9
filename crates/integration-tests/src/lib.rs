//! Integration tests for the marketplace workspace.
//!
//! These tests exercise the crates together the way a page would: resolve
//! an identity, read and write the per-user stores, and run fetched
//! products through the admin overlay. Everything runs against the
//! in-memory storage backend (or a temp-dir file store), so no backend or
//! network is required.
//!
//! # Test Categories
//!
//! - `storefront_flows` - session, identity, cart, profile, ratings,
//!   checkout
//! - `admin_overlay` - override document mutation and the product overlay,
//!   including persistence across file-backed store instances

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a test tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn` so corrupt-record discards show
/// up in test output.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
