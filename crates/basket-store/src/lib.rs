//! # basket-store: Cart Store for a Shopping Session
//!
//! Owns the live cart and drives the asynchronous checkout against an
//! external collaborator.
//!
//! ## Module Organization
//! ```text
//! basket_store/
//! ├── lib.rs      ◄─── You are here (exports & tracing setup)
//! ├── store.rs    ◄─── CartStore, builder, event emitter
//! ├── client.rs   ◄─── CheckoutClient trait + SimulatedCheckout
//! ├── config.rs   ◄─── StoreConfig (TOML + env overrides)
//! ├── error.rs    ◄─── StoreError
//! └── bin/
//!     └── demo.rs ◄─── Scripted success / failure walkthrough
//! ```
//!
//! ## Checkout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │          checkout_cart()              success: true                     │
//! │   READY ───────────────► LOADING ──────────────────► READY (items = {}) │
//! │     ▲                       │                                           │
//! │     │                       │ success: false / call failed / timeout    │
//! │     │  checkout_cart()      ▼                                           │
//! │     └──────────────────── ERROR (items kept, message set)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod store;

pub use client::{CheckoutClient, CheckoutFailure, CheckoutRequest, SimulatedCheckout, SimulatedOutcome};
pub use config::{CheckoutConcurrency, QuantityPolicy, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use store::{CartEventEmitter, CartStore, CartStoreBuilder, CheckoutOutcome, NoOpEmitter};

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,basket_core=debug,basket_store=debug";

/// Installs the global tracing subscriber.
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`]. Calling it
/// twice is harmless; the second subscriber is ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
