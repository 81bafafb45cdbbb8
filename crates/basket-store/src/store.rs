//! # Cart Store
//!
//! The session's cart: one owned [`CartState`] behind a cloneable handle,
//! the memo caches for its selectors, and the in-flight checkout slot.
//!
//! ## Thread Safety
//! Everything lives behind one `Mutex`. Each action locks, mutates and
//! unlocks, so actions apply in call order and are atomic with respect to
//! reads. The lock is never held across an `.await`.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout_cart()                                 │
//! │                                                                         │
//! │  ── atomic point 1 (lock held) ──────────────────────────────────────   │
//! │  claim slot (reject / supersede) ─► LOADING ─► snapshot items           │
//! │                                                                         │
//! │  ── suspension (no lock) ────────────────────────────────────────────   │
//! │  spawned task: timeout(client.checkout(snapshot))                       │
//! │       ▲ add_to_cart / update_quantity may run here; the snapshot        │
//! │       │ already sent is not affected                                    │
//! │       └ cancel_checkout() / a superseding checkout interrupts here      │
//! │                                                                         │
//! │  ── atomic point 2 (lock held) ──────────────────────────────────────   │
//! │  slot still ours? ─► fulfilled / rejected ─► release slot               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checkout runs in its own task, so it finishes and applies its result
//! even if the caller stops awaiting it. The collaborator call runs in a
//! further task of its own: a panicking client lands the cart in ERROR like
//! any other failure instead of leaving it in LOADING.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use basket_core::selectors::{num_items, NumItemsSelector, TotalPriceSelector};
use basket_core::validation::{validate_product_id, validate_quantity};
use basket_core::{CartState, CheckoutState, ProductCatalog};

use crate::client::{CheckoutClient, CheckoutFailure, CheckoutRequest};
use crate::config::{CheckoutConcurrency, QuantityPolicy, StoreConfig};
use crate::error::{StoreError, StoreResult};

/// Message stored when a checkout is cancelled through [`CartStore::cancel_checkout`].
pub const CANCELLED_MESSAGE: &str = "checkout cancelled";

// =============================================================================
// Checkout Outcome
// =============================================================================

/// How a checkout that ran to completion ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// `success: true`. Cart is READY and empty.
    Completed,

    /// `success: false`. Cart is ERROR, items kept, no message.
    Declined,

    /// The call failed. Cart is ERROR with the failure's message.
    Failed(CheckoutFailure),
}

impl CheckoutOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CheckoutOutcome::Completed)
    }
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives change notifications so a UI layer can re-render.
///
/// Called after the store lock is released, so implementations may read
/// the store again.
///
/// ## Ordering
/// Two changes made concurrently from different threads can reach the
/// emitter in the opposite order from the one they were applied in. Every
/// snapshot carries the store `version` it was taken at, assigned under the
/// lock and strictly increasing; keep the highest one seen and drop anything
/// older.
pub trait CartEventEmitter: Send + Sync {
    /// Emitted after every change to the cart state.
    fn emit_state(&self, version: u64, state: &CartState);

    /// Emitted when a checkout finishes with an outcome.
    fn emit_checkout(&self, checkout_id: Uuid, outcome: &CheckoutOutcome);
}

/// No-op event emitter.
pub struct NoOpEmitter;

impl CartEventEmitter for NoOpEmitter {
    fn emit_state(&self, _version: u64, _state: &CartState) {}
    fn emit_checkout(&self, _checkout_id: Uuid, _outcome: &CheckoutOutcome) {}
}

// =============================================================================
// Internals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interruption {
    Superseded,
    Cancelled,
}

impl From<Interruption> for StoreError {
    fn from(reason: Interruption) -> Self {
        match reason {
            Interruption::Superseded => StoreError::CheckoutSuperseded,
            Interruption::Cancelled => StoreError::CheckoutCancelled,
        }
    }
}

/// The one checkout currently considered "the current one".
struct InFlight {
    checkout_id: Uuid,
    interrupt: oneshot::Sender<Interruption>,
}

impl InFlight {
    fn interrupt(self, reason: Interruption) {
        // The checkout task may already be gone; nothing to tell it then.
        let _ = self.interrupt.send(reason);
    }
}

struct Guarded {
    cart: CartState,
    version: u64,
    num_items: NumItemsSelector,
    total_price: TotalPriceSelector,
    in_flight: Option<InFlight>,
}

impl Guarded {
    /// Stamps the current cart with the next version, for emitting once the
    /// lock is gone.
    fn snapshot(&mut self) -> Snapshot {
        self.version += 1;
        Snapshot {
            version: self.version,
            cart: self.cart.clone(),
        }
    }
}

struct Snapshot {
    version: u64,
    cart: CartState,
}

struct Inner {
    config: StoreConfig,
    client: Arc<dyn CheckoutClient>,
    emitter: Arc<dyn CartEventEmitter>,
    guarded: Mutex<Guarded>,
}

// =============================================================================
// Cart Store
// =============================================================================

/// Cloneable handle to the session's cart.
///
/// ## Usage
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use basket_core::CheckoutState;
/// use basket_store::{CartStore, SimulatedCheckout};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = CartStore::new(Arc::new(SimulatedCheckout::approving(Duration::ZERO)));
/// store.add_to_cart("X");
/// store.add_to_cart("X");
/// assert_eq!(store.num_items(), 2);
///
/// let outcome = store.checkout_cart().await.unwrap();
/// assert!(outcome.is_completed());
/// assert!(store.state().items.is_empty());
/// assert_eq!(store.state().checkout_state, CheckoutState::Ready);
/// # }
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    /// Creates a store with default configuration.
    pub fn new(client: Arc<dyn CheckoutClient>) -> Self {
        Self::with_config(StoreConfig::default(), client)
    }

    /// Creates a store with the given configuration.
    pub fn with_config(config: StoreConfig, client: Arc<dyn CheckoutClient>) -> Self {
        Self::with_emitter(config, client, Arc::new(NoOpEmitter))
    }

    /// Creates a store with a custom event emitter.
    pub fn with_emitter(
        config: StoreConfig,
        client: Arc<dyn CheckoutClient>,
        emitter: Arc<dyn CartEventEmitter>,
    ) -> Self {
        CartStore {
            inner: Arc::new(Inner {
                config,
                client,
                emitter,
                guarded: Mutex::new(Guarded {
                    cart: CartState::new(),
                    version: 0,
                    num_items: NumItemsSelector::new(),
                    total_price: TotalPriceSelector::new(),
                    in_flight: None,
                }),
            }),
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    fn lock(&self) -> MutexGuard<'_, Guarded> {
        self.inner
            .guarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, snapshot: Snapshot) {
        self.inner
            .emitter
            .emit_state(snapshot.version, &snapshot.cart);
    }

    /// Runs `f` against the cart under the lock, then emits the new state.
    fn mutate<R>(&self, f: impl FnOnce(&mut CartState) -> R) -> R {
        let (result, snapshot) = {
            let mut guard = self.lock();
            let result = f(&mut guard.cart);
            (result, guard.snapshot())
        };
        self.emit(snapshot);
        result
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Adds one unit of a product. Returns the new quantity.
    pub fn add_to_cart(&self, product_id: &str) -> i64 {
        let quantity = self.mutate(|cart| cart.add_to_cart(product_id));
        debug!(product_id = %product_id, quantity, "add_to_cart");
        quantity
    }

    /// Removes a product's entry. Absent products are a no-op.
    pub fn remove_from_cart(&self, product_id: &str) -> Option<i64> {
        let removed = self.mutate(|cart| cart.remove_from_cart(product_id));
        debug!(product_id = %product_id, ?removed, "remove_from_cart");
        removed
    }

    /// Sets a product's quantity, subject to the configured [`QuantityPolicy`].
    ///
    /// ## Errors
    /// Only under [`QuantityPolicy::Reject`]: [`StoreError::Validation`] for
    /// an invalid product id or a quantity outside 1..=999. State is left
    /// unchanged.
    pub fn update_quantity(&self, product_id: &str, quantity: i64) -> StoreResult<()> {
        let policy = self.inner.config.cart.quantity_policy;
        debug!(product_id = %product_id, quantity, %policy, "update_quantity");

        match policy {
            QuantityPolicy::Accept => {
                self.mutate(|cart| cart.update_quantity(product_id, quantity));
            }
            QuantityPolicy::Reject => {
                if let Err(e) = validate_product_id(product_id).and(validate_quantity(quantity)) {
                    warn!(product_id = %product_id, quantity, error = %e, "Rejected quantity update");
                    return Err(e.into());
                }
                self.mutate(|cart| cart.update_quantity(product_id, quantity));
            }
            QuantityPolicy::Remove if quantity <= 0 => {
                self.mutate(|cart| cart.remove_from_cart(product_id));
            }
            QuantityPolicy::Remove => {
                self.mutate(|cart| cart.update_quantity(product_id, quantity));
            }
        }

        Ok(())
    }

    /// Runs a checkout of the current cart contents.
    ///
    /// ## Returns
    /// - `Ok(outcome)` once the collaborator answered or failed; the cart
    ///   state already reflects it
    ///
    /// ## Errors
    /// - [`StoreError::CheckoutInProgress`] under the reject policy while
    ///   another checkout is in flight (nothing changed)
    /// - [`StoreError::CheckoutSuperseded`] / [`StoreError::CheckoutCancelled`]
    ///   if this checkout was interrupted (its result is discarded)
    pub async fn checkout_cart(&self) -> StoreResult<CheckoutOutcome> {
        let checkout_id = Uuid::new_v4();
        let (interrupt_tx, interrupt_rx) = oneshot::channel();

        let (request, snapshot) = {
            let mut guard = self.lock();

            if let Some(current) = &guard.in_flight {
                if self.inner.config.checkout.concurrency == CheckoutConcurrency::Reject {
                    warn!(
                        checkout_id = %checkout_id,
                        in_flight = %current.checkout_id,
                        "Checkout rejected, another checkout is in progress"
                    );
                    return Err(StoreError::CheckoutInProgress {
                        checkout_id: current.checkout_id,
                    });
                }
            }

            if let Some(previous) = guard.in_flight.take() {
                warn!(
                    checkout_id = %checkout_id,
                    superseded = %previous.checkout_id,
                    "Superseding in-flight checkout"
                );
                previous.interrupt(Interruption::Superseded);
            }

            guard.in_flight = Some(InFlight {
                checkout_id,
                interrupt: interrupt_tx,
            });
            guard.cart.checkout_pending();

            let request = CheckoutRequest {
                checkout_id,
                items: guard.cart.items.to_map(),
            };
            (request, guard.snapshot())
        };
        self.emit(snapshot);

        info!(
            checkout_id = %checkout_id,
            distinct_items = request.items.len(),
            "Checkout started"
        );

        let store = self.clone();
        match tokio::spawn(async move { store.run_checkout(request, interrupt_rx).await }).await {
            Ok(result) => result,
            Err(join_err) => {
                self.release_failed_checkout(checkout_id, &join_err.to_string());
                Err(join_err.into())
            }
        }
    }

    /// Frees the slot of a checkout whose task died before applying a
    /// result, moving the cart to ERROR. No-op once the slot has moved on.
    fn release_failed_checkout(&self, checkout_id: Uuid, message: &str) {
        let snapshot = {
            let mut guard = self.lock();
            let owned = guard
                .in_flight
                .as_ref()
                .is_some_and(|f| f.checkout_id == checkout_id);
            if !owned {
                return;
            }
            guard.in_flight = None;
            guard.cart.checkout_rejected(Some(message));
            guard.snapshot()
        };
        error!(checkout_id = %checkout_id, error = %message, "Checkout task failed");
        self.emit(snapshot);
    }

    async fn run_checkout(
        &self,
        request: CheckoutRequest,
        mut interrupt_rx: oneshot::Receiver<Interruption>,
    ) -> StoreResult<CheckoutOutcome> {
        let checkout_id = request.checkout_id;
        let timeout = self.inner.config.checkout.timeout();

        let client = Arc::clone(&self.inner.client);
        let call = tokio::spawn(async move { client.checkout(request).await });
        let call_abort = call.abort_handle();

        let result = tokio::select! {
            result = tokio::time::timeout(timeout, call) => match result {
                Ok(Ok(answer)) => answer,
                Ok(Err(join_err)) => Err(CheckoutFailure::from(join_err)),
                Err(_) => {
                    call_abort.abort();
                    Err(CheckoutFailure::Timeout(self.inner.config.checkout.timeout_ms))
                }
            },
            Ok(reason) = &mut interrupt_rx => {
                call_abort.abort();
                info!(checkout_id = %checkout_id, ?reason, "Checkout interrupted");
                return Err(reason.into());
            }
        };

        let (outcome, snapshot) = {
            let mut guard = self.lock();

            let still_current = guard
                .in_flight
                .as_ref()
                .is_some_and(|f| f.checkout_id == checkout_id);
            if !still_current {
                // Interrupted between the answer arriving and taking the lock.
                let reason = interrupt_rx.try_recv().unwrap_or(Interruption::Superseded);
                info!(checkout_id = %checkout_id, ?reason, "Discarding result of interrupted checkout");
                return Err(reason.into());
            }
            guard.in_flight = None;

            let outcome = match result {
                Ok(response) => {
                    guard.cart.checkout_fulfilled(response);
                    if response.success {
                        CheckoutOutcome::Completed
                    } else {
                        CheckoutOutcome::Declined
                    }
                }
                Err(failure) => {
                    let message = failure.message();
                    guard.cart.checkout_rejected(Some(message.as_str()));
                    CheckoutOutcome::Failed(failure)
                }
            };
            (outcome, guard.snapshot())
        };

        match &outcome {
            CheckoutOutcome::Completed => info!(checkout_id = %checkout_id, "Checkout completed"),
            CheckoutOutcome::Declined => warn!(checkout_id = %checkout_id, "Checkout declined"),
            CheckoutOutcome::Failed(failure) => {
                warn!(checkout_id = %checkout_id, error = %failure.message(), "Checkout failed")
            }
        }

        self.emit(snapshot);
        self.inner.emitter.emit_checkout(checkout_id, &outcome);
        Ok(outcome)
    }

    /// Cancels the in-flight checkout, if there is one.
    ///
    /// The cart moves to ERROR with [`CANCELLED_MESSAGE`]; items are kept.
    /// Returns whether a checkout was cancelled.
    pub fn cancel_checkout(&self) -> bool {
        let snapshot = {
            let mut guard = self.lock();
            let Some(current) = guard.in_flight.take() else {
                return false;
            };
            warn!(checkout_id = %current.checkout_id, "Cancelling checkout");
            current.interrupt(Interruption::Cancelled);
            guard.cart.checkout_rejected(Some(CANCELLED_MESSAGE));
            guard.snapshot()
        };
        self.emit(snapshot);
        true
    }

    /// Returns true while a checkout is awaiting the collaborator.
    pub fn is_checkout_in_flight(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot of the current state.
    pub fn state(&self) -> CartState {
        self.lock().cart.clone()
    }

    /// Reads the state under the lock without cloning it.
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartState) -> R,
    {
        f(&self.lock().cart)
    }

    pub fn checkout_state(&self) -> CheckoutState {
        self.lock().cart.checkout_state
    }

    /// Total quantity, recomputed on every call.
    pub fn num_items(&self) -> i64 {
        num_items(&self.lock().cart)
    }

    /// Total quantity, recomputed only when items changed.
    pub fn memoized_num_items(&self) -> i64 {
        let mut guard = self.lock();
        let Guarded { cart, num_items, .. } = &mut *guard;
        num_items.select(cart)
    }

    /// How often [`CartStore::memoized_num_items`] actually recomputed.
    pub fn num_items_recomputations(&self) -> u64 {
        self.lock().num_items.recomputations()
    }

    /// Cart total as a two-decimal string, memoized on items and catalog.
    ///
    /// ## Errors
    /// [`StoreError::Core`] wrapping `ProductNotFound` when an item is missing
    /// from `catalog`.
    pub fn total_price(&self, catalog: &ProductCatalog) -> StoreResult<String> {
        let mut guard = self.lock();
        let Guarded {
            cart, total_price, ..
        } = &mut *guard;
        Ok(total_price.select(cart, catalog)?)
    }

    /// How often [`CartStore::total_price`] actually recomputed.
    pub fn total_price_recomputations(&self) -> u64 {
        self.lock().total_price.recomputations()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.lock();
        f.debug_struct("CartStore")
            .field("cart", &guard.cart)
            .field("in_flight", &guard.in_flight.as_ref().map(|i| i.checkout_id))
            .finish()
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a CartStore with options.
pub struct CartStoreBuilder {
    config: StoreConfig,
    client: Option<Arc<dyn CheckoutClient>>,
    emitter: Option<Arc<dyn CartEventEmitter>>,
}

impl CartStoreBuilder {
    pub fn new(config: StoreConfig) -> Self {
        CartStoreBuilder {
            config,
            client: None,
            emitter: None,
        }
    }

    /// Sets the checkout collaborator.
    pub fn with_client(mut self, client: Arc<dyn CheckoutClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn CartEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Builds the CartStore.
    pub fn build(self) -> StoreResult<CartStore> {
        self.config.validate()?;

        let client = self
            .client
            .ok_or_else(|| StoreError::InvalidConfig("Checkout client required".into()))?;

        let emitter = self.emitter.unwrap_or_else(|| Arc::new(NoOpEmitter));

        Ok(CartStore::with_emitter(self.config, client, emitter))
    }
}
