//! # Checkout Client
//!
//! The seam between the store and whatever actually finalizes a purchase.
//!
//! ## Call Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartStore                          CheckoutClient                      │
//! │  ─────────                          ──────────────                      │
//! │                                                                         │
//! │  CheckoutRequest { id, items } ───► checkout()                          │
//! │                                          │                              │
//! │       Ok({ success: true })  ◄───────────┤  → READY, items = {}         │
//! │       Ok({ success: false }) ◄───────────┤  → ERROR, items kept         │
//! │       Err(CheckoutFailure)   ◄───────────┘  → ERROR, message kept       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The HTTP endpoint lives outside this crate. [`SimulatedCheckout`] stands
//! in for it in the demo binary and in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::debug;
use uuid::Uuid;

use basket_core::{CheckoutResponse, ProductId};

// =============================================================================
// Wire Types
// =============================================================================

/// What the collaborator is sent: the items captured when checkout started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Correlates log lines on both sides of the call.
    pub checkout_id: Uuid,

    /// Product identifier → quantity.
    pub items: BTreeMap<ProductId, i64>,
}

/// The collaborator call itself failed (as opposed to answering `success: false`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutFailure {
    /// Network or HTTP-level failure.
    #[error("{0}")]
    Transport(String),

    /// Request or response could not be (de)serialized.
    #[error("{0}")]
    Serialization(String),

    /// No answer within the configured timeout.
    #[error("checkout timed out after {0} ms")]
    Timeout(u64),

    /// The collaborator panicked instead of answering.
    #[error("{0}")]
    Crashed(String),

    /// Failed without any usable detail.
    #[error("")]
    Unknown,
}

impl CheckoutFailure {
    /// Text stored into the cart's `error_message`; empty for [`CheckoutFailure::Unknown`].
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<serde_json::Error> for CheckoutFailure {
    fn from(err: serde_json::Error) -> Self {
        CheckoutFailure::Serialization(err.to_string())
    }
}

impl From<JoinError> for CheckoutFailure {
    fn from(err: JoinError) -> Self {
        if !err.is_panic() {
            return CheckoutFailure::Crashed("checkout call was aborted".to_string());
        }

        let payload = err.into_panic();
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned());

        match detail {
            Some(detail) => CheckoutFailure::Crashed(format!("checkout client panicked: {detail}")),
            None => CheckoutFailure::Crashed("checkout client panicked".to_string()),
        }
    }
}

// =============================================================================
// Client Trait
// =============================================================================

/// Finalizes a purchase for the given cart contents.
#[async_trait]
pub trait CheckoutClient: Send + Sync {
    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutResponse, CheckoutFailure>;
}

// =============================================================================
// Simulated Client
// =============================================================================

/// Scripted answer for [`SimulatedCheckout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedOutcome {
    /// Answer `{ success: true }`.
    Approve,

    /// Answer `{ success: false }`.
    Decline,

    /// Fail the call with this failure.
    Fail(CheckoutFailure),

    /// Demo storefront rule: an empty cart fails with
    /// `"Cart must not be empty"`, anything else is approved.
    Storefront,
}

/// In-process checkout collaborator with a fixed latency.
///
/// The request goes through a JSON round trip before it is inspected, so
/// the wire shape is exercised the same way a real endpoint would see it.
#[derive(Debug)]
pub struct SimulatedCheckout {
    delay: Duration,
    outcome: SimulatedOutcome,
    received: Mutex<Vec<CheckoutRequest>>,
}

impl SimulatedCheckout {
    /// Creates a simulator that answers `outcome` after `delay`.
    pub fn new(delay: Duration, outcome: SimulatedOutcome) -> Self {
        SimulatedCheckout {
            delay,
            outcome,
            received: Mutex::new(Vec::new()),
        }
    }

    /// The demo storefront: 500 ms latency, rejects empty carts.
    pub fn storefront() -> Self {
        Self::new(Duration::from_millis(500), SimulatedOutcome::Storefront)
    }

    pub fn approving(delay: Duration) -> Self {
        Self::new(delay, SimulatedOutcome::Approve)
    }

    pub fn declining(delay: Duration) -> Self {
        Self::new(delay, SimulatedOutcome::Decline)
    }

    pub fn failing(delay: Duration, message: impl Into<String>) -> Self {
        Self::new(delay, SimulatedOutcome::Fail(CheckoutFailure::Transport(message.into())))
    }

    /// Requests seen so far, oldest first.
    pub fn received(&self) -> Vec<CheckoutRequest> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CheckoutClient for SimulatedCheckout {
    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutResponse, CheckoutFailure> {
        let body = serde_json::to_vec(&request)?;
        let request: CheckoutRequest = serde_json::from_slice(&body)?;
        debug!(
            checkout_id = %request.checkout_id,
            bytes = body.len(),
            "Simulated checkout received request"
        );

        let empty = request.items.is_empty();
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);

        tokio::time::sleep(self.delay).await;

        match &self.outcome {
            SimulatedOutcome::Approve => Ok(CheckoutResponse::approved()),
            SimulatedOutcome::Decline => Ok(CheckoutResponse::declined()),
            SimulatedOutcome::Fail(failure) => Err(failure.clone()),
            SimulatedOutcome::Storefront if empty => {
                Err(CheckoutFailure::Transport("Cart must not be empty".to_string()))
            }
            SimulatedOutcome::Storefront => Ok(CheckoutResponse::approved()),
        }
    }
}
