//! # Cart State
//!
//! The cart's data and the reducers that mutate it.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Action                Reducer                  State Change         │
//! │  ─────────                ───────                  ────────────         │
//! │                                                                         │
//! │  Click "Add" ───────────► add_to_cart() ─────────► items[id] += 1      │
//! │                                                                         │
//! │  Change Quantity ───────► update_quantity() ─────► items[id] = n       │
//! │                                                                         │
//! │  Click "Remove" ────────► remove_from_cart() ────► delete items[id]    │
//! │                                                                         │
//! │  Checkout started ──────► checkout_pending() ────► LOADING             │
//! │  Collaborator answered ─► checkout_fulfilled() ──► READY + {} / ERROR  │
//! │  Collaborator failed ───► checkout_rejected() ───► ERROR + message     │
//! │                                                                         │
//! │  NOTE: Reducers never validate. Policy lives in basket-store.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reducers are `&mut self` methods on [`CartState`]; [`reduce`] wraps them
//! as a pure `(state, action) → state` function.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::types::{CheckoutResponse, CheckoutState, ProductId, Revision};

// =============================================================================
// Cart Items
// =============================================================================

/// Product identifier → quantity, stamped with a [`Revision`].
///
/// ## Invariants
/// - `add_to_cart` never produces an entry below 1
/// - `update_quantity` stores whatever it is given (see [`CartState::update_quantity`])
/// - Any change to the map takes a fresh revision; a no-op keeps it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItems {
    entries: BTreeMap<ProductId, i64>,

    #[serde(skip, default = "Revision::next")]
    revision: Revision,
}

impl CartItems {
    /// Creates an empty item map.
    pub fn new() -> Self {
        CartItems {
            entries: BTreeMap::new(),
            revision: Revision::next(),
        }
    }

    /// Quantity held for a product, if present.
    pub fn get(&self, id: &str) -> Option<i64> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(product_id, quantity)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    /// Current revision of the mapping.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Owned copy of the plain mapping, as sent to the checkout collaborator.
    pub fn to_map(&self) -> BTreeMap<ProductId, i64> {
        self.entries.clone()
    }

    /// Adds one unit, saturating at `i64::MAX` so adding never fails.
    fn increment(&mut self, id: &str) -> i64 {
        let qty = self.entries.entry(id.to_string()).or_insert(0);
        *qty = qty.saturating_add(1);
        let qty = *qty;
        self.touch();
        qty
    }

    fn set(&mut self, id: &str, quantity: i64) {
        if self.entries.get(id) == Some(&quantity) {
            return;
        }
        self.entries.insert(id.to_string(), quantity);
        self.touch();
    }

    fn remove(&mut self, id: &str) -> Option<i64> {
        let removed = self.entries.remove(id);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.revision = Revision::next();
    }
}

impl Default for CartItems {
    fn default() -> Self {
        Self::new()
    }
}

/// Items compare by content; revisions are identity, not value.
impl PartialEq for CartItems {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for CartItems {}

impl<K: Into<ProductId>> FromIterator<(K, i64)> for CartItems {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        CartItems {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            revision: Revision::next(),
        }
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// The cart's complete state.
///
/// ## Invariants
/// - `checkout_state` starts as `Ready`, and is `Ready` again after a
///   successful checkout, which also empties `items`
/// - `error_message` is empty unless `checkout_state == Error`
///
/// ## Serialized Shape
/// ```json
/// { "items": { "X": 2 }, "checkoutState": "READY", "errorMessage": "" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartState {
    /// Product identifier → quantity.
    #[ts(type = "Record<string, number>")]
    pub items: CartItems,

    /// Where the checkout lifecycle currently is.
    pub checkout_state: CheckoutState,

    /// Failure detail from the last failed checkout call.
    pub error_message: String,
}

impl CartState {
    /// Creates the initial state: no items, `Ready`, no message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of a product, inserting it with quantity 1 if absent.
    ///
    /// Returns the new quantity.
    pub fn add_to_cart(&mut self, product_id: &str) -> i64 {
        self.items.increment(product_id)
    }

    /// Deletes the entry for a product. Absent products are a no-op.
    ///
    /// Returns the removed quantity, if there was one.
    pub fn remove_from_cart(&mut self, product_id: &str) -> Option<i64> {
        self.items.remove(product_id)
    }

    /// Sets a product's quantity to exactly `quantity`.
    ///
    /// ## Note
    /// Zero and negative values are stored as given. Unlike
    /// [`CartState::add_to_cart`], nothing here keeps entries at 1 or above;
    /// callers that care pick a quantity policy in basket-store.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        self.items.set(product_id, quantity);
    }

    /// READY/ERROR → LOADING.
    pub fn checkout_pending(&mut self) {
        self.checkout_state = CheckoutState::Loading;
        self.error_message.clear();
    }

    /// LOADING → READY (items emptied) or LOADING → ERROR (items kept).
    pub fn checkout_fulfilled(&mut self, response: CheckoutResponse) {
        if response.success {
            self.checkout_state = CheckoutState::Ready;
            self.items.clear();
        } else {
            self.checkout_state = CheckoutState::Error;
        }
    }

    /// LOADING → ERROR with the failure's message, or `""` if it had none.
    pub fn checkout_rejected(&mut self, message: Option<&str>) {
        self.checkout_state = CheckoutState::Error;
        self.error_message = message.unwrap_or_default().to_string();
    }

    /// Applies one action in place.
    pub fn apply(&mut self, action: &CartAction) {
        match action {
            CartAction::AddToCart(id) => {
                self.add_to_cart(id);
            }
            CartAction::RemoveFromCart(id) => {
                self.remove_from_cart(id);
            }
            CartAction::UpdateQuantity { id, quantity } => self.update_quantity(id, *quantity),
            CartAction::CheckoutPending => self.checkout_pending(),
            CartAction::CheckoutFulfilled(response) => self.checkout_fulfilled(*response),
            CartAction::CheckoutRejected(message) => self.checkout_rejected(message.as_deref()),
        }
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Every transition the cart knows about.
///
/// The first three are dispatched by the UI; the checkout variants are
/// dispatched by the checkout orchestration around its collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum CartAction {
    AddToCart(ProductId),
    RemoveFromCart(ProductId),
    UpdateQuantity { id: ProductId, quantity: i64 },
    CheckoutPending,
    CheckoutFulfilled(CheckoutResponse),
    CheckoutRejected(Option<String>),
}

/// Pure reducer: returns the state after `action`, leaving `state` untouched.
///
/// ```rust
/// use basket_core::{reduce, CartAction, CartState};
///
/// let s0 = CartState::default();
/// let s1 = reduce(&s0, &CartAction::AddToCart("X".into()));
/// assert!(s0.items.is_empty());
/// assert_eq!(s1.items.get("X"), Some(1));
/// ```
pub fn reduce(state: &CartState, action: &CartAction) -> CartState {
    let mut next = state.clone();
    next.apply(action);
    next
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_cart() -> CartState {
        let mut state = CartState::new();
        state.add_to_cart("X");
        state.add_to_cart("X");
        state.add_to_cart("Y");
        state
    }

    #[test]
    fn test_initial_state() {
        let state = CartState::new();
        assert!(state.items.is_empty());
        assert_eq!(state.checkout_state, CheckoutState::Ready);
        assert!(state.error_message.is_empty());
    }

    #[test]
    fn test_add_same_product_counts_calls() {
        let mut state = CartState::new();
        for n in 1..=7 {
            assert_eq!(state.add_to_cart("X"), n);
        }
        assert_eq!(state.items.get("X"), Some(7));
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_add_at_max_quantity_saturates() {
        let mut state = CartState::new();
        state.update_quantity("A", i64::MAX);

        assert_eq!(state.add_to_cart("A"), i64::MAX);
        assert_eq!(state.items.get("A"), Some(i64::MAX));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut state = loaded_cart();

        assert_eq!(state.remove_from_cart("X"), Some(2));
        let after_first = state.clone();
        let revision = state.items.revision();

        assert_eq!(state.remove_from_cart("X"), None);
        assert_eq!(state, after_first);
        assert_eq!(state.items.revision(), revision);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut state = CartState::new();
        assert_eq!(state.remove_from_cart("nope"), None);
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_update_quantity_stores_literal_value() {
        let mut state = loaded_cart();

        state.update_quantity("X", 10);
        assert_eq!(state.items.get("X"), Some(10));

        // Not clamped, not removed
        state.update_quantity("Y", 0);
        assert_eq!(state.items.get("Y"), Some(0));
        state.update_quantity("Z", -3);
        assert_eq!(state.items.get("Z"), Some(-3));
    }

    #[test]
    fn test_update_to_same_value_keeps_revision() {
        let mut state = loaded_cart();
        let revision = state.items.revision();
        state.update_quantity("X", 2);
        assert_eq!(state.items.revision(), revision);
        state.update_quantity("X", 3);
        assert_ne!(state.items.revision(), revision);
    }

    #[test]
    fn test_checkout_success_clears_items() {
        let mut state = loaded_cart();
        state.checkout_pending();
        assert_eq!(state.checkout_state, CheckoutState::Loading);

        state.checkout_fulfilled(CheckoutResponse::approved());
        assert_eq!(state.checkout_state, CheckoutState::Ready);
        assert!(state.items.is_empty());
        assert!(state.error_message.is_empty());
    }

    #[test]
    fn test_checkout_declined_keeps_items() {
        let mut state = loaded_cart();
        let before = state.items.clone();

        state.checkout_pending();
        state.checkout_fulfilled(CheckoutResponse::declined());

        assert_eq!(state.checkout_state, CheckoutState::Error);
        assert_eq!(state.items, before);
        assert!(state.error_message.is_empty());
    }

    #[test]
    fn test_checkout_rejected_sets_message() {
        let mut state = loaded_cart();
        state.checkout_pending();
        state.checkout_rejected(Some("network down"));
        assert_eq!(state.checkout_state, CheckoutState::Error);
        assert_eq!(state.error_message, "network down");
        assert_eq!(state.items.get("X"), Some(2));

        // Retry clears the stale message, then a message-less failure
        state.checkout_pending();
        assert!(state.error_message.is_empty());
        state.checkout_rejected(None);
        assert_eq!(state.checkout_state, CheckoutState::Error);
        assert_eq!(state.error_message, "");
    }

    #[test]
    fn test_reduce_is_pure() {
        let s0 = loaded_cart();
        let s1 = reduce(&s0, &CartAction::RemoveFromCart("X".into()));
        assert_eq!(s0.items.get("X"), Some(2));
        assert_eq!(s1.items.get("X"), None);
    }

    #[test]
    fn test_end_to_end_sequence() {
        let actions = [
            CartAction::AddToCart("X".into()),
            CartAction::AddToCart("X".into()),
            CartAction::CheckoutPending,
            CartAction::CheckoutFulfilled(CheckoutResponse::approved()),
        ];

        let mid = actions[..2]
            .iter()
            .fold(CartState::new(), |s, a| reduce(&s, a));
        assert_eq!(mid.items.get("X"), Some(2));
        assert_eq!(mid.checkout_state, CheckoutState::Ready);

        let end = actions.iter().fold(CartState::new(), |s, a| reduce(&s, a));
        assert!(end.items.is_empty());
        assert_eq!(end.checkout_state, CheckoutState::Ready);
    }

    #[test]
    fn test_serialized_shape() {
        let mut state = CartState::new();
        state.add_to_cart("X");
        state.add_to_cart("X");

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "items": { "X": 2 },
                "checkoutState": "READY",
                "errorMessage": ""
            })
        );

        let back: CartState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_action_wire_shape() {
        let action = CartAction::UpdateQuantity {
            id: "X".into(),
            quantity: 4,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "updateQuantity", "payload": { "id": "X", "quantity": 4 } })
        );
    }
}
