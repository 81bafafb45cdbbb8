//! # Domain Types
//!
//! Core domain types used throughout Basket.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ ProductCatalog  │   │ CheckoutState   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id → Product   │   │  Loading        │       │
//! │  │  name           │   │  revision       │   │  Ready          │       │
//! │  │  price (Money)  │   │  (read-only to  │   │  Error          │       │
//! │  └─────────────────┘   │   the cart)     │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌──────────────────┐                            │
//! │  │    Revision     │   │ CheckoutResponse │                            │
//! │  │  process-wide   │   │  success: bool   │                            │
//! │  │  monotonic u64  │   └──────────────────┘                            │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use ts_rs::TS;

use crate::money::Money;

/// Product identifier as used by the catalog and the cart.
pub type ProductId = String;

// =============================================================================
// Revision
// =============================================================================

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Identity stamp for a map value that selectors memoize against.
///
/// Every mutation of a [`ProductCatalog`] or [`crate::CartItems`] takes a
/// fresh revision. Revisions come from one process-wide counter, so two
/// different maps never carry the same stamp even if they were built by
/// unrelated stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    /// Draws a fresh, never-before-seen revision.
    pub fn next() -> Self {
        Revision(NEXT_REVISION.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw counter value, for logging.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product record from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Catalog identifier, the same string the cart keys items by.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Unit price.
    pub price: Money,
}

impl Product {
    /// Creates a product record.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

// =============================================================================
// Product Catalog
// =============================================================================

/// Product lookup owned by the catalog subsystem.
///
/// The cart only ever reads it. Serializes as a plain `{ id: Product }`
/// object; deserializing produces a catalog with a fresh revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCatalog {
    products: BTreeMap<ProductId, Product>,

    #[serde(skip, default = "Revision::next")]
    revision: Revision,
}

impl ProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        ProductCatalog {
            products: BTreeMap::new(),
            revision: Revision::next(),
        }
    }

    /// Inserts or replaces a product, keyed by its `id`.
    pub fn insert(&mut self, product: Product) -> Option<Product> {
        self.revision = Revision::next();
        self.products.insert(product.id.clone(), product)
    }

    /// Removes a product. The revision only moves if something was removed.
    pub fn remove(&mut self, id: &str) -> Option<Product> {
        let removed = self.products.remove(id);
        if removed.is_some() {
            self.revision = Revision::next();
        }
        removed
    }

    /// Looks up a product by identifier.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Looks up a product's unit price.
    pub fn price_of(&self, id: &str) -> Option<Money> {
        self.products.get(id).map(|p| p.price)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Iterates products in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Current revision of the product mapping.
    pub fn revision(&self) -> Revision {
        self.revision
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Product> for ProductCatalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut catalog = ProductCatalog::new();
        catalog.extend(iter);
        catalog
    }
}

impl Extend<Product> for ProductCatalog {
    fn extend<I: IntoIterator<Item = Product>>(&mut self, iter: I) {
        for product in iter {
            self.products.insert(product.id.clone(), product);
        }
        self.revision = Revision::next();
    }
}

// =============================================================================
// Checkout State
// =============================================================================

/// Lifecycle of the checkout flow.
///
/// ## State Machine
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │            initiate                      success = true                 │
/// │   READY ─────────────► LOADING ─────────────────────────► READY         │
/// │     ▲                    │  │                             (items = {})  │
/// │     │                    │  │ success = false                           │
/// │     │     initiate       │  └───────────────────────────► ERROR         │
/// │   ERROR ◄────────────────┘    call failed (message kept)  (items kept)  │
/// │     │                                                                   │
/// │     └──────── initiate ────────► LOADING   (only way out of ERROR)      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum CheckoutState {
    /// A checkout call is in flight.
    Loading,

    /// Idle. Initial state, and the state after a successful checkout.
    #[default]
    Ready,

    /// The last checkout was declined or failed.
    Error,
}

impl CheckoutState {
    /// Returns true while a checkout call is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self, CheckoutState::Loading)
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutState::Loading => write!(f, "LOADING"),
            CheckoutState::Ready => write!(f, "READY"),
            CheckoutState::Error => write!(f, "ERROR"),
        }
    }
}

// =============================================================================
// Checkout Response
// =============================================================================

/// What the checkout collaborator answers when the call itself succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutResponse {
    /// Whether the purchase went through.
    pub success: bool,
}

impl CheckoutResponse {
    pub const fn approved() -> Self {
        CheckoutResponse { success: true }
    }

    pub const fn declined() -> Self {
        CheckoutResponse { success: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revisions_are_unique() {
        let a = Revision::next();
        let b = Revision::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_catalog_revision_moves_on_mutation() {
        let mut catalog = ProductCatalog::new();
        let r0 = catalog.revision();

        catalog.insert(Product::new("A", "Apples", Money::from_cents(300)));
        let r1 = catalog.revision();
        assert_ne!(r0, r1);

        // Removing something absent is not a change
        assert!(catalog.remove("missing").is_none());
        assert_eq!(catalog.revision(), r1);

        assert!(catalog.remove("A").is_some());
        assert_ne!(catalog.revision(), r1);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog: ProductCatalog = vec![
            Product::new("A", "Apples", Money::from_cents(300)),
            Product::new("B", "Bread", Money::from_cents(500)),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.price_of("B"), Some(Money::from_cents(500)));
        assert_eq!(catalog.price_of("C"), None);
        assert_eq!(catalog.get("A").map(|p| p.name.as_str()), Some("Apples"));
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = r#"{"A":{"id":"A","name":"Apples","price":300}}"#;
        let catalog: ProductCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.price_of("A"), Some(Money::from_cents(300)));
        assert_eq!(serde_json::to_string(&catalog).unwrap(), json);
    }

    #[test]
    fn test_checkout_state_serialization() {
        assert_eq!(
            serde_json::to_string(&CheckoutState::Loading).unwrap(),
            "\"LOADING\""
        );
        assert_eq!(
            serde_json::from_str::<CheckoutState>("\"ERROR\"").unwrap(),
            CheckoutState::Error
        );
        assert_eq!(CheckoutState::default(), CheckoutState::Ready);
        assert_eq!(CheckoutState::Ready.to_string(), "READY");
    }

    #[test]
    fn test_checkout_response_wire_shape() {
        let resp: CheckoutResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(resp, CheckoutResponse::approved());
    }
}
