//! # basket-core: Pure Cart Logic for Basket
//!
//! This crate is the **heart** of Basket. It holds the cart's state, the
//! reducers that mutate it, and the selectors that derive totals from it,
//! all as pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Basket Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         UI Layer                                │   │
//! │  │     Product list ──► Cart badge ──► Cart page ──► Checkout      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ actions / selectors                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  basket-store (CartStore handle)                │   │
//! │  │     add_to_cart, remove_from_cart, update_quantity, checkout    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ basket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ selectors │  │   │
//! │  │   │  Product  │  │   Money   │  │ CartState │  │ NumItems  │  │   │
//! │  │   │  Catalog  │  │  to_fixed │  │ reducers  │  │TotalPrice │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, ProductCatalog, CheckoutState, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart state, actions and reducers
//! - [`selectors`] - Derived values, plain and memoized
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation for the store boundary
//!
//! ## Example Usage
//!
//! ```rust
//! use basket_core::{CartState, Money, Product, ProductCatalog};
//! use basket_core::selectors::{num_items, TotalPriceSelector};
//!
//! let mut catalog = ProductCatalog::new();
//! catalog.insert(Product::new("A", "Apples", Money::dollars(3, 0)));
//! catalog.insert(Product::new("B", "Bread", Money::dollars(5, 0)));
//!
//! let mut state = CartState::default();
//! state.add_to_cart("A");
//! state.add_to_cart("A");
//! state.add_to_cart("B");
//!
//! assert_eq!(num_items(&state), 3);
//!
//! let mut total = TotalPriceSelector::new();
//! assert_eq!(total.select(&state, &catalog).unwrap(), "11.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod selectors;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use basket_core::Money` instead of
// `use basket_core::money::Money`

pub use cart::{reduce, CartAction, CartItems, CartState};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single item when quantities are validated
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Only enforced by stores configured to reject invalid quantities.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a product identifier accepted at the store boundary.
pub const MAX_PRODUCT_ID_LEN: usize = 64;
