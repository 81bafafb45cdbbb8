//! # Selectors
//!
//! Read-only values derived from [`CartState`] and the [`ProductCatalog`].
//!
//! ## Memoization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Selector              Cache key                       Recomputes when  │
//! │  ────────              ─────────                       ───────────────  │
//! │  num_items             (none)                          every call       │
//! │  NumItemsSelector      items revision                  items changed    │
//! │  TotalPriceSelector    (items rev, catalog rev)        either changed   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each selector value owns its cache. There is no shared or global cache,
//! so two callers never evict each other.

use tracing::trace;

use crate::cart::CartState;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ProductCatalog, Revision};

/// Total quantity across all items. Recomputed on every call.
///
/// Saturates at the i64 bounds; a count has no failure mode.
pub fn num_items(state: &CartState) -> i64 {
    state
        .items
        .iter()
        .fold(0i64, |count, (_, qty)| count.saturating_add(qty))
}

/// Σ quantity × unit price, without caching.
///
/// ## Errors
/// Reported for the first offending item in identifier order:
/// - [`CoreError::ProductNotFound`] when it has no catalog entry
/// - [`CoreError::TotalOverflow`] when its line total, or the running
///   total after adding it, leaves the i64 cents range
pub fn total_price(state: &CartState, catalog: &ProductCatalog) -> CoreResult<Money> {
    state.items.iter().try_fold(Money::ZERO, |total, (id, qty)| {
        let price = catalog
            .price_of(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        price
            .line_total(qty)
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| CoreError::TotalOverflow {
                product_id: id.to_string(),
            })
    })
}

// =============================================================================
// Memoized Item Count
// =============================================================================

/// Item count memoized against the items revision.
#[derive(Debug, Default)]
pub struct NumItemsSelector {
    cached: Option<(Revision, i64)>,
    recomputations: u64,
}

impl NumItemsSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the item count, recomputing only if `items` changed since the
    /// previous call.
    pub fn select(&mut self, state: &CartState) -> i64 {
        let revision = state.items.revision();
        if let Some((cached_rev, value)) = self.cached {
            if cached_rev == revision {
                return value;
            }
        }

        let value = num_items(state);
        self.recomputations += 1;
        trace!(recomputations = self.recomputations, "recomputing num_items");
        self.cached = Some((revision, value));
        value
    }

    /// How many times the count was actually computed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

// =============================================================================
// Memoized Total Price
// =============================================================================

/// Cart total, formatted to two decimals, memoized against both the items
/// revision and the catalog revision.
///
/// ```rust
/// use basket_core::{CartState, Money, Product, ProductCatalog};
/// use basket_core::selectors::TotalPriceSelector;
///
/// let catalog: ProductCatalog = vec![
///     Product::new("A", "Apples", Money::dollars(3, 0)),
///     Product::new("B", "Bread", Money::dollars(5, 0)),
/// ]
/// .into_iter()
/// .collect();
///
/// let mut state = CartState::default();
/// state.update_quantity("A", 2);
/// state.update_quantity("B", 1);
///
/// let mut selector = TotalPriceSelector::new();
/// assert_eq!(selector.select(&state, &catalog).unwrap(), "11.00");
/// ```
#[derive(Debug, Default)]
pub struct TotalPriceSelector {
    cached: Option<((Revision, Revision), String)>,
    recomputations: u64,
}

impl TotalPriceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the formatted total.
    ///
    /// ## Errors
    /// [`CoreError::ProductNotFound`] when an item is missing from the
    /// catalog, [`CoreError::TotalOverflow`] when the total leaves the i64
    /// cents range. Failures are not cached; the next call retries.
    pub fn select(&mut self, state: &CartState, catalog: &ProductCatalog) -> CoreResult<String> {
        let key = (state.items.revision(), catalog.revision());
        if let Some((cached_key, value)) = &self.cached {
            if *cached_key == key {
                return Ok(value.clone());
            }
        }

        self.recomputations += 1;
        trace!(recomputations = self.recomputations, "recomputing total_price");
        let value = total_price(state, catalog)?.to_fixed();
        self.cached = Some((key, value.clone()));
        Ok(value)
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
