//! # Money Module
//!
//! Provides the `Money` type for catalog prices and cart totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing float prices:                                                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ and toFixed(2) has to hide it   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    10 + 20 = 30 cents, rendered as "0.30" with no rounding step         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checked Arithmetic
//! Quantities are caller-supplied and unbounded, so every operation that can
//! leave the i64 range returns `Option` instead of panicking or wrapping.
//! There are no `Add`/`Mul` operator impls.
//!
//! ## Usage
//! ```rust
//! use basket_core::money::Money;
//!
//! let price = Money::from_cents(1099);             // $10.99
//! let line = price.line_total(2).unwrap();         // $21.98
//! assert_eq!(line.to_fixed(), "21.98");
//! assert_eq!(line.to_string(), "$21.98");
//! assert_eq!(price.line_total(i64::MAX), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: a cart holding a literal negative quantity prices
///   to a negative total, and that has to be representable
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► line_total(qty) ──► checked_add ──► to_fixed()       │
/// │                        │                   │                            │
/// │                        └──── None ─────────┴──► CoreError::TotalOverflow│
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use basket_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Price literal in dollars and cents, e.g. `Money::dollars(4, 49)`.
    ///
    /// `cents` carries the sign of `dollars`: `dollars(-5, 50)` is -5.50.
    /// Saturates at the i64 bounds.
    ///
    /// ```rust
    /// use basket_core::money::Money;
    ///
    /// assert_eq!(Money::dollars(3, 0).cents(), 300);
    /// assert_eq!(Money::dollars(-5, 50).cents(), -550);
    /// ```
    pub const fn dollars(dollars: i64, cents: i64) -> Self {
        let whole = dollars.saturating_mul(100);
        if dollars < 0 {
            Money(whole.saturating_sub(cents))
        } else {
            Money(whole.saturating_add(cents))
        }
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Unit price times a cart quantity, `None` on overflow.
    ///
    /// ```rust
    /// use basket_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(299).line_total(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(300).line_total(100_000_000_000_000_000), None);
    /// ```
    #[inline]
    pub const fn line_total(&self, quantity: i64) -> Option<Money> {
        match self.0.checked_mul(quantity) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sum of two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Renders the amount with exactly two decimal places and no currency
    /// symbol, e.g. `"11.00"`, `"0.05"`, `"-5.50"`.
    ///
    /// This is the format the cart total is exposed in.
    ///
    /// ```rust
    /// use basket_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1100).to_fixed(), "11.00");
    /// assert_eq!(Money::from_cents(5).to_fixed(), "0.05");
    /// assert_eq!(Money::from_cents(-550).to_fixed(), "-5.50");
    /// ```
    pub fn to_fixed(&self) -> String {
        let (sign, whole, fraction) = self.split();
        format!("{sign}{whole}.{fraction:02}")
    }

    /// Sign, whole units and two-digit fraction. Uses the unsigned magnitude
    /// so `i64::MIN` renders instead of overflowing on `abs()`.
    fn split(&self) -> (&'static str, u64, u64) {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        (sign, magnitude / 100, magnitude % 100)
    }
}

/// `"$10.99"` / `"-$5.50"`, for logs. The cart total string comes from
/// [`Money::to_fixed`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, whole, fraction) = self.split();
        write!(f, "{sign}${whole}.{fraction:02}")
    }
}
