//! Price and stock count types.
//!
//! Prices are whole currency units (rupiah have no fractional unit in
//! practice), so a plain integer is enough - no decimal arithmetic needed.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned for a non-positive price.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("price must be a positive integer")]
pub struct PriceError;

/// A product price in whole currency units.
///
/// Invariant: always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Create a `Price`, rejecting zero and negative values.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if `value <= 0`.
    pub const fn new(value: i64) -> Result<Self, PriceError> {
        if value > 0 { Ok(Self(value)) } else { Err(PriceError) }
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned for a negative stock count.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("stock must be a non-negative integer")]
pub struct StockError;

/// A product stock count.
///
/// Invariant: never negative. Zero is a valid (sold out) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stock(i64);

impl Stock {
    /// Create a `Stock`, rejecting negative values.
    ///
    /// # Errors
    ///
    /// Returns [`StockError`] if `value < 0`.
    pub const fn new(value: i64) -> Result<Self, StockError> {
        if value >= 0 { Ok(Self(value)) } else { Err(StockError) }
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether the product is sold out.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
