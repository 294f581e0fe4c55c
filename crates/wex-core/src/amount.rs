//! # Escrow Amounts
//!
//! Monetary value in indivisible units of the platform's single
//! settlement asset.
//!
//! ## Security Invariant
//!
//! Escrowed value must never be represented as floating point. Amounts
//! are unsigned 128-bit unit counts; all arithmetic on them is checked,
//! so fund-conservation bugs surface as errors instead of wrapping.

use serde::{Deserialize, Serialize};

/// A quantity of escrowed value, in indivisible units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw unit count.
    pub fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// The raw unit count.
    pub fn units(&self) -> u128 {
        self.0
    }

    /// Whether this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. `None` on overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction. `None` if `other` exceeds `self`.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}
