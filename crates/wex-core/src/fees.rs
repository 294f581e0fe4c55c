//! # Fee Calculator
//!
//! The pure platform/worker fee split. Stateless, deterministic, no
//! rounding beyond integer floor.
//!
//! ## Security Invariant
//!
//! `platform_cut + worker_cut == amount` exactly, for every split — no
//! value is created or destroyed by fee computation.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::MarketError;

/// The outcome of splitting a payment between the platform and the
/// worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// The platform's share: `floor(amount * fee_pct / 100)`.
    pub platform_cut: Amount,
    /// The worker's share: the exact remainder.
    pub worker_cut: Amount,
}

/// Split `amount` according to `fee_pct`.
///
/// # Errors
///
/// Returns [`MarketError::Validation`] if `fee_pct` exceeds 100 or if
/// the intermediate product overflows.
pub fn split(amount: Amount, fee_pct: u8) -> Result<FeeSplit, MarketError> {
    if fee_pct > 100 {
        return Err(MarketError::Validation(format!(
            "fee percentage {fee_pct} exceeds 100"
        )));
    }
    let product = amount
        .units()
        .checked_mul(u128::from(fee_pct))
        .ok_or_else(|| {
            MarketError::Validation(format!(
                "fee computation overflows for amount {amount}"
            ))
        })?;
    let platform_cut = Amount::from_units(product / 100);
    // Cannot underflow: platform_cut <= amount because fee_pct <= 100.
    let worker_cut = Amount::from_units(amount.units() - platform_cut.units());
    Ok(FeeSplit {
        platform_cut,
        worker_cut,
    })
}
