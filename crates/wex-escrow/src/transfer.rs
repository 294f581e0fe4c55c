//! # Value Transfer Seam
//!
//! The substrate's value-movement primitive, abstracted as a trait. The
//! contract is fail-stop and all-or-nothing: a batch either credits
//! every payout or credits none and returns an error. The escrow vault
//! relies on that contract when it rolls back its own state after a
//! failed transfer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use wex_core::{AccountId, Amount, MarketError};

/// A single payout instruction within a disbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// The account receiving the funds.
    pub recipient: AccountId,
    /// Units to credit.
    pub amount: Amount,
}

impl Payout {
    pub fn new(recipient: AccountId, amount: Amount) -> Self {
        Self { recipient, amount }
    }
}

/// The substrate's value-transfer primitive.
///
/// Implementations must be all-or-nothing: after an `Err`, no payout in
/// the batch may have been applied.
pub trait ValueTransfer {
    /// Execute every payout in the batch, or none of them.
    fn transfer_batch(&mut self, payouts: &[Payout]) -> Result<(), MarketError>;
}

/// In-memory settlement book crediting per-account balances.
///
/// The reference [`ValueTransfer`] implementation, used by the
/// marketplace facade and throughout the test suites. Validates the
/// whole batch before applying any of it, honoring the all-or-nothing
/// contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementBook {
    balances: BTreeMap<AccountId, Amount>,
}

impl SettlementBook {
    /// Create an empty settlement book.
    pub fn new() -> Self {
        Self::default()
    }

    /// The credited balance of an account. Zero for unknown accounts.
    pub fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }
}

impl ValueTransfer for SettlementBook {
    fn transfer_batch(&mut self, payouts: &[Payout]) -> Result<(), MarketError> {
        // Validate every credit before touching the book.
        let mut updated: Vec<(AccountId, Amount)> = Vec::with_capacity(payouts.len());
        for payout in payouts {
            let current = updated
                .iter()
                .find(|(account, _)| account == &payout.recipient)
                .map(|(_, balance)| *balance)
                .unwrap_or_else(|| self.balance(&payout.recipient));
            let next = current.checked_add(payout.amount).ok_or_else(|| {
                MarketError::Validation(format!(
                    "settlement balance overflow for {}",
                    payout.recipient
                ))
            })?;
            match updated
                .iter_mut()
                .find(|(account, _)| account == &payout.recipient)
            {
                Some((_, balance)) => *balance = next,
                None => updated.push((payout.recipient.clone(), next)),
            }
        }
        for (account, balance) in updated {
            self.balances.insert(account, balance);
        }
        Ok(())
    }
}
