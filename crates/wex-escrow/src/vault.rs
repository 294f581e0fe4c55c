// SPDX-License-Identifier: BUSL-1.1
//! # Escrow Vault
//!
//! Per-job custody accounts. A deposit binds value to a job id; a
//! disbursement pays it out to one or more recipients exactly once.
//!
//! ## Security Invariant
//!
//! State-before-transfer ordering: the vault marks the account disbursed
//! and debits the custodied balance *before* handing control to the
//! external transfer, so a re-entrant call observes the account as
//! already spent. If the transfer fails, the mutation is explicitly
//! reversed — failure leaves no partial effect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use wex_core::{Amount, JobId, MarketError};

use crate::transfer::{Payout, ValueTransfer};

/// Custody state for a single job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EscrowAccount {
    balance: Amount,
    disbursed: bool,
}

/// The escrow vault: custodied value keyed by job id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscrowVault {
    accounts: BTreeMap<JobId, EscrowAccount>,
}

impl EscrowVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `amount` of custodied value to `job_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] for a zero amount and
    /// [`MarketError::Duplicate`] if the job already has an escrow
    /// account.
    pub fn deposit(&mut self, job_id: JobId, amount: Amount) -> Result<(), MarketError> {
        if amount.is_zero() {
            return Err(MarketError::Validation(
                "escrow deposit must be positive".to_string(),
            ));
        }
        if self.accounts.contains_key(&job_id) {
            return Err(MarketError::Duplicate(format!("escrow account for {job_id}")));
        }
        self.accounts.insert(
            job_id,
            EscrowAccount {
                balance: amount,
                disbursed: false,
            },
        );
        Ok(())
    }

    /// The balance currently custodied for a job. Zero for unknown
    /// jobs; debited by disbursement.
    pub fn custodied(&self, job_id: JobId) -> Amount {
        self.accounts
            .get(&job_id)
            .map(|account| account.balance)
            .unwrap_or(Amount::ZERO)
    }

    /// Whether the job's escrow has already been paid out.
    pub fn is_disbursed(&self, job_id: JobId) -> bool {
        self.accounts
            .get(&job_id)
            .map(|account| account.disbursed)
            .unwrap_or(false)
    }

    /// Pay out `payouts` from the job's custodied balance, exactly once.
    ///
    /// Commits the disbursed marker and debits the balance before
    /// invoking `transfer`; rolls both back if the transfer fails.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] for a job with no escrow account.
    /// - [`MarketError::State`] if the account was already disbursed.
    /// - [`MarketError::Funds`] if the payouts exceed the custodied
    ///   balance.
    /// - Any error of the transfer itself, after rollback.
    pub fn disburse(
        &mut self,
        job_id: JobId,
        payouts: &[Payout],
        transfer: &mut dyn ValueTransfer,
    ) -> Result<(), MarketError> {
        let account = self
            .accounts
            .get_mut(&job_id)
            .ok_or_else(|| MarketError::NotFound(format!("escrow account for {job_id}")))?;
        if account.disbursed {
            return Err(MarketError::State {
                job_id,
                state: "disbursed".to_string(),
                reason: "escrow already paid out".to_string(),
            });
        }

        let mut total = Amount::ZERO;
        for payout in payouts {
            total = total.checked_add(payout.amount).ok_or_else(|| {
                MarketError::Validation(format!("payout total overflows for {job_id}"))
            })?;
        }
        let remaining = account.balance.checked_sub(total).ok_or(MarketError::Funds {
            job_id,
            available: account.balance,
            requested: total,
        })?;

        // Effects before interaction.
        let previous_balance = account.balance;
        account.balance = remaining;
        account.disbursed = true;

        if let Err(err) = transfer.transfer_batch(payouts) {
            let account = self
                .accounts
                .get_mut(&job_id)
                .expect("escrow account vanished during disbursement");
            account.balance = previous_balance;
            account.disbursed = false;
            return Err(err);
        }
        Ok(())
    }
}
