// SPDX-License-Identifier: BUSL-1.1
//! # wex-arbitration — Dispute Arbitration
//!
//! Dispute records and the single-arbiter resolution path. Any
//! participant of an open job may raise a dispute, freezing the job in
//! `Disputed`; only the configured arbiter may resolve it, awarding a
//! compensation to the winner and routing the remainder to the
//! treasury. Resolution bypasses the platform fee split entirely.
//!
//! ## Security Invariant
//!
//! Resolution commits every re-entry guard — the `Resolved` status, the
//! released flag, and the dispute's resolved marker — before the escrow
//! disburses, and rolls all of them back if the disbursement fails, so
//! a failed ruling leaves the dispute open for a retry.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wex_core::{AccountId, Amount, JobId, MarketError, PlatformConfig};
use wex_escrow::{EscrowVault, Payout, ValueTransfer};
use wex_ledger::JobLedger;

/// A raised dispute, keyed by the job it contests. One dispute per job
/// for the lifetime of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    initiator: AccountId,
    reason: String,
    raised_at: DateTime<Utc>,
    resolved: bool,
    winner: Option<AccountId>,
}

impl Dispute {
    pub fn initiator(&self) -> &AccountId {
        &self.initiator
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn raised_at(&self) -> DateTime<Utc> {
        self.raised_at
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// The winning party, once resolved.
    pub fn winner(&self) -> Option<&AccountId> {
        self.winner.as_ref()
    }
}

/// The arbiter's ruling on a dispute: how the escrowed payment was
/// divided between the winner and the treasury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruling {
    pub winner: AccountId,
    pub compensation: Amount,
    pub remainder: Amount,
}

/// Dispute store and resolution engine. Owns all dispute records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisputeArbiter {
    disputes: BTreeMap<JobId, Dispute>,
}

impl DisputeArbiter {
    /// Create an empty dispute store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the dispute for a job.
    pub fn dispute(&self, job_id: JobId) -> Option<&Dispute> {
        self.disputes.get(&job_id)
    }

    /// Raise a dispute against a job, freezing it in `Disputed`.
    ///
    /// # Errors
    ///
    /// [`MarketError::Authorization`] for a non-participant caller,
    /// [`MarketError::Duplicate`] if the job was ever disputed, and
    /// [`MarketError::State`] if the job is already closed.
    pub fn raise(
        &mut self,
        ledger: &mut JobLedger,
        job_id: JobId,
        caller: &AccountId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        let job = ledger.require_job_mut(job_id)?;
        if !job.is_participant(caller) {
            return Err(MarketError::Authorization {
                caller: caller.to_string(),
                reason: format!("not a participant of {job_id}"),
            });
        }
        if self.disputes.contains_key(&job_id) {
            return Err(MarketError::Duplicate(format!("dispute for {job_id}")));
        }
        job.begin_dispute()?;
        self.disputes.insert(
            job_id,
            Dispute {
                initiator: caller.clone(),
                reason,
                raised_at: now,
                resolved: false,
                winner: None,
            },
        );
        tracing::debug!(%job_id, initiator = %caller, "dispute raised");
        Ok(())
    }

    /// Resolve a dispute. Arbiter only.
    ///
    /// The winner receives `compensation` from the escrow and the
    /// remainder goes to the treasury, with no fee split applied. The
    /// ruling is authoritative: the arbiter names any winner identity.
    /// Every re-entry guard commits before the disbursement; a failed
    /// disbursement reverses them all and leaves the dispute open.
    ///
    /// # Errors
    ///
    /// [`MarketError::Authorization`] for any caller but the arbiter,
    /// [`MarketError::NotFound`] if the job was never disputed,
    /// [`MarketError::State`] if the dispute is already resolved, and
    /// [`MarketError::Validation`] for a compensation exceeding the
    /// escrowed payment.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        &mut self,
        ledger: &mut JobLedger,
        job_id: JobId,
        caller: &AccountId,
        winner: AccountId,
        compensation: Amount,
        config: &PlatformConfig,
        vault: &mut EscrowVault,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<Ruling, MarketError> {
        if caller != config.arbiter() {
            return Err(MarketError::Authorization {
                caller: caller.to_string(),
                reason: "only the arbiter may resolve disputes".to_string(),
            });
        }
        let dispute = self
            .disputes
            .get_mut(&job_id)
            .ok_or_else(|| MarketError::NotFound(format!("dispute for {job_id}")))?;
        let job = ledger.require_job_mut(job_id)?;
        if dispute.resolved {
            return Err(MarketError::State {
                job_id,
                state: job.status().to_string(),
                reason: "dispute already resolved".to_string(),
            });
        }
        let remainder = job.payment().checked_sub(compensation).ok_or_else(|| {
            MarketError::Validation(format!(
                "compensation {compensation} exceeds escrowed payment {}",
                job.payment()
            ))
        })?;

        let payouts = [
            Payout::new(winner.clone(), compensation),
            Payout::new(config.treasury().clone(), remainder),
        ];

        // Effects before interaction.
        let prior = job.finalize_resolution()?;
        dispute.resolved = true;
        dispute.winner = Some(winner.clone());
        if let Err(err) = vault.disburse(job_id, &payouts, transfer) {
            job.rollback_resolution(prior);
            dispute.resolved = false;
            dispute.winner = None;
            return Err(err);
        }

        tracing::debug!(%job_id, %winner, %compensation, %remainder, "dispute resolved");
        Ok(Ruling {
            winner,
            compensation,
            remainder,
        })
    }
}
