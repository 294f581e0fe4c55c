// SPDX-License-Identifier: BUSL-1.1
//! # wex-market — Marketplace Facade
//!
//! The single entry point of the stack. A [`Marketplace`] owns every
//! component — the worker registry, the escrow vault, the job ledger,
//! and the dispute arbiter — and exposes one method per operation.
//! Callers never touch a component directly; every call carries the
//! caller's identity and the current time, and all authorization
//! happens against those.
//!
//! Each successful operation appends a [`MarketEvent`] to the
//! marketplace's event log after the state commit and mirrors it as a
//! structured `tracing` line. A failed operation appends nothing.
//!
//! The value-transfer substrate is a type parameter so deployments can
//! plug in their own settlement backend; [`Marketplace::in_memory`]
//! wires up the bundled [`SettlementBook`].

use chrono::{DateTime, Utc};

use wex_arbitration::{Dispute, DisputeArbiter, Ruling};
use wex_core::{AccountId, Amount, FeeSplit, JobId, MarketError, MarketEvent, PlatformConfig};
use wex_escrow::{EscrowVault, SettlementBook, ValueTransfer};
use wex_ledger::{Job, JobLedger};
use wex_registry::{WorkerRegistry, WorkerStats};

/// The marketplace. Owns all state; see the crate docs.
#[derive(Debug, Clone)]
pub struct Marketplace<T: ValueTransfer> {
    config: PlatformConfig,
    registry: WorkerRegistry,
    vault: EscrowVault,
    ledger: JobLedger,
    arbiter: DisputeArbiter,
    settlement: T,
    events: Vec<MarketEvent>,
}

impl Marketplace<SettlementBook> {
    /// A marketplace settling over the bundled in-memory book.
    pub fn in_memory(owner: AccountId, arbiter: AccountId, treasury: AccountId) -> Self {
        Self::with_settlement(owner, arbiter, treasury, SettlementBook::new())
    }
}

impl<T: ValueTransfer> Marketplace<T> {
    /// A marketplace settling over the given substrate.
    pub fn with_settlement(
        owner: AccountId,
        arbiter: AccountId,
        treasury: AccountId,
        settlement: T,
    ) -> Self {
        Self {
            config: PlatformConfig::new(owner, arbiter, treasury),
            registry: WorkerRegistry::new(),
            vault: EscrowVault::new(),
            ledger: JobLedger::new(),
            arbiter: DisputeArbiter::new(),
            settlement,
            events: Vec::new(),
        }
    }

    // ── Operations ─────────────────────────────────────────────────────

    /// Register the caller as a worker.
    pub fn register_worker(
        &mut self,
        caller: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        self.registry.register(caller.clone(), now)?;
        self.record(MarketEvent::WorkerRegistered {
            worker: caller.clone(),
            timestamp: now,
        });
        Ok(())
    }

    /// Create a job: the caller becomes the client and the payment is
    /// escrowed immediately.
    pub fn create_job(
        &mut self,
        caller: &AccountId,
        worker: AccountId,
        description: String,
        deadline: DateTime<Utc>,
        payment: Amount,
        now: DateTime<Utc>,
    ) -> Result<JobId, MarketError> {
        let job_id = self.ledger.create_job(
            caller.clone(),
            worker.clone(),
            description,
            deadline,
            payment,
            now,
            &self.registry,
            &mut self.vault,
        )?;
        self.record(MarketEvent::JobCreated {
            job_id,
            client: caller.clone(),
            worker,
            payment,
            deadline,
            timestamp: now,
        });
        Ok(job_id)
    }

    /// Mark a job complete. Worker only.
    pub fn complete_job(
        &mut self,
        caller: &AccountId,
        job_id: JobId,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        self.ledger.complete_job(job_id, caller)?;
        self.record(MarketEvent::JobCompleted {
            job_id,
            worker: caller.clone(),
            timestamp: now,
        });
        Ok(())
    }

    /// Release a completed job's escrowed payment along the fee-split
    /// path. The client may release at any time; any participant may
    /// release once the post-deadline grace window has elapsed.
    pub fn release_payment(
        &mut self,
        caller: &AccountId,
        job_id: JobId,
        now: DateTime<Utc>,
    ) -> Result<FeeSplit, MarketError> {
        let split = self.ledger.release_payment(
            job_id,
            caller,
            now,
            &self.config,
            &mut self.vault,
            &mut self.registry,
            &mut self.settlement,
        )?;
        let worker = self
            .ledger
            .require_job(job_id)?
            .worker()
            .clone();
        self.record(MarketEvent::PaymentReleased {
            job_id,
            worker,
            worker_cut: split.worker_cut,
            platform_cut: split.platform_cut,
            timestamp: now,
        });
        Ok(split)
    }

    /// Raise a dispute against a job. Participants only.
    pub fn raise_dispute(
        &mut self,
        caller: &AccountId,
        job_id: JobId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        self.arbiter
            .raise(&mut self.ledger, job_id, caller, reason.clone(), now)?;
        self.record(MarketEvent::DisputeRaised {
            job_id,
            initiator: caller.clone(),
            reason,
            timestamp: now,
        });
        Ok(())
    }

    /// Resolve a dispute. Arbiter only; no fee split applies.
    pub fn resolve_dispute(
        &mut self,
        caller: &AccountId,
        job_id: JobId,
        winner: AccountId,
        compensation: Amount,
        now: DateTime<Utc>,
    ) -> Result<Ruling, MarketError> {
        let ruling = self.arbiter.resolve(
            &mut self.ledger,
            job_id,
            caller,
            winner,
            compensation,
            &self.config,
            &mut self.vault,
            &mut self.settlement,
        )?;
        self.record(MarketEvent::DisputeResolved {
            job_id,
            winner: ruling.winner.clone(),
            compensation: ruling.compensation,
            remainder: ruling.remainder,
            timestamp: now,
        });
        Ok(ruling)
    }

    /// Update the platform fee percentage. Owner only. Applies to every
    /// release from this point on, whenever the job was created.
    pub fn update_platform_fee(
        &mut self,
        caller: &AccountId,
        new_pct: u8,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        let old_pct = self.config.fee_pct();
        self.config.update_fee(caller, new_pct)?;
        self.record(MarketEvent::FeeUpdated {
            old_pct,
            new_pct,
            timestamp: now,
        });
        Ok(())
    }

    // ── Reads ──────────────────────────────────────────────────────────

    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.ledger.job(job_id)
    }

    pub fn worker_jobs(&self, worker: &AccountId) -> &[JobId] {
        self.ledger.worker_jobs(worker)
    }

    pub fn client_jobs(&self, client: &AccountId) -> &[JobId] {
        self.ledger.client_jobs(client)
    }

    pub fn worker_stats(&self, identity: &AccountId) -> WorkerStats {
        self.registry.stats(identity)
    }

    pub fn dispute(&self, job_id: JobId) -> Option<&Dispute> {
        self.arbiter.dispute(job_id)
    }

    /// Funds currently held in escrow for a job.
    pub fn escrowed(&self, job_id: JobId) -> Amount {
        self.vault.custodied(job_id)
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn settlement(&self) -> &T {
        &self.settlement
    }

    /// Every event emitted so far, oldest first.
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    fn record(&mut self, event: MarketEvent) {
        match event.job_id() {
            Some(job_id) => tracing::info!(kind = event.kind(), %job_id, "market event"),
            None => tracing::info!(kind = event.kind(), "market event"),
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    fn market() -> Marketplace<SettlementBook> {
        Marketplace::in_memory(account("owner"), account("arbiter"), account("treasury"))
    }

    #[test]
    fn register_emits_event() {
        let mut market = market();
        let now = Utc::now();
        market.register_worker(&account("w"), now).unwrap();
        assert!(market.worker_stats(&account("w")).registered);
        assert_eq!(market.events().len(), 1);
        assert_eq!(market.events()[0].kind(), "worker_registered");
    }

    #[test]
    fn failed_operation_emits_nothing() {
        let mut market = market();
        let now = Utc::now();
        let result = market.create_job(
            &account("client"),
            account("nobody"),
            "job".to_string(),
            now + Duration::days(1),
            Amount::from_units(10),
            now,
        );
        assert!(result.is_err());
        assert!(market.events().is_empty());
    }

    #[test]
    fn fee_update_is_owner_gated_and_logged() {
        let mut market = market();
        let now = Utc::now();
        assert!(market
            .update_platform_fee(&account("mallory"), 3, now)
            .is_err());
        market.update_platform_fee(&account("owner"), 3, now).unwrap();
        assert_eq!(market.config().fee_pct(), 3);
        assert!(matches!(
            market.events().last(),
            Some(MarketEvent::FeeUpdated {
                old_pct: 5,
                new_pct: 3,
                ..
            })
        ));
    }
}
