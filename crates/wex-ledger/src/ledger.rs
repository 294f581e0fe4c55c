// SPDX-License-Identifier: BUSL-1.1
//! # Job Ledger
//!
//! The record store driving the job lifecycle. Owns every job, assigns
//! monotone identifiers, maintains per-worker and per-client indexes,
//! and orchestrates the escrow vault and the worker registry for the
//! create and release operations.
//!
//! ## Security Invariant
//!
//! `release_payment` commits `payment_released = true` strictly before
//! instructing the vault to disburse, and reverses the flag if the
//! disbursement fails. Together with the vault's own disbursed marker
//! this gives two independent guards against a second payout
//! (defense in depth).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wex_core::{fees, AccountId, Amount, FeeSplit, JobId, MarketError, PlatformConfig};
use wex_escrow::{EscrowVault, Payout, ValueTransfer};
use wex_registry::WorkerRegistry;

use crate::job::Job;

/// The job ledger. Owns all job records; other components address them
/// by [`JobId`] only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLedger {
    jobs: BTreeMap<JobId, Job>,
    next_job_id: JobId,
    worker_jobs: BTreeMap<AccountId, Vec<JobId>>,
    client_jobs: BTreeMap<AccountId, Vec<JobId>>,
}

impl JobLedger {
    /// Create an empty ledger. Job ids start at 1.
    pub fn new() -> Self {
        Self {
            jobs: BTreeMap::new(),
            next_job_id: JobId::from_index(1),
            worker_jobs: BTreeMap::new(),
            client_jobs: BTreeMap::new(),
        }
    }

    /// Record a new job and escrow its payment.
    ///
    /// All preconditions are checked before any state is touched; a
    /// failed creation consumes no job id and deposits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] for a non-positive payment,
    /// a deadline not strictly in the future, an unregistered worker,
    /// or `client == worker`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_job(
        &mut self,
        client: AccountId,
        worker: AccountId,
        description: String,
        deadline: DateTime<Utc>,
        payment: Amount,
        now: DateTime<Utc>,
        registry: &WorkerRegistry,
        vault: &mut EscrowVault,
    ) -> Result<JobId, MarketError> {
        if payment.is_zero() {
            return Err(MarketError::Validation(
                "payment must be positive".to_string(),
            ));
        }
        if deadline <= now {
            return Err(MarketError::Validation(format!(
                "deadline {deadline} is not after creation time {now}"
            )));
        }
        if !registry.is_registered(&worker) {
            return Err(MarketError::Validation(format!(
                "worker {worker} is not registered"
            )));
        }
        if client == worker {
            return Err(MarketError::Validation(
                "client and worker must differ".to_string(),
            ));
        }

        let job_id = self.next_job_id;
        vault.deposit(job_id, payment)?;
        self.jobs.insert(
            job_id,
            Job::new(
                job_id,
                client.clone(),
                worker.clone(),
                payment,
                description,
                deadline,
                now,
            ),
        );
        self.worker_jobs.entry(worker).or_default().push(job_id);
        self.client_jobs.entry(client).or_default().push(job_id);
        self.next_job_id = job_id.next();

        tracing::debug!(%job_id, %payment, "job created and payment escrowed");
        Ok(job_id)
    }

    /// Advance a job to `Completed`. Worker only.
    pub fn complete_job(&mut self, job_id: JobId, caller: &AccountId) -> Result<(), MarketError> {
        let job = self.require_job_mut(job_id)?;
        job.complete(caller)?;
        tracing::debug!(%job_id, worker = %caller, "job completed");
        Ok(())
    }

    /// Release the escrowed payment along the fee-split path.
    ///
    /// Authorization and status checks first, then the fee split at the
    /// percentage currently configured, then commit-then-transfer: the
    /// released flag is set, the vault disburses worker and platform
    /// cuts, and the registry is credited. A failed disbursement rolls
    /// the flag back and leaves every store untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn release_payment(
        &mut self,
        job_id: JobId,
        caller: &AccountId,
        now: DateTime<Utc>,
        config: &PlatformConfig,
        vault: &mut EscrowVault,
        registry: &mut WorkerRegistry,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<FeeSplit, MarketError> {
        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| MarketError::NotFound(format!("{job_id}")))?;
        job.ensure_release_authorized(caller, now, config.release_grace())?;

        let split = fees::split(job.payment(), config.fee_pct())?;
        let worker = job.worker().clone();

        // The credit after the transfer must not be able to fail.
        let earnings = registry.stats(&worker).total_earnings;
        if earnings.checked_add(split.worker_cut).is_none() {
            return Err(MarketError::Validation(format!(
                "earnings overflow for worker {worker}"
            )));
        }

        let payouts = [
            Payout::new(worker.clone(), split.worker_cut),
            Payout::new(config.treasury().clone(), split.platform_cut),
        ];

        // Effects before interaction.
        job.mark_released();
        if let Err(err) = vault.disburse(job_id, &payouts, transfer) {
            job.clear_released();
            return Err(err);
        }
        registry.credit(&worker, split.worker_cut)?;

        tracing::debug!(
            %job_id,
            worker_cut = %split.worker_cut,
            platform_cut = %split.platform_cut,
            "payment released"
        );
        Ok(split)
    }

    /// Look up a job.
    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    /// Look up a job, or fail with [`MarketError::NotFound`].
    pub fn require_job(&self, job_id: JobId) -> Result<&Job, MarketError> {
        self.jobs
            .get(&job_id)
            .ok_or_else(|| MarketError::NotFound(format!("{job_id}")))
    }

    /// Mutable job access for the dispute arbiter, which exclusively
    /// drives the `Disputed`/`Resolved` transitions.
    pub fn require_job_mut(&mut self, job_id: JobId) -> Result<&mut Job, MarketError> {
        self.jobs
            .get_mut(&job_id)
            .ok_or_else(|| MarketError::NotFound(format!("{job_id}")))
    }

    /// Ids of all jobs where the account is the worker, oldest first.
    pub fn worker_jobs(&self, worker: &AccountId) -> &[JobId] {
        self.worker_jobs
            .get(worker)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ids of all jobs where the account is the client, oldest first.
    pub fn client_jobs(&self, client: &AccountId) -> &[JobId] {
        self.client_jobs
            .get(client)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The id the next successful creation will be assigned.
    pub fn next_job_id(&self) -> JobId {
        self.next_job_id
    }

    /// Number of jobs ever recorded.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

impl Default for JobLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use wex_escrow::SettlementBook;

    fn account(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    fn config() -> PlatformConfig {
        PlatformConfig::new(account("owner"), account("arbiter"), account("treasury"))
    }

    struct Fixture {
        ledger: JobLedger,
        registry: WorkerRegistry,
        vault: EscrowVault,
        book: SettlementBook,
        config: PlatformConfig,
        now: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let now = Utc::now();
        let mut registry = WorkerRegistry::new();
        registry.register(account("worker"), now).unwrap();
        Fixture {
            ledger: JobLedger::new(),
            registry,
            vault: EscrowVault::new(),
            book: SettlementBook::new(),
            config: config(),
            now,
        }
    }

    fn create(fx: &mut Fixture, payment: u128) -> JobId {
        fx.ledger
            .create_job(
                account("client"),
                account("worker"),
                "audit".to_string(),
                fx.now + Duration::days(10),
                Amount::from_units(payment),
                fx.now,
                &fx.registry,
                &mut fx.vault,
            )
            .unwrap()
    }

    /// Transfer double that always refuses.
    struct RefusingTransfer;

    impl ValueTransfer for RefusingTransfer {
        fn transfer_batch(&mut self, _payouts: &[Payout]) -> Result<(), MarketError> {
            Err(MarketError::Validation("transfer refused".to_string()))
        }
    }

    #[test]
    fn create_escrows_payment_and_indexes_parties() {
        let mut fx = fixture();
        let job_id = create(&mut fx, 1000);
        assert_eq!(fx.vault.custodied(job_id), Amount::from_units(1000));
        assert_eq!(fx.ledger.worker_jobs(&account("worker")), &[job_id]);
        assert_eq!(fx.ledger.client_jobs(&account("client")), &[job_id]);
        assert!(!fx.ledger.job(job_id).unwrap().payment_released());
    }

    #[test]
    fn job_ids_are_monotone_and_not_consumed_on_failure() {
        let mut fx = fixture();
        let first = create(&mut fx, 100);

        // Worker == client fails validation and must not burn an id.
        let before = fx.ledger.next_job_id();
        let result = fx.ledger.create_job(
            account("worker"),
            account("worker"),
            "self-deal".to_string(),
            fx.now + Duration::days(1),
            Amount::from_units(100),
            fx.now,
            &fx.registry,
            &mut fx.vault,
        );
        assert!(matches!(result, Err(MarketError::Validation(_))));
        assert_eq!(fx.ledger.next_job_id(), before);

        let second = create(&mut fx, 100);
        assert_eq!(second, first.next());
    }

    #[test]
    fn create_rejects_zero_payment() {
        let mut fx = fixture();
        let result = fx.ledger.create_job(
            account("client"),
            account("worker"),
            "free work".to_string(),
            fx.now + Duration::days(1),
            Amount::ZERO,
            fx.now,
            &fx.registry,
            &mut fx.vault,
        );
        assert!(matches!(result, Err(MarketError::Validation(_))));
        assert_eq!(fx.ledger.job_count(), 0);
    }

    #[test]
    fn create_rejects_past_deadline() {
        let mut fx = fixture();
        for offset in [Duration::days(-1), Duration::zero()] {
            let result = fx.ledger.create_job(
                account("client"),
                account("worker"),
                "late".to_string(),
                fx.now + offset,
                Amount::from_units(10),
                fx.now,
                &fx.registry,
                &mut fx.vault,
            );
            assert!(matches!(result, Err(MarketError::Validation(_))));
        }
    }

    #[test]
    fn create_rejects_unregistered_worker() {
        let mut fx = fixture();
        let result = fx.ledger.create_job(
            account("client"),
            account("stranger"),
            "job".to_string(),
            fx.now + Duration::days(1),
            Amount::from_units(10),
            fx.now,
            &fx.registry,
            &mut fx.vault,
        );
        assert!(matches!(result, Err(MarketError::Validation(_))));
    }

    #[test]
    fn release_happy_path_splits_credits_and_closes() {
        let mut fx = fixture();
        let job_id = create(&mut fx, 1000);
        fx.ledger.complete_job(job_id, &account("worker")).unwrap();

        let split = fx
            .ledger
            .release_payment(
                job_id,
                &account("client"),
                fx.now,
                &fx.config,
                &mut fx.vault,
                &mut fx.registry,
                &mut fx.book,
            )
            .unwrap();

        assert_eq!(split.worker_cut, Amount::from_units(950));
        assert_eq!(split.platform_cut, Amount::from_units(50));
        assert_eq!(fx.book.balance(&account("worker")), Amount::from_units(950));
        assert_eq!(
            fx.book.balance(&account("treasury")),
            Amount::from_units(50)
        );
        let stats = fx.registry.stats(&account("worker"));
        assert_eq!(stats.total_earnings, Amount::from_units(950));
        assert_eq!(stats.jobs_completed, 1);
        assert!(fx.ledger.job(job_id).unwrap().payment_released());
    }

    #[test]
    fn second_release_fails_with_state_error() {
        let mut fx = fixture();
        let job_id = create(&mut fx, 1000);
        fx.ledger.complete_job(job_id, &account("worker")).unwrap();
        fx.ledger
            .release_payment(
                job_id,
                &account("client"),
                fx.now,
                &fx.config,
                &mut fx.vault,
                &mut fx.registry,
                &mut fx.book,
            )
            .unwrap();
        let result = fx.ledger.release_payment(
            job_id,
            &account("client"),
            fx.now,
            &fx.config,
            &mut fx.vault,
            &mut fx.registry,
            &mut fx.book,
        );
        assert!(matches!(result, Err(MarketError::State { .. })));
        // Exactly one payout landed.
        assert_eq!(fx.book.balance(&account("worker")), Amount::from_units(950));
    }

    #[test]
    fn worker_auto_release_after_deadline_plus_grace() {
        let mut fx = fixture();
        let job_id = create(&mut fx, 1000);
        fx.ledger.complete_job(job_id, &account("worker")).unwrap();

        let deadline = fx.ledger.job(job_id).unwrap().deadline();
        let too_early = deadline + fx.config.release_grace();
        let result = fx.ledger.release_payment(
            job_id,
            &account("worker"),
            too_early,
            &fx.config,
            &mut fx.vault,
            &mut fx.registry,
            &mut fx.book,
        );
        assert!(matches!(result, Err(MarketError::Authorization { .. })));

        fx.ledger
            .release_payment(
                job_id,
                &account("worker"),
                too_early + Duration::seconds(1),
                &fx.config,
                &mut fx.vault,
                &mut fx.registry,
                &mut fx.book,
            )
            .unwrap();
        assert!(fx.ledger.job(job_id).unwrap().payment_released());
    }

    #[test]
    fn failed_disbursement_rolls_back_released_flag() {
        let mut fx = fixture();
        let job_id = create(&mut fx, 1000);
        fx.ledger.complete_job(job_id, &account("worker")).unwrap();

        let result = fx.ledger.release_payment(
            job_id,
            &account("client"),
            fx.now,
            &fx.config,
            &mut fx.vault,
            &mut fx.registry,
            &mut RefusingTransfer,
        );
        assert!(result.is_err());

        let job = fx.ledger.job(job_id).unwrap();
        assert!(!job.payment_released());
        assert_eq!(fx.vault.custodied(job_id), Amount::from_units(1000));
        assert_eq!(fx.registry.stats(&account("worker")).jobs_completed, 0);

        // The job is still releasable once the substrate recovers.
        fx.ledger
            .release_payment(
                job_id,
                &account("client"),
                fx.now,
                &fx.config,
                &mut fx.vault,
                &mut fx.registry,
                &mut fx.book,
            )
            .unwrap();
    }

    #[test]
    fn release_observes_fee_in_effect_at_release_time() {
        let mut fx = fixture();
        let job_id = create(&mut fx, 1000);
        fx.ledger.complete_job(job_id, &account("worker")).unwrap();

        fx.config.update_fee(&account("owner"), 10).unwrap();
        let split = fx
            .ledger
            .release_payment(
                job_id,
                &account("client"),
                fx.now,
                &fx.config,
                &mut fx.vault,
                &mut fx.registry,
                &mut fx.book,
            )
            .unwrap();
        assert_eq!(split.platform_cut, Amount::from_units(100));
        assert_eq!(split.worker_cut, Amount::from_units(900));
    }

    #[test]
    fn release_unknown_job_not_found() {
        let mut fx = fixture();
        let result = fx.ledger.release_payment(
            JobId::from_index(404),
            &account("client"),
            fx.now,
            &fx.config,
            &mut fx.vault,
            &mut fx.registry,
            &mut fx.book,
        );
        assert!(matches!(result, Err(MarketError::NotFound(_))));
    }

    #[test]
    fn accessors_empty_for_unknown_parties() {
        let fx = fixture();
        assert!(fx.ledger.worker_jobs(&account("nobody")).is_empty());
        assert!(fx.ledger.client_jobs(&account("nobody")).is_empty());
        assert!(fx.ledger.job(JobId::from_index(1)).is_none());
    }
}
