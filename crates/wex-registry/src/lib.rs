//! # wex-registry — Worker Registry
//!
//! Worker records keyed by account identity: cumulative earnings,
//! completed-job count, and a reputation score. Registration happens
//! exactly once per identity; earnings and counts move only on a
//! successful payment release, never on a dispute loss.
//!
//! Reputation is initialized to [`INITIAL_REPUTATION`] and never
//! mutated afterwards — the field is reserved until an update policy
//! exists.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wex_core::{AccountId, Amount, MarketError};

/// Reputation score assigned at registration. Nominal range 0–100.
pub const INITIAL_REPUTATION: u8 = 50;

/// A registered worker's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    identity: AccountId,
    total_earnings: Amount,
    jobs_completed: u64,
    reputation: u8,
    registered_at: DateTime<Utc>,
}

/// Read-only snapshot of a worker, also produced (zero-valued) for
/// identities that never registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub registered: bool,
    pub total_earnings: Amount,
    pub jobs_completed: u64,
    pub reputation: u8,
}

impl WorkerStats {
    /// The snapshot returned for an identity with no record.
    pub fn unregistered() -> Self {
        Self {
            registered: false,
            total_earnings: Amount::ZERO,
            jobs_completed: 0,
            reputation: 0,
        }
    }
}

/// The worker registry. Owns all worker records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerRegistry {
    workers: BTreeMap<AccountId, Worker>,
}

impl WorkerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker identity.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Duplicate`] if the identity is already
    /// registered.
    pub fn register(
        &mut self,
        identity: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        if self.workers.contains_key(&identity) {
            return Err(MarketError::Duplicate(format!(
                "worker registration for {identity}"
            )));
        }
        self.workers.insert(
            identity.clone(),
            Worker {
                identity,
                total_earnings: Amount::ZERO,
                jobs_completed: 0,
                reputation: INITIAL_REPUTATION,
                registered_at: now,
            },
        );
        Ok(())
    }

    /// Whether an identity has registered.
    pub fn is_registered(&self, identity: &AccountId) -> bool {
        self.workers.contains_key(identity)
    }

    /// Read-only snapshot of a worker. Zero-valued for unknown
    /// identities.
    pub fn stats(&self, identity: &AccountId) -> WorkerStats {
        match self.workers.get(identity) {
            Some(worker) => WorkerStats {
                registered: true,
                total_earnings: worker.total_earnings,
                jobs_completed: worker.jobs_completed,
                reputation: worker.reputation,
            },
            None => WorkerStats::unregistered(),
        }
    }

    /// Credit a worker for a released payment: earnings grow by
    /// `amount`, the completed-job counter by one. Invoked only by the
    /// release path, which guarantees a single invocation per job.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] for an unregistered identity
    /// and [`MarketError::Validation`] on earnings overflow.
    pub fn credit(&mut self, identity: &AccountId, amount: Amount) -> Result<(), MarketError> {
        let worker = self
            .workers
            .get_mut(identity)
            .ok_or_else(|| MarketError::NotFound(format!("worker {identity}")))?;
        let earnings = worker.total_earnings.checked_add(amount).ok_or_else(|| {
            MarketError::Validation(format!("earnings overflow for worker {identity}"))
        })?;
        worker.total_earnings = earnings;
        worker.jobs_completed += 1;
        Ok(())
    }
}
