// SPDX-License-Identifier: BUSL-1.1
//! # Job Records
//!
//! The job record and its lifecycle state machine.
//!
//! ## Transition Graph
//!
//! ```text
//! Created ──▶ InProgress ──▶ Completed
//!    │            │             │
//!    └────────────┴─────────────┴──▶ Disputed ──▶ Resolved
//! ```
//!
//! `Completed` never reaches `Resolved` directly — only through a
//! dispute. A `Completed` job with `payment_released == true` is
//! terminal in its own right. No transition moves a job backward.
//!
//! ## Security Invariant
//!
//! `payment_released` flips false→true at most once for the lifetime of
//! the record, and only while the status is `Completed` or during
//! dispute resolution. Both release paths set the flag *before* the
//! external disbursement and reverse it if the disbursement fails.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use wex_core::{AccountId, Amount, JobId, MarketError};

// ── Job Status ─────────────────────────────────────────────────────────

/// The lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job recorded and payment escrowed; work not yet started.
    Created,
    /// Worker is on the job.
    InProgress,
    /// Worker declared the work complete; awaiting release.
    Completed,
    /// A participant raised a dispute; awaiting the arbiter.
    Disputed,
    /// Arbiter resolved the dispute. Terminal state.
    Resolved,
}

impl JobStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Disputed => "DISPUTED",
            Self::Resolved => "RESOLVED",
        }
    }

    /// Valid target statuses from this status.
    pub fn valid_transitions(&self) -> &'static [JobStatus] {
        match self {
            Self::Created => &[Self::InProgress, Self::Completed, Self::Disputed],
            Self::InProgress => &[Self::Completed, Self::Disputed],
            Self::Completed => &[Self::Disputed],
            Self::Disputed => &[Self::Resolved],
            Self::Resolved => &[],
        }
    }

    /// Whether this status alone ends the lifecycle. A released
    /// `Completed` job is also terminal; see [`Job::is_closed`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── The Job ────────────────────────────────────────────────────────────

/// A paid work engagement between a client and a worker.
///
/// Created by the ledger, mutated only through the guarded transition
/// methods here, never deleted — the record is the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    client: AccountId,
    worker: AccountId,
    payment: Amount,
    description: String,
    deadline: DateTime<Utc>,
    status: JobStatus,
    created_at: DateTime<Utc>,
    payment_released: bool,
}

impl Job {
    /// Record a new job. Precondition checks live in
    /// [`JobLedger::create_job`](crate::ledger::JobLedger::create_job);
    /// this only assembles the record.
    pub(crate) fn new(
        id: JobId,
        client: AccountId,
        worker: AccountId,
        payment: Amount,
        description: String,
        deadline: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client,
            worker,
            payment,
            description,
            deadline,
            status: JobStatus::Created,
            created_at,
            payment_released: false,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn client(&self) -> &AccountId {
        &self.client
    }

    pub fn worker(&self) -> &AccountId {
        &self.worker
    }

    pub fn payment(&self) -> Amount {
        self.payment
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payment_released(&self) -> bool {
        self.payment_released
    }

    /// Whether the account is the job's client or worker.
    pub fn is_participant(&self, account: &AccountId) -> bool {
        account == &self.client || account == &self.worker
    }

    /// Whether no further lifecycle progress is possible.
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal() || self.payment_released
    }

    /// Transition to `Completed`. Worker only, from `Created` or
    /// `InProgress`.
    ///
    /// # Errors
    ///
    /// [`MarketError::Authorization`] for any caller but the worker,
    /// [`MarketError::State`] for a wrong status or a released payment.
    pub fn complete(&mut self, caller: &AccountId) -> Result<(), MarketError> {
        if caller != &self.worker {
            return Err(MarketError::Authorization {
                caller: caller.to_string(),
                reason: format!("only the worker may complete {}", self.id),
            });
        }
        if self.payment_released {
            return Err(self.state_error("payment already released"));
        }
        if !matches!(self.status, JobStatus::Created | JobStatus::InProgress) {
            return Err(self.state_error("job is not open for completion"));
        }
        self.status = JobStatus::Completed;
        Ok(())
    }

    /// Check every release precondition without mutating anything.
    ///
    /// Release requires a participant caller, `Completed` status, an
    /// unreleased payment, and either the client as caller or a call
    /// strictly after `deadline + grace` (the permissionless
    /// auto-release window).
    pub fn ensure_release_authorized(
        &self,
        caller: &AccountId,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<(), MarketError> {
        if !self.is_participant(caller) {
            return Err(MarketError::Authorization {
                caller: caller.to_string(),
                reason: format!("not a participant of {}", self.id),
            });
        }
        if self.payment_released {
            return Err(self.state_error("payment already released"));
        }
        if self.status != JobStatus::Completed {
            return Err(self.state_error("release requires a completed job"));
        }
        if caller != &self.client && now <= self.deadline + grace {
            return Err(MarketError::Authorization {
                caller: caller.to_string(),
                reason: format!(
                    "only the client may release before the grace window ends at {}",
                    self.deadline + grace
                ),
            });
        }
        Ok(())
    }

    /// Set the released flag. Callers commit this before the external
    /// disbursement.
    pub fn mark_released(&mut self) {
        self.payment_released = true;
    }

    /// Reverse [`mark_released`](Self::mark_released) after a failed
    /// disbursement.
    pub fn clear_released(&mut self) {
        self.payment_released = false;
    }

    /// Transition to `Disputed`, from any pre-resolution status with an
    /// unreleased payment.
    ///
    /// # Errors
    ///
    /// [`MarketError::State`] if the job is already disputed, resolved,
    /// or released.
    pub fn begin_dispute(&mut self) -> Result<(), MarketError> {
        if self.payment_released {
            return Err(self.state_error("payment already released"));
        }
        match self.status {
            JobStatus::Created | JobStatus::InProgress | JobStatus::Completed => {
                self.status = JobStatus::Disputed;
                Ok(())
            }
            JobStatus::Disputed => Err(self.state_error("job is already disputed")),
            JobStatus::Resolved => Err(self.state_error("job is already resolved")),
        }
    }

    /// Finalize dispute resolution: status to `Resolved` and the
    /// released flag set, committed before the disbursement. Returns
    /// the prior status for [`rollback_resolution`](Self::rollback_resolution).
    ///
    /// # Errors
    ///
    /// [`MarketError::State`] unless the job is `Disputed` with an
    /// unreleased payment.
    pub fn finalize_resolution(&mut self) -> Result<JobStatus, MarketError> {
        if self.payment_released {
            return Err(self.state_error("payment already released"));
        }
        if self.status != JobStatus::Disputed {
            return Err(self.state_error("resolution requires a disputed job"));
        }
        let prior = self.status;
        self.status = JobStatus::Resolved;
        self.payment_released = true;
        Ok(prior)
    }

    /// Reverse [`finalize_resolution`](Self::finalize_resolution) after
    /// a failed disbursement.
    pub fn rollback_resolution(&mut self, prior: JobStatus) {
        self.status = prior;
        self.payment_released = false;
    }

    fn state_error(&self, reason: &str) -> MarketError {
        MarketError::State {
            job_id: self.id,
            state: self.status.as_str().to_string(),
            reason: reason.to_string(),
        }
    }
}
