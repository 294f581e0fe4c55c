//! # Notification Events
//!
//! Payloads emitted after a successful operation commits, intended for
//! external indexing and observers. Delivery itself is out of scope;
//! the marketplace keeps an append-only log of these and mirrors each
//! one as a structured `tracing` line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::identity::{AccountId, JobId};

/// A notification emitted by the marketplace after a state commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MarketEvent {
    /// A worker registered with the platform.
    WorkerRegistered {
        worker: AccountId,
        timestamp: DateTime<Utc>,
    },

    /// A job was created and its payment escrowed.
    JobCreated {
        job_id: JobId,
        client: AccountId,
        worker: AccountId,
        payment: Amount,
        deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// The worker marked a job complete.
    JobCompleted {
        job_id: JobId,
        worker: AccountId,
        timestamp: DateTime<Utc>,
    },

    /// Escrowed payment was disbursed along the normal fee-split path.
    PaymentReleased {
        job_id: JobId,
        worker: AccountId,
        worker_cut: Amount,
        platform_cut: Amount,
        timestamp: DateTime<Utc>,
    },

    /// A participant raised a dispute.
    DisputeRaised {
        job_id: JobId,
        initiator: AccountId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The arbiter resolved a dispute and directed disbursement.
    DisputeResolved {
        job_id: JobId,
        winner: AccountId,
        compensation: Amount,
        remainder: Amount,
        timestamp: DateTime<Utc>,
    },

    /// The platform owner changed the fee percentage.
    FeeUpdated {
        old_pct: u8,
        new_pct: u8,
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// The canonical kind string of this event, for log lines and
    /// external routing.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WorkerRegistered { .. } => "worker_registered",
            Self::JobCreated { .. } => "job_created",
            Self::JobCompleted { .. } => "job_completed",
            Self::PaymentReleased { .. } => "payment_released",
            Self::DisputeRaised { .. } => "dispute_raised",
            Self::DisputeResolved { .. } => "dispute_resolved",
            Self::FeeUpdated { .. } => "fee_updated",
        }
    }

    /// The job this event concerns, if any.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Self::JobCreated { job_id, .. }
            | Self::JobCompleted { job_id, .. }
            | Self::PaymentReleased { job_id, .. }
            | Self::DisputeRaised { job_id, .. }
            | Self::DisputeResolved { job_id, .. } => Some(*job_id),
            Self::WorkerRegistered { .. } | Self::FeeUpdated { .. } => None,
        }
    }
}
