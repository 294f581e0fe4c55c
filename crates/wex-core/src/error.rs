//! # Error Taxonomy
//!
//! Structured errors for every marketplace operation. Uses `thiserror`
//! for ergonomic error definitions with diagnostic context.
//!
//! Every operation either succeeds completely or returns one of these
//! and leaves no observable state change. Nothing here is retried
//! internally; callers decide whether to retry with corrected input.

use thiserror::Error;

use crate::amount::Amount;
use crate::identity::JobId;

/// Errors surfaced by WEX Stack operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Malformed or out-of-range input: zero payment, past deadline,
    /// fee over the ceiling, compensation exceeding the escrowed
    /// payment.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The caller lacks the required role or relationship to the job.
    #[error("caller {caller} is not authorized: {reason}")]
    Authorization {
        /// The authenticated caller that was rejected.
        caller: String,
        /// Why the caller was rejected.
        reason: String,
    },

    /// The operation is invalid for the current job or dispute status.
    #[error("{job_id} in state {state}: {reason}")]
    State {
        /// The job the operation targeted.
        job_id: JobId,
        /// The job's status at the time of the call.
        state: String,
        /// Why the operation was rejected.
        reason: String,
    },

    /// The record already exists: re-registration, duplicate dispute.
    #[error("duplicate {0}")]
    Duplicate(String),

    /// Unknown job or dispute identifier.
    #[error("{0} not found")]
    NotFound(String),

    /// A disbursement would exceed the custodied balance, or the
    /// external transfer refused the payout.
    #[error("escrow for {job_id} holds {available}, cannot disburse {requested}")]
    Funds {
        /// The job whose escrow account was addressed.
        job_id: JobId,
        /// Units currently custodied for the job.
        available: Amount,
        /// Units the disbursement asked for.
        requested: Amount,
    },
}
