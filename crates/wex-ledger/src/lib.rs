//! # wex-ledger — Job Ledger
//!
//! Owns the job records and drives their lifecycle:
//!
//! - **Job** (`job.rs`): the job record and its status state machine,
//!   `Created → InProgress → Completed` with the dispute branch
//!   `→ Disputed → Resolved`.
//!
//! - **Ledger** (`ledger.rs`): the record store — monotone id
//!   allocation, per-party indexes, and the create / complete / release
//!   operations orchestrating the vault and the registry.
//!
//! ## Design Choice: Validated Enum over Typestate
//!
//! The status is a runtime-checked enum rather than typestate: jobs are
//! stored in one map and serialized where the state is not known at
//! compile time, and the dispute branch leaves several source states
//! into `Disputed`. Each transition is a dedicated method that returns
//! an error for an illegal move.

pub mod job;
pub mod ledger;

pub use job::{Job, JobStatus};
pub use ledger::JobLedger;
