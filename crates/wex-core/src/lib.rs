//! # wex-core — Shared Domain Primitives
//!
//! Foundation types for the WEX Stack:
//!
//! - **Identity** (`identity.rs`): validated newtypes for account and
//!   job identifiers.
//!
//! - **Amount** (`amount.rs`): escrowed value in indivisible units with
//!   checked arithmetic.
//!
//! - **Fees** (`fees.rs`): the pure platform/worker fee split.
//!
//! - **Config** (`config.rs`): platform configuration — owner, arbiter,
//!   treasury, and the bounded fee percentage.
//!
//! - **Error** (`error.rs`): the shared error taxonomy surfaced by every
//!   marketplace operation.
//!
//! - **Events** (`events.rs`): notification payloads emitted after
//!   successful state commits.
//!
//! ## Crate Policy
//!
//! No I/O, no clocks, no storage. Time enters the system only through
//! caller-supplied `DateTime<Utc>` arguments; this crate merely carries
//! those values.

pub mod amount;
pub mod config;
pub mod error;
pub mod events;
pub mod fees;
pub mod identity;

pub use amount::Amount;
pub use config::PlatformConfig;
pub use error::MarketError;
pub use events::MarketEvent;
pub use fees::FeeSplit;
pub use identity::{AccountId, JobId};
