//! # wex-escrow — Fund Custody
//!
//! Custodies each job's payment from creation until it is disbursed
//! exactly once:
//!
//! - **Vault** (`vault.rs`): per-job escrow accounts with the
//!   single-disbursement guarantee.
//!
//! - **Transfer** (`transfer.rs`): the [`ValueTransfer`] seam to the
//!   substrate's value-movement primitive, plus the in-memory
//!   [`SettlementBook`] reference implementation.
//!
//! ## Crate Policy
//!
//! The vault commits its own state (disbursed marker, balance) before
//! invoking the external transfer, and restores it if the transfer
//! fails. Callers layer their own release flags on top of this for
//! defense in depth.

pub mod transfer;
pub mod vault;

pub use transfer::{Payout, SettlementBook, ValueTransfer};
pub use vault::EscrowVault;
