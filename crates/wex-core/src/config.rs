//! # Platform Configuration
//!
//! Mutable platform-administration state: the owner, the arbiter role,
//! the treasury account, and the bounded fee percentage. The fee is read
//! at release time, never cached per job, so a release always observes
//! the fee in effect when it happens.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::identity::AccountId;

/// Ceiling on the platform fee percentage. Administrative updates past
/// this bound are rejected.
pub const MAX_FEE_PCT: u8 = 10;

/// Fee percentage a fresh platform starts with.
pub const DEFAULT_FEE_PCT: u8 = 5;

/// Days after a job's deadline during which release still requires the
/// client; once elapsed, release becomes permissionless for participants.
pub const RELEASE_GRACE_DAYS: i64 = 7;

/// Platform-administration configuration.
///
/// The owner is the only identity allowed to change the fee; the arbiter
/// is the only identity allowed to resolve disputes. Both are fixed at
/// construction — governance of these roles is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    owner: AccountId,
    arbiter: AccountId,
    treasury: AccountId,
    fee_pct: u8,
}

impl PlatformConfig {
    /// Create a configuration with the default fee percentage.
    pub fn new(owner: AccountId, arbiter: AccountId, treasury: AccountId) -> Self {
        Self {
            owner,
            arbiter,
            treasury,
            fee_pct: DEFAULT_FEE_PCT,
        }
    }

    /// The platform owner.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// The identity holding the dispute-arbiter role.
    pub fn arbiter(&self) -> &AccountId {
        &self.arbiter
    }

    /// The account receiving platform cuts and dispute remainders.
    pub fn treasury(&self) -> &AccountId {
        &self.treasury
    }

    /// The fee percentage currently in effect.
    pub fn fee_pct(&self) -> u8 {
        self.fee_pct
    }

    /// The grace window appended to job deadlines for the auto-release
    /// path.
    pub fn release_grace(&self) -> Duration {
        Duration::days(RELEASE_GRACE_DAYS)
    }

    /// Update the platform fee percentage. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Authorization`] for any caller other than
    /// the owner, and [`MarketError::Validation`] if `new_pct` exceeds
    /// [`MAX_FEE_PCT`].
    pub fn update_fee(&mut self, caller: &AccountId, new_pct: u8) -> Result<(), MarketError> {
        if caller != &self.owner {
            return Err(MarketError::Authorization {
                caller: caller.to_string(),
                reason: "only the platform owner may update the fee".to_string(),
            });
        }
        if new_pct > MAX_FEE_PCT {
            return Err(MarketError::Validation(format!(
                "fee percentage {new_pct} exceeds ceiling {MAX_FEE_PCT}"
            )));
        }
        self.fee_pct = new_pct;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PlatformConfig {
        PlatformConfig::new(
            AccountId::new("owner").unwrap(),
            AccountId::new("arbiter").unwrap(),
            AccountId::new("treasury").unwrap(),
        )
    }

    #[test]
    fn starts_with_default_fee() {
        assert_eq!(config().fee_pct(), DEFAULT_FEE_PCT);
    }

    #[test]
    fn owner_updates_fee_within_ceiling() {
        let mut cfg = config();
        let owner = AccountId::new("owner").unwrap();
        cfg.update_fee(&owner, 10).unwrap();
        assert_eq!(cfg.fee_pct(), 10);
        cfg.update_fee(&owner, 0).unwrap();
        assert_eq!(cfg.fee_pct(), 0);
    }

    #[test]
    fn non_owner_update_rejected() {
        let mut cfg = config();
        let outsider = AccountId::new("mallory").unwrap();
        let result = cfg.update_fee(&outsider, 3);
        assert!(matches!(result, Err(MarketError::Authorization { .. })));
        assert_eq!(cfg.fee_pct(), DEFAULT_FEE_PCT);
    }

    #[test]
    fn fee_over_ceiling_rejected() {
        let mut cfg = config();
        let owner = AccountId::new("owner").unwrap();
        let result = cfg.update_fee(&owner, MAX_FEE_PCT + 1);
        assert!(matches!(result, Err(MarketError::Validation(_))));
        assert_eq!(cfg.fee_pct(), DEFAULT_FEE_PCT);
    }

    #[test]
    fn grace_is_seven_days() {
        assert_eq!(config().release_grace(), Duration::days(7));
    }
}
