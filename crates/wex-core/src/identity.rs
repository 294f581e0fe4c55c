//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the WEX Stack.
//! Each identifier is a distinct type — you cannot pass an [`AccountId`]
//! where a [`JobId`] is expected.
//!
//! ## Validation
//!
//! [`AccountId`] validates its contents at construction time. [`JobId`]
//! is an integer key allocated monotonically by the job ledger and is
//! always valid by construction.

use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Maximum accepted length for an account identifier.
pub const MAX_ACCOUNT_ID_LEN: usize = 128;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ── AccountId ──────────────────────────────────────────────────────────

/// The address of a party known to the platform: a client, a worker, the
/// platform owner, the arbiter, or the treasury.
///
/// The execution substrate authenticates callers; this type only carries
/// the authenticated identity. Accepted form: non-empty, at most
/// [`MAX_ACCOUNT_ID_LEN`] bytes, no whitespace or control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AccountId(String);

impl_validating_deserialize!(AccountId);

impl AccountId {
    /// Create an account identifier from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if the string is empty, too
    /// long, or contains whitespace or control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, MarketError> {
        let s = value.into();
        if s.is_empty() {
            return Err(MarketError::Validation(
                "account id must not be empty".to_string(),
            ));
        }
        if s.len() > MAX_ACCOUNT_ID_LEN {
            return Err(MarketError::Validation(format!(
                "account id exceeds {MAX_ACCOUNT_ID_LEN} bytes"
            )));
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(MarketError::Validation(format!(
                "account id contains whitespace or control characters: {s:?}"
            )));
        }
        Ok(Self(s))
    }

    /// Access the underlying identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ── JobId ──────────────────────────────────────────────────────────────

/// A unique identifier for a job engagement.
///
/// Allocated by the job ledger as a monotonically increasing integer.
/// Identifiers are never reused, and a failed creation never consumes
/// one. Disputes share the identifier of the job they concern, so the
/// job and dispute stores are addressed from a single index space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    /// Wrap a raw index. Only the ledger's allocator should mint new
    /// values; this exists for lookups and deserialization.
    pub fn from_index(index: u64) -> Self {
        Self(index)
    }

    /// The raw integer index.
    pub fn index(&self) -> u64 {
        self.0
    }

    /// The identifier following this one in allocation order.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job:{}", self.0)
    }
}
