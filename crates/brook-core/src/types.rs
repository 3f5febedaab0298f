//! Core vault types: identities, the rate state record, and audit events.
//!
//! Amounts, shares and fixed-point rates are `u128`; timestamps are `u64`
//! Unix seconds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::INITIAL_EXCHANGE_RATE;

/// Identity of a holder, the owner, or the vault's own account on the asset ledger.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a fungible asset ledger.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The time-indexed exchange rate and the coefficient that grows it.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct RateState {
    /// Asset units per share unit, scaled by `SCALE`. Never below `SCALE`.
    pub exchange_rate: u128,
    /// Fixed-point growth per second, scaled by `SCALE`.
    pub rate_per_second: u128,
    /// Timestamp of the last accrual that observed elapsed time.
    pub last_accrual: u64,
}

impl RateState {
    /// A fresh 1:1 rate starting at `now`.
    pub fn new(rate_per_second: u128, now: u64) -> Self {
        Self {
            exchange_rate: INITIAL_EXCHANGE_RATE,
            rate_per_second,
            last_accrual: now,
        }
    }
}

/// Result of bringing a [`RateState`] up to date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accrual {
    /// The updated rate state (identical to the input when nothing elapsed).
    pub state: RateState,
    /// Amount added to the exchange rate.
    pub delta: u128,
    /// Seconds covered by this accrual.
    pub elapsed: u64,
}

impl Accrual {
    /// An accrual that changed nothing.
    pub fn unchanged(state: RateState) -> Self {
        Self {
            state,
            delta: 0,
            elapsed: 0,
        }
    }
}

/// Audit events, appended only when the emitting operation succeeds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VaultEvent {
    Accrued {
        previous_rate: u128,
        exchange_rate: u128,
        elapsed: u64,
    },
    Deposited {
        holder: AccountId,
        assets: u128,
        shares: u128,
    },
    Withdrawn {
        holder: AccountId,
        assets: u128,
        shares: u128,
    },
    RatePerSecondUpdated {
        previous: u128,
        current: u128,
    },
    PausedSet {
        paused: bool,
    },
    AssetRescued {
        asset: AssetId,
        to: AccountId,
        amount: u128,
    },
    OwnershipTransferred {
        previous: AccountId,
        current: AccountId,
    },
}
