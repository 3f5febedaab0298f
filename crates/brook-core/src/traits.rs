//! Trait interfaces between Brook crates and the outside world.
//!
//! - [`AssetLedger`] — the underlying fungible asset (external collaborator)
//! - [`Clock`] — source of the current time
//! - [`RateAccrual`] — exchange-rate growth rule (brook-accrual implements)

use crate::error::VaultError;
use crate::types::{AccountId, Accrual, AssetId, RateState};

/// A fungible asset ledger.
///
/// Contract platforms identify the caller implicitly; here the acting account
/// is passed explicitly as `sender` / `spender`. Transfers report success as a
/// boolean and must leave balances untouched when they return `false`.
pub trait AssetLedger: Send + Sync {
    /// Identifier of this asset.
    fn asset_id(&self) -> AssetId;

    /// Current balance of `holder`.
    fn balance_of(&self, holder: &AccountId) -> u128;

    /// Push `amount` from `sender` to `to`.
    fn transfer(&self, sender: &AccountId, to: &AccountId, amount: u128) -> bool;

    /// Pull `amount` from `from` to `to` on behalf of `spender`, consuming an
    /// allowance previously granted by `from`.
    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> bool;
}

/// Source of wall-clock time in Unix seconds.
///
/// Expected to be non-decreasing; consecutive calls may return the same value.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Pure computation of exchange-rate growth.
pub trait RateAccrual: Send + Sync {
    /// Bring `state` up to `now`.
    ///
    /// Returns the input unchanged when no time has elapsed. Never mutates
    /// anything; the caller decides whether to commit the result.
    fn accrue(&self, state: &RateState, now: u64) -> Result<Accrual, VaultError>;

    /// Exchange rate `state` would have at `now`.
    ///
    /// Default implementation delegates to [`accrue`](Self::accrue).
    fn projected_rate(&self, state: &RateState, now: u64) -> Result<u128, VaultError> {
        Ok(self.accrue(state, now)?.state.exchange_rate)
    }
}
