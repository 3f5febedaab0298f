//! Share ledger: per-holder share balances and total-share accounting.
//!
//! Conversions between assets and shares go through the fixed-point helpers
//! and always floor, so neither direction rounds in the holder's favour.
//! [`ShareLedger::mint`] and [`ShareLedger::burn`] validate before touching
//! any balance; a failed call leaves the ledger unchanged.

use std::collections::HashMap;

use brook_core::error::VaultError;
use brook_core::fixed::{div_scale_floor, mul_scale_floor};
use brook_core::types::AccountId;
use serde::{Deserialize, Serialize};

/// Shares minted for `amount` of asset at `exchange_rate`: `floor(amount * SCALE / rate)`.
pub fn shares_for_assets(amount: u128, exchange_rate: u128) -> Result<u128, VaultError> {
    div_scale_floor(amount, exchange_rate)
}

/// Assets returned for `shares` at `exchange_rate`: `floor(shares * rate / SCALE)`.
pub fn assets_for_shares(shares: u128, exchange_rate: u128) -> Result<u128, VaultError> {
    mul_scale_floor(shares, exchange_rate)
}

/// Holder balances. Zero balances are not stored.
#[derive(
    Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct ShareLedger {
    total_shares: u128,
    balances: HashMap<AccountId, u128>,
}

impl ShareLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    pub fn shares_of(&self, holder: &AccountId) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Number of holders with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, u128)> {
        self.balances.iter().map(|(k, v)| (k, *v))
    }

    /// Credit `shares` to `holder`.
    ///
    /// # Errors
    ///
    /// [`VaultError::Overflow`] if the total would exceed `u128`.
    pub fn mint(&mut self, holder: &AccountId, shares: u128) -> Result<(), VaultError> {
        let total = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::Overflow)?;
        if shares == 0 {
            return Ok(());
        }
        // Bounded by the total, which was just checked.
        *self.balances.entry(holder.clone()).or_insert(0) += shares;
        self.total_shares = total;
        Ok(())
    }

    /// Debit `shares` from `holder`.
    ///
    /// # Errors
    ///
    /// [`VaultError::InsufficientShares`] if the holder owns fewer than `shares`.
    pub fn burn(&mut self, holder: &AccountId, shares: u128) -> Result<(), VaultError> {
        let have = self.shares_of(holder);
        if have < shares {
            return Err(VaultError::InsufficientShares { have, need: shares });
        }
        self.set_balance(holder, have - shares);
        self.total_shares -= shares;
        Ok(())
    }

    /// Put `holder` back to a previously observed balance, adjusting the total.
    pub(crate) fn restore_balance(&mut self, holder: &AccountId, balance: u128, total: u128) {
        self.set_balance(holder, balance);
        self.total_shares = total;
    }

    fn set_balance(&mut self, holder: &AccountId, balance: u128) {
        if balance == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(holder.clone(), balance);
        }
    }

    /// Whether `total_shares` equals the sum of all balances.
    pub fn is_conserved(&self) -> bool {
        let mut sum: u128 = 0;
        for balance in self.balances.values() {
            match sum.checked_add(*balance) {
                Some(s) => sum = s,
                None => return false,
            }
        }
        sum == self.total_shares
    }
}
