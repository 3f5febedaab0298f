//! The persisted vault state record and its binary codec.

use brook_core::constants::SCALE;
use brook_core::error::VaultError;
use brook_core::types::{AccountId, AssetId, RateState};
use serde::{Deserialize, Serialize};

use crate::guard::AccessControl;
use crate::ledger::ShareLedger;

/// Everything a vault needs to resume: the managed asset, the rate state,
/// the share ledger and the access-control record.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct VaultState {
    /// The managed asset. Fixed at construction.
    pub asset: AssetId,
    /// The vault's own account on the asset ledger.
    pub vault_account: AccountId,
    pub rate: RateState,
    pub ledger: ShareLedger,
    pub access: AccessControl,
}

impl VaultState {
    pub fn new(
        asset: AssetId,
        vault_account: AccountId,
        owner: AccountId,
        rate_per_second: u128,
        now: u64,
    ) -> Self {
        Self {
            asset,
            vault_account,
            rate: RateState::new(rate_per_second, now),
            ledger: ShareLedger::new(),
            access: AccessControl::new(owner, false),
        }
    }

    /// Check the invariants every committed state satisfies.
    ///
    /// # Errors
    ///
    /// [`VaultError::Codec`] naming the first violated invariant.
    pub fn validate(&self) -> Result<(), VaultError> {
        if !self.ledger.is_conserved() {
            return Err(VaultError::Codec(
                "total shares do not equal the sum of balances".into(),
            ));
        }
        if self.rate.exchange_rate < SCALE {
            return Err(VaultError::Codec(format!(
                "exchange rate {} below scale",
                self.rate.exchange_rate
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, VaultError> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| VaultError::Codec(e.to_string()))
    }

    /// Decode and validate a state produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VaultError> {
        let (state, read): (Self, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| VaultError::Codec(e.to_string()))?;
        if read != bytes.len() {
            return Err(VaultError::Codec(format!(
                "trailing bytes: read {read} of {}",
                bytes.len()
            )));
        }
        state.validate()?;
        Ok(state)
    }
}
