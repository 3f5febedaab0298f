//! Shared test helpers for integration and property tests.

use std::sync::Arc;

use brook_core::asset::MemoryAsset;
use brook_core::clock::ManualClock;
use brook_core::types::AccountId;
use brook_vault::{Vault, VaultState, init_logging};

/// Start time for every test vault.
pub const START: u64 = 1_700_000_000;

/// Name of the managed asset.
pub const ASSET: &str = "USDX";

pub fn acct(name: &str) -> AccountId {
    AccountId::from(name)
}

pub fn owner() -> AccountId {
    acct("owner")
}

pub fn vault_account() -> AccountId {
    acct("vault")
}

/// A vault wired to an in-memory asset and a manual clock.
pub struct Harness {
    pub vault: Arc<Vault>,
    pub asset: Arc<MemoryAsset>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(rate_per_second: u128) -> Self {
        init_logging("warn", "text");
        let asset = Arc::new(MemoryAsset::new(ASSET));
        let clock = Arc::new(ManualClock::new(START));
        let vault = Arc::new(Vault::new(
            asset.clone(),
            clock.clone(),
            owner(),
            vault_account(),
            rate_per_second,
        ));
        Self {
            vault,
            asset,
            clock,
        }
    }

    /// Give `holder` `amount` of the asset and approve the vault to pull it.
    pub fn fund(&self, holder: &AccountId, amount: u128) {
        assert!(self.asset.mint(holder, amount), "mint overflow");
        self.asset.approve(holder, &vault_account(), u128::MAX);
    }

    /// Mint asset straight into the vault, standing in for real yield.
    pub fn back_yield(&self, amount: u128) {
        assert!(self.asset.mint(&vault_account(), amount), "mint overflow");
    }

    pub fn advance(&self, secs: u64) -> u64 {
        self.clock.advance(secs)
    }

    /// Panic if any committed-state invariant is broken.
    pub fn assert_invariants(&self) {
        let state: VaultState = self.vault.state();
        state.validate().expect("state invariants");
        let sum: u128 = state.ledger.holders().map(|(_, s)| s).sum();
        assert_eq!(sum, state.ledger.total_shares());
    }
}
