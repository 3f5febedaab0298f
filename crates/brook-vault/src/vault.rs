//! The vault: share ledger, accrual engine and guard composed behind one
//! owned aggregate.
//!
//! Every state-mutating entry point follows the same order:
//!
//! 1. guard checks (reentrancy lock, owner, pause gate, argument checks);
//! 2. accrue the exchange rate up to `now`;
//! 3. convert and mutate the ledger, append audit records (effects committed);
//! 4. call the asset ledger (interaction) with no internal lock held.
//!
//! If step 4 reports failure, the call takes back what it committed in
//! step 3 and fails with [`VaultError::TransferFailed`]. The admin mutators
//! take the same reentrancy lock, so nothing but accrual can run in between.
//! An accrual that moved the rate meanwhile compounded on this call's rate,
//! and that time-derived growth is kept.

use std::sync::Arc;

use brook_accrual::AccrualEngine;
use brook_core::error::VaultError;
use brook_core::traits::{AssetLedger, Clock, RateAccrual};
use brook_core::types::{AccountId, Accrual, AssetId, RateState, VaultEvent};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::audit::{AuditLog, AuditRecord};
use crate::config::{ConfigError, VaultConfig};
use crate::guard::ReentrancyLock;
use crate::ledger::{assets_for_shares, shares_for_assets};
use crate::state::VaultState;

/// What a guarded call committed before its asset transfer.
struct Undo {
    holder: AccountId,
    holder_shares: u128,
    total_shares: u128,
    prior_rate: RateState,
    committed_rate: RateState,
    accrued: Option<u64>,
    recorded: u64,
}

impl Undo {
    fn capture(state: &VaultState, holder: &AccountId) -> Self {
        Self {
            holder: holder.clone(),
            holder_shares: state.ledger.shares_of(holder),
            total_shares: state.ledger.total_shares(),
            prior_rate: state.rate,
            committed_rate: state.rate,
            accrued: None,
            recorded: 0,
        }
    }

    fn committed(self, state: &VaultState, accrued: Option<u64>, recorded: u64) -> Self {
        Self {
            committed_rate: state.rate,
            accrued,
            recorded,
            ..self
        }
    }
}

/// A single-asset vault with a time-accruing exchange rate.
///
/// All methods take `&self`; state lives behind a mutex that is never held
/// across a call into the asset ledger, so a transfer callback may call back
/// into the vault and observe fully committed state.
pub struct Vault {
    asset: Arc<dyn AssetLedger>,
    clock: Arc<dyn Clock>,
    accrual: Box<dyn RateAccrual>,
    state: Mutex<VaultState>,
    audit: Mutex<AuditLog>,
    lock: ReentrancyLock,
}

impl Vault {
    /// Deploy a vault over `asset` with a 1:1 exchange rate starting now.
    pub fn new(
        asset: Arc<dyn AssetLedger>,
        clock: Arc<dyn Clock>,
        owner: AccountId,
        vault_account: AccountId,
        rate_per_second: u128,
    ) -> Self {
        let state = VaultState::new(
            asset.asset_id(),
            vault_account,
            owner,
            rate_per_second,
            clock.now(),
        );
        info!(
            asset = %state.asset,
            owner = %state.access.owner(),
            rate_per_second,
            "vault created"
        );
        Self::assemble(asset, clock, state)
    }

    /// Deploy a vault from a loaded [`VaultConfig`], installing its logging
    /// settings unless a subscriber is already in place.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::AssetMismatch`] if `asset` is not the configured asset
    /// - any validation error from [`VaultConfig::validate`]
    pub fn from_config(
        config: &VaultConfig,
        asset: Arc<dyn AssetLedger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        config.init_logging();
        let actual = asset.asset_id();
        if actual.0 != config.asset_id {
            return Err(ConfigError::AssetMismatch {
                configured: config.asset_id.clone(),
                actual: actual.0,
            });
        }
        let rate_per_second = config.resolved_rate_per_second()?;
        let vault = Self::new(
            asset,
            clock,
            AccountId::new(config.owner.clone()),
            AccountId::new(config.vault_account.clone()),
            rate_per_second,
        );
        if config.start_paused {
            vault.state.lock().access.set_paused(true);
        }
        Ok(vault)
    }

    /// Resume a vault from a previously exported [`VaultState`].
    ///
    /// # Errors
    ///
    /// [`VaultError::Codec`] if the state is invalid or belongs to another asset.
    pub fn from_state(
        state: VaultState,
        asset: Arc<dyn AssetLedger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, VaultError> {
        state.validate()?;
        let actual = asset.asset_id();
        if actual != state.asset {
            return Err(VaultError::Codec(format!(
                "state is for asset {}, ledger is {actual}",
                state.asset
            )));
        }
        Ok(Self::assemble(asset, clock, state))
    }

    /// Replace the accrual rule.
    pub fn with_accrual(mut self, accrual: Box<dyn RateAccrual>) -> Self {
        self.accrual = accrual;
        self
    }

    fn assemble(asset: Arc<dyn AssetLedger>, clock: Arc<dyn Clock>, state: VaultState) -> Self {
        Self {
            asset,
            clock,
            accrual: Box::new(AccrualEngine::new()),
            state: Mutex::new(state),
            audit: Mutex::new(AuditLog::new()),
            lock: ReentrancyLock::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accrual
    // ------------------------------------------------------------------

    /// Bring the exchange rate up to date and return it.
    ///
    /// Callable by anyone, including while paused or from inside a transfer
    /// callback.
    pub fn accrue(&self) -> Result<u128, VaultError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let accrual = self.accrual.accrue(&state.rate, now)?;
        self.apply_accrual(&mut state, &accrual, now);
        Ok(state.rate.exchange_rate)
    }

    /// Commit an accrual computed against the current state. Returns the
    /// sequence number of the `Accrued` record, if the rate moved.
    fn apply_accrual(&self, state: &mut VaultState, accrual: &Accrual, now: u64) -> Option<u64> {
        let previous_rate = state.rate.exchange_rate;
        state.rate = accrual.state;
        if accrual.delta == 0 {
            return None;
        }
        Some(self.audit.lock().push(
            now,
            VaultEvent::Accrued {
                previous_rate,
                exchange_rate: accrual.state.exchange_rate,
                elapsed: accrual.elapsed,
            },
        ))
    }

    // ------------------------------------------------------------------
    // Guarded entry points
    // ------------------------------------------------------------------

    /// Deposit `amount` of the asset from `holder` and mint shares to them.
    ///
    /// The vault pulls the asset with `transfer_from`, so `holder` must have
    /// approved the vault account beforehand. Returns the shares minted.
    ///
    /// # Errors
    ///
    /// `ReentrantCall`, `InvalidAmount`, `Paused`, `DustAmount`, `Overflow`,
    /// `TransferFailed`.
    pub fn deposit(&self, holder: &AccountId, amount: u128) -> Result<u128, VaultError> {
        let _entered = self.lock.enter()?;
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        let now = self.clock.now();

        let (undo, vault_account, shares) = {
            let mut state = self.state.lock();
            state.access.ensure_live()?;

            let accrual = self.accrual.accrue(&state.rate, now)?;
            let shares = shares_for_assets(amount, accrual.state.exchange_rate)?;
            if shares == 0 {
                debug!(%holder, amount, "rejected dust deposit");
                return Err(VaultError::DustAmount { amount });
            }

            let undo = Undo::capture(&state, holder);
            state.ledger.mint(holder, shares)?;
            let accrued = self.apply_accrual(&mut state, &accrual, now);
            let recorded = self.audit.lock().push(
                now,
                VaultEvent::Deposited {
                    holder: holder.clone(),
                    assets: amount,
                    shares,
                },
            );
            (
                undo.committed(&state, accrued, recorded),
                state.vault_account.clone(),
                shares,
            )
        };

        if !self
            .asset
            .transfer_from(&vault_account, holder, &vault_account, amount)
        {
            self.rollback(undo);
            warn!(%holder, amount, "deposit transfer failed; rolled back");
            return Err(VaultError::TransferFailed);
        }

        info!(%holder, assets = amount, shares, "deposit");
        Ok(shares)
    }

    /// Burn `shares` from `holder` and pay out the asset at the current rate.
    ///
    /// Returns the asset amount sent.
    ///
    /// # Errors
    ///
    /// `ReentrantCall`, `InvalidAmount`, `Paused`, `InsufficientShares`,
    /// `Overflow`, `TransferFailed`.
    pub fn withdraw(&self, holder: &AccountId, shares: u128) -> Result<u128, VaultError> {
        let _entered = self.lock.enter()?;
        if shares == 0 {
            return Err(VaultError::InvalidAmount);
        }
        self.withdraw_entered(holder, shares)
    }

    /// Withdraw the holder's entire share balance.
    ///
    /// # Errors
    ///
    /// `ReentrantCall`, `Paused`, `NoShares`, `Overflow`, `TransferFailed`.
    pub fn withdraw_all(&self, holder: &AccountId) -> Result<u128, VaultError> {
        let _entered = self.lock.enter()?;
        let shares = {
            let state = self.state.lock();
            state.access.ensure_live()?;
            state.ledger.shares_of(holder)
        };
        if shares == 0 {
            return Err(VaultError::NoShares);
        }
        self.withdraw_entered(holder, shares)
    }

    /// Withdraw body; the caller holds the reentrancy lock.
    fn withdraw_entered(&self, holder: &AccountId, shares: u128) -> Result<u128, VaultError> {
        let now = self.clock.now();

        let (undo, vault_account, assets) = {
            let mut state = self.state.lock();
            state.access.ensure_live()?;

            let have = state.ledger.shares_of(holder);
            if have < shares {
                return Err(VaultError::InsufficientShares { have, need: shares });
            }

            let accrual = self.accrual.accrue(&state.rate, now)?;
            let assets = assets_for_shares(shares, accrual.state.exchange_rate)?;

            let undo = Undo::capture(&state, holder);
            state.ledger.burn(holder, shares)?;
            let accrued = self.apply_accrual(&mut state, &accrual, now);
            let recorded = self.audit.lock().push(
                now,
                VaultEvent::Withdrawn {
                    holder: holder.clone(),
                    assets,
                    shares,
                },
            );
            (
                undo.committed(&state, accrued, recorded),
                state.vault_account.clone(),
                assets,
            )
        };

        if !self.asset.transfer(&vault_account, holder, assets) {
            self.rollback(undo);
            warn!(%holder, shares, assets, "withdraw transfer failed; rolled back");
            return Err(VaultError::TransferFailed);
        }

        info!(%holder, assets, shares, "withdraw");
        Ok(assets)
    }

    /// Take back what the failed call committed.
    ///
    /// The holder balance and total are only written under the reentrancy
    /// lock, so they still hold this call's values. The rate is restored only
    /// if no accrual moved it since.
    fn rollback(&self, undo: Undo) {
        let mut state = self.state.lock();
        state
            .ledger
            .restore_balance(&undo.holder, undo.holder_shares, undo.total_shares);
        let mut audit = self.audit.lock();
        audit.retract(undo.recorded);
        if state.rate == undo.committed_rate {
            state.rate = undo.prior_rate;
            if let Some(seq) = undo.accrued {
                audit.retract(seq);
            }
        }
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    /// Change the growth coefficient. The old rate is accrued up to now first.
    pub fn set_rate_per_second(
        &self,
        caller: &AccountId,
        rate_per_second: u128,
    ) -> Result<(), VaultError> {
        let _entered = self.lock.enter()?;
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.access.authorize(caller)?;

        let accrual = self.accrual.accrue(&state.rate, now)?;
        self.apply_accrual(&mut state, &accrual, now);

        let previous = state.rate.rate_per_second;
        state.rate.rate_per_second = rate_per_second;
        self.audit.lock().push(
            now,
            VaultEvent::RatePerSecondUpdated {
                previous,
                current: rate_per_second,
            },
        );
        info!(previous, current = rate_per_second, "rate per second updated");
        Ok(())
    }

    /// Set or clear the pause gate on deposit and withdraw. Does not accrue.
    pub fn set_paused(&self, caller: &AccountId, paused: bool) -> Result<(), VaultError> {
        let _entered = self.lock.enter()?;
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.access.authorize(caller)?;
        state.access.set_paused(paused);
        self.audit.lock().push(now, VaultEvent::PausedSet { paused });
        info!(paused, "pause gate set");
        Ok(())
    }

    /// Hand admin rights to `new_owner`.
    pub fn transfer_ownership(
        &self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), VaultError> {
        let _entered = self.lock.enter()?;
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.access.authorize(caller)?;
        let previous = state.access.set_owner(new_owner.clone());
        self.audit.lock().push(
            now,
            VaultEvent::OwnershipTransferred {
                previous: previous.clone(),
                current: new_owner.clone(),
            },
        );
        info!(%previous, current = %new_owner, "ownership transferred");
        Ok(())
    }

    /// Sweep `amount` of a foreign asset held by the vault to `to`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ReentrantCall`] while another guarded call is running
    /// - [`VaultError::Unauthorized`] unless called by the owner
    /// - [`VaultError::ReservedAsset`] if `token` is the managed asset
    /// - [`VaultError::TransferFailed`] if the token rejects the push
    pub fn rescue_asset(
        &self,
        caller: &AccountId,
        token: &dyn AssetLedger,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), VaultError> {
        let _entered = self.lock.enter()?;
        let token_id = token.asset_id();
        let vault_account = {
            let state = self.state.lock();
            state.access.authorize(caller)?;
            if token_id == state.asset {
                return Err(VaultError::ReservedAsset);
            }
            state.vault_account.clone()
        };

        if !token.transfer(&vault_account, to, amount) {
            return Err(VaultError::TransferFailed);
        }

        self.audit.lock().push(
            self.clock.now(),
            VaultEvent::AssetRescued {
                asset: token_id.clone(),
                to: to.clone(),
                amount,
            },
        );
        info!(asset = %token_id, %to, amount, "foreign asset rescued");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    /// Shares `amount` would mint at the stored exchange rate.
    ///
    /// Does not accrue first, so it under-reports the rate (and over-reports
    /// shares) if time has passed since the last accrual. Call
    /// [`accrue`](Self::accrue) first for an up-to-date figure.
    pub fn preview_deposit(&self, amount: u128) -> Result<u128, VaultError> {
        shares_for_assets(amount, self.exchange_rate())
    }

    /// Assets `shares` would return at the stored exchange rate. Does not accrue.
    pub fn preview_withdraw(&self, shares: u128) -> Result<u128, VaultError> {
        assets_for_shares(shares, self.exchange_rate())
    }

    /// Asset balance actually held by the vault account.
    ///
    /// Not derived from `total_shares * exchange_rate`; the two diverge when
    /// accrued yield is not backed by incoming funds.
    pub fn total_assets(&self) -> u128 {
        let vault_account = self.state.lock().vault_account.clone();
        self.asset.balance_of(&vault_account)
    }

    /// Stored exchange rate (as of the last accrual).
    pub fn exchange_rate(&self) -> u128 {
        self.state.lock().rate.exchange_rate
    }

    /// Exchange rate an accrual at the current time would produce.
    pub fn projected_exchange_rate(&self) -> Result<u128, VaultError> {
        let rate = self.state.lock().rate;
        self.accrual.projected_rate(&rate, self.clock.now())
    }

    pub fn rate_per_second(&self) -> u128 {
        self.state.lock().rate.rate_per_second
    }

    pub fn last_accrual_timestamp(&self) -> u64 {
        self.state.lock().rate.last_accrual
    }

    pub fn total_shares(&self) -> u128 {
        self.state.lock().ledger.total_shares()
    }

    pub fn shares_of(&self, holder: &AccountId) -> u128 {
        self.state.lock().ledger.shares_of(holder)
    }

    /// Holder's shares valued at the stored exchange rate.
    pub fn assets_of(&self, holder: &AccountId) -> Result<u128, VaultError> {
        let (shares, rate) = {
            let state = self.state.lock();
            (state.ledger.shares_of(holder), state.rate.exchange_rate)
        };
        assets_for_shares(shares, rate)
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().access.is_paused()
    }

    pub fn owner(&self) -> AccountId {
        self.state.lock().access.owner().clone()
    }

    pub fn asset_id(&self) -> AssetId {
        self.state.lock().asset.clone()
    }

    pub fn vault_account(&self) -> AccountId {
        self.state.lock().vault_account.clone()
    }

    /// Snapshot of the persisted state record.
    pub fn state(&self) -> VaultState {
        self.state.lock().clone()
    }

    pub fn audit_log(&self) -> Vec<AuditRecord> {
        self.audit.lock().records().to_vec()
    }

    /// Audit records with sequence number `>= from`.
    pub fn audit_since(&self, from: u64) -> Vec<AuditRecord> {
        self.audit.lock().since(from).to_vec()
    }
}
