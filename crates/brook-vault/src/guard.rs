//! Access & safety guard.
//!
//! [`AccessControl`] holds the owner identity and the pause gate and is part
//! of the persisted vault state. [`ReentrancyLock`] is a runtime-only flag held
//! for the duration of every state-mutating call except accrual; any nested
//! attempt to enter fails with [`VaultError::ReentrantCall`].

use std::sync::atomic::{AtomicBool, Ordering};

use brook_core::error::VaultError;
use brook_core::types::AccountId;
use serde::{Deserialize, Serialize};

/// Owner identity and the pause gate.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct AccessControl {
    owner: AccountId,
    paused: bool,
}

impl AccessControl {
    pub fn new(owner: AccountId, paused: bool) -> Self {
        Self { owner, paused }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// # Errors
    ///
    /// [`VaultError::Unauthorized`] unless `caller` is the owner.
    pub fn authorize(&self, caller: &AccountId) -> Result<(), VaultError> {
        if caller != &self.owner {
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`VaultError::Paused`] while the gate is set.
    pub fn ensure_live(&self) -> Result<(), VaultError> {
        if self.paused {
            return Err(VaultError::Paused);
        }
        Ok(())
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Replace the owner, returning the previous one.
    pub(crate) fn set_owner(&mut self, owner: AccountId) -> AccountId {
        std::mem::replace(&mut self.owner, owner)
    }
}

/// Exclusive execution flag for deposit, withdraw and the admin mutators.
///
/// Calls from another thread while a guarded call is running are rejected
/// the same way as nested calls; callers are expected to be sequenced.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    entered: AtomicBool,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock; it is released when the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// [`VaultError::ReentrantCall`] if the lock is already held.
    pub fn enter(&self) -> Result<EnteredGuard<'_>, VaultError> {
        self.entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| VaultError::ReentrantCall)?;
        Ok(EnteredGuard { lock: self })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// Releases the [`ReentrancyLock`] on drop.
#[derive(Debug)]
pub struct EnteredGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for EnteredGuard<'_> {
    fn drop(&mut self) {
        self.lock.entered.store(false, Ordering::Release);
    }
}
