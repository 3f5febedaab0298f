//! In-memory fungible asset ledger.
//!
//! [`MemoryAsset`] implements [`AssetLedger`] with balances and allowances
//! held in `HashMap`s. It backs the test suites and embedders that do not
//! have a real token to plug in. A [`TransferHook`] can be installed to
//! observe every transfer before it settles: the hook may call back into the
//! vault (to exercise reentrancy) or veto the transfer by returning `false`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::AssetLedger;
use crate::types::{AccountId, AssetId};

/// Direction of a transfer seen by a [`TransferHook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferKind {
    Push,
    Pull,
}

/// A transfer about to settle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferCall {
    pub kind: TransferKind,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u128,
}

/// Callback invoked before a transfer settles. Returning `false` fails the transfer.
pub type TransferHook = Arc<dyn Fn(&TransferCall) -> bool + Send + Sync>;

#[derive(Default)]
struct Books {
    balances: HashMap<AccountId, u128>,
    /// `(owner, spender) -> remaining allowance`.
    allowances: HashMap<(AccountId, AccountId), u128>,
    supply: u128,
}

/// In-memory asset ledger.
pub struct MemoryAsset {
    id: AssetId,
    books: Mutex<Books>,
    hook: Mutex<Option<TransferHook>>,
}

impl MemoryAsset {
    pub fn new(id: impl Into<AssetId>) -> Self {
        Self {
            id: id.into(),
            books: Mutex::new(Books::default()),
            hook: Mutex::new(None),
        }
    }

    /// Credit `amount` to `account` out of thin air. Returns `false` on supply overflow.
    pub fn mint(&self, account: &AccountId, amount: u128) -> bool {
        let mut books = self.books.lock();
        let Some(supply) = books.supply.checked_add(amount) else {
            return false;
        };
        let balance = books.balances.entry(account.clone()).or_insert(0);
        // Every balance is bounded by supply, so this cannot overflow.
        *balance += amount;
        books.supply = supply;
        true
    }

    /// Allow `spender` to pull up to `amount` from `owner`. `u128::MAX` never decreases.
    pub fn approve(&self, owner: &AccountId, spender: &AccountId, amount: u128) {
        self.books
            .lock()
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.books
            .lock()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.books.lock().supply
    }

    pub fn set_hook(&self, hook: TransferHook) {
        *self.hook.lock() = Some(hook);
    }

    pub fn clear_hook(&self) {
        *self.hook.lock() = None;
    }

    /// Run the hook without holding any lock so it may re-enter this ledger.
    fn run_hook(&self, call: TransferCall) -> bool {
        let hook = self.hook.lock().clone();
        match hook {
            Some(hook) => hook(&call),
            None => true,
        }
    }

    fn move_balance(books: &mut Books, from: &AccountId, to: &AccountId, amount: u128) -> bool {
        let have = books.balances.get(from).copied().unwrap_or(0);
        if have < amount {
            return false;
        }
        if from == to {
            return true;
        }
        books.balances.insert(from.clone(), have - amount);
        *books.balances.entry(to.clone()).or_insert(0) += amount;
        true
    }
}

impl AssetLedger for MemoryAsset {
    fn asset_id(&self) -> AssetId {
        self.id.clone()
    }

    fn balance_of(&self, holder: &AccountId) -> u128 {
        self.books.lock().balances.get(holder).copied().unwrap_or(0)
    }

    fn transfer(&self, sender: &AccountId, to: &AccountId, amount: u128) -> bool {
        let call = TransferCall {
            kind: TransferKind::Push,
            from: sender.clone(),
            to: to.clone(),
            amount,
        };
        if !self.run_hook(call) {
            return false;
        }
        Self::move_balance(&mut self.books.lock(), sender, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> bool {
        let call = TransferCall {
            kind: TransferKind::Pull,
            from: from.clone(),
            to: to.clone(),
            amount,
        };
        if !self.run_hook(call) {
            return false;
        }

        let mut books = self.books.lock();
        let key = (from.clone(), spender.clone());
        let allowance = books.allowances.get(&key).copied().unwrap_or(0);
        if allowance < amount {
            return false;
        }
        if !Self::move_balance(&mut books, from, to, amount) {
            return false;
        }
        if allowance != u128::MAX {
            books.allowances.insert(key, allowance - amount);
        }
        true
    }
}
