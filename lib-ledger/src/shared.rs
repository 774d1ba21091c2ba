//! Thread-safe handle to a [`TokenEngine`].
//!
//! Every mutating call holds the write lock for the whole operation, so a
//! reader on another thread sees either none or all of its effects.

use parking_lot::RwLock;
use std::sync::Arc;

use lib_types::{Address, Amount, TokenId};

use crate::engine::{TokenEngine, TransferReceipt};
use crate::errors::LedgerResult;
use crate::events::EventRecord;
use crate::roles::Role;

#[derive(Debug, Clone)]
pub struct SharedTokenEngine {
    inner: Arc<RwLock<TokenEngine>>,
}

impl SharedTokenEngine {
    pub fn new(engine: TokenEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// Run a read-only closure against a consistent view of the engine
    pub fn read<R>(&self, f: impl FnOnce(&TokenEngine) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run several operations as one indivisible unit
    pub fn write<R>(&self, f: impl FnOnce(&mut TokenEngine) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn mint(&self, caller: &Address, to: &Address, amount: Amount, verification_id: &str) -> LedgerResult<()> {
        self.inner.write().mint(caller, to, amount, verification_id)
    }

    pub fn transfer(&self, caller: &Address, to: &Address, amount: Amount) -> LedgerResult<TransferReceipt> {
        self.inner.write().transfer(caller, to, amount)
    }

    pub fn burn(&self, caller: &Address, amount: Amount) -> LedgerResult<()> {
        self.inner.write().burn(caller, amount)
    }

    pub fn rescue(&self, caller: &Address, token: &TokenId, to: &Address, amount: Amount) -> LedgerResult<()> {
        self.inner.write().rescue(caller, token, to, amount)
    }

    pub fn pause(&self, caller: &Address) -> LedgerResult<()> {
        self.inner.write().pause(caller)
    }

    pub fn unpause(&self, caller: &Address) -> LedgerResult<()> {
        self.inner.write().unpause(caller)
    }

    pub fn set_treasury(&self, caller: &Address, new_treasury: &Address) -> LedgerResult<()> {
        self.inner.write().set_treasury(caller, new_treasury)
    }

    pub fn grant_role(&self, caller: &Address, role: Role, account: &Address) -> LedgerResult<()> {
        self.inner.write().grant_role(caller, role, account)
    }

    pub fn revoke_role(&self, caller: &Address, role: Role, account: &Address) -> LedgerResult<()> {
        self.inner.write().revoke_role(caller, role, account)
    }

    pub fn renounce_role(&self, caller: &Address, role: Role) -> LedgerResult<()> {
        self.inner.write().renounce_role(caller, role)
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.inner.read().balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.inner.read().total_supply()
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.inner.read().has_role(role, account)
    }

    pub fn is_paused(&self) -> bool {
        self.inner.read().is_paused()
    }

    /// Copy of the event records with `sequence >= from`
    pub fn events_since(&self, from: u64) -> Vec<EventRecord> {
        self.inner.read().events().since(from).to_vec()
    }
}
