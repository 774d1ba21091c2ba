//! Ledger Store
//!
//! Balances and total supply. Every mutating primitive computes all of its
//! new values before writing any of them, so a failed call leaves the store
//! untouched.

use std::collections::HashMap;

use lib_types::{Address, Amount};

use crate::errors::{LedgerError, LedgerResult};

/// Domain separation prefix for the balance state root
const STATE_ROOT_DOMAIN: &[u8] = b"CREDIT_LEDGER_STATE_ROOT_V1";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerStore {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from stored balances. Fails unless the balances sum
    /// to `total_supply`.
    pub fn from_parts(
        balances: impl IntoIterator<Item = (Address, Amount)>,
        total_supply: Amount,
    ) -> LedgerResult<Self> {
        let store = Self {
            balances: balances
                .into_iter()
                .filter(|(_, amount)| *amount > 0)
                .collect(),
            total_supply,
        };
        let sum = store.sum_of_balances()?;
        if sum != total_supply {
            return Err(LedgerError::Snapshot(format!(
                "balances sum to {} but total supply is {}",
                sum, total_supply
            )));
        }
        Ok(store)
    }

    /// Balance of an account; 0 for unknown accounts
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Number of accounts with a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Funded accounts, sorted by address
    pub fn accounts(&self) -> Vec<(Address, Amount)> {
        let mut accounts: Vec<(Address, Amount)> =
            self.balances.iter().map(|(a, b)| (*a, *b)).collect();
        accounts.sort();
        accounts
    }

    /// Sum of every balance. Equal to `total_supply` whenever the store is
    /// consistent.
    pub fn sum_of_balances(&self) -> LedgerResult<Amount> {
        self.balances
            .values()
            .try_fold(0 as Amount, |acc, b| acc.checked_add(*b))
            .ok_or(LedgerError::Overflow)
    }

    /// Increase `account` and the total supply by `amount` (mint path).
    pub fn credit(&mut self, account: &Address, amount: Amount) -> LedgerResult<()> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let new_balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.total_supply = new_supply;
        self.set_balance(account, new_balance);
        Ok(())
    }

    /// Decrease `account` by `amount`. Total supply is unchanged.
    pub fn debit(&mut self, account: &Address, amount: Amount) -> LedgerResult<()> {
        let available = self.balance_of(account);
        let new_balance = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                available,
                required: amount,
            })?;
        self.set_balance(account, new_balance);
        Ok(())
    }

    /// Reduce total supply after a debit of destroyed tokens.
    pub fn burn_supply(&mut self, amount: Amount) -> LedgerResult<()> {
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Underflow)?;
        Ok(())
    }

    /// Debit `holder` and reduce supply as one step.
    pub fn burn(&mut self, holder: &Address, amount: Amount) -> LedgerResult<()> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        // balance <= supply, so neither step can fail past this point
        self.burn_supply(amount)?;
        self.debit(holder, amount)
    }

    /// Move `amount` from `from` to `to`. Supply is unchanged.
    ///
    /// Both sides are checked before either is written; if the debit would
    /// fail the recipient is never credited.
    pub fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<()> {
        let available = self.balance_of(from);
        let new_from = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                available,
                required: amount,
            })?;

        if from == to {
            return Ok(());
        }

        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(from, new_from);
        self.set_balance(to, new_to);
        Ok(())
    }

    /// Deterministic digest of every balance and the total supply.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(STATE_ROOT_DOMAIN);
        hasher.update(&self.total_supply.to_le_bytes());
        for (address, balance) in self.accounts() {
            hasher.update(address.as_bytes());
            hasher.update(&balance.to_le_bytes());
        }
        *hasher.finalize().as_bytes()
    }

    fn set_balance(&mut self, account: &Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, amount);
        }
    }
}
