//! External asset custody
//!
//! Assets other than the ledger's own token that end up held by the
//! contract account. The engine only ever moves them out, through
//! [`safe_transfer`], during a rescue.

use std::collections::HashMap;
use std::fmt;

use lib_types::{Address, Amount, TokenId};

use crate::errors::{LedgerError, LedgerResult};

/// Storage interface for externally issued assets
///
/// `transfer` follows the convention of token interfaces that report failure
/// by returning `false` instead of erroring. Callers must go through
/// [`safe_transfer`] so that a `false` is never silently ignored.
pub trait AssetCustody: fmt::Debug + Send + Sync {
    /// Balance of `holder` in `token`
    fn balance_of(&self, token: &TokenId, holder: &Address) -> Amount;

    /// Move `amount` of `token`. `Ok(false)` means the asset refused the
    /// transfer and nothing moved.
    fn transfer(
        &mut self,
        token: &TokenId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<bool>;
}

/// Transfer that turns a `false` return into [`LedgerError::TransferFailed`].
pub fn safe_transfer(
    custody: &mut dyn AssetCustody,
    token: &TokenId,
    from: &Address,
    to: &Address,
    amount: Amount,
) -> LedgerResult<()> {
    if custody.transfer(token, from, to, amount)? {
        Ok(())
    } else {
        Err(LedgerError::TransferFailed { token: *token })
    }
}

/// In-memory custody keyed by `(token, holder)`
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustody {
    balances: HashMap<(TokenId, Address), Amount>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `amount` of `token` arriving at `holder`
    pub fn deposit(&mut self, token: TokenId, holder: Address, amount: Amount) -> LedgerResult<()> {
        let entry = self.balances.entry((token, holder)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }
}

impl AssetCustody for InMemoryCustody {
    fn balance_of(&self, token: &TokenId, holder: &Address) -> Amount {
        self.balances.get(&(*token, *holder)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        token: &TokenId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<bool> {
        let from_balance = self.balance_of(token, from);
        if from_balance < amount {
            return Ok(false);
        }
        if from == to {
            return Ok(true);
        }
        let to_balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert((*token, *from), from_balance - amount);
        self.balances.insert((*token, *to), to_balance);
        Ok(true)
    }
}
