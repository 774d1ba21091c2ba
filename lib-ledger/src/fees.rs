//! Transfer fee computation.
//!
//! Pure functions of `(amount, rate)`; nothing here touches ledger state.

use serde::{Deserialize, Serialize};

use lib_types::{Amount, Bps};

/// Maximum basis points (100%)
pub const MAX_BPS: Bps = 10_000;

/// Transfer fee rate routed to the treasury (0.1%)
pub const FEE_RATE_BPS: Bps = 10;

/// Smallest transfer that pays a non-zero fee at [`FEE_RATE_BPS`]
pub const FEE_THRESHOLD: Amount = (MAX_BPS / FEE_RATE_BPS) as Amount;

/// Compute `floor(amount * rate_bps / 10_000)`.
///
/// The product is never formed directly, so the result is exact for every
/// `Amount` including `Amount::MAX`. Rates above [`MAX_BPS`] are clamped.
pub fn compute_fee(amount: Amount, rate_bps: Bps) -> Amount {
    let rate = rate_bps.min(MAX_BPS) as Amount;
    let denom = MAX_BPS as Amount;
    (amount / denom) * rate + (amount % denom) * rate / denom
}

/// How a transfer amount divides between recipient and treasury
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Amount credited to the recipient
    pub net: Amount,
    /// Amount credited to the treasury
    pub fee: Amount,
}

impl FeeSplit {
    /// Split `amount` at the given rate. `net + fee == amount` always holds.
    pub fn of(amount: Amount, rate_bps: Bps) -> Self {
        let fee = compute_fee(amount, rate_bps);
        Self {
            net: amount - fee,
            fee,
        }
    }

    /// Split at the ledger's fixed transfer rate
    pub fn transfer(amount: Amount) -> Self {
        Self::of(amount, FEE_RATE_BPS)
    }

    pub fn total(&self) -> Amount {
        self.net + self.fee
    }
}
