//! Credit ledger primitives.
//! Stable, fixed-size, behavior-free.
//!
//! Rule: No String identifiers in ledger state. Ever.

pub mod errors;
pub mod primitives;

pub use errors::PrimitiveError;
pub use primitives::{Address, Amount, Bps, TokenId};
