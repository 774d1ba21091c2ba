//! Credit Ledger
//!
//! A single-denomination fungible ledger with role-gated issuance, a fixed
//! basis-point transfer fee routed to a treasury, and emergency controls.
//!
//! # Key Types
//!
//! - [`TokenEngine`]: every state-changing operation goes through it
//! - [`LedgerStore`]: balances and total supply
//! - [`RoleRegistry`]: Administrator / Verifier / Pauser membership
//! - [`EventLog`]: append-only record of completed operations
//! - [`SharedTokenEngine`]: lock-serialized handle for multi-threaded hosts
//!
//! # Example
//!
//! ```ignore
//! use lib_ledger::{TokenEngine, TokenMetadata};
//!
//! let mut engine = TokenEngine::new(admin, vault, TokenMetadata::new("Carbon Credit", "CC", 18), 1_000, treasury)?;
//! engine.mint(&admin, &user, 100, "Cert-1")?;
//! let receipt = engine.transfer(&user, &recipient, 10)?;
//! assert_eq!(receipt.fee, 0);
//! ```

pub mod config;
pub mod custody;
pub mod engine;
pub mod errors;
pub mod events;
pub mod fees;
pub mod roles;
pub mod shared;
pub mod snapshot;
pub mod store;

pub use config::{LedgerConfig, ResolvedConfig};
pub use custody::{safe_transfer, AssetCustody, InMemoryCustody};
pub use engine::{PauseState, TokenEngine, TokenMetadata, TransferReceipt};
pub use errors::*;
pub use events::{EventLog, EventRecord, LedgerEvent};
pub use fees::{compute_fee, FeeSplit, FEE_RATE_BPS, MAX_BPS};
pub use roles::{Role, RoleRegistry};
pub use shared::SharedTokenEngine;
pub use snapshot::LedgerSnapshot;
pub use store::LedgerStore;

pub use lib_types::{Address, Amount, Bps, TokenId};
