//! Durable ledger snapshots
//!
//! A snapshot captures everything the engine owns except external custody
//! holdings. Restoring re-derives the state root and refuses snapshots
//! whose balances, roles or event sequence do not check out.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use lib_types::{Address, Amount};

use crate::custody::AssetCustody;
use crate::engine::{PauseState, TokenEngine, TokenMetadata};
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{EventLog, EventRecord};
use crate::roles::{Role, RoleRegistry};
use crate::store::LedgerStore;

/// Snapshot format version
pub const SNAPSHOT_VERSION: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u16,
    pub metadata: TokenMetadata,
    pub contract_account: Address,
    pub treasury: Address,
    pub pause_state: PauseState,
    pub total_supply: Amount,
    /// Funded accounts, sorted by address
    pub balances: Vec<(Address, Amount)>,
    /// Sorted role assignments
    pub roles: Vec<(Role, Address)>,
    pub events: Vec<EventRecord>,
    /// Hex-encoded [`LedgerStore::state_root`]
    pub state_root: String,
}

impl LedgerSnapshot {
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(self).context("failed to serialize ledger snapshot")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write ledger snapshot {}", path.display()))?;
        tracing::info!("Saved ledger snapshot ({} events) to {}", self.events.len(), path.display());
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)
            .with_context(|| format!("failed to read ledger snapshot {}", path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse ledger snapshot {}", path.display()))
    }
}

impl TokenEngine {
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            metadata: self.metadata().clone(),
            contract_account: self.contract_account(),
            treasury: self.treasury(),
            pause_state: self.pause_state(),
            total_supply: self.total_supply(),
            balances: self.ledger().accounts(),
            roles: self.roles().assignments(),
            events: self.events().records().to_vec(),
            state_root: hex::encode(self.ledger().state_root()),
        }
    }

    /// Rebuild an engine from a snapshot, attaching the given custody backend
    pub fn restore(snapshot: LedgerSnapshot, custody: Box<dyn AssetCustody>) -> LedgerResult<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported version {}",
                snapshot.version
            )));
        }
        if snapshot.treasury.is_zero() || snapshot.contract_account.is_zero() {
            return Err(LedgerError::Snapshot("null treasury or contract account".to_string()));
        }

        let ledger = LedgerStore::from_parts(snapshot.balances, snapshot.total_supply)?;
        let root = hex::encode(ledger.state_root());
        if root != snapshot.state_root {
            return Err(LedgerError::Snapshot(format!(
                "state root mismatch: stored {}, computed {}",
                snapshot.state_root, root
            )));
        }

        let mut roles = RoleRegistry::new();
        for (role, account) in snapshot.roles {
            roles.grant(role, account);
        }
        if roles.member_count(Role::Administrator) == 0 {
            return Err(LedgerError::Snapshot("no administrator".to_string()));
        }

        let events = EventLog::from_records(snapshot.events)
            .ok_or_else(|| LedgerError::Snapshot("event sequence is not contiguous".to_string()))?;

        tracing::info!(
            holders = ledger.holder_count(),
            events = events.len(),
            state_root = %root,
            "ledger restored from snapshot"
        );

        Ok(TokenEngine::from_state(
            snapshot.metadata,
            snapshot.contract_account,
            ledger,
            roles,
            snapshot.treasury,
            snapshot.pause_state,
            events,
            custody,
        ))
    }
}
