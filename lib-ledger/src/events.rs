//! Ledger Event Log
//!
//! Append-only record of completed state transitions. Records are numbered
//! from 0 in completion order and are never modified once appended.

use serde::{Deserialize, Serialize};
use std::fmt;

use lib_types::{Address, Amount, TokenId};

use crate::roles::Role;

// ============================================================================
// EVENT TYPES
// ============================================================================

/// State changes recorded by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Supply issued against a verification id
    CreditsMinted {
        to: Address,
        amount: Amount,
        verification_id: String,
    },

    /// Balance moved between accounts
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },

    /// Transfer fee routed to the treasury
    FeeCollected { from: Address, fee: Amount },

    /// Supply destroyed by its holder
    Burned { holder: Address, amount: Amount },

    /// Asset recovered from the contract account
    TokensRescued {
        token: TokenId,
        to: Address,
        amount: Amount,
    },

    Paused { by: Address },

    Unpaused { by: Address },

    TreasuryUpdated { previous: Address, current: Address },

    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },

    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::CreditsMinted { .. } => "CreditsMinted",
            LedgerEvent::Transfer { .. } => "Transfer",
            LedgerEvent::FeeCollected { .. } => "FeeCollected",
            LedgerEvent::Burned { .. } => "Burned",
            LedgerEvent::TokensRescued { .. } => "TokensRescued",
            LedgerEvent::Paused { .. } => "Paused",
            LedgerEvent::Unpaused { .. } => "Unpaused",
            LedgerEvent::TreasuryUpdated { .. } => "TreasuryUpdated",
            LedgerEvent::RoleGranted { .. } => "RoleGranted",
            LedgerEvent::RoleRevoked { .. } => "RoleRevoked",
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::CreditsMinted { to, amount, verification_id } => {
                write!(f, "CreditsMinted(to={}, amount={}, id={})", hex::encode(&to.0[..8]), amount, verification_id)
            }
            LedgerEvent::Transfer { from, to, amount } => write!(
                f,
                "Transfer({}->{}, amount={})",
                hex::encode(&from.0[..8]),
                hex::encode(&to.0[..8]),
                amount
            ),
            LedgerEvent::FeeCollected { fee, .. } => write!(f, "FeeCollected(fee={})", fee),
            LedgerEvent::Burned { amount, .. } => write!(f, "Burned(amount={})", amount),
            LedgerEvent::TokensRescued { token, amount, .. } => {
                write!(f, "TokensRescued(token={}, amount={})", hex::encode(&token.0[..8]), amount)
            }
            LedgerEvent::RoleGranted { role, .. } => write!(f, "RoleGranted({})", role),
            LedgerEvent::RoleRevoked { role, .. } => write!(f, "RoleRevoked({})", role),
            other => f.write_str(other.kind()),
        }
    }
}

/// An event with its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: LedgerEvent,
}

// ============================================================================
// EVENT LOG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from stored records. Sequence numbers must run 0..n.
    pub fn from_records(records: Vec<EventRecord>) -> Option<Self> {
        let contiguous = records
            .iter()
            .enumerate()
            .all(|(i, record)| record.sequence == i as u64);
        contiguous.then_some(Self { records })
    }

    /// Append an event and return its sequence number
    pub fn append(&mut self, event: LedgerEvent) -> u64 {
        let sequence = self.records.len() as u64;
        tracing::trace!(sequence, event = %event, "event appended");
        self.records.push(EventRecord { sequence, event });
        sequence
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.records.iter().map(|record| &record.event)
    }

    pub fn last(&self) -> Option<&LedgerEvent> {
        self.records.last().map(|record| &record.event)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee_event(fee: Amount) -> LedgerEvent {
        LedgerEvent::FeeCollected {
            from: Address::new([1u8; 32]),
            fee,
        }
    }

    #[test]
    fn test_append_assigns_sequence() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        assert_eq!(log.append(fee_event(1)), 0);
        assert_eq!(log.append(fee_event(2)), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(&fee_event(2)));
        assert_eq!(log.records()[1].sequence, 1);
    }

    #[test]
    fn test_since() {
        let mut log = EventLog::new();
        for fee in 0..5 {
            log.append(fee_event(fee));
        }

        let tail = log.since(3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 3);
        assert!(log.since(10).is_empty());
    }

    #[test]
    fn test_from_records_requires_contiguous_sequence() {
        let good = vec![
            EventRecord { sequence: 0, event: fee_event(1) },
            EventRecord { sequence: 1, event: fee_event(2) },
        ];
        assert_eq!(EventLog::from_records(good).map(|log| log.len()), Some(2));

        let gap = vec![EventRecord { sequence: 1, event: fee_event(1) }];
        assert!(EventLog::from_records(gap).is_none());
    }

    #[test]
    fn test_display() {
        let event = LedgerEvent::CreditsMinted {
            to: Address::new([0xaa; 32]),
            amount: 100,
            verification_id: "Cert-1".to_string(),
        };
        assert_eq!(event.kind(), "CreditsMinted");
        assert_eq!(
            event.to_string(),
            "CreditsMinted(to=aaaaaaaaaaaaaaaa, amount=100, id=Cert-1)"
        );
        assert_eq!(
            LedgerEvent::Paused { by: Address::zero() }.to_string(),
            "Paused"
        );
    }
}
