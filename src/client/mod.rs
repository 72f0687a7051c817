//! Node client capability for Roundtrip
//!
//! Defines the ledger data model (rounds, transaction ids, pending
//! snapshots) and the minimal `NodeClient` trait the confirmation poller
//! runs against. The RPC binding lives in [`rpc`].

pub mod rpc;

pub use rpc::RpcNodeClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A unit of ledger progress. Rounds are monotonically non-decreasing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Round(pub u64);

impl Round {
    /// The round immediately after this one
    pub fn next(self) -> Round {
        Round(self.0 + 1)
    }

    /// Add a round budget to this round
    pub fn plus(self, rounds: u64) -> Round {
        Round(self.0 + rounds)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Round {
    fn from(round: u64) -> Self {
        Round(round)
    }
}

/// Opaque identifier of a submitted transaction (base58 signature string).
///
/// Assigned at submission time and immutable thereafter; the lookup key for
/// confirmation polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short prefix for log lines
    pub fn short(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<solana_sdk::signature::Signature> for TransactionId {
    fn from(signature: solana_sdk::signature::Signature) -> Self {
        Self(signature.to_string())
    }
}

/// Point-in-time node status
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeStatus {
    /// Last round the node has seen
    pub last_round: Round,
}

/// What the node knows about a confirmed transaction at snapshot time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction id the record belongs to
    pub id: TransactionId,
    /// Round the transaction was included in
    pub round: Round,
    /// Cluster confirmations observed so far (None once rooted)
    pub confirmations: Option<usize>,
}

impl TransactionRecord {
    /// Whether the node reports the transaction as rooted
    pub fn finalized(&self) -> bool {
        self.confirmations.is_none()
    }
}

/// Point-in-time snapshot of a submitted transaction.
///
/// Not cached; every poll produces a fresh snapshot. A transaction cannot be
/// both confirmed and rejected, so at most one of `confirmed_round` and
/// `pool_error` is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingInfo {
    /// Round the transaction was confirmed in, if any
    pub confirmed_round: Option<Round>,
    /// Rejection reason from the transaction pool, if any
    pub pool_error: Option<String>,
    /// Full record, present once confirmed
    pub record: Option<TransactionRecord>,
}

impl PendingInfo {
    /// Snapshot for a transaction the node has not seen land yet
    pub fn still_pending() -> Self {
        Self::default()
    }

    /// Snapshot for a transaction confirmed in `round`
    pub fn confirmed(record: TransactionRecord) -> Self {
        Self {
            confirmed_round: Some(record.round),
            pool_error: None,
            record: Some(record),
        }
    }

    /// Snapshot for a transaction the pool rejected
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            confirmed_round: None,
            pool_error: Some(reason.into()),
            record: None,
        }
    }
}

/// Capability the confirmation poller requires from a node.
///
/// Implemented for the RPC binding in [`rpc::RpcNodeClient`] and by scripted
/// fakes in tests. `block_after` must suspend the calling task until the
/// ledger has advanced past `round`; it must not spin.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Query current node status
    async fn current_status(&self) -> Result<NodeStatus, ClientError>;

    /// Snapshot the node's view of a submitted transaction
    async fn pending_transaction(&self, id: &TransactionId) -> Result<PendingInfo, ClientError>;

    /// Wait until the ledger has advanced past `round`
    async fn block_after(&self, round: Round) -> Result<(), ClientError>;
}

/// Error types for node client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("node request failed: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("malformed transaction id: {0}")]
    MalformedTransactionId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_ordering_and_arithmetic() {
        let round = Round(100);
        assert_eq!(round.next(), Round(101));
        assert_eq!(round.plus(4), Round(104));
        assert!(Round(101) < Round(101).plus(4));
        assert_eq!(Round(7).to_string(), "7");
    }

    #[test]
    fn test_transaction_id_display() {
        let id = TransactionId::from("5VERYLongBase58SignatureString");
        assert_eq!(id.short(), "5VERYLon");
        assert_eq!(id.to_string(), "5VERYLongBase58SignatureString");
        assert!(!id.is_empty());
        assert!(TransactionId::default().is_empty());
    }

    #[test]
    fn test_pending_info_snapshots_are_exclusive() {
        let pending = PendingInfo::still_pending();
        assert!(pending.confirmed_round.is_none());
        assert!(pending.pool_error.is_none());

        let record = TransactionRecord {
            id: TransactionId::from("tx"),
            round: Round(42),
            confirmations: Some(3),
        };
        let confirmed = PendingInfo::confirmed(record);
        assert_eq!(confirmed.confirmed_round, Some(Round(42)));
        assert!(confirmed.pool_error.is_none());
        assert!(!confirmed.record.as_ref().unwrap().finalized());

        let rejected = PendingInfo::rejected("overspend");
        assert!(rejected.confirmed_round.is_none());
        assert_eq!(rejected.pool_error.as_deref(), Some("overspend"));
    }
}
