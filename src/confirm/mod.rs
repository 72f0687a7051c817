//! Transaction confirmation polling
//!
//! The same bounded wait every submit-and-confirm workflow needs: given a
//! submitted transaction id, watch the node until the transaction is
//! confirmed, rejected by the pool, or a round budget runs out. One status
//! query up front, then one pending snapshot and at most one round-wait per
//! ledger round consumed.

use thiserror::Error;

use crate::client::{ClientError, NodeClient, Round, TransactionId, TransactionRecord};

/// Successful confirmation of a submitted transaction
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// Round the transaction was included in
    pub round: Round,
    /// The node's record of the confirmed transaction
    pub record: TransactionRecord,
}

/// Wait until `id` is confirmed, rejected, or `max_rounds` ledger rounds
/// have passed.
///
/// The wait is cooperative: the only suspension point is the node's
/// round-wait, so independent calls can run concurrently without shared
/// state. A [`ConfirmError::Timeout`] is a caller-side judgment, not a
/// ledger fact; the transaction may still confirm after the budget runs
/// out, and callers needing certainty must poll again.
///
/// Rejection is terminal: a transaction the pool refused will never
/// confirm and must not be resubmitted under the same id.
pub async fn await_confirmation<C>(
    client: &C,
    id: &TransactionId,
    max_rounds: u64,
) -> Result<Confirmation, ConfirmError>
where
    C: NodeClient + ?Sized,
{
    if id.is_empty() {
        return Err(ConfirmError::InvalidArgument(
            "transaction id must not be empty".to_string(),
        ));
    }

    let status = client
        .current_status()
        .await
        .map_err(ConfirmError::NodeUnavailable)?;

    let start_round = status.last_round.next();
    let mut current_round = start_round;

    tracing::debug!(
        "Waiting for tx {} from round {} (budget: {} rounds)",
        id.short(),
        start_round,
        max_rounds
    );

    while current_round < start_round.plus(max_rounds) {
        match client.pending_transaction(id).await {
            Ok(info) => {
                if let Some(round) = info.confirmed_round.filter(|round| round.0 > 0) {
                    let record = info.record.unwrap_or(TransactionRecord {
                        id: id.clone(),
                        round,
                        confirmations: None,
                    });
                    tracing::info!("Transaction {} confirmed in round {}", id.short(), round);
                    return Ok(Confirmation { round, record });
                }

                // Rejection only matters while confirmation is absent; a
                // transaction cannot be both confirmed and rejected.
                if let Some(reason) = info.pool_error.filter(|reason| !reason.is_empty()) {
                    tracing::warn!("Transaction {} rejected: {}", id.short(), reason);
                    return Err(ConfirmError::Rejected {
                        id: id.clone(),
                        reason,
                    });
                }
            }
            Err(e) => {
                // Snapshot unavailable this round; treat as still pending
                tracing::warn!("Pending lookup for tx {} failed: {}", id.short(), e);
            }
        }

        client
            .block_after(current_round)
            .await
            .map_err(ConfirmError::NodeUnavailable)?;
        current_round = current_round.next();
    }

    Err(ConfirmError::Timeout {
        id: id.clone(),
        max_rounds,
    })
}

/// Error types for confirmation polling
#[derive(Debug, Error)]
pub enum ConfirmError {
    /// Malformed call; caller bug, never retried
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The initial status query or a round-wait failed
    #[error("unable to reach node: {0}")]
    NodeUnavailable(#[source] ClientError),

    /// The pool rejected the transaction; terminal, never confirms
    #[error("transaction {id} rejected - pool error: {reason}")]
    Rejected { id: TransactionId, reason: String },

    /// Round budget exhausted without a terminal state
    #[error("transaction {id} not confirmed after {max_rounds} rounds")]
    Timeout { id: TransactionId, max_rounds: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{NodeStatus, PendingInfo};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// One scripted answer per pending-transaction query
    enum Step {
        Answer(PendingInfo),
        Fail,
    }

    /// Node client that replays a script and counts every call
    struct ScriptedNode {
        last_round: u64,
        status_fails: bool,
        script: Mutex<VecDeque<Step>>,
        status_queries: AtomicUsize,
        pending_queries: AtomicUsize,
        round_waits: AtomicUsize,
    }

    impl ScriptedNode {
        fn new(last_round: u64, script: Vec<Step>) -> Self {
            Self {
                last_round,
                status_fails: false,
                script: Mutex::new(script.into()),
                status_queries: AtomicUsize::new(0),
                pending_queries: AtomicUsize::new(0),
                round_waits: AtomicUsize::new(0),
            }
        }

        fn unreachable_node() -> Self {
            let mut node = Self::new(0, Vec::new());
            node.status_fails = true;
            node
        }

        fn confirmed_at(round: u64) -> PendingInfo {
            PendingInfo::confirmed(TransactionRecord {
                id: TransactionId::from("scripted"),
                round: Round(round),
                confirmations: Some(1),
            })
        }
    }

    #[async_trait]
    impl NodeClient for ScriptedNode {
        async fn current_status(&self) -> Result<NodeStatus, ClientError> {
            self.status_queries.fetch_add(1, Ordering::SeqCst);
            if self.status_fails {
                return Err(ClientError::MalformedTransactionId(
                    "node unreachable".to_string(),
                ));
            }
            Ok(NodeStatus {
                last_round: Round(self.last_round),
            })
        }

        async fn pending_transaction(
            &self,
            _id: &TransactionId,
        ) -> Result<PendingInfo, ClientError> {
            self.pending_queries.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front() {
                Some(Step::Answer(info)) => Ok(info),
                Some(Step::Fail) => Err(ClientError::MalformedTransactionId(
                    "snapshot failed".to_string(),
                )),
                None => Ok(PendingInfo::still_pending()),
            }
        }

        async fn block_after(&self, _round: Round) -> Result<(), ClientError> {
            self.round_waits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn tx() -> TransactionId {
        TransactionId::from("4uQeVj5tqViQh7yWWGStvkEG1Zmhx6uasJtWCJziofM")
    }

    #[tokio::test]
    async fn test_zero_budget_times_out_without_any_wait() {
        let node = ScriptedNode::new(100, Vec::new());

        let result = await_confirmation(&node, &tx(), 0).await;

        assert!(matches!(result, Err(ConfirmError::Timeout { max_rounds: 0, .. })));
        assert_eq!(node.pending_queries.load(Ordering::SeqCst), 0);
        assert_eq!(node.round_waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_confirmation_on_nth_query_does_n_minus_one_waits() {
        // lastRound=100; unconfirmed for rounds 101-103, confirmed round 104
        // on the 4th query
        let node = ScriptedNode::new(
            100,
            vec![
                Step::Answer(PendingInfo::still_pending()),
                Step::Answer(PendingInfo::still_pending()),
                Step::Answer(PendingInfo::still_pending()),
                Step::Answer(ScriptedNode::confirmed_at(104)),
            ],
        );

        let confirmation = await_confirmation(&node, &tx(), 4).await.unwrap();

        assert_eq!(confirmation.round, Round(104));
        assert_eq!(confirmation.record.round, Round(104));
        assert_eq!(node.pending_queries.load(Ordering::SeqCst), 4);
        assert_eq!(node.round_waits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_pool_error_stops_polling_immediately() {
        let node = ScriptedNode::new(
            100,
            vec![
                Step::Answer(PendingInfo::rejected("overspend")),
                Step::Answer(ScriptedNode::confirmed_at(104)),
            ],
        );

        let err = await_confirmation(&node, &tx(), 4).await.unwrap_err();

        match err {
            ConfirmError::Rejected { reason, .. } => assert_eq!(reason, "overspend"),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(node.pending_queries.load(Ordering::SeqCst), 1);
        assert_eq!(node.round_waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_does_max_rounds_waits() {
        let node = ScriptedNode::new(100, Vec::new());

        let err = await_confirmation(&node, &tx(), 4).await.unwrap_err();

        assert!(matches!(err, ConfirmError::Timeout { max_rounds: 4, .. }));
        assert_eq!(node.pending_queries.load(Ordering::SeqCst), 4);
        assert_eq!(node.round_waits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_empty_id_fails_before_any_network_call() {
        let node = ScriptedNode::new(100, Vec::new());

        let err = await_confirmation(&node, &TransactionId::default(), 4)
            .await
            .unwrap_err();

        assert!(matches!(err, ConfirmError::InvalidArgument(_)));
        assert_eq!(node.status_queries.load(Ordering::SeqCst), 0);
        assert_eq!(node.pending_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_failure_surfaces_node_unavailable() {
        let node = ScriptedNode::unreachable_node();

        let err = await_confirmation(&node, &tx(), 4).await.unwrap_err();

        assert!(matches!(err, ConfirmError::NodeUnavailable(_)));
        assert_eq!(node.pending_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_confirmation_takes_precedence_over_pool_error() {
        // A snapshot carrying both is nonsensical; confirmation wins because
        // rejection is only checked when confirmation is absent
        let mut both = ScriptedNode::confirmed_at(104);
        both.pool_error = Some("phantom".to_string());
        let node = ScriptedNode::new(100, vec![Step::Answer(both)]);

        let confirmation = await_confirmation(&node, &tx(), 4).await.unwrap();

        assert_eq!(confirmation.round, Round(104));
    }

    #[tokio::test]
    async fn test_failed_snapshot_counts_as_still_pending() {
        let node = ScriptedNode::new(
            100,
            vec![Step::Fail, Step::Answer(ScriptedNode::confirmed_at(103))],
        );

        let confirmation = await_confirmation(&node, &tx(), 4).await.unwrap();

        assert_eq!(confirmation.round, Round(103));
        assert_eq!(node.pending_queries.load(Ordering::SeqCst), 2);
        assert_eq!(node.round_waits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_confirmed_round_is_not_a_confirmation() {
        // A zero round can only come from a malformed snapshot; keep waiting
        let node = ScriptedNode::new(
            100,
            vec![
                Step::Answer(ScriptedNode::confirmed_at(0)),
                Step::Answer(ScriptedNode::confirmed_at(102)),
            ],
        );

        let confirmation = await_confirmation(&node, &tx(), 4).await.unwrap();

        assert_eq!(confirmation.round, Round(102));
    }

    #[tokio::test]
    async fn test_missing_record_is_synthesized() {
        let node = ScriptedNode::new(
            100,
            vec![Step::Answer(PendingInfo {
                confirmed_round: Some(Round(105)),
                pool_error: None,
                record: None,
            })],
        );

        let confirmation = await_confirmation(&node, &tx(), 4).await.unwrap();

        assert_eq!(confirmation.record.id, tx());
        assert_eq!(confirmation.record.round, Round(105));
    }
}
