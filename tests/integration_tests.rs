//! Integration tests for the Roundtrip SDK

use async_trait::async_trait;
use roundtrip::client::{ClientError, NodeClient, NodeStatus, PendingInfo, TransactionRecord};
use roundtrip::{
    await_confirmation, ConfirmError, Round, RoundtripSDK, Settings, TransactionId, Wallet,
};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use std::sync::atomic::{AtomicU64, Ordering};

#[test]
fn test_sdk_construction_from_settings() {
    let mut settings = Settings::default();
    settings.rpc_url = "http://localhost:8899".to_string();
    settings.commitment = "finalized".to_string();

    let sdk = RoundtripSDK::new(&settings);

    assert_eq!(sdk.client().url(), "http://localhost:8899");
    assert_eq!(sdk.client().commitment(), CommitmentConfig::finalized());
}

#[test]
fn test_account_round_trip_through_facade() {
    let sdk = RoundtripSDK::connect("http://localhost:8899");

    let wallet = sdk.generate_account();
    let restored = sdk.restore_account(&wallet.export_secret()).unwrap();

    assert_eq!(restored.address(), wallet.address());
}

#[test]
fn test_signed_payment_survives_the_wire_form() {
    let sender = Wallet::generate();
    let recipient = Pubkey::new_unique();

    let tx = roundtrip::transaction::build_payment(
        sender.keypair(),
        &recipient,
        1_000_000,
        Hash::default(),
    );
    let encoded = roundtrip::transaction::export_base64(&tx).unwrap();
    let decoded = roundtrip::transaction::import_base64(&encoded).unwrap();

    assert_eq!(decoded, tx);
}

/// Node that pretends the transaction confirms a fixed number of rounds
/// after polling starts
struct EventuallyConfirmingNode {
    last_round: u64,
    confirm_after: u64,
    polls: AtomicU64,
}

#[async_trait]
impl NodeClient for EventuallyConfirmingNode {
    async fn current_status(&self) -> Result<NodeStatus, ClientError> {
        Ok(NodeStatus {
            last_round: Round(self.last_round),
        })
    }

    async fn pending_transaction(&self, id: &TransactionId) -> Result<PendingInfo, ClientError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if poll >= self.confirm_after {
            let record = TransactionRecord {
                id: id.clone(),
                round: Round(self.last_round + poll),
                confirmations: Some(1),
            };
            Ok(PendingInfo::confirmed(record))
        } else {
            Ok(PendingInfo::still_pending())
        }
    }

    async fn block_after(&self, _round: Round) -> Result<(), ClientError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_poller_confirms_against_a_slow_node() {
    let node = EventuallyConfirmingNode {
        last_round: 500,
        confirm_after: 3,
        polls: AtomicU64::new(0),
    };
    let id = TransactionId::from("slowtx");

    let confirmation = await_confirmation(&node, &id, 8).await.unwrap();

    assert_eq!(confirmation.round, Round(503));
    assert_eq!(confirmation.record.id, id);
}

#[tokio::test]
async fn test_poller_budget_is_respected_end_to_end() {
    let node = EventuallyConfirmingNode {
        last_round: 500,
        confirm_after: 10,
        polls: AtomicU64::new(0),
    };

    let err = await_confirmation(&node, &TransactionId::from("slowtx"), 4)
        .await
        .unwrap_err();

    assert!(matches!(err, ConfirmError::Timeout { max_rounds: 4, .. }));
}
