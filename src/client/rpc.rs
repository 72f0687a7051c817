//! RPC binding of the node client capability
//!
//! Maps the abstract round/pending-snapshot model onto the cluster RPC API:
//! the last round is the current slot at the configured commitment, a
//! pending snapshot comes from the signature status, and the round-wait is a
//! paced slot poll that suspends the calling task between queries.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use solana_account_decoder::parse_token::UiTokenAmount;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};

use super::{ClientError, NodeClient, NodeStatus, PendingInfo, Round, TransactionId, TransactionRecord};
use crate::config::Settings;

/// Node client backed by the cluster RPC API
pub struct RpcNodeClient {
    rpc: RpcClient,
    commitment: CommitmentConfig,
    round_poll: Duration,
}

impl RpcNodeClient {
    /// Connect to a node at `url` with confirmed commitment
    pub fn new(url: impl Into<String>) -> Self {
        Self::new_with_commitment(url, CommitmentConfig::confirmed())
    }

    /// Connect to a node at `url` with an explicit commitment level
    pub fn new_with_commitment(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(url.into(), commitment),
            commitment,
            round_poll: Duration::from_millis(crate::DEFAULT_ROUND_POLL_MS),
        }
    }

    /// Build a client from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(settings.rpc_url.clone(), settings.commitment()),
            commitment: settings.commitment(),
            round_poll: Duration::from_millis(settings.round_poll_ms),
        }
    }

    /// RPC endpoint this client talks to
    pub fn url(&self) -> String {
        self.rpc.url()
    }

    /// Commitment level applied to queries
    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    /// Latest blockhash for transaction assembly
    pub async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    /// Lamport balance of an account
    pub async fn balance(&self, address: &Pubkey) -> Result<u64, ClientError> {
        Ok(self.rpc.get_balance(address).await?)
    }

    /// Fetch a full account
    pub async fn account(&self, address: &Pubkey) -> Result<Account, ClientError> {
        Ok(self.rpc.get_account(address).await?)
    }

    /// Minimum lamports for rent exemption of `data_len` bytes
    pub async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ClientError> {
        Ok(self.rpc.get_minimum_balance_for_rent_exemption(data_len).await?)
    }

    /// Submit a signed transaction without waiting for confirmation
    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<TransactionId, ClientError> {
        let signature = self.rpc.send_transaction(transaction).await?;
        tracing::debug!("Submitted transaction {}", signature);
        Ok(TransactionId::from(signature))
    }

    /// Request an airdrop (test clusters only)
    pub async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<TransactionId, ClientError> {
        let signature = self.rpc.request_airdrop(address, lamports).await?;
        Ok(TransactionId::from(signature))
    }

    /// Balance of a token account
    pub async fn token_account_balance(
        &self,
        token_account: &Pubkey,
    ) -> Result<UiTokenAmount, ClientError> {
        Ok(self.rpc.get_token_account_balance(token_account).await?)
    }

    fn parse_id(&self, id: &TransactionId) -> Result<Signature, ClientError> {
        Signature::from_str(id.as_str())
            .map_err(|e| ClientError::MalformedTransactionId(format!("{}: {}", id, e)))
    }
}

#[async_trait]
impl NodeClient for RpcNodeClient {
    async fn current_status(&self) -> Result<NodeStatus, ClientError> {
        let slot = self.rpc.get_slot().await?;
        Ok(NodeStatus {
            last_round: Round(slot),
        })
    }

    async fn pending_transaction(&self, id: &TransactionId) -> Result<PendingInfo, ClientError> {
        let signature = self.parse_id(id)?;
        let status = self
            .rpc
            .get_signature_statuses(&[signature])
            .await?
            .value
            .into_iter()
            .next()
            .flatten();

        let info = match status {
            Some(status) => {
                let at_commitment = status.satisfies_commitment(self.commitment);
                if let Some(err) = status.err {
                    // The transaction landed in a block but failed, or the
                    // pool dropped it. Either way it will never confirm.
                    PendingInfo::rejected(err.to_string())
                } else if at_commitment {
                    PendingInfo::confirmed(TransactionRecord {
                        id: id.clone(),
                        round: Round(status.slot),
                        confirmations: status.confirmations,
                    })
                } else {
                    // Seen by the node but not yet at our commitment level
                    PendingInfo::still_pending()
                }
            }
            None => PendingInfo::still_pending(),
        };

        Ok(info)
    }

    async fn block_after(&self, round: Round) -> Result<(), ClientError> {
        loop {
            let slot = self.rpc.get_slot().await?;
            if slot > round.0 {
                return Ok(());
            }
            tokio::time::sleep(self.round_poll).await;
        }
    }
}
