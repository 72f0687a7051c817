//! Payment transactions for Roundtrip
//!
//! Builds, signs and submits lamport transfers, then waits on the
//! confirmation poller. Also carries the base64 wire form used to hand a
//! signed transaction through a string channel.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};
use thiserror::Error;

use crate::client::{ClientError, RpcNodeClient, TransactionId};
use crate::confirm::{await_confirmation, ConfirmError, Confirmation};

/// Outcome of a submit-and-confirm workflow
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Id assigned at submission time
    pub id: TransactionId,
    /// The confirmation the poller observed
    pub confirmation: Confirmation,
}

/// Payment workflow service
pub struct TransactionService {
    client: Arc<RpcNodeClient>,
    confirmation_rounds: u64,
}

impl TransactionService {
    pub fn new(client: Arc<RpcNodeClient>, confirmation_rounds: u64) -> Self {
        Self {
            client,
            confirmation_rounds,
        }
    }

    /// Send `lamports` from `sender` to `recipient` and wait for
    /// confirmation
    pub async fn pay(
        &self,
        sender: &Keypair,
        recipient: &Pubkey,
        lamports: u64,
    ) -> Result<Receipt, TransactionError> {
        let blockhash = self.client.latest_blockhash().await?;
        let transaction = build_payment(sender, recipient, lamports, blockhash);

        tracing::info!(
            "Paying {} lamports from {} to {}",
            lamports,
            sender.pubkey(),
            recipient
        );

        self.submit_and_confirm(&transaction).await
    }

    /// Submit a signed transaction without waiting
    pub async fn submit(&self, transaction: &Transaction) -> Result<TransactionId, TransactionError> {
        Ok(self.client.send_transaction(transaction).await?)
    }

    /// Submit a signed transaction and wait for confirmation
    pub async fn submit_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> Result<Receipt, TransactionError> {
        let id = self.client.send_transaction(transaction).await?;
        let confirmation =
            await_confirmation(self.client.as_ref(), &id, self.confirmation_rounds).await?;
        Ok(Receipt { id, confirmation })
    }
}

/// Build a signed lamport transfer
pub fn build_payment(
    sender: &Keypair,
    recipient: &Pubkey,
    lamports: u64,
    blockhash: Hash,
) -> Transaction {
    let instruction = system_instruction::transfer(&sender.pubkey(), recipient, lamports);
    Transaction::new_signed_with_payer(
        &[instruction],
        Some(&sender.pubkey()),
        &[sender],
        blockhash,
    )
}

/// Encode a signed transaction as base64 wire bytes
pub fn export_base64(transaction: &Transaction) -> Result<String, TransactionError> {
    let bytes = bincode1::serialize(transaction)
        .map_err(|e| TransactionError::Serialization(e.to_string()))?;
    Ok(BASE64.encode(bytes))
}

/// Decode a transaction from its base64 wire form
pub fn import_base64(encoded: &str) -> Result<Transaction, TransactionError> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| TransactionError::Serialization(e.to_string()))?;
    bincode1::deserialize(&bytes).map_err(|e| TransactionError::Serialization(e.to_string()))
}

/// Error types for payment workflows
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Confirm(#[from] ConfirmError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::system_program;

    #[test]
    fn test_build_payment_targets_system_program() {
        let sender = Keypair::new();
        let recipient = Pubkey::new_unique();

        let tx = build_payment(&sender, &recipient, 1_000_000, Hash::default());

        assert_eq!(tx.message.account_keys[0], sender.pubkey());
        assert!(tx.message.account_keys.contains(&recipient));
        let instruction = &tx.message.instructions[0];
        assert_eq!(
            *instruction.program_id(&tx.message.account_keys),
            system_program::id()
        );
        assert_eq!(tx.signatures.len(), 1);
    }

    #[test]
    fn test_wire_form_round_trip() {
        let sender = Keypair::new();
        let tx = build_payment(&sender, &Pubkey::new_unique(), 42, Hash::default());

        let encoded = export_base64(&tx).unwrap();
        let decoded = import_base64(&encoded).unwrap();

        assert_eq!(decoded.signatures, tx.signatures);
        assert_eq!(decoded.message, tx.message);
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(
            import_base64("@@not-base64@@"),
            Err(TransactionError::Serialization(_))
        ));
        // valid base64, invalid wire bytes
        let bogus = BASE64.encode([0u8; 3]);
        assert!(matches!(
            import_base64(&bogus),
            Err(TransactionError::Serialization(_))
        ));
    }
}
