//! Program workflows for Roundtrip
//!
//! Calling deployed programs and managing upgradeable ones: invoke with
//! caller-supplied accounts and data, point a program at a new buffer,
//! close a loader account to reclaim its lamports, and read account state
//! back for printing.

use std::sync::Arc;

use solana_sdk::{
    bpf_loader_upgradeable,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use thiserror::Error;

use crate::client::{ClientError, RpcNodeClient};
use crate::confirm::{await_confirmation, ConfirmError};
use crate::transaction::Receipt;

/// Snapshot of an account's on-ledger state
#[derive(Debug, Clone)]
pub struct AccountState {
    /// Address the state was read from
    pub address: Pubkey,
    /// Lamport balance
    pub lamports: u64,
    /// Owning program
    pub owner: Pubkey,
    /// Whether the account is an executable program
    pub executable: bool,
    /// Raw account data
    pub data: Vec<u8>,
}

impl AccountState {
    /// Short hex rendering of the data for log lines
    pub fn data_preview(&self) -> String {
        const PREVIEW_BYTES: usize = 32;
        if self.data.len() <= PREVIEW_BYTES {
            hex::encode(&self.data)
        } else {
            format!(
                "{}... ({} bytes)",
                hex::encode(&self.data[..PREVIEW_BYTES]),
                self.data.len()
            )
        }
    }
}

/// Program workflow service
pub struct ProgramService {
    client: Arc<RpcNodeClient>,
    confirmation_rounds: u64,
}

impl ProgramService {
    pub fn new(client: Arc<RpcNodeClient>, confirmation_rounds: u64) -> Self {
        Self {
            client,
            confirmation_rounds,
        }
    }

    /// Call `program_id` with the given accounts and instruction data,
    /// signed and paid for by `payer`
    pub async fn invoke(
        &self,
        payer: &Keypair,
        program_id: &Pubkey,
        accounts: Vec<AccountMeta>,
        data: Vec<u8>,
    ) -> Result<Receipt, ProgramOpsError> {
        let instruction = build_invoke_instruction(program_id, accounts, data);

        let blockhash = self.client.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&payer.pubkey()),
            &[payer],
            blockhash,
        );

        tracing::info!("Calling program {}", program_id);
        self.submit_and_confirm(&transaction).await
    }

    /// Upgrade `program_id` to the code staged in `buffer`. The upgrade
    /// authority signs; freed buffer lamports are spilled to `spill`.
    pub async fn upgrade(
        &self,
        authority: &Keypair,
        program_id: &Pubkey,
        buffer: &Pubkey,
        spill: &Pubkey,
    ) -> Result<Receipt, ProgramOpsError> {
        let instruction =
            bpf_loader_upgradeable::upgrade(program_id, buffer, &authority.pubkey(), spill);

        let blockhash = self.client.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&authority.pubkey()),
            &[authority],
            blockhash,
        );

        tracing::info!("Upgrading program {} from buffer {}", program_id, buffer);
        self.submit_and_confirm(&transaction).await
    }

    /// Close an upgradeable-loader account (program data or buffer) and
    /// reclaim its lamports to `recipient`
    pub async fn close(
        &self,
        authority: &Keypair,
        target: &Pubkey,
        recipient: &Pubkey,
    ) -> Result<Receipt, ProgramOpsError> {
        let instruction = bpf_loader_upgradeable::close(target, recipient, &authority.pubkey());

        let blockhash = self.client.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&authority.pubkey()),
            &[authority],
            blockhash,
        );

        tracing::info!("Closing {} to recipient {}", target, recipient);
        self.submit_and_confirm(&transaction).await
    }

    /// Read the state of any account for inspection
    pub async fn read_state(&self, address: &Pubkey) -> Result<AccountState, ProgramOpsError> {
        let account = self.client.account(address).await?;
        Ok(AccountState {
            address: *address,
            lamports: account.lamports,
            owner: account.owner,
            executable: account.executable,
            data: account.data,
        })
    }

    async fn submit_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> Result<Receipt, ProgramOpsError> {
        let id = self.client.send_transaction(transaction).await?;
        let confirmation =
            await_confirmation(self.client.as_ref(), &id, self.confirmation_rounds).await?;
        Ok(Receipt { id, confirmation })
    }
}

/// Instruction calling `program_id` with raw data
pub fn build_invoke_instruction(
    program_id: &Pubkey,
    accounts: Vec<AccountMeta>,
    data: Vec<u8>,
) -> Instruction {
    Instruction::new_with_bytes(*program_id, &data, accounts)
}

/// Error types for program workflows
#[derive(Debug, Error)]
pub enum ProgramOpsError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Confirm(#[from] ConfirmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_instruction_carries_data_and_accounts() {
        let program_id = Pubkey::new_unique();
        let state_account = Pubkey::new_unique();
        let accounts = vec![AccountMeta::new(state_account, false)];

        let instruction = build_invoke_instruction(&program_id, accounts, b"A".to_vec());

        assert_eq!(instruction.program_id, program_id);
        assert_eq!(instruction.data, b"A");
        assert_eq!(instruction.accounts[0].pubkey, state_account);
    }

    #[test]
    fn test_upgrade_targets_the_loader() {
        let authority = Pubkey::new_unique();
        let instruction = bpf_loader_upgradeable::upgrade(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &authority,
            &Pubkey::new_unique(),
        );
        assert_eq!(instruction.program_id, bpf_loader_upgradeable::id());
    }

    #[test]
    fn test_close_targets_the_loader() {
        let instruction = bpf_loader_upgradeable::close(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
        );
        assert_eq!(instruction.program_id, bpf_loader_upgradeable::id());
    }

    #[test]
    fn test_data_preview_truncates() {
        let state = AccountState {
            address: Pubkey::new_unique(),
            lamports: 0,
            owner: Pubkey::new_unique(),
            executable: false,
            data: vec![0xAB; 100],
        };
        let preview = state.data_preview();
        assert!(preview.starts_with("abab"));
        assert!(preview.ends_with("(100 bytes)"));

        let short = AccountState {
            data: vec![0x01, 0x02],
            ..state
        };
        assert_eq!(short.data_preview(), "0102");
    }
}
