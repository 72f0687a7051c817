//! Roundtrip - submit-and-confirm toolkit for Solana transactions
//!
//! Wraps a node RPC client with the workflows the demo scripts share:
//! account management, payments, token lifecycle, program calls, and the
//! round-budgeted confirmation poller every submission waits on.

pub mod account;
pub mod client;
pub mod config;
pub mod confirm;
pub mod program;
pub mod token;
pub mod transaction;

use std::sync::Arc;

use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey, signature::Keypair};
use thiserror::Error;

pub use account::Wallet;
pub use client::{NodeClient, NodeStatus, PendingInfo, Round, RpcNodeClient, TransactionId};
pub use config::Settings;
pub use confirm::{await_confirmation, ConfirmError, Confirmation};
pub use transaction::Receipt;

use program::{AccountState, ProgramService};
use token::{TokenCreation, TokenHolding, TokenService};
use transaction::TransactionService;

/// Default round budget for confirmation waits
pub const DEFAULT_CONFIRMATION_ROUNDS: u64 = 32;

/// Default pacing of the round-wait slot poll in milliseconds
pub const DEFAULT_ROUND_POLL_MS: u64 = 400;

/// Core Roundtrip SDK instance
pub struct RoundtripSDK {
    /// Shared node client
    client: Arc<RpcNodeClient>,
    /// Payment workflows
    transactions: Arc<TransactionService>,
    /// Token workflows
    tokens: Arc<TokenService>,
    /// Program workflows
    programs: Arc<ProgramService>,
    /// Round budget applied to confirmation waits
    confirmation_rounds: u64,
}

impl RoundtripSDK {
    /// Initialize an SDK instance from loaded settings
    pub fn new(settings: &Settings) -> Self {
        let client = Arc::new(RpcNodeClient::from_settings(settings));
        Self::with_client(client, settings.confirmation_rounds)
    }

    /// Initialize an SDK instance against an RPC endpoint with defaults
    pub fn connect(rpc_url: impl Into<String>) -> Self {
        let client = Arc::new(RpcNodeClient::new(rpc_url));
        Self::with_client(client, DEFAULT_CONFIRMATION_ROUNDS)
    }

    fn with_client(client: Arc<RpcNodeClient>, confirmation_rounds: u64) -> Self {
        Self {
            transactions: Arc::new(TransactionService::new(client.clone(), confirmation_rounds)),
            tokens: Arc::new(TokenService::new(client.clone(), confirmation_rounds)),
            programs: Arc::new(ProgramService::new(client.clone(), confirmation_rounds)),
            client,
            confirmation_rounds,
        }
    }

    /// The shared node client
    pub fn client(&self) -> &RpcNodeClient {
        &self.client
    }

    /// Generate a fresh local account
    pub fn generate_account(&self) -> Wallet {
        Wallet::generate()
    }

    /// Restore a local account from an exported secret
    pub fn restore_account(&self, secret: &str) -> Result<Wallet, RoundtripError> {
        Ok(Wallet::restore(secret)?)
    }

    /// Current node status
    pub async fn node_status(&self) -> Result<NodeStatus, RoundtripError> {
        Ok(self.client.current_status().await?)
    }

    /// Lamport balance of an account
    pub async fn balance(&self, address: &Pubkey) -> Result<u64, RoundtripError> {
        Ok(self.client.balance(address).await?)
    }

    /// Fund an account via airdrop and wait for the drop to confirm
    /// (test clusters only)
    pub async fn fund(&self, address: &Pubkey, lamports: u64) -> Result<Receipt, RoundtripError> {
        let id = self.client.request_airdrop(address, lamports).await?;
        let confirmation =
            await_confirmation(self.client.as_ref(), &id, self.confirmation_rounds).await?;
        Ok(Receipt { id, confirmation })
    }

    /// Pay lamports from `sender` to `recipient` and wait for confirmation
    pub async fn pay(
        &self,
        sender: &Keypair,
        recipient: &Pubkey,
        lamports: u64,
    ) -> Result<Receipt, RoundtripError> {
        Ok(self.transactions.pay(sender, recipient, lamports).await?)
    }

    /// Submit a base64 encoded signed transaction and wait for confirmation
    pub async fn submit_encoded(&self, base64_tx: &str) -> Result<Receipt, RoundtripError> {
        let transaction = transaction::import_base64(base64_tx)?;
        Ok(self.transactions.submit_and_confirm(&transaction).await?)
    }

    /// Create a new token with its supply parked at the creator
    pub async fn create_token(
        &self,
        creator: &Keypair,
        decimals: u8,
        initial_supply: u64,
    ) -> Result<TokenCreation, RoundtripError> {
        Ok(self
            .tokens
            .create_token(creator, decimals, initial_supply)
            .await?)
    }

    /// Opt a wallet in to a token
    pub async fn opt_in(&self, wallet: &Keypair, mint: &Pubkey) -> Result<Receipt, RoundtripError> {
        Ok(self.tokens.opt_in(wallet, mint).await?)
    }

    /// Transfer token units between opted-in wallets
    pub async fn transfer_token(
        &self,
        sender: &Keypair,
        recipient: &Pubkey,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<Receipt, RoundtripError> {
        Ok(self
            .tokens
            .transfer(sender, recipient, mint, amount)
            .await?)
    }

    /// Look up a wallet's holding of a token
    pub async fn token_holding(
        &self,
        wallet: &Pubkey,
        mint: &Pubkey,
    ) -> Result<TokenHolding, RoundtripError> {
        Ok(self.tokens.holding(wallet, mint).await?)
    }

    /// Call a deployed program
    pub async fn call_program(
        &self,
        payer: &Keypair,
        program_id: &Pubkey,
        accounts: Vec<AccountMeta>,
        data: Vec<u8>,
    ) -> Result<Receipt, RoundtripError> {
        Ok(self
            .programs
            .invoke(payer, program_id, accounts, data)
            .await?)
    }

    /// Upgrade an upgradeable program from a staged buffer
    pub async fn upgrade_program(
        &self,
        authority: &Keypair,
        program_id: &Pubkey,
        buffer: &Pubkey,
        spill: &Pubkey,
    ) -> Result<Receipt, RoundtripError> {
        Ok(self
            .programs
            .upgrade(authority, program_id, buffer, spill)
            .await?)
    }

    /// Close an upgradeable-loader account and reclaim its lamports
    pub async fn close_program(
        &self,
        authority: &Keypair,
        target: &Pubkey,
        recipient: &Pubkey,
    ) -> Result<Receipt, RoundtripError> {
        Ok(self.programs.close(authority, target, recipient).await?)
    }

    /// Read any account's state for inspection
    pub async fn read_state(&self, address: &Pubkey) -> Result<AccountState, RoundtripError> {
        Ok(self.programs.read_state(address).await?)
    }

    /// Wait for a previously submitted transaction with an explicit round
    /// budget
    pub async fn await_confirmation(
        &self,
        id: &TransactionId,
        max_rounds: u64,
    ) -> Result<Confirmation, RoundtripError> {
        Ok(await_confirmation(self.client.as_ref(), id, max_rounds).await?)
    }
}

/// Error types for Roundtrip operations
#[derive(Error, Debug)]
pub enum RoundtripError {
    #[error("node client error: {0}")]
    Client(#[from] client::ClientError),

    #[error("confirmation error: {0}")]
    Confirm(#[from] confirm::ConfirmError),

    #[error("payment error: {0}")]
    Transaction(#[from] transaction::TransactionError),

    #[error("token error: {0}")]
    Token(#[from] token::TokenError),

    #[error("program error: {0}")]
    Program(#[from] program::ProgramOpsError),

    #[error("account error: {0}")]
    Account(#[from] account::AccountError),

    #[error("configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}
