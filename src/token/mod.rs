//! Token workflows for Roundtrip
//!
//! The token lifecycle the demos walk through: create a mint with its
//! initial supply parked at the creator, opt a wallet in by creating its
//! associated token account, transfer units between opted-in wallets, and
//! look up a wallet's holding for printing.
//!
//! Opt-in is the associated-account creation; a wallet cannot hold a token
//! before it exists, which is the same contract as a zero-amount self
//! transfer on asset-based ledgers.

use std::sync::Arc;

use solana_account_decoder::parse_token::UiTokenAmount;
use solana_program::program_pack::Pack;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token::state::Mint;
use thiserror::Error;

use crate::client::{ClientError, RpcNodeClient};
use crate::confirm::{await_confirmation, ConfirmError};
use crate::transaction::Receipt;

/// Result of creating a new token
#[derive(Debug, Clone)]
pub struct TokenCreation {
    /// Address of the new mint
    pub mint: Pubkey,
    /// Submission receipt of the creation transaction
    pub receipt: Receipt,
}

/// A wallet's holding of one mint
#[derive(Debug, Clone)]
pub struct TokenHolding {
    /// The associated token account holding the units
    pub token_account: Pubkey,
    /// Amount as reported by the node
    pub amount: UiTokenAmount,
}

/// Token workflow service
pub struct TokenService {
    client: Arc<RpcNodeClient>,
    confirmation_rounds: u64,
}

impl TokenService {
    pub fn new(client: Arc<RpcNodeClient>, confirmation_rounds: u64) -> Self {
        Self {
            client,
            confirmation_rounds,
        }
    }

    /// Create a new token: mint account, creator's token account, and the
    /// full `initial_supply` minted to the creator, in one transaction
    pub async fn create_token(
        &self,
        creator: &Keypair,
        decimals: u8,
        initial_supply: u64,
    ) -> Result<TokenCreation, TokenError> {
        let mint = Keypair::new();
        let rent = self
            .client
            .minimum_balance_for_rent_exemption(Mint::LEN)
            .await?;
        let instructions = build_create_token_instructions(
            &creator.pubkey(),
            &mint.pubkey(),
            decimals,
            initial_supply,
            rent,
        )?;

        let blockhash = self.client.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &instructions,
            Some(&creator.pubkey()),
            &[creator, &mint],
            blockhash,
        );

        tracing::info!(
            "Creating token {} (decimals: {}, supply: {})",
            mint.pubkey(),
            decimals,
            initial_supply
        );

        let receipt = self.submit_and_confirm(&transaction).await?;
        Ok(TokenCreation {
            mint: mint.pubkey(),
            receipt,
        })
    }

    /// Opt `wallet` in to `mint` by creating its associated token account
    pub async fn opt_in(&self, wallet: &Keypair, mint: &Pubkey) -> Result<Receipt, TokenError> {
        let instruction = build_opt_in_instruction(&wallet.pubkey(), mint);

        let blockhash = self.client.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&wallet.pubkey()),
            &[wallet],
            blockhash,
        );

        tracing::info!("Opting {} in to token {}", wallet.pubkey(), mint);
        self.submit_and_confirm(&transaction).await
    }

    /// Transfer `amount` units of `mint` from `sender` to an opted-in
    /// `recipient` wallet
    pub async fn transfer(
        &self,
        sender: &Keypair,
        recipient: &Pubkey,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<Receipt, TokenError> {
        let instruction = build_transfer_instruction(&sender.pubkey(), recipient, mint, amount)?;

        let blockhash = self.client.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&sender.pubkey()),
            &[sender],
            blockhash,
        );

        tracing::info!(
            "Transferring {} units of {} from {} to {}",
            amount,
            mint,
            sender.pubkey(),
            recipient
        );
        self.submit_and_confirm(&transaction).await
    }

    /// Look up `wallet`'s holding of `mint`
    pub async fn holding(&self, wallet: &Pubkey, mint: &Pubkey) -> Result<TokenHolding, TokenError> {
        let token_account = get_associated_token_address(wallet, mint);
        let amount = self.client.token_account_balance(&token_account).await?;
        Ok(TokenHolding {
            token_account,
            amount,
        })
    }

    async fn submit_and_confirm(&self, transaction: &Transaction) -> Result<Receipt, TokenError> {
        let id = self.client.send_transaction(transaction).await?;
        let confirmation =
            await_confirmation(self.client.as_ref(), &id, self.confirmation_rounds).await?;
        Ok(Receipt { id, confirmation })
    }
}

/// Instructions for a single-transaction token creation
pub fn build_create_token_instructions(
    creator: &Pubkey,
    mint: &Pubkey,
    decimals: u8,
    initial_supply: u64,
    mint_rent: u64,
) -> Result<Vec<Instruction>, TokenError> {
    let creator_token_account = get_associated_token_address(creator, mint);

    Ok(vec![
        system_instruction::create_account(
            creator,
            mint,
            mint_rent,
            Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint(&spl_token::id(), mint, creator, Some(creator), decimals)
            .map_err(|e| TokenError::Instruction(e.to_string()))?,
        create_associated_token_account(creator, creator, mint, &spl_token::id()),
        spl_token::instruction::mint_to(
            &spl_token::id(),
            mint,
            &creator_token_account,
            creator,
            &[],
            initial_supply,
        )
        .map_err(|e| TokenError::Instruction(e.to_string()))?,
    ])
}

/// Instruction creating `wallet`'s associated token account for `mint`
pub fn build_opt_in_instruction(wallet: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account(wallet, wallet, mint, &spl_token::id())
}

/// Instruction moving `amount` units between the two associated accounts
pub fn build_transfer_instruction(
    sender: &Pubkey,
    recipient: &Pubkey,
    mint: &Pubkey,
    amount: u64,
) -> Result<Instruction, TokenError> {
    let source = get_associated_token_address(sender, mint);
    let destination = get_associated_token_address(recipient, mint);

    spl_token::instruction::transfer(&spl_token::id(), &source, &destination, sender, &[], amount)
        .map_err(|e| TokenError::Instruction(e.to_string()))
}

/// Error types for token workflows
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("instruction build failed: {0}")]
    Instruction(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Confirm(#[from] ConfirmError),
}
