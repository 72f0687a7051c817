//! Account management for Roundtrip
//!
//! Locally held keypairs: generation, secret export, and restore. The
//! secret travels as a base58 string of the 64-byte keypair, the same form
//! wallet tooling expects.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use thiserror::Error;

/// A locally held account: ed25519 keypair plus conveniences
#[derive(Debug)]
pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    /// Generate a fresh account
    pub fn generate() -> Self {
        let keypair = Keypair::new();
        tracing::info!("Generated account {}", keypair.pubkey());
        Self { keypair }
    }

    /// Restore an account from a base58 encoded secret
    pub fn restore(secret: &str) -> Result<Self, AccountError> {
        let bytes = bs58::decode(secret)
            .into_vec()
            .map_err(|e| AccountError::InvalidSecret(format!("not base58: {}", e)))?;

        let keypair = Keypair::try_from(&bytes[..])
            .map_err(|e| AccountError::InvalidSecret(format!("not a keypair: {}", e)))?;

        Ok(Self { keypair })
    }

    /// On-ledger address of this account
    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Signing key, for transaction assembly
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Secret as a base58 string; treat the result like the key itself
    pub fn export_secret(&self) -> String {
        bs58::encode(self.keypair.to_bytes()).into_string()
    }
}

impl From<Keypair> for Wallet {
    fn from(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

/// Error types for account operations
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid secret: {0}")]
    InvalidSecret(String),
}
