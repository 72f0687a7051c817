//! Create a fresh local account
//!
//! Generates a keypair, prints its address and exportable secret, and
//! proves the secret restores to the same address. Fund the printed address
//! from a faucet before using it in the other demos.

use roundtrip::Wallet;
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let wallet = Wallet::generate();
    let secret = wallet.export_secret();

    info!("Account address is {}", wallet.address());
    info!("Account secret is {}", secret);

    let restored = Wallet::restore(&secret)?;
    info!("✅ Secret restores to {}", restored.address());
    info!("💡 Set WALLET_PRIVATE_KEY in .env to reuse this account");

    Ok(())
}
