//! Payment demo
//!
//! Creates two accounts, funds the sender from the cluster faucet, pays the
//! recipient, and waits for confirmation before printing both balances.

use roundtrip::{RoundtripSDK, Settings};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use tracing::info;

/// Lamports moved by the demo payment
const PAYMENT_LAMPORTS: u64 = 1_000_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::load()?;
    let sdk = RoundtripSDK::new(&settings);
    info!("Connected to {}", settings.rpc_url);

    let sender = sdk.generate_account();
    info!("Sender: {}", sender.address());

    let recipient = sdk.generate_account();
    info!("Recipient: {}", recipient.address());

    info!("Requesting airdrop for sender...");
    let funded = sdk.fund(&sender.address(), 2 * LAMPORTS_PER_SOL).await?;
    info!("Airdrop confirmed in round {}", funded.confirmation.round);

    let sender_balance = sdk.balance(&sender.address()).await?;
    info!("Sender balance: {} lamports", sender_balance);

    let receipt = sdk
        .pay(sender.keypair(), &recipient.address(), PAYMENT_LAMPORTS)
        .await?;
    info!(
        "✅ Transaction {} confirmed in round {}",
        receipt.id,
        receipt.confirmation.round
    );

    let sender_balance = sdk.balance(&sender.address()).await?;
    info!("Sender balance: {} lamports", sender_balance);

    let recipient_balance = sdk.balance(&recipient.address()).await?;
    info!("Recipient balance: {} lamports", recipient_balance);

    Ok(())
}
