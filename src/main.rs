//! Roundtrip demonstration
//!
//! Walks the submit-and-confirm workflows end to end against the configured
//! cluster: account creation, funding, a payment, and the wire round trip.

use roundtrip::{transaction, RoundtripSDK, Settings};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("🚀 Starting Roundtrip demonstration...");

    let settings = Settings::load()?;
    info!(
        "⚙️  Using node {} ({} commitment, {} round budget)",
        settings.rpc_url, settings.commitment, settings.confirmation_rounds
    );

    let sdk = RoundtripSDK::new(&settings);

    // Node check
    match sdk.node_status().await {
        Ok(status) => info!("✅ Node reachable, last round {}", status.last_round),
        Err(e) => {
            error!("❌ Node unreachable: {}", e);
            return Err(e.into());
        }
    }

    // Example 1: create and fund an account
    info!("\n👛 Example 1: Creating and funding an account");
    let payer = sdk.generate_account();
    info!("   Account address: {}", payer.address());
    info!("   Account secret:  {}", payer.export_secret());

    match sdk.fund(&payer.address(), 2 * LAMPORTS_PER_SOL).await {
        Ok(receipt) => info!(
            "✅ Airdrop {} confirmed in round {}",
            receipt.id.short(),
            receipt.confirmation.round
        ),
        Err(e) => error!("❌ Airdrop failed (is this a test cluster?): {}", e),
    }

    let balance = sdk.balance(&payer.address()).await?;
    info!(
        "   Balance: {} lamports ({} SOL)",
        balance,
        balance as f64 / LAMPORTS_PER_SOL as f64
    );

    // Example 2: pay a second account and wait for confirmation
    info!("\n💸 Example 2: Payment with confirmation");
    let recipient = sdk.generate_account();
    match sdk
        .pay(payer.keypair(), &recipient.address(), LAMPORTS_PER_SOL / 10)
        .await
    {
        Ok(receipt) => {
            info!(
                "✅ Payment {} confirmed in round {} at {}",
                receipt.id.short(),
                receipt.confirmation.round,
                chrono::Utc::now().format("%H:%M:%S")
            );
            let recipient_balance = sdk.balance(&recipient.address()).await?;
            info!("   Recipient balance: {} lamports", recipient_balance);
        }
        Err(e) => error!("❌ Payment failed: {}", e),
    }

    // Example 3: hand a signed transaction through a string channel
    info!("\n📦 Example 3: Wire round trip");
    let blockhash = sdk.client().latest_blockhash().await?;
    let tx = transaction::build_payment(
        payer.keypair(),
        &recipient.address(),
        LAMPORTS_PER_SOL / 20,
        blockhash,
    );
    let encoded = transaction::export_base64(&tx)?;
    info!("   Encoded transaction: {} chars", encoded.len());

    match sdk.submit_encoded(&encoded).await {
        Ok(receipt) => info!(
            "✅ Imported transaction {} confirmed in round {}",
            receipt.id.short(),
            receipt.confirmation.round
        ),
        Err(e) => error!("❌ Imported transaction failed: {}", e),
    }

    info!("\n🎉 Roundtrip demonstration completed!");

    Ok(())
}
