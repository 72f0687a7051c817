//! Token lifecycle demo
//!
//! The full arc: create a token with its supply parked at the creator, opt
//! a second wallet in, transfer some units across, and print both holdings
//! after every step.

use roundtrip::{RoundtripSDK, Settings, Wallet};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

/// Total supply of the demo token
const TOTAL_SUPPLY: u64 = 100;

/// Units transferred to the second wallet
const TRANSFER_AMOUNT: u64 = 20;

/// Print a wallet's holding of the demo token
async fn print_holding(sdk: &RoundtripSDK, wallet: &Pubkey, mint: &Pubkey) -> anyhow::Result<()> {
    let holding = sdk.token_holding(wallet, mint).await?;
    info!(
        "   {} holds (account {}): {}",
        wallet,
        holding.token_account,
        serde_json::to_string_pretty(&holding.amount)?
    );
    Ok(())
}

async fn fund(sdk: &RoundtripSDK, wallet: &Wallet) -> anyhow::Result<()> {
    info!("Requesting airdrop for {}...", wallet.address());
    let receipt = sdk.fund(&wallet.address(), LAMPORTS_PER_SOL).await?;
    info!("Airdrop confirmed in round {}", receipt.confirmation.round);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::load()?;
    let sdk = RoundtripSDK::new(&settings);
    info!("Connected to {}", settings.rpc_url);

    let creator = sdk.generate_account();
    let holder = sdk.generate_account();
    fund(&sdk, &creator).await?;
    fund(&sdk, &holder).await?;

    // Creator mints the token for itself
    info!("🪙 Creating token (supply: {})", TOTAL_SUPPLY);
    let creation = sdk.create_token(creator.keypair(), 0, TOTAL_SUPPLY).await?;
    info!(
        "✅ Token {} created in round {}",
        creation.mint, creation.receipt.confirmation.round
    );
    print_holding(&sdk, &creator.address(), &creation.mint).await?;

    // A wallet must opt in before it can receive the token
    info!("🔓 Opting holder in");
    let receipt = sdk.opt_in(holder.keypair(), &creation.mint).await?;
    info!("✅ Opt-in confirmed in round {}", receipt.confirmation.round);
    print_holding(&sdk, &holder.address(), &creation.mint).await?;

    // Move some units across
    info!("➡️  Transferring {} units", TRANSFER_AMOUNT);
    let receipt = sdk
        .transfer_token(
            creator.keypair(),
            &holder.address(),
            &creation.mint,
            TRANSFER_AMOUNT,
        )
        .await?;
    info!("✅ Transfer confirmed in round {}", receipt.confirmation.round);

    print_holding(&sdk, &creator.address(), &creation.mint).await?;
    print_holding(&sdk, &holder.address(), &creation.mint).await?;

    Ok(())
}
