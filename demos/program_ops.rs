//! Program operations demo
//!
//! Calls a deployed program and reads account state back. Defaults to the
//! memo program with a one-byte payload; override with environment
//! variables to exercise your own program:
//!
//! - `ROUNDTRIP_PROGRAM_ID`: program to call / inspect
//! - `ROUNDTRIP_CALL_DATA`: hex instruction data (default "41")
//! - `ROUNDTRIP_BUFFER` + `ROUNDTRIP_SPILL`: run an upgrade from a buffer
//! - `ROUNDTRIP_CLOSE_TARGET` + `ROUNDTRIP_CLOSE_RECIPIENT`: close a
//!   loader account

use std::env;
use std::str::FromStr;

use roundtrip::{RoundtripSDK, Settings};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

/// Memo program, deployed on every public cluster
const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

fn pubkey_from_env(var: &str) -> anyhow::Result<Option<Pubkey>> {
    match env::var(var) {
        Ok(value) => Ok(Some(Pubkey::from_str(&value)?)),
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::load()?;
    let sdk = RoundtripSDK::new(&settings);
    info!("Connected to {}", settings.rpc_url);

    let program_id =
        pubkey_from_env("ROUNDTRIP_PROGRAM_ID")?.unwrap_or(Pubkey::from_str(MEMO_PROGRAM_ID)?);
    let data = hex::decode(env::var("ROUNDTRIP_CALL_DATA").unwrap_or_else(|_| "41".to_string()))?;

    let caller = sdk.generate_account();
    info!("Requesting airdrop for caller {}...", caller.address());
    sdk.fund(&caller.address(), LAMPORTS_PER_SOL).await?;

    // Call the program
    info!("📞 Calling program {} with {} data bytes", program_id, data.len());
    let receipt = sdk
        .call_program(caller.keypair(), &program_id, Vec::new(), data)
        .await?;
    info!(
        "✅ Call {} confirmed in round {}",
        receipt.id.short(),
        receipt.confirmation.round
    );

    // Read the program account back
    let state = sdk.read_state(&program_id).await?;
    info!(
        "🔎 {}: owner {}, {} lamports, executable: {}",
        state.address, state.owner, state.lamports, state.executable
    );
    info!("   data: {}", state.data_preview());

    // Optional: upgrade from a staged buffer
    if let (Some(buffer), Some(spill)) = (
        pubkey_from_env("ROUNDTRIP_BUFFER")?,
        pubkey_from_env("ROUNDTRIP_SPILL")?,
    ) {
        info!("⬆️  Upgrading {} from buffer {}", program_id, buffer);
        let receipt = sdk
            .upgrade_program(caller.keypair(), &program_id, &buffer, &spill)
            .await?;
        info!("✅ Upgrade confirmed in round {}", receipt.confirmation.round);
    }

    // Optional: close a loader account and reclaim its lamports
    if let (Some(target), Some(recipient)) = (
        pubkey_from_env("ROUNDTRIP_CLOSE_TARGET")?,
        pubkey_from_env("ROUNDTRIP_CLOSE_RECIPIENT")?,
    ) {
        info!("🗑️  Closing {} to {}", target, recipient);
        let receipt = sdk
            .close_program(caller.keypair(), &target, &recipient)
            .await?;
        info!("✅ Close confirmed in round {}", receipt.confirmation.round);
    }

    Ok(())
}
