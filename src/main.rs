use std::env;

use alloy::primitives::Address;
use eyre::WrapErr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dex_wallet::{config, registry, Dex};

const DEFAULT_ACCOUNT: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("dex-wallet starting...");

    let cfg = config::load()?;
    let account: Address = env::args()
        .nth(1)
        .as_deref()
        .unwrap_or(DEFAULT_ACCOUNT)
        .parse()
        .wrap_err("account must be a 0x-prefixed address")?;

    let mut dex = Dex::connect(&cfg)?.with_account(account);
    info!("Scanning {} registry tokens for {}", registry::TOKENS.len(), account);

    let positions = dex.fetch_positions(None).await?;
    if positions.is_empty() {
        warn!("No token positions found for {}", account);
    }
    println!("{}", serde_json::to_string_pretty(&positions)?);

    let (weth, usdc) = match (registry::token_address("WETH"), registry::token_address("USDC")) {
        (Some(weth), Some(usdc)) => (weth, usdc),
        _ => eyre::bail!("WETH and USDC missing from token registry"),
    };
    match dex.get_liquidity_position(weth, usdc).await {
        Ok(Some(lp)) => println!("{}", serde_json::to_string_pretty(&lp)?),
        Ok(None) => info!("No WETH/USDC pair found"),
        Err(e) => warn!("LP lookup failed: {}", e),
    }

    info!("dex-wallet done.");
    Ok(())
}
