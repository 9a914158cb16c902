use std::env;

use alloy::primitives::Address;
use anyhow::Context;
use dex_wallet::{config, registry, Dex, Exchange};
use tracing_subscriber::EnvFilter;

const DEFAULT_ACCOUNTS: [&str; 2] = [
    "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
    "0x28C6c06298d514Db089934071355E5743bf21d60",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cfg = config::load()?;
    let usdc = registry::token_address("USDC").context("USDC missing from token registry")?;

    let args: Vec<String> = env::args().skip(1).collect();
    let accounts: Vec<String> = if args.is_empty() {
        DEFAULT_ACCOUNTS.iter().map(|a| a.to_string()).collect()
    } else {
        args
    };

    let mut dex = Dex::connect(&cfg)?;

    for raw in &accounts {
        let account: Address = raw.parse().with_context(|| format!("bad address {raw}"))?;
        dex.set_account(account);
        println!("== {account}");

        match dex.fetch_balance().await {
            Ok(balances) => {
                for (symbol, balance) in &balances {
                    println!("  {symbol}: {}", balance.total);
                }
            }
            Err(e) => eprintln!("  balance error: {e}"),
        }

        let approvals = match dex.fetch_approvals(usdc, None).await {
            Ok(approvals) => approvals,
            Err(e) => {
                eprintln!("  approval error: {e}");
                continue;
            }
        };
        println!("  {} USDC router approvals", approvals.len());
        for approval in approvals {
            let amount = if approval.is_unlimited {
                "UNLIMITED".to_string()
            } else {
                approval.display_allowance.to_string()
            };
            println!(
                "  {} ({}): {}",
                approval.spender_name.as_deref().unwrap_or("unknown"),
                approval.spender_address,
                amount
            );
        }
    }

    Ok(())
}
