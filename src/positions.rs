// src/positions.rs
use alloy::primitives::{Address, U256};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::abi::{IUniswapV2Factory, IUniswapV2Pair, IERC20};
use crate::cache::StateCache;
use crate::chain::{call_contract, ChainClient};
use crate::error::{OperationContext, Result};
use crate::models::{LiquidityPosition, TokenPosition};
use crate::units;

/// Balance and metadata of `token` held by `owner`.
pub async fn get_token_position<C: ChainClient>(
    chain: &C,
    owner: Address,
    token: Address,
) -> Result<TokenPosition> {
    read_position(chain, owner, token)
        .await
        .operation("Failed to get token position")
}

async fn read_position<C: ChainClient>(
    chain: &C,
    owner: Address,
    token: Address,
) -> Result<TokenPosition> {
    let raw_balance = call_contract(chain, token, IERC20::balanceOfCall { owner }).await?;
    let decimals = call_contract(chain, token, IERC20::decimalsCall {}).await?;
    let symbol = call_contract(chain, token, IERC20::symbolCall {}).await?;
    let name = call_contract(chain, token, IERC20::nameCall {}).await?;

    debug!("{} balance of {}: {} (raw)", symbol, owner, raw_balance);

    Ok(TokenPosition {
        symbol,
        name,
        contract_address: token,
        display_balance: units::to_display(raw_balance, decimals),
        raw_balance,
        decimals,
        observed_at: Utc::now(),
    })
}

/// Scan `tokens` one at a time and keep the non-zero balances.
///
/// A token whose lookup fails is logged and left out. The result replaces the
/// cached positions of `owner`.
pub async fn fetch_positions<C: ChainClient>(
    chain: &C,
    owner: Address,
    tokens: &[Address],
    cache: &mut StateCache,
) -> Vec<TokenPosition> {
    let mut positions = Vec::new();

    for &token in tokens {
        match get_token_position(chain, owner, token).await {
            Ok(position) if position.raw_balance.is_zero() => {}
            Ok(position) => positions.push(position),
            Err(e) => warn!("Error fetching position for {}: {}", token, e),
        }
    }

    info!(
        "Found {} non-zero positions for {} across {} tokens",
        positions.len(),
        owner,
        tokens.len()
    );

    cache.store_positions(owner, positions.clone());
    positions
}

/// Uniswap V2 LP holding of `owner` in the `token_a`/`token_b` pool.
///
/// `None` when the factory has no pair for the two tokens.
pub async fn get_liquidity_position<C: ChainClient>(
    chain: &C,
    factory: Address,
    owner: Address,
    token_a: Address,
    token_b: Address,
) -> Result<Option<LiquidityPosition>> {
    read_liquidity_position(chain, factory, owner, token_a, token_b)
        .await
        .operation("Failed to get liquidity position")
}

async fn read_liquidity_position<C: ChainClient>(
    chain: &C,
    factory: Address,
    owner: Address,
    token_a: Address,
    token_b: Address,
) -> Result<Option<LiquidityPosition>> {
    let pair = call_contract(
        chain,
        factory,
        IUniswapV2Factory::getPairCall {
            tokenA: token_a,
            tokenB: token_b,
        },
    )
    .await?;

    if pair.is_zero() {
        debug!("No pair for {} / {}", token_a, token_b);
        return Ok(None);
    }

    let reserves = call_contract(chain, pair, IUniswapV2Pair::getReservesCall {}).await?;
    let token0 = call_contract(chain, pair, IUniswapV2Pair::token0Call {}).await?;
    let token1 = call_contract(chain, pair, IUniswapV2Pair::token1Call {}).await?;
    let lp_balance = call_contract(chain, pair, IERC20::balanceOfCall { owner }).await?;
    let total_supply = call_contract(chain, pair, IERC20::totalSupplyCall {}).await?;

    Ok(Some(LiquidityPosition {
        pair_address: pair,
        token0,
        token1,
        reserve0: U256::from(reserves.reserve0),
        reserve1: U256::from(reserves.reserve1),
        lp_balance,
        total_supply,
        share: pool_share(lp_balance, total_supply),
        observed_at: Utc::now(),
    }))
}

/// `lp_balance / total_supply` scaled by 1e18, zero for an empty pool.
pub fn pool_share(lp_balance: U256, total_supply: U256) -> U256 {
    if total_supply.is_zero() {
        return U256::ZERO;
    }
    let one = U256::from(1_000_000_000_000_000_000u64);
    lp_balance.saturating_mul(one) / total_supply
}
