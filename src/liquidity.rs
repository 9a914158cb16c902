// src/liquidity.rs
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::abi::{IUniswapV2Router02, IERC20};
use crate::chain::{call_contract, ChainClient};
use crate::error::{OperationContext, Result};
use crate::models::{OutcomeDetails, TransactionOutcome};
use crate::signer::TxSigner;
use crate::transaction::{self, ContractCall, TxOptions, ADD_LIQUIDITY_GAS_LIMIT};
use crate::units;

pub const DEFAULT_SLIPPAGE_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
pub const DEFAULT_DEADLINE_SECS: u64 = 1200;

/// Per-call settings for `add_liquidity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidityParams {
    pub router: Address,
    /// Percent, so `0.5` is half a percent.
    pub slippage_pct: Decimal,
    pub deadline_secs: u64,
}

/// Base-unit amounts submitted to `addLiquidity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityPlan {
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub deadline: U256,
}

pub fn plan_add_liquidity(
    amount_a: Decimal,
    decimals_a: u8,
    amount_b: Decimal,
    decimals_b: u8,
    slippage_pct: Decimal,
    now_secs: u64,
    deadline_secs: u64,
) -> Result<LiquidityPlan> {
    let amount_a_desired = units::to_base_units(amount_a, decimals_a)?;
    let amount_b_desired = units::to_base_units(amount_b, decimals_b)?;

    Ok(LiquidityPlan {
        amount_a_desired,
        amount_b_desired,
        amount_a_min: units::apply_slippage(amount_a_desired, slippage_pct)?,
        amount_b_min: units::apply_slippage(amount_b_desired, slippage_pct)?,
        deadline: units::deadline(now_secs, deadline_secs),
    })
}

/// Deposit `amount_a` of `token_a` and `amount_b` of `token_b` through the router.
#[allow(clippy::too_many_arguments)]
pub async fn add_liquidity<C: ChainClient>(
    chain: &C,
    signer: &TxSigner,
    token_a: Address,
    token_b: Address,
    amount_a: Decimal,
    amount_b: Decimal,
    params: &LiquidityParams,
    opts: &TxOptions,
) -> Result<TransactionOutcome> {
    send_add_liquidity(chain, signer, token_a, token_b, amount_a, amount_b, params, opts)
        .await
        .operation("Failed to add liquidity")
}

#[allow(clippy::too_many_arguments)]
async fn send_add_liquidity<C: ChainClient>(
    chain: &C,
    signer: &TxSigner,
    token_a: Address,
    token_b: Address,
    amount_a: Decimal,
    amount_b: Decimal,
    params: &LiquidityParams,
    opts: &TxOptions,
) -> Result<TransactionOutcome> {
    let decimals_a = call_contract(chain, token_a, IERC20::decimalsCall {}).await?;
    let decimals_b = call_contract(chain, token_b, IERC20::decimalsCall {}).await?;

    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    let plan = plan_add_liquidity(
        amount_a,
        decimals_a,
        amount_b,
        decimals_b,
        params.slippage_pct,
        now,
        params.deadline_secs,
    )?;

    info!(
        "Adding liquidity {} / {} via router {} (slippage {}%)",
        amount_a, amount_b, params.router, params.slippage_pct
    );

    let input = IUniswapV2Router02::addLiquidityCall {
        tokenA: token_a,
        tokenB: token_b,
        amountADesired: plan.amount_a_desired,
        amountBDesired: plan.amount_b_desired,
        amountAMin: plan.amount_a_min,
        amountBMin: plan.amount_b_min,
        to: signer.address(),
        deadline: plan.deadline,
    }
    .abi_encode();

    let call = ContractCall {
        to: params.router,
        input: Bytes::from(input),
        gas_limit: ADD_LIQUIDITY_GAS_LIMIT,
    };
    let receipt = transaction::submit(chain, signer, call, opts).await?;

    Ok(TransactionOutcome {
        success: receipt.status,
        transaction_hash: format!("0x{}", hex::encode(receipt.transaction_hash)),
        gas_used: receipt.gas_used,
        details: OutcomeDetails::Liquidity {
            token_a,
            token_b,
            amount_a,
            amount_b,
        },
    })
}

/// Router quote for swapping `amount_in` along `path`, one amount per hop.
pub async fn get_amounts_out<C: ChainClient>(
    chain: &C,
    router: Address,
    amount_in: U256,
    path: &[Address],
) -> Result<Vec<U256>> {
    let call = IUniswapV2Router02::getAmountsOutCall {
        amountIn: amount_in,
        path: path.to_vec(),
    };
    call_contract(chain, router, call)
        .await
        .operation("Failed to get amounts out")
}
