// src/approvals.rs
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::abi::IERC20;
use crate::cache::StateCache;
use crate::chain::{call_contract, ChainClient};
use crate::error::{OperationContext, Result};
use crate::models::{Approval, OutcomeDetails, TransactionOutcome};
use crate::registry;
use crate::signer::TxSigner;
use crate::transaction::{self, ContractCall, TxOptions, APPROVE_GAS_LIMIT};
use crate::units;

/// Allowance of `spender` over `owner`'s `token`, classified.
pub async fn get_token_approval<C: ChainClient>(
    chain: &C,
    owner: Address,
    token: Address,
    spender: Address,
) -> Result<Approval> {
    read_approval(chain, owner, token, spender)
        .await
        .operation("Failed to get token approval")
}

async fn read_approval<C: ChainClient>(
    chain: &C,
    owner: Address,
    token: Address,
    spender: Address,
) -> Result<Approval> {
    let raw_allowance =
        call_contract(chain, token, IERC20::allowanceCall { owner, spender }).await?;
    let decimals = call_contract(chain, token, IERC20::decimalsCall {}).await?;
    let token_symbol = call_contract(chain, token, IERC20::symbolCall {}).await?;

    Ok(Approval {
        token_symbol,
        token_address: token,
        spender_address: spender,
        spender_name: registry::router_name(spender).map(str::to_string),
        display_allowance: units::to_display(raw_allowance, decimals),
        raw_allowance,
        decimals,
        is_unlimited: units::is_unlimited(raw_allowance),
        observed_at: Utc::now(),
    })
}

/// Allowances of `owner`'s `token`.
///
/// With a `spender` only that allowance is read and any failure is returned.
/// Without one every registered router is checked and routers that fail are
/// logged and skipped. The result replaces the cached entry for `(token, owner)`.
pub async fn fetch_approvals<C: ChainClient>(
    chain: &C,
    owner: Address,
    token: Address,
    spender: Option<Address>,
    cache: &mut StateCache,
) -> Result<Vec<Approval>> {
    let mut approvals = Vec::new();

    match spender {
        Some(spender) => {
            let approval = get_token_approval(chain, owner, token, spender)
                .await
                .operation("Failed to fetch approvals")?;
            approvals.push(approval);
        }
        None => {
            for (name, router) in registry::ROUTERS {
                match get_token_approval(chain, owner, token, router).await {
                    Ok(approval) => approvals.push(approval),
                    Err(e) => warn!("Error checking approval for {}: {}", name, e),
                }
            }
        }
    }

    cache.store_approvals(token, owner, approvals.clone());
    Ok(approvals)
}

/// Whether `spender` may move any of `owner`'s `token` at all.
pub async fn check_approval<C: ChainClient>(
    chain: &C,
    owner: Address,
    token: Address,
    spender: Address,
) -> Result<bool> {
    let allowance = call_contract(chain, token, IERC20::allowanceCall { owner, spender })
        .await
        .operation("Failed to check approval")?;
    Ok(!allowance.is_zero())
}

/// On-chain value for an approval: `None` is unlimited (`U256::MAX`).
pub fn approval_amount(amount: Option<Decimal>, decimals: u8) -> Result<U256> {
    match amount {
        None => Ok(U256::MAX),
        Some(amount) => units::to_base_units(amount, decimals),
    }
}

/// Let `spender` move up to `amount` of the signer's `token` and wait for the receipt.
pub async fn approve_token<C: ChainClient>(
    chain: &C,
    signer: &TxSigner,
    token: Address,
    spender: Address,
    amount: Option<Decimal>,
    opts: &TxOptions,
) -> Result<TransactionOutcome> {
    send_approval(chain, signer, token, spender, amount, opts)
        .await
        .operation("Failed to approve token")
}

async fn send_approval<C: ChainClient>(
    chain: &C,
    signer: &TxSigner,
    token: Address,
    spender: Address,
    amount: Option<Decimal>,
    opts: &TxOptions,
) -> Result<TransactionOutcome> {
    let decimals = call_contract(chain, token, IERC20::decimalsCall {}).await?;
    let symbol = call_contract(chain, token, IERC20::symbolCall {}).await?;

    let value = approval_amount(amount, decimals)?;
    let amount_label = amount.map_or_else(|| "unlimited".to_string(), |a| a.to_string());

    info!(
        "Approving {} {} for spender {}",
        amount_label, symbol, spender
    );

    let call = ContractCall {
        to: token,
        input: Bytes::from(IERC20::approveCall { spender, amount: value }.abi_encode()),
        gas_limit: APPROVE_GAS_LIMIT,
    };
    let receipt = transaction::submit(chain, signer, call, opts).await?;

    Ok(TransactionOutcome {
        success: receipt.status,
        transaction_hash: format!("0x{}", hex::encode(receipt.transaction_hash)),
        gas_used: receipt.gas_used,
        details: OutcomeDetails::Approval {
            token: symbol,
            spender,
            amount: amount_label,
        },
    })
}

/// Set the allowance of `spender` back to zero.
pub async fn revoke_approval<C: ChainClient>(
    chain: &C,
    signer: &TxSigner,
    token: Address,
    spender: Address,
    opts: &TxOptions,
) -> Result<TransactionOutcome> {
    approve_token(chain, signer, token, spender, Some(Decimal::ZERO), opts).await
}
