// src/transaction.rs
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use tracing::info;

use crate::chain::{ChainClient, Receipt};
use crate::error::Result;
use crate::signer::TxSigner;

/// Gas limit for a standard ERC20 `approve`.
pub const APPROVE_GAS_LIMIT: u64 = 100_000;
/// Gas limit for a router `addLiquidity`.
pub const ADD_LIQUIDITY_GAS_LIMIT: u64 = 300_000;

/// How long to block for a receipt once a transaction is broadcast.
#[derive(Debug, Clone, Copy)]
pub struct TxOptions {
    pub receipt_timeout: Duration,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            receipt_timeout: Duration::from_secs(120),
        }
    }
}

/// A state-changing contract call ready to be signed.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub to: Address,
    pub input: Bytes,
    pub gas_limit: u64,
}

/// Legacy-priced request from `from`, with the network gas price and next nonce.
pub fn build_request(
    from: Address,
    call: &ContractCall,
    gas_price: u128,
    nonce: u64,
    chain_id: u64,
) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(from)
        .with_to(call.to)
        .with_input(call.input.clone())
        .with_gas_limit(call.gas_limit)
        .with_gas_price(gas_price)
        .with_nonce(nonce)
        .with_chain_id(chain_id)
}

/// Sign, broadcast and block until `call` is mined.
pub async fn submit<C: ChainClient>(
    chain: &C,
    signer: &TxSigner,
    call: ContractCall,
    opts: &TxOptions,
) -> Result<Receipt> {
    let from = signer.address();
    let gas_price = chain.gas_price().await?;
    let nonce = chain.transaction_count(from).await?;
    let chain_id = chain.chain_id().await?;

    let tx = build_request(from, &call, gas_price, nonce, chain_id);
    let raw = signer.sign(tx).await?;
    let hash = chain.send_raw_transaction(raw).await?;

    info!(
        "Broadcast tx {} to {} (nonce {}, gas price {})",
        hash, call.to, nonce, gas_price
    );

    let receipt = chain.wait_for_receipt(hash, opts.receipt_timeout).await?;

    info!(
        "Mined tx {} status={} gas_used={}",
        receipt.transaction_hash, receipt.status, receipt.gas_used
    );

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Receipt;
    use crate::mock::{decode_raw, MockChain, TEST_KEY};
    use alloy::consensus::Transaction;
    use alloy::primitives::address;

    fn call() -> ContractCall {
        ContractCall {
            to: address!("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"),
            input: Bytes::from_static(&[1, 2, 3, 4]),
            gas_limit: APPROVE_GAS_LIMIT,
        }
    }

    #[tokio::test]
    async fn submit_uses_network_gas_price_and_next_nonce() {
        let chain = MockChain::new().with_nonce(12);
        let signer = TxSigner::from_hex(TEST_KEY).unwrap();

        let receipt = submit(&chain, &signer, call(), &TxOptions::default())
            .await
            .unwrap();
        assert!(receipt.status);

        let sent = chain.sent_transactions();
        assert_eq!(sent.len(), 1);
        let envelope = decode_raw(&sent[0]);
        assert_eq!(envelope.nonce(), 12);
        assert_eq!(envelope.gas_price(), Some(MockChain::GAS_PRICE));
        assert_eq!(envelope.gas_limit(), APPROVE_GAS_LIMIT);
        assert_eq!(envelope.chain_id(), Some(MockChain::CHAIN_ID));
    }

    #[tokio::test]
    async fn reverted_receipt_is_returned_not_raised() {
        let chain = MockChain::new().reverting_transactions();
        let signer = TxSigner::from_hex(TEST_KEY).unwrap();

        let receipt: Receipt = submit(&chain, &signer, call(), &TxOptions::default())
            .await
            .unwrap();
        assert!(!receipt.status);
    }

    #[tokio::test]
    async fn missing_receipt_times_out() {
        let chain = MockChain::new().never_mined();
        let signer = TxSigner::from_hex(TEST_KEY).unwrap();
        let opts = TxOptions {
            receipt_timeout: Duration::from_millis(30),
        };

        let err = submit(&chain, &signer, call(), &opts).await.unwrap_err();
        assert!(err.to_string().contains("not mined"));
    }
}
