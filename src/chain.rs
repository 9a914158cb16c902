// src/chain.rs
use std::future::Future;
use std::time::Duration;

use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{PendingTransactionBuilder, Provider, RootProvider};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::http::Http;
use reqwest::{Client, Url};

use crate::error::{DexError, Result};

/// Outcome of a mined transaction, as reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub status: bool,
    pub gas_used: u64,
}

/// The JSON-RPC surface this client depends on.
///
/// Every method is one round-trip; callers await them one after another.
pub trait ChainClient: Send + Sync {
    fn chain_id(&self) -> impl Future<Output = Result<u64>> + Send;

    /// `eth_call` against `to` with ABI-encoded `input`.
    fn call(&self, to: Address, input: Bytes) -> impl Future<Output = Result<Bytes>> + Send;

    fn gas_price(&self) -> impl Future<Output = Result<u128>> + Send;

    /// Next nonce for `account`.
    fn transaction_count(&self, account: Address) -> impl Future<Output = Result<u64>> + Send;

    /// Broadcast a signed EIP-2718 transaction and return its hash.
    fn send_raw_transaction(&self, raw: Bytes) -> impl Future<Output = Result<B256>> + Send;

    /// Block until `hash` is mined, failing once `timeout` elapses.
    fn wait_for_receipt(
        &self,
        hash: B256,
        timeout: Duration,
    ) -> impl Future<Output = Result<Receipt>> + Send;
}

/// [`ChainClient`] over an HTTP JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcChain {
    provider: RootProvider,
    rpc_url: Url,
}

impl RpcChain {
    /// Build the HTTP transport. No request is sent until the first call.
    ///
    /// `poll_interval` paces receipt polling while waiting for a transaction.
    pub fn connect(rpc_url: &str, timeout: Duration, poll_interval: Duration) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| DexError::Config(format!("invalid RPC URL '{rpc_url}': {e}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DexError::Config(format!("failed to build HTTP client: {e}")))?;

        let transport = Http::with_client(http, url.clone());
        let client = RpcClient::new(transport, false).with_poll_interval(poll_interval);
        let provider = RootProvider::new(client);

        Ok(Self {
            provider,
            rpc_url: url,
        })
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }
}

impl ChainClient for RpcChain {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| DexError::rpc(format!("eth_chainId failed: {e}")))
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(input);
        self.provider
            .call(tx)
            .await
            .map_err(|e| DexError::rpc(format!("eth_call to {to} failed: {e}")))
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| DexError::rpc(format!("eth_gasPrice failed: {e}")))
    }

    async fn transaction_count(&self, account: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(account)
            .await
            .map_err(|e| DexError::rpc(format!("eth_getTransactionCount failed: {e}")))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| DexError::rpc(format!("eth_sendRawTransaction failed: {e}")))?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: B256, timeout: Duration) -> Result<Receipt> {
        let receipt = PendingTransactionBuilder::new(self.provider.clone(), hash)
            .with_timeout(Some(timeout))
            .get_receipt()
            .await
            .map_err(|e| {
                DexError::transaction(format!(
                    "transaction {hash} not mined after {}s: {e}",
                    timeout.as_secs()
                ))
            })?;

        Ok(Receipt {
            transaction_hash: receipt.transaction_hash(),
            status: receipt.status(),
            gas_used: receipt.gas_used(),
        })
    }
}

/// Encode `call`, run it with `eth_call` and decode the return value.
pub async fn call_contract<C, T>(chain: &C, to: Address, call: T) -> Result<T::Return>
where
    C: ChainClient,
    T: SolCall + Send,
{
    let input = Bytes::from(call.abi_encode());
    let output = chain.call(to, input).await?;

    T::abi_decode_returns(&output)
        .map_err(|e| DexError::Decode(format!("{} on {to}: {e}", T::SIGNATURE)))
}
