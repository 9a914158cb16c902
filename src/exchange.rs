// src/exchange.rs
use std::future::Future;

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use rust_decimal::Decimal;
use tracing::info;

use crate::approvals;
use crate::cache::StateCache;
use crate::chain::{ChainClient, RpcChain};
use crate::config::DexConfig;
use crate::error::{DexError, Result};
use crate::liquidity::{self, LiquidityParams};
use crate::models::{
    Approval, Balance, BalanceSheet, LiquidityPosition, Market, Order, OrderSide, OrderType,
    TokenPosition, TransactionOutcome,
};
use crate::positions;
use crate::registry;
use crate::signer::TxSigner;
use crate::transaction::TxOptions;

/// Capabilities of a trading venue.
///
/// Venues that cannot offer a capability return [`DexError::NotSupported`].
pub trait Exchange {
    fn load_markets(&mut self, reload: bool) -> impl Future<Output = Result<Vec<Market>>> + Send;

    fn fetch_balance(&mut self) -> impl Future<Output = Result<BalanceSheet>> + Send;

    fn create_order(
        &mut self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: Decimal,
        price: Option<Decimal>,
    ) -> impl Future<Output = Result<Order>> + Send;
}

/// Wallet-centric client for token positions, approvals and liquidity.
#[derive(Debug)]
pub struct Dex<C> {
    chain: C,
    signer: Option<TxSigner>,
    account: Option<Address>,
    poa: bool,
    slippage_pct: Decimal,
    deadline_secs: u64,
    tx_options: TxOptions,
    cache: StateCache,
}

impl Dex<RpcChain> {
    /// Connect to `config.rpc_url` over HTTP.
    pub fn connect(config: &DexConfig) -> Result<Self> {
        let chain = RpcChain::connect(
            &config.rpc_url,
            config.rpc_timeout(),
            config.receipt_poll_interval(),
        )?;
        Self::new(chain, config)
    }
}

impl<C: ChainClient> Dex<C> {
    pub fn new(chain: C, config: &DexConfig) -> Result<Self> {
        let signer = config
            .private_key
            .as_deref()
            .map(TxSigner::from_hex)
            .transpose()?;
        let account = signer.as_ref().map(TxSigner::address);

        match account {
            Some(addr) => info!("Wallet {} configured (poa: {})", addr, config.poa),
            None => info!("No private key configured, running read-only (poa: {})", config.poa),
        }

        Ok(Self {
            chain,
            signer,
            account,
            poa: config.poa,
            slippage_pct: config.slippage_pct,
            deadline_secs: config.deadline_secs,
            tx_options: config.tx_options(),
            cache: StateCache::new(),
        })
    }

    /// Read positions and approvals of `account` instead of the signer's.
    pub fn with_account(mut self, account: Address) -> Self {
        self.set_account(account);
        self
    }

    pub fn set_account(&mut self, account: Address) {
        self.account = Some(account);
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(TxSigner::address)
    }

    pub fn is_poa(&self) -> bool {
        self.poa
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut StateCache {
        &mut self.cache
    }

    fn require_account(&self) -> Result<Address> {
        self.account
            .ok_or_else(|| DexError::Config("Wallet not configured".into()))
    }

    fn require_signer(&self) -> Result<&TxSigner> {
        self.signer
            .as_ref()
            .ok_or_else(|| DexError::Config("Private key not configured".into()))
    }

    /// Tokens considered part of the wallet: the static registry.
    pub fn get_wallet_tokens(&self) -> Vec<Address> {
        registry::token_addresses()
    }

    /// Non-zero positions of the configured account over `tokens` (default: registry).
    pub async fn fetch_positions(&mut self, tokens: Option<&[Address]>) -> Result<Vec<TokenPosition>> {
        let owner = self.require_account()?;
        let registry_tokens;
        let tokens = match tokens {
            Some(tokens) => tokens,
            None => {
                registry_tokens = registry::token_addresses();
                &registry_tokens
            }
        };

        Ok(positions::fetch_positions(&self.chain, owner, tokens, &mut self.cache).await)
    }

    pub async fn get_token_position(&self, owner: Address, token: Address) -> Result<TokenPosition> {
        positions::get_token_position(&self.chain, owner, token).await
    }

    /// Uniswap V2 LP position of the configured account.
    pub async fn get_liquidity_position(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<LiquidityPosition>> {
        let owner = self.require_account()?;
        positions::get_liquidity_position(
            &self.chain,
            registry::UNISWAP_V2_FACTORY,
            owner,
            token_a,
            token_b,
        )
        .await
    }

    /// Allowances of the configured account on `token`, for `spender` or every router.
    pub async fn fetch_approvals(
        &mut self,
        token: Address,
        spender: Option<Address>,
    ) -> Result<Vec<Approval>> {
        let owner = self.require_account()?;
        approvals::fetch_approvals(&self.chain, owner, token, spender, &mut self.cache).await
    }

    pub async fn get_token_approval(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
    ) -> Result<Approval> {
        approvals::get_token_approval(&self.chain, owner, token, spender).await
    }

    pub async fn check_approval(&self, token: Address, spender: Address) -> Result<bool> {
        let owner = self.require_account()?;
        approvals::check_approval(&self.chain, owner, token, spender).await
    }

    /// Approve `spender` for `amount` display units of `token`; `None` is unlimited.
    pub async fn approve_token(
        &self,
        token: Address,
        spender: Address,
        amount: Option<Decimal>,
    ) -> Result<TransactionOutcome> {
        let signer = self.require_signer()?;
        approvals::approve_token(&self.chain, signer, token, spender, amount, &self.tx_options)
            .await
    }

    pub async fn revoke_approval(&self, token: Address, spender: Address) -> Result<TransactionOutcome> {
        let signer = self.require_signer()?;
        approvals::revoke_approval(&self.chain, signer, token, spender, &self.tx_options).await
    }

    /// Configured slippage and deadline against the default router.
    pub fn liquidity_params(&self) -> LiquidityParams {
        LiquidityParams {
            router: registry::default_router(),
            slippage_pct: self.slippage_pct,
            deadline_secs: self.deadline_secs,
        }
    }

    pub async fn add_liquidity(
        &self,
        token_a: Address,
        token_b: Address,
        amount_a: Decimal,
        amount_b: Decimal,
        params: Option<LiquidityParams>,
    ) -> Result<TransactionOutcome> {
        let signer = self.require_signer()?;
        let params = params.unwrap_or_else(|| self.liquidity_params());
        liquidity::add_liquidity(
            &self.chain,
            signer,
            token_a,
            token_b,
            amount_a,
            amount_b,
            &params,
            &self.tx_options,
        )
        .await
    }

    pub async fn get_amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        liquidity::get_amounts_out(&self.chain, registry::default_router(), amount_in, path).await
    }
}

impl<C: ChainClient> Exchange for Dex<C> {
    async fn load_markets(&mut self, _reload: bool) -> Result<Vec<Market>> {
        Err(DexError::NotSupported("load_markets"))
    }

    /// Registry positions of the configured account as free balances.
    async fn fetch_balance(&mut self) -> Result<BalanceSheet> {
        let positions = self.fetch_positions(None).await?;

        Ok(positions
            .into_iter()
            .map(|position| {
                let balance = Balance {
                    free: position.display_balance.clone(),
                    used: BigDecimal::from(0),
                    total: position.display_balance,
                };
                (position.symbol, balance)
            })
            .collect())
    }

    async fn create_order(
        &mut self,
        _symbol: &str,
        _order_type: OrderType,
        _side: OrderSide,
        _amount: Decimal,
        _price: Option<Decimal>,
    ) -> Result<Order> {
        Err(DexError::NotSupported("create_order"))
    }
}
