// src/mock.rs
//! In-memory chain used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::aliases::U112;
use alloy::primitives::{address, keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use tokio::time::sleep;

use crate::abi::{IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02, IERC20};
use crate::chain::{ChainClient, Receipt};
use crate::error::{DexError, Result};
use crate::registry;

/// Well-known development key (first anvil account).
pub const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ACCOUNT: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

#[derive(Debug, Default)]
struct MockToken {
    symbol: String,
    name: String,
    decimals: u8,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    reverts: bool,
}

#[derive(Debug)]
struct MockPair {
    token0: Address,
    token1: Address,
    reserve0: u128,
    reserve1: u128,
}

#[derive(Debug)]
pub struct MockChain {
    tokens: HashMap<Address, MockToken>,
    reverting_spenders: HashSet<Address>,
    pairs: HashMap<Address, MockPair>,
    amounts_out: Vec<U256>,
    nonce: u64,
    tx_status: bool,
    mined: bool,
    calls: Mutex<Vec<Address>>,
    sent: Mutex<Vec<Bytes>>,
}

impl MockChain {
    pub const CHAIN_ID: u64 = 1;
    pub const GAS_PRICE: u128 = 20_000_000_000;
    pub const GAS_USED: u64 = 46_109;

    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
            reverting_spenders: HashSet::new(),
            pairs: HashMap::new(),
            amounts_out: Vec::new(),
            nonce: 0,
            tx_status: true,
            mined: true,
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_token(mut self, token: Address, symbol: &str, name: &str, decimals: u8) -> Self {
        self.tokens.insert(
            token,
            MockToken {
                symbol: symbol.to_string(),
                name: name.to_string(),
                decimals,
                ..Default::default()
            },
        );
        self
    }

    /// A token contract whose every call reverts.
    pub fn with_reverting_token(mut self, token: Address) -> Self {
        self.tokens.insert(
            token,
            MockToken {
                reverts: true,
                ..Default::default()
            },
        );
        self
    }

    pub fn with_balance(mut self, token: Address, owner: Address, amount: U256) -> Self {
        let entry = self.tokens.get_mut(&token).expect("token registered");
        entry.balances.insert(owner, amount);
        entry.total_supply += amount;
        self
    }

    pub fn with_allowance(
        mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Self {
        self.tokens
            .get_mut(&token)
            .expect("token registered")
            .allowances
            .insert((owner, spender), amount);
        self
    }

    /// `allowance(_, spender)` reverts on every token.
    pub fn with_reverting_spender(mut self, spender: Address) -> Self {
        self.reverting_spenders.insert(spender);
        self
    }

    /// Registers a V2 pair with the factory; LP balances go through `with_balance`.
    pub fn with_pair(
        mut self,
        pair: Address,
        token0: Address,
        token1: Address,
        reserves: (u128, u128),
    ) -> Self {
        self.pairs.insert(
            pair,
            MockPair {
                token0,
                token1,
                reserve0: reserves.0,
                reserve1: reserves.1,
            },
        );
        self.with_token(pair, "UNI-V2", "Uniswap V2", 18)
    }

    pub fn with_amounts_out(mut self, amounts: Vec<U256>) -> Self {
        self.amounts_out = amounts;
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn reverting_transactions(mut self) -> Self {
        self.tx_status = false;
        self
    }

    pub fn never_mined(mut self) -> Self {
        self.mined = false;
        self
    }

    /// Targets of every `eth_call`, in order.
    pub fn calls(&self) -> Vec<Address> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_transactions(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }

    /// Decode the calldata of every broadcast transaction as `T`.
    pub fn sent_calls<T: SolCall>(&self) -> Vec<T> {
        self.sent_transactions()
            .iter()
            .map(|raw| T::abi_decode(decode_raw(raw).input()).expect("calldata decodes"))
            .collect()
    }

    fn respond(&self, to: Address, input: &[u8]) -> Result<Bytes> {
        if input.len() < 4 {
            return Err(DexError::rpc("execution reverted"));
        }
        let selector: [u8; 4] = [input[0], input[1], input[2], input[3]];

        if to == registry::UNISWAP_V2_FACTORY
            && selector == IUniswapV2Factory::getPairCall::SELECTOR
        {
            let call = IUniswapV2Factory::getPairCall::abi_decode(input).map_err(decode_err)?;
            let pair = self
                .pairs
                .iter()
                .find(|(_, p)| {
                    (p.token0 == call.tokenA && p.token1 == call.tokenB)
                        || (p.token0 == call.tokenB && p.token1 == call.tokenA)
                })
                .map(|(addr, _)| *addr)
                .unwrap_or(Address::ZERO);
            return Ok(encode::<IUniswapV2Factory::getPairCall>(&pair));
        }

        if registry::router_name(to).is_some()
            && selector == IUniswapV2Router02::getAmountsOutCall::SELECTOR
        {
            return Ok(encode::<IUniswapV2Router02::getAmountsOutCall>(&self.amounts_out));
        }

        if let Some(pair) = self.pairs.get(&to) {
            if selector == IUniswapV2Pair::getReservesCall::SELECTOR {
                let reserves = IUniswapV2Pair::getReservesReturn {
                    reserve0: U112::from(pair.reserve0),
                    reserve1: U112::from(pair.reserve1),
                    blockTimestampLast: 0,
                };
                return Ok(encode::<IUniswapV2Pair::getReservesCall>(&reserves));
            }
            if selector == IUniswapV2Pair::token0Call::SELECTOR {
                return Ok(encode::<IUniswapV2Pair::token0Call>(&pair.token0));
            }
            if selector == IUniswapV2Pair::token1Call::SELECTOR {
                return Ok(encode::<IUniswapV2Pair::token1Call>(&pair.token1));
            }
        }

        // no code at the address: the node answers with empty return data
        let Some(token) = self.tokens.get(&to) else {
            return Ok(Bytes::new());
        };
        if token.reverts {
            return Err(DexError::rpc("execution reverted"));
        }

        if selector == IERC20::balanceOfCall::SELECTOR {
            let call = IERC20::balanceOfCall::abi_decode(input).map_err(decode_err)?;
            let balance = token.balances.get(&call.owner).copied().unwrap_or_default();
            Ok(encode::<IERC20::balanceOfCall>(&balance))
        } else if selector == IERC20::allowanceCall::SELECTOR {
            let call = IERC20::allowanceCall::abi_decode(input).map_err(decode_err)?;
            if self.reverting_spenders.contains(&call.spender) {
                return Err(DexError::rpc("execution reverted"));
            }
            let allowance = token
                .allowances
                .get(&(call.owner, call.spender))
                .copied()
                .unwrap_or_default();
            Ok(encode::<IERC20::allowanceCall>(&allowance))
        } else if selector == IERC20::decimalsCall::SELECTOR {
            Ok(encode::<IERC20::decimalsCall>(&token.decimals))
        } else if selector == IERC20::symbolCall::SELECTOR {
            Ok(encode::<IERC20::symbolCall>(&token.symbol))
        } else if selector == IERC20::nameCall::SELECTOR {
            Ok(encode::<IERC20::nameCall>(&token.name))
        } else if selector == IERC20::totalSupplyCall::SELECTOR {
            Ok(encode::<IERC20::totalSupplyCall>(&token.total_supply))
        } else {
            Err(DexError::rpc("execution reverted"))
        }
    }
}

impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(Self::CHAIN_ID)
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        self.calls.lock().unwrap().push(to);
        self.respond(to, &input)
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(Self::GAS_PRICE)
    }

    async fn transaction_count(&self, _account: Address) -> Result<u64> {
        Ok(self.nonce + self.sent.lock().unwrap().len() as u64)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256> {
        let hash = keccak256(&raw);
        self.sent.lock().unwrap().push(raw);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: B256, timeout: Duration) -> Result<Receipt> {
        if !self.mined {
            sleep(timeout).await;
            return Err(DexError::transaction(format!(
                "transaction {hash} not mined after {}s",
                timeout.as_secs()
            )));
        }
        Ok(Receipt {
            transaction_hash: hash,
            status: self.tx_status,
            gas_used: Self::GAS_USED,
        })
    }
}

pub fn decode_raw(raw: &Bytes) -> TxEnvelope {
    let mut buf: &[u8] = raw.as_ref();
    TxEnvelope::decode_2718(&mut buf).expect("valid EIP-2718 transaction")
}

fn encode<T: SolCall>(ret: &T::Return) -> Bytes {
    Bytes::from(T::abi_encode_returns(ret))
}

fn decode_err(e: alloy::sol_types::Error) -> DexError {
    DexError::Decode(e.to_string())
}
