// src/lib.rs
//! ERC20 wallet client: token positions, approvals and Uniswap V2 liquidity.

pub mod abi;
pub mod approvals;
pub mod cache;
pub mod chain;
pub mod config;
pub mod error;
pub mod exchange;
pub mod liquidity;
pub mod models;
pub mod positions;
pub mod registry;
pub mod signer;
pub mod transaction;
pub mod units;

#[cfg(test)]
mod mock;

pub use chain::{ChainClient, RpcChain};
pub use config::DexConfig;
pub use error::{DexError, Result};
pub use exchange::{Dex, Exchange};
pub use models::{Approval, Balance, BalanceSheet, LiquidityPosition, TokenPosition, TransactionOutcome};
