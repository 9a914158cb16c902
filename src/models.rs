// src/models.rs
use std::collections::BTreeMap;

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Raw on-chain integers go out as base-10 strings.
fn u256_string<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// A wallet's holding of one ERC20 token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenPosition {
    pub symbol: String,
    pub name: String,
    pub contract_address: Address,
    /// `raw_balance / 10^decimals`, exact.
    pub display_balance: BigDecimal,
    #[serde(serialize_with = "u256_string")]
    pub raw_balance: U256,
    pub decimals: u8,
    pub observed_at: DateTime<Utc>,
}

/// Allowance granted by an owner to a spender on one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Approval {
    pub token_symbol: String,
    pub token_address: Address,
    pub spender_address: Address,
    pub spender_name: Option<String>,
    pub display_allowance: BigDecimal,
    #[serde(serialize_with = "u256_string")]
    pub raw_allowance: U256,
    pub decimals: u8,
    pub is_unlimited: bool,
    pub observed_at: DateTime<Utc>,
}

/// Echoed parameters of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutcomeDetails {
    Approval {
        token: String,
        spender: Address,
        /// `"unlimited"` or the display amount requested.
        amount: String,
    },
    Liquidity {
        token_a: Address,
        token_b: Address,
        amount_a: Decimal,
        amount_b: Decimal,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionOutcome {
    pub success: bool,
    pub transaction_hash: String,
    pub gas_used: u64,
    #[serde(flatten)]
    pub details: OutcomeDetails,
}

/// Share of a Uniswap V2 pool held by an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidityPosition {
    pub pair_address: Address,
    pub token0: Address,
    pub token1: Address,
    #[serde(serialize_with = "u256_string")]
    pub reserve0: U256,
    #[serde(serialize_with = "u256_string")]
    pub reserve1: U256,
    #[serde(serialize_with = "u256_string")]
    pub lp_balance: U256,
    #[serde(serialize_with = "u256_string")]
    pub total_supply: U256,
    /// `lp_balance / total_supply` scaled by 1e18.
    #[serde(serialize_with = "u256_string")]
    pub share: U256,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub free: BigDecimal,
    pub used: BigDecimal,
    pub total: BigDecimal,
}

/// Balances keyed by token symbol.
pub type BalanceSheet = BTreeMap<String, Balance>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Market {
    pub symbol: String,
    pub base: Address,
    pub quote: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: Decimal,
    pub price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn raw_amounts_serialize_as_decimal_strings() {
        let approval = Approval {
            token_symbol: "USDC".into(),
            token_address: address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            spender_address: address!("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"),
            spender_name: Some("uniswap_v2_router".into()),
            display_allowance: crate::units::to_display(U256::MAX, 6),
            raw_allowance: U256::MAX,
            decimals: 6,
            is_unlimited: true,
            observed_at: Utc::now(),
        };

        let value = serde_json::to_value(&approval).unwrap();
        assert_eq!(value["raw_allowance"], json!(U256::MAX.to_string()));
        let display = value["display_allowance"].as_str().unwrap();
        assert_eq!(
            BigDecimal::from_str(display).unwrap(),
            crate::units::to_display(U256::MAX, 6)
        );
        assert_eq!(value["is_unlimited"], json!(true));
    }

    #[test]
    fn outcome_flattens_details() {
        let outcome = TransactionOutcome {
            success: true,
            transaction_hash: "0xabc".into(),
            gas_used: 46_109,
            details: OutcomeDetails::Approval {
                token: "DAI".into(),
                spender: Address::ZERO,
                amount: "unlimited".into(),
            },
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["amount"], json!("unlimited"));
        assert_eq!(value["token"], json!("DAI"));
        assert_eq!(value["gas_used"], json!(46_109));
    }
}
