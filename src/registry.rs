// src/registry.rs
use alloy::primitives::{address, Address};

/// Well-known mainnet ERC20 tokens scanned by default.
pub const TOKENS: [(&str, Address); 5] = [
    ("USDC", address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
    ("USDT", address!("0xdAC17F958D2ee523a2206206994597C13D831ec7")),
    ("WBTC", address!("0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599")),
    ("WETH", address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")),
    ("DAI", address!("0x6B175474E89094C44Da98b954EedeAC495271d0F")),
];

/// DEX routers checked for approvals. The first entry is the default liquidity router.
pub const ROUTERS: [(&str, Address); 4] = [
    ("uniswap_v2_router", address!("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D")),
    ("uniswap_v3_router", address!("0xE592427A0AEce92De3Edee1F18E0157C05861564")),
    ("sushiswap_router", address!("0xd9e1cE17f2641f24aE83637ab66a2cca9C378B9F")),
    // BSC
    ("pancakeswap_router", address!("0x10ED43C718714eb63d5aA57B78B54704E256024E")),
];

pub const UNISWAP_V2_FACTORY: Address = address!("0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");

pub fn token_address(symbol: &str) -> Option<Address> {
    TOKENS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
        .map(|(_, addr)| *addr)
}

pub fn token_addresses() -> Vec<Address> {
    TOKENS.iter().map(|(_, addr)| *addr).collect()
}

pub fn router_address(name: &str) -> Option<Address> {
    ROUTERS.iter().find(|(n, _)| *n == name).map(|(_, addr)| *addr)
}

/// Registry name of a router, if the address is a known one.
pub fn router_name(router: Address) -> Option<&'static str> {
    ROUTERS.iter().find(|(_, addr)| *addr == router).map(|(n, _)| *n)
}

pub fn default_router() -> Address {
    ROUTERS[0].1
}
