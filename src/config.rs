// src/config.rs
use std::{env, fmt, str::FromStr, time::Duration};

use dotenvy::dotenv;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{DexError, Result};
use crate::liquidity::{DEFAULT_DEADLINE_SECS, DEFAULT_SLIPPAGE_PCT};
use crate::transaction::TxOptions;

/// Construction-time settings.
///
/// Deserializes from the camelCase shape `{ "rpcUrl", "privateKey", "poa", ... }`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexConfig {
    pub rpc_url: String,
    /// Hex signing key. Without it the client is read-only.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Proof-of-authority chain (Polygon, BSC).
    #[serde(default)]
    pub poa: bool,
    #[serde(default = "default_slippage_pct")]
    pub slippage_pct: Decimal,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
}

fn default_slippage_pct() -> Decimal {
    DEFAULT_SLIPPAGE_PCT
}

fn default_deadline_secs() -> u64 {
    DEFAULT_DEADLINE_SECS
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

fn default_receipt_timeout_secs() -> u64 {
    120
}

fn default_receipt_poll_ms() -> u64 {
    1000
}

impl fmt::Debug for DexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DexConfig")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("poa", &self.poa)
            .field("slippage_pct", &self.slippage_pct)
            .field("deadline_secs", &self.deadline_secs)
            .field("rpc_timeout_secs", &self.rpc_timeout_secs)
            .field("receipt_timeout_secs", &self.receipt_timeout_secs)
            .field("receipt_poll_ms", &self.receipt_poll_ms)
            .finish()
    }
}

impl DexConfig {
    /// Read-only config against `rpc_url` with every default applied.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            private_key: None,
            poa: false,
            slippage_pct: default_slippage_pct(),
            deadline_secs: default_deadline_secs(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
            receipt_poll_ms: default_receipt_poll_ms(),
        }
    }

    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn tx_options(&self) -> TxOptions {
        TxOptions {
            receipt_timeout: Duration::from_secs(self.receipt_timeout_secs),
        }
    }
}

/// Load configuration from the environment, reading `.env` first if present.
pub fn load() -> Result<DexConfig> {
    dotenv().ok();

    let cfg = from_vars(|key| env::var(key).ok())?;
    info!("Loaded config: {:?}", cfg);

    Ok(cfg)
}

/// Build a config from a variable lookup.
///
/// `RPC_URL` wins over `INFURA_PROJECT_ID`; one of them is required.
/// Unparsable optional values fall back to their defaults.
pub fn from_vars<F>(var: F) -> Result<DexConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let rpc_url = get("RPC_URL")
        .or_else(|| get("INFURA_PROJECT_ID").map(|id| format!("https://mainnet.infura.io/v3/{id}")))
        .ok_or_else(|| DexError::Config("RPC_URL or INFURA_PROJECT_ID must be set".into()))?;

    let mut cfg = DexConfig::new(rpc_url);
    cfg.private_key = get("PRIVATE_KEY");
    cfg.poa = get("POA")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    cfg.slippage_pct = parse_or(get("SLIPPAGE_PCT"), "SLIPPAGE_PCT", cfg.slippage_pct);
    cfg.deadline_secs = parse_or(get("DEADLINE_SECS"), "DEADLINE_SECS", cfg.deadline_secs);
    cfg.rpc_timeout_secs = parse_or(get("RPC_TIMEOUT_SECS"), "RPC_TIMEOUT_SECS", cfg.rpc_timeout_secs);
    cfg.receipt_timeout_secs =
        parse_or(get("RECEIPT_TIMEOUT_SECS"), "RECEIPT_TIMEOUT_SECS", cfg.receipt_timeout_secs);
    cfg.receipt_poll_ms = parse_or(get("RECEIPT_POLL_MS"), "RECEIPT_POLL_MS", cfg.receipt_poll_ms);

    Ok(cfg)
}

fn parse_or<T: FromStr + fmt::Display>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}
