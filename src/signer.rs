// src/signer.rs
use std::fmt;

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

use crate::error::{DexError, Result};

/// Local signing key for the configured account.
#[derive(Clone)]
pub struct TxSigner {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
}

impl fmt::Debug for TxSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl TxSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        let wallet = EthereumWallet::from(signer.clone());
        Self { signer, wallet }
    }

    /// Parse a 32-byte hex private key, with or without `0x`.
    pub fn from_hex(key: &str) -> Result<Self> {
        let key = key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let bytes = hex::decode(key)
            .map_err(|e| DexError::Config(format!("private key is not valid hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(DexError::Config(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        let signer = PrivateKeySigner::from_bytes(&B256::from_slice(&bytes))
            .map_err(|e| DexError::Config(format!("invalid private key: {e}")))?;

        Ok(Self::new(signer))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a fully populated request into a raw EIP-2718 transaction.
    pub async fn sign(&self, tx: TransactionRequest) -> Result<Bytes> {
        let envelope = tx
            .build(&self.wallet)
            .await
            .map_err(|e| DexError::transaction(format!("signing failed: {e}")))?;

        Ok(Bytes::from(envelope.encoded_2718()))
    }
}
