// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DexError>;

#[derive(Error, Debug)]
pub enum DexError {
    /// Missing signing key / account, or a bad configuration value.
    #[error("Config error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("ABI decode error: {0}")]
    Decode(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Envelope for single-target reads and every state-changing call.
    #[error("{context}: {source}")]
    Operation {
        context: &'static str,
        #[source]
        source: Box<DexError>,
    },

    #[error("{0} is not supported by this exchange")]
    NotSupported(&'static str),
}

impl DexError {
    pub fn rpc(msg: impl ToString) -> Self {
        Self::Rpc(msg.to_string())
    }

    pub fn transaction(msg: impl ToString) -> Self {
        Self::Transaction(msg.to_string())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation { .. })
    }
}

/// Wraps any failure of a call into a single `Operation` error.
pub(crate) trait OperationContext<T> {
    fn operation(self, context: &'static str) -> Result<T>;
}

impl<T> OperationContext<T> for Result<T> {
    fn operation(self, context: &'static str) -> Result<T> {
        self.map_err(|e| DexError::Operation {
            context,
            source: Box::new(e),
        })
    }
}
