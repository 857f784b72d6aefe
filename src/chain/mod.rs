//! Chain-data seam
//!
//! Purpose:
//!     Everything the analysis needs from a node sits behind `ChainData`:
//!     transactions, receipts, revert reasons, decoded receipt events and
//!     token / pool metadata. `RpcChainData` implements it on an alloy
//!     Provider; tests use an in-memory chain.
//!
//! Errors from implementations are `anyhow::Error` and reach callers as
//! `AnalysisError::Collaborator` without being reworded.

pub mod events;
#[cfg(test)]
pub mod mock;
pub mod rpc;

pub use events::{decode_receipt_events, DecodedEvent, EventKind, EventValue};
pub use rpc::RpcChainData;

use crate::error::AnalysisError;
use crate::pool::{PoolDetails, TokenDetails};
use alloy::primitives::{Address, Bytes, B256, U256};
use anyhow::Result;
use async_trait::async_trait;

/// The parts of a transaction the analysis reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionData {
    pub from: Address,
    /// None for contract creation
    pub to: Option<Address>,
    pub input: Bytes,
    pub value: U256,
}

/// A raw receipt log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub log_index: Option<u64>,
}

/// The parts of a receipt the analysis reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptData {
    /// false when the transaction reverted
    pub status: bool,
    pub gas_used: u64,
    /// Wei
    pub effective_gas_price: u128,
    pub block_number: Option<u64>,
    pub logs: Vec<LogEntry>,
}

/// Node access used by trade analysis
#[async_trait]
pub trait ChainData: Send + Sync {
    async fn transaction(&self, tx_hash: B256) -> Result<TransactionData>;

    async fn receipt(&self, tx_hash: B256) -> Result<ReceiptData>;

    /// Human-readable reason a transaction reverted, if one can be recovered
    async fn revert_reason(&self, tx_hash: B256) -> Result<Option<String>>;

    /// All recognised events emitted by the transaction, in log order
    async fn transaction_events(&self, tx_hash: B256) -> Result<Vec<DecodedEvent>> {
        let receipt = self.receipt(tx_hash).await?;
        Ok(decode_receipt_events(&receipt.logs))
    }

    async fn token_details(&self, token: Address) -> Result<TokenDetails>;

    /// V3 pool tokens (with decimals) and fee tier
    async fn pool_details(&self, pool: Address) -> Result<PoolDetails>;

    /// V2 pair (token0, token1)
    async fn pair_tokens(&self, pair: Address) -> Result<(Address, Address)>;
}

/// Anything that names a transaction: hex string (with or without `0x`) or 32 raw bytes
pub trait IntoTxHash {
    fn into_tx_hash(self) -> Result<B256, AnalysisError>;
}

impl IntoTxHash for B256 {
    fn into_tx_hash(self) -> Result<B256, AnalysisError> {
        Ok(self)
    }
}

impl IntoTxHash for [u8; 32] {
    fn into_tx_hash(self) -> Result<B256, AnalysisError> {
        Ok(B256::from(self))
    }
}

impl IntoTxHash for &[u8] {
    fn into_tx_hash(self) -> Result<B256, AnalysisError> {
        if self.len() != 32 {
            return Err(AnalysisError::InvalidTxHash(format!(
                "expected 32 bytes, got {}",
                self.len()
            )));
        }
        Ok(B256::from_slice(self))
    }
}

impl IntoTxHash for &str {
    fn into_tx_hash(self) -> Result<B256, AnalysisError> {
        let trimmed = self.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if hex.len() != 64 {
            return Err(AnalysisError::InvalidTxHash(self.to_string()));
        }
        hex.parse::<B256>()
            .map_err(|_| AnalysisError::InvalidTxHash(self.to_string()))
    }
}

impl IntoTxHash for &String {
    fn into_tx_hash(self) -> Result<B256, AnalysisError> {
        self.as_str().into_tx_hash()
    }
}

impl IntoTxHash for String {
    fn into_tx_hash(self) -> Result<B256, AnalysisError> {
        self.as_str().into_tx_hash()
    }
}
