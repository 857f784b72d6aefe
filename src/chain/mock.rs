//! In-memory chain for tests
//!
//! Serves canned transactions, receipts and metadata through `ChainData`.
//! Logs are built from real `sol!` event encodings so the receipt event
//! decoder runs on exactly what a node would return.

use super::{ChainData, LogEntry, ReceiptData, TransactionData};
use crate::pool::{PoolDetails, TokenDetails};
use alloy::primitives::aliases::I24;
use alloy::primitives::{Address, B256, I256};
use alloy::sol_types::SolEvent;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What `revert_reason` returns
#[derive(Debug, Clone)]
pub enum RevertLookup {
    Found(Option<String>),
    Fails(String),
}

impl Default for RevertLookup {
    fn default() -> Self {
        RevertLookup::Found(None)
    }
}

#[derive(Debug, Default)]
pub struct MockChain {
    pub transactions: HashMap<B256, TransactionData>,
    pub receipts: HashMap<B256, ReceiptData>,
    pub tokens: HashMap<Address, TokenDetails>,
    pub pools: HashMap<Address, PoolDetails>,
    pub pairs: HashMap<Address, (Address, Address)>,
    pub revert: RevertLookup,
    /// Number of `revert_reason` calls served
    pub revert_calls: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transaction(mut self, hash: B256, tx: TransactionData, receipt: ReceiptData) -> Self {
        self.transactions.insert(hash, tx);
        self.receipts.insert(hash, receipt);
        self
    }

    pub fn with_token(mut self, address: Address, decimals: u8, symbol: &str) -> Self {
        self.tokens
            .insert(address, TokenDetails::new(address, decimals, Some(symbol.to_string())));
        self
    }

    pub fn with_pool(mut self, pool: PoolDetails) -> Self {
        self.pools.insert(pool.address, pool);
        self
    }

    pub fn with_pair(mut self, pair: Address, token0: Address, token1: Address) -> Self {
        self.pairs.insert(pair, (token0, token1));
        self
    }

    pub fn with_revert(mut self, revert: RevertLookup) -> Self {
        self.revert = revert;
        self
    }
}

#[async_trait]
impl ChainData for MockChain {
    async fn transaction(&self, tx_hash: B256) -> Result<TransactionData> {
        self.transactions
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| anyhow!("transaction {} not found", tx_hash))
    }

    async fn receipt(&self, tx_hash: B256) -> Result<ReceiptData> {
        self.receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| anyhow!("receipt {} not found", tx_hash))
    }

    async fn revert_reason(&self, _tx_hash: B256) -> Result<Option<String>> {
        self.revert_calls.fetch_add(1, Ordering::SeqCst);
        match &self.revert {
            RevertLookup::Found(reason) => Ok(reason.clone()),
            RevertLookup::Fails(msg) => Err(anyhow!("{}", msg)),
        }
    }

    async fn token_details(&self, token: Address) -> Result<TokenDetails> {
        self.tokens
            .get(&token)
            .cloned()
            .ok_or_else(|| anyhow!("unknown token {}", token))
    }

    async fn pool_details(&self, pool: Address) -> Result<PoolDetails> {
        self.pools
            .get(&pool)
            .cloned()
            .ok_or_else(|| anyhow!("unknown pool {}", pool))
    }

    async fn pair_tokens(&self, pair: Address) -> Result<(Address, Address)> {
        self.pairs
            .get(&pair)
            .copied()
            .ok_or_else(|| anyhow!("unknown pair {}", pair))
    }
}

/// Signed 256-bit literal
pub fn int(value: i128) -> I256 {
    I256::try_from(value).unwrap()
}

/// int24 tick literal
pub fn tick(value: i32) -> I24 {
    I24::try_from(value).unwrap()
}

/// Encode a `sol!` event as a receipt log emitted by `address`
pub fn log_entry<E: SolEvent>(address: Address, event: &E, log_index: u64) -> LogEntry {
    let data = event.encode_log_data();
    LogEntry {
        address,
        topics: data.topics().to_vec(),
        data: data.data.clone(),
        log_index: Some(log_index),
    }
}
