//! JSON-RPC chain data
//!
//! `ChainData` over any alloy Provider. Token metadata (decimals and symbol)
//! is cached since every trade asks for the same handful of tokens.

use super::{ChainData, LogEntry, ReceiptData, TransactionData};
use crate::contracts::{IUniswapV2Pair, UniswapV3Pool, IERC20};
use crate::pool::{PoolDetails, TokenDetails};
use alloy::consensus::Transaction as ConsensusTransaction;
use alloy::eips::BlockId;
use alloy::network::{TransactionBuilder, TransactionResponse};
use alloy::primitives::{Address, B256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::decode_revert_reason;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// ERC-20 metadata already read from chain. Token metadata is immutable, so
/// entries never expire.
#[derive(Default)]
struct TokenCache {
    tokens: RwLock<HashMap<Address, TokenDetails>>,
}

impl TokenCache {
    fn get(&self, token: Address) -> Result<Option<TokenDetails>> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| anyhow!("token cache poisoned"))?;
        Ok(tokens.get(&token).cloned())
    }

    fn insert(&self, details: TokenDetails) -> Result<()> {
        self.tokens
            .write()
            .map_err(|_| anyhow!("token cache poisoned"))?
            .insert(details.address, details);
        Ok(())
    }
}

/// Chain data served by a node over JSON-RPC
pub struct RpcChainData<P> {
    provider: Arc<P>,
    token_cache: TokenCache,
}

impl<P: Provider + 'static> RpcChainData<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            token_cache: TokenCache::default(),
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    async fn get_decimals(&self, token: Address) -> Result<u8> {
        let token_contract = IERC20::new(token, self.provider.clone());
        token_contract
            .decimals()
            .call()
            .await
            .with_context(|| format!("Failed to get decimals for token {}", token))
    }

    /// Some tokens (MKR and friends) return bytes32 or nothing for `symbol()`
    async fn get_symbol(&self, token: Address) -> Option<String> {
        let token_contract = IERC20::new(token, self.provider.clone());
        match token_contract.symbol().call().await {
            Ok(symbol) => Some(symbol),
            Err(e) => {
                debug!("symbol() failed for {}: {}", token, e);
                None
            }
        }
    }
}

#[async_trait]
impl<P: Provider + 'static> ChainData for RpcChainData<P> {
    async fn transaction(&self, tx_hash: B256) -> Result<TransactionData> {
        let tx = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await
            .context("eth_getTransactionByHash failed")?
            .ok_or_else(|| anyhow!("transaction {} not found", tx_hash))?;

        Ok(TransactionData {
            from: TransactionResponse::from(&tx),
            to: ConsensusTransaction::to(&tx),
            input: ConsensusTransaction::input(&tx).clone(),
            value: ConsensusTransaction::value(&tx),
        })
    }

    async fn receipt(&self, tx_hash: B256) -> Result<ReceiptData> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .context("eth_getTransactionReceipt failed")?
            .ok_or_else(|| anyhow!("receipt for {} not found", tx_hash))?;

        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| LogEntry {
                address: log.address(),
                topics: log.topics().to_vec(),
                data: log.data().data.clone(),
                log_index: log.log_index,
            })
            .collect();

        Ok(ReceiptData {
            status: receipt.status(),
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
            block_number: receipt.block_number,
            logs,
        })
    }

    /// Replay the transaction with `eth_call` at its block and decode the revert data.
    async fn revert_reason(&self, tx_hash: B256) -> Result<Option<String>> {
        let tx = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await
            .context("eth_getTransactionByHash failed")?
            .ok_or_else(|| anyhow!("transaction {} not found", tx_hash))?;

        let block = tx
            .block_number
            .ok_or_else(|| anyhow!("transaction {} is still pending", tx_hash))?;

        let mut request = TransactionRequest::default()
            .with_from(TransactionResponse::from(&tx))
            .with_input(ConsensusTransaction::input(&tx).clone())
            .with_value(ConsensusTransaction::value(&tx))
            .with_gas_limit(ConsensusTransaction::gas_limit(&tx));
        if let Some(to) = ConsensusTransaction::to(&tx) {
            request = request.with_to(to);
        }

        match self.provider.call(request).block(BlockId::number(block)).await {
            Ok(_) => {
                warn!("Transaction {} did not revert when replayed at block {}", tx_hash, block);
                Ok(None)
            }
            Err(err) => {
                let Some(payload) = err.as_error_resp() else {
                    return Err(anyhow::Error::new(err).context("eth_call replay failed"));
                };
                let reason = match payload.as_revert_data() {
                    Some(data) => decode_revert_reason(&data),
                    None => Some(payload.message.to_string()),
                };
                debug!("Revert reason for {}: {:?}", tx_hash, reason);
                Ok(reason)
            }
        }
    }

    async fn token_details(&self, token: Address) -> Result<TokenDetails> {
        if let Some(details) = self.token_cache.get(token)? {
            return Ok(details);
        }

        let decimals = self.get_decimals(token).await?;
        let symbol = self.get_symbol(token).await;
        let details = TokenDetails::new(token, decimals, symbol);
        self.token_cache.insert(details.clone())?;
        Ok(details)
    }

    async fn pool_details(&self, pool_address: Address) -> Result<PoolDetails> {
        let pool = UniswapV3Pool::new(pool_address, self.provider.clone());

        // V3 pools sort tokens by address, read the actual order from the pool
        let token0 = pool.token0().call().await.context("Failed to get token0")?;
        let token1 = pool.token1().call().await.context("Failed to get token1")?;
        let fee = pool.fee().call().await.context("Failed to get pool fee")?;

        let token0 = self.token_details(token0).await?;
        let token1 = self.token_details(token1).await?;

        Ok(PoolDetails {
            address: pool_address,
            token0,
            token1,
            fee: fee.to::<u32>(),
        })
    }

    async fn pair_tokens(&self, pair_address: Address) -> Result<(Address, Address)> {
        let pair = IUniswapV2Pair::new(pair_address, self.provider.clone());
        let token0 = pair.token0().call().await.context("Failed to get pair token0")?;
        let token1 = pair.token1().call().await.context("Failed to get pair token1")?;
        Ok((token0, token1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_token_cache() {
        let cache = TokenCache::default();
        let usdc = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
        assert_eq!(cache.get(usdc).unwrap(), None);

        cache
            .insert(TokenDetails::new(usdc, 6, Some("USDC".to_string())))
            .unwrap();
        let cached = cache.get(usdc).unwrap().unwrap();
        assert_eq!(cached.decimals, 6);
        assert_eq!(cached.symbol.as_deref(), Some("USDC"));

        // symbol-less tokens are cached too, so symbol() is not retried
        let mkr = address!("9f8F72aA9304c8B593d555F12eF6589cC3A579A2");
        cache.insert(TokenDetails::new(mkr, 18, None)).unwrap();
        assert_eq!(cache.get(mkr).unwrap(), Some(TokenDetails::new(mkr, 18, None)));
    }
}
