//! Token and pool metadata
//!
//! Plain records filled in by the chain-data layer (`ChainData::token_details`,
//! `ChainData::pool_details`) and consumed by the trade builders.

use super::calculator::{tick_to_human_price, v3_fee_rate};
use crate::error::AnalysisError;
use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::Serialize;

/// ERC-20 metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDetails {
    pub address: Address,
    pub decimals: u8,
    /// None when `symbol()` is missing or not a string (e.g. MKR)
    pub symbol: Option<String>,
}

impl TokenDetails {
    pub fn new(address: Address, decimals: u8, symbol: Option<String>) -> Self {
        Self {
            address,
            decimals,
            symbol,
        }
    }
}

/// Uniswap V3 pool metadata
///
/// V3 pools sort tokens by address (token0 < token1); ticks price token1 in
/// units of token0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolDetails {
    pub address: Address,
    pub token0: TokenDetails,
    pub token1: TokenDetails,
    /// Fee tier in hundredths of a bip (500 = 0.05%, 3000 = 0.30%)
    pub fee: u32,
}

impl PoolDetails {
    /// Fee as a rate (3000 -> 0.003)
    pub fn fee_rate(&self) -> f64 {
        v3_fee_rate(self.fee)
    }

    /// Human price for a tick: token1 per token0, decimal adjusted.
    /// With `reverse_token_order` the price is token0 per token1.
    pub fn convert_price_to_human(
        &self,
        tick: i32,
        reverse_token_order: bool,
    ) -> Result<Decimal, AnalysisError> {
        let price = tick_to_human_price(tick, self.token0.decimals, self.token1.decimals)?;
        if reverse_token_order {
            Decimal::ONE
                .checked_div(price)
                .ok_or(AnalysisError::PriceOutOfRange { tick })
        } else {
            Ok(price)
        }
    }
}
