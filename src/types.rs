//! Trade outcome records
//!
//! Every analysed transaction ends in exactly one `TradeAnalysis`:
//! `Success(TradeSuccess)` for a swap that executed, `Fail(TradeFail)` for a
//! transaction that reverted on chain.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Wei per gwei
const GWEI: u64 = 1_000_000_000;

/// Outcome of analysing one swap transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TradeAnalysis {
    Success(TradeSuccess),
    Fail(TradeFail),
}

impl TradeAnalysis {
    pub fn is_success(&self) -> bool {
        matches!(self, TradeAnalysis::Success(_))
    }

    pub fn gas_used(&self) -> u64 {
        match self {
            TradeAnalysis::Success(s) => s.gas_used,
            TradeAnalysis::Fail(f) => f.gas_used,
        }
    }

    pub fn effective_gas_price(&self) -> u128 {
        match self {
            TradeAnalysis::Success(s) => s.effective_gas_price,
            TradeAnalysis::Fail(f) => f.effective_gas_price,
        }
    }

    pub fn as_success(&self) -> Option<&TradeSuccess> {
        match self {
            TradeAnalysis::Success(s) => Some(s),
            TradeAnalysis::Fail(_) => None,
        }
    }
}

impl fmt::Display for TradeAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAnalysis::Success(s) => write!(
                f,
                "SUCCESS | {} -> {} | in={} out={} (min {}) | price={} | lp_fee={:.8} | gas={} @ {} gwei",
                s.path.first().map(|a| format!("{:?}", a)).unwrap_or_default(),
                s.path.last().map(|a| format!("{:?}", a)).unwrap_or_default(),
                s.amount_in,
                s.amount_out,
                s.amount_out_min,
                s.price,
                s.lp_fee_paid,
                s.gas_used,
                s.effective_gas_price_gwei(),
            ),
            TradeAnalysis::Fail(t) => write!(
                f,
                "FAIL | reason={} | gas={} @ {} gwei",
                t.revert_reason.as_deref().unwrap_or("<unknown>"),
                t.gas_used,
                t.effective_gas_price_gwei(),
            ),
        }
    }
}

/// A swap that executed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSuccess {
    pub gas_used: u64,
    /// Effective gas price in wei
    pub effective_gas_price: u128,
    /// Token route, input token first
    pub path: Vec<Address>,
    /// Input amount in raw token units
    pub amount_in: U256,
    /// Minimum acceptable output declared in calldata (raw units)
    pub amount_out_min: U256,
    /// Output actually received (raw units)
    pub amount_out: U256,
    /// Human-unit price. V3: pool price after the swap, token1 per token0.
    /// V2: executed rate, output per input.
    pub price: Decimal,
    pub amount_in_decimals: u8,
    pub amount_out_decimals: u8,
    /// Pool token0
    pub token0: Address,
    /// Pool token1
    pub token1: Address,
    /// LP fee paid in input-token units.
    ///
    /// Computed in f64 while `price` keeps full decimal precision; values
    /// past ~15 significant digits are rounded.
    pub lp_fee_paid: f64,
}

impl TradeSuccess {
    pub fn effective_gas_price_gwei(&self) -> Decimal {
        wei_to_gwei(self.effective_gas_price)
    }

    /// Gas cost in native token units (ETH on mainnet/Base)
    pub fn cost_of_gas(&self) -> Decimal {
        gas_cost(self.gas_used, self.effective_gas_price)
    }

    /// Price as token1/token0, or token0/token1 when `reverse_token_order`.
    /// Returns None for a zero price.
    pub fn human_price(&self, reverse_token_order: bool) -> Option<Decimal> {
        if reverse_token_order {
            Decimal::ONE.checked_div(self.price)
        } else {
            Some(self.price)
        }
    }

    pub fn amount_in_human(&self) -> Option<Decimal> {
        crate::pool::raw_to_decimal(self.amount_in, self.amount_in_decimals).ok()
    }

    pub fn amount_out_human(&self) -> Option<Decimal> {
        crate::pool::raw_to_decimal(self.amount_out, self.amount_out_decimals).ok()
    }
}

/// A swap transaction that reverted on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeFail {
    pub gas_used: u64,
    /// Effective gas price in wei
    pub effective_gas_price: u128,
    /// Decoded revert message, if it could be recovered
    pub revert_reason: Option<String>,
}

impl TradeFail {
    pub fn effective_gas_price_gwei(&self) -> Decimal {
        wei_to_gwei(self.effective_gas_price)
    }

    pub fn cost_of_gas(&self) -> Decimal {
        gas_cost(self.gas_used, self.effective_gas_price)
    }
}

fn wei_to_gwei(wei: u128) -> Decimal {
    Decimal::from(wei) / Decimal::from(GWEI)
}

fn gas_cost(gas_used: u64, effective_gas_price: u128) -> Decimal {
    // gas_used * price fits u128 for any realistic block gas limit
    let wei = u128::from(gas_used).saturating_mul(effective_gas_price);
    Decimal::from(wei) / Decimal::from(GWEI) / Decimal::from(GWEI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use rust_decimal_macros::dec;

    fn sample_success() -> TradeSuccess {
        TradeSuccess {
            gas_used: 150_000,
            effective_gas_price: 2_500_000_000,
            path: vec![
                address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
                address!("4200000000000000000000000000000000000006"),
            ],
            amount_in: U256::from(1_000_000_000u64),
            amount_out_min: U256::from(300_000_000_000_000_000u64),
            amount_out: U256::from(310_000_000_000_000_000u64),
            price: dec!(0.0003100),
            amount_in_decimals: 6,
            amount_out_decimals: 18,
            token0: address!("4200000000000000000000000000000000000006"),
            token1: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            lp_fee_paid: 0.5,
        }
    }

    #[test]
    fn test_gas_price_gwei() {
        let trade = sample_success();
        assert_eq!(trade.effective_gas_price_gwei(), dec!(2.5));
    }

    #[test]
    fn test_cost_of_gas() {
        let trade = sample_success();
        // 150_000 * 2.5 gwei = 375_000 gwei = 0.000375 ETH
        assert_eq!(trade.cost_of_gas(), dec!(0.000375));

        let fail = TradeFail {
            gas_used: 21_000,
            effective_gas_price: 1_000_000_000,
            revert_reason: None,
        };
        assert_eq!(fail.cost_of_gas(), dec!(0.000021));
        assert_eq!(fail.effective_gas_price_gwei(), dec!(1));
    }

    #[test]
    fn test_human_price_reverse() {
        let trade = sample_success();
        let reversed = trade.human_price(true).unwrap();
        assert!(reversed > dec!(3225) && reversed < dec!(3226));
        assert_eq!(trade.human_price(false), Some(dec!(0.00031)));
    }

    #[test]
    fn test_human_amounts() {
        let trade = sample_success();
        assert_eq!(trade.amount_in_human(), Some(dec!(1000)));
        assert_eq!(trade.amount_out_human(), Some(dec!(0.31)));
    }

    #[test]
    fn test_outcome_accessors() {
        let success = TradeAnalysis::Success(sample_success());
        assert!(success.is_success());
        assert_eq!(success.gas_used(), 150_000);
        assert!(success.as_success().is_some());

        let fail = TradeAnalysis::Fail(TradeFail {
            gas_used: 40_000,
            effective_gas_price: 7,
            revert_reason: Some("Too little received".to_string()),
        });
        assert!(!fail.is_success());
        assert_eq!(fail.effective_gas_price(), 7);
        assert!(fail.to_string().contains("Too little received"));
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let fail = TradeAnalysis::Fail(TradeFail {
            gas_used: 40_000,
            effective_gas_price: 7,
            revert_reason: None,
        });
        let json = serde_json::to_value(&fail).unwrap();
        assert_eq!(json["outcome"], "fail");
        assert_eq!(json["gas_used"], 40_000);
    }
}
