//! Price Calculator
//!
//! Conversions between raw on-chain integers and human-readable numbers:
//! tick -> price, raw amount -> decimal amount, executed price of a swap,
//! and the LP fee paid on the input leg.
//!
//! Amounts and executed prices run in `rust_decimal::Decimal`. Tick prices
//! span roughly 1e-38..1e38 before decimal adjustment, far outside what a
//! 28-digit Decimal holds, so they are computed in f64 with the decimal
//! adjustment applied first and converted once at the end (about 15
//! significant digits). The LP fee stays `f64`.

use crate::error::AnalysisError;
use alloy::primitives::U256;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Uniswap V3 tick base: price = 1.0001^tick
const TICK_BASE: f64 = 1.0001;

/// V3 pool fees are expressed in hundredths of a bip (3000 = 0.30%)
pub const V3_FEE_DENOMINATOR: f64 = 1_000_000.0;

/// Decimal-adjusted price for a tick: 1.0001^tick * 10^(token0_decimals - token1_decimals),
/// token1 per token0 in human units.
///
/// Errors with `PriceOutOfRange` when the adjusted price is above
/// `Decimal::MAX` or too small to keep a non-zero digit at 28 decimal places.
pub fn tick_to_human_price(
    tick: i32,
    token0_decimals: u8,
    token1_decimals: u8,
) -> Result<Decimal, AnalysisError> {
    let decimal_adjustment =
        10_f64.powi(i32::from(token0_decimals) - i32::from(token1_decimals));
    let price = TICK_BASE.powi(tick) * decimal_adjustment;

    if !price.is_finite() || price <= 0.0 {
        return Err(AnalysisError::PriceOutOfRange { tick });
    }
    Decimal::from_f64(price)
        .filter(|p| !p.is_zero())
        .ok_or(AnalysisError::PriceOutOfRange { tick })
}

/// Convert a raw token amount into human units (amount / 10^decimals), exactly.
pub fn raw_to_decimal(amount: U256, decimals: u8) -> Result<Decimal, AnalysisError> {
    let mantissa = i128::try_from(amount).map_err(|_| AnalysisError::AmountOutOfRange(amount))?;
    Decimal::try_from_i128_with_scale(mantissa, u32::from(decimals))
        .map_err(|_| AnalysisError::AmountOutOfRange(amount))
}

/// Executed price of a swap: (amount_out / 10^out_decimals) / (amount_in / 10^in_decimals)
pub fn execution_price(
    amount_in: U256,
    in_decimals: u8,
    amount_out: U256,
    out_decimals: u8,
) -> Result<Decimal, AnalysisError> {
    let amount_in_human = raw_to_decimal(amount_in, in_decimals)?;
    let amount_out_human = raw_to_decimal(amount_out, out_decimals)?;

    amount_out_human
        .checked_div(amount_in_human)
        .ok_or_else(|| AnalysisError::UnsupportedSwapShape("zero input amount".to_string()))
}

/// LP fee paid on the input leg, in input-token units: amount_in * fee_rate / 10^decimals.
///
/// Computed in f64: amounts above 2^53 lose their low digits here.
pub fn lp_fee_paid(amount_in: U256, fee_rate: f64, in_decimals: u8) -> f64 {
    f64::from(amount_in) * fee_rate / 10_f64.powi(i32::from(in_decimals))
}

/// Convert a V3 pool fee (hundredths of a bip) into a rate: 3000 -> 0.003
pub fn v3_fee_rate(fee: u32) -> f64 {
    f64::from(fee) / V3_FEE_DENOMINATOR
}

/// Convert a fee in basis points into a rate: 30 -> 0.003
pub fn bps_fee_rate(bps: u32) -> f64 {
    f64::from(bps) / 10_000.0
}
