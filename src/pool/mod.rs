//! Pool metadata and price math
//!
//! Token/pool records returned by the chain-data layer and the conversions
//! that turn raw event values into prices, human amounts and LP fees.
//! Supports both V2 (executed price from amounts) and V3 (tick-based price) pools.

pub mod calculator;
pub mod details;

pub use calculator::{
    bps_fee_rate, execution_price, lp_fee_paid, raw_to_decimal, tick_to_human_price,
    v3_fee_rate,
};
pub use details::{PoolDetails, TokenDetails};
