//! Uniswap V3 trade analysis
//!
//! `build_v3_trade` turns one V3 pool `Swap` event plus the decoded route
//! into a `TradeSuccess`. Both the SwapRouter path and the Universal Router
//! path end here.
//!
//! Sign convention of the event: a positive amount flowed into the pool (the
//! input leg), a negative amount left it (the output leg).

use super::{failed_trade, single_swap_event};
use crate::chain::{ChainData, DecodedEvent, EventKind, ReceiptData, TransactionData};
use crate::decoder::decode_v3_router_call;
use crate::error::AnalysisError;
use crate::pool::lp_fee_paid;
use crate::types::{TradeAnalysis, TradeSuccess};
use alloy::primitives::{Address, B256, I256, U256};
use tracing::debug;

/// Analyse a transaction sent to a V3 SwapRouter / SwapRouter02.
pub(crate) async fn analyse_trade<C: ChainData + ?Sized>(
    chain_data: &C,
    tx: &TransactionData,
    tx_hash: B256,
    receipt: &ReceiptData,
) -> Result<TradeAnalysis, AnalysisError> {
    if !receipt.status {
        return Ok(TradeAnalysis::Fail(failed_trade(chain_data, tx_hash, receipt).await));
    }

    let swap = decode_v3_router_call(&tx.input)?;
    debug!(tx = %tx_hash, "V3 router call {} over {} tokens", swap.function, swap.path.len());

    let events = chain_data.transaction_events(tx_hash).await?;
    let event = single_swap_event(&events, EventKind::UniswapV3Swap)?;

    let trade = build_v3_trade(chain_data, receipt, swap.path, swap.amount_out_min, event).await?;
    Ok(TradeAnalysis::Success(trade))
}

/// Build a success record from a V3 `Swap` event.
///
/// `path` starts at the input token; `amount_out_min` is what the calldata declared.
/// Only single-hop routes are accepted: the event amounts belong to one pool
/// and must match the decimals of both path ends.
pub(crate) async fn build_v3_trade<C: ChainData + ?Sized>(
    chain_data: &C,
    receipt: &ReceiptData,
    path: Vec<Address>,
    amount_out_min: U256,
    event: &DecodedEvent,
) -> Result<TradeSuccess, AnalysisError> {
    let (token_in, token_out) = match path.as_slice() {
        [token_in, token_out] => (*token_in, *token_out),
        [] | [_] => {
            return Err(AnalysisError::InputDecode(format!(
                "swap path has {} tokens",
                path.len()
            )))
        }
        hops => {
            return Err(AnalysisError::UnsupportedProtocolPath(format!(
                "multi-hop route over {} tokens",
                hops.len()
            )))
        }
    };

    let amount0 = int_arg(event, "amount0")?;
    let amount1 = int_arg(event, "amount1")?;
    let tick = int_arg(event, "tick")?;
    let tick = i32::try_from(tick)
        .map_err(|_| AnalysisError::UnsupportedSwapShape(format!("tick {} out of range", tick)))?;

    // Depending on the pool's token order the output shows up as amount0 or amount1
    let (amount_in, amount_out) = if amount0.is_positive() && amount1.is_negative() {
        (amount0, amount1)
    } else if amount0.is_negative() && amount1.is_positive() {
        (amount1, amount0)
    } else {
        return Err(AnalysisError::UnsupportedSwapShape(format!(
            "expected one positive and one negative amount, got amount0={} amount1={}",
            amount0, amount1
        )));
    };

    let pool = chain_data.pool_details(event.address).await?;
    let in_token = chain_data.token_details(token_in).await?;
    let out_token = chain_data.token_details(token_out).await?;

    // token1 per token0, decimal adjusted
    let price = pool.convert_price_to_human(tick, false)?;

    let amount_in = amount_in.unsigned_abs();
    let amount_out = amount_out.unsigned_abs();
    let lp_fee = lp_fee_paid(amount_in, pool.fee_rate(), in_token.decimals);

    debug!(
        "V3 swap in pool {} (fee {}): {} {} -> {} {} tick={} price={}",
        pool.address,
        pool.fee,
        amount_in,
        in_token.symbol.as_deref().unwrap_or("?"),
        amount_out,
        out_token.symbol.as_deref().unwrap_or("?"),
        tick,
        price
    );

    Ok(TradeSuccess {
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
        path,
        amount_in,
        amount_out_min,
        amount_out,
        price,
        amount_in_decimals: in_token.decimals,
        amount_out_decimals: out_token.decimals,
        token0: pool.token0.address,
        token1: pool.token1.address,
        lp_fee_paid: lp_fee,
    })
}

fn int_arg(event: &DecodedEvent, name: &str) -> Result<I256, AnalysisError> {
    event.int_arg(name).ok_or_else(|| {
        AnalysisError::UnsupportedSwapShape(format!("{} event has no signed '{}'", event.name(), name))
    })
}
