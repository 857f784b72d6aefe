//! Uniswap V2 trade analysis
//!
//! A V2 pair reports a swap as four unsigned amounts. Exactly one of the two
//! outputs must be non-zero; the price is the executed rate
//! `amount_out / amount_in` in human units.

use super::{failed_trade, single_swap_event, AnalysisOptions};
use crate::chain::{ChainData, EventKind, ReceiptData, TransactionData};
use crate::decoder::decode_v2_router_call;
use crate::error::AnalysisError;
use crate::pool::{bps_fee_rate, execution_price, lp_fee_paid};
use crate::types::{TradeAnalysis, TradeSuccess};
use alloy::primitives::{B256, U256};
use tracing::debug;

/// Analyse a transaction sent to a V2 Router02.
pub(crate) async fn analyse_trade<C: ChainData + ?Sized>(
    chain_data: &C,
    tx: &TransactionData,
    tx_hash: B256,
    receipt: &ReceiptData,
    options: &AnalysisOptions,
) -> Result<TradeAnalysis, AnalysisError> {
    if !receipt.status {
        return Ok(TradeAnalysis::Fail(failed_trade(chain_data, tx_hash, receipt).await));
    }

    let swap = decode_v2_router_call(&tx.input)?;
    debug!(tx = %tx_hash, "V2 router call {} over {} tokens", swap.function, swap.path.len());

    let events = chain_data.transaction_events(tx_hash).await?;
    let event = single_swap_event(&events, EventKind::UniswapV2Swap)?;

    let amount = |name: &str| {
        event.uint_arg(name).ok_or_else(|| {
            AnalysisError::UnsupportedSwapShape(format!("V2 Swap event has no '{}'", name))
        })
    };
    let amount0_in = amount("amount0In")?;
    let amount1_in = amount("amount1In")?;
    let amount0_out = amount("amount0Out")?;
    let amount1_out = amount("amount1Out")?;

    let (amount_out, event_amount_in) = match (amount0_out.is_zero(), amount1_out.is_zero()) {
        (false, true) => (amount0_out, amount1_in),
        (true, false) => (amount1_out, amount0_in),
        _ => {
            return Err(AnalysisError::UnsupportedSwapShape(format!(
                "expected exactly one output amount, got amount0Out={} amount1Out={}",
                amount0_out, amount1_out
            )))
        }
    };
    let amount_in: U256 = swap.amount_in.unwrap_or(event_amount_in);

    let (token_in, token_out) = match (swap.token_in(), swap.token_out()) {
        (Some(token_in), Some(token_out)) => (token_in, token_out),
        _ => return Err(AnalysisError::InputDecode("empty V2 path".to_string())),
    };
    let in_token = chain_data.token_details(token_in).await?;
    let out_token = chain_data.token_details(token_out).await?;

    let price = execution_price(amount_in, in_token.decimals, amount_out, out_token.decimals)?;
    let lp_fee = lp_fee_paid(
        amount_in,
        bps_fee_rate(options.v2_lp_fee_bps),
        in_token.decimals,
    );

    let (token0, token1) = chain_data.pair_tokens(event.address).await?;

    debug!(
        "V2 swap in pair {}: in={} out={} price={}",
        event.address, amount_in, amount_out, price
    );

    Ok(TradeAnalysis::Success(TradeSuccess {
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
        path: swap.path,
        amount_in,
        amount_out_min: swap.amount_out_min,
        amount_out,
        price,
        amount_in_decimals: in_token.decimals,
        amount_out_decimals: out_token.decimals,
        token0,
        token1,
        lp_fee_paid: lp_fee,
    }))
}
