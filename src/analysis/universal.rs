//! Universal Router trade analysis
//!
//! Supports simple trades only: exactly one single-hop swap command with one
//! input and one output token; multi-hop routes are rejected. V2 swap commands are recognised but not analysed.
//!
//! The Universal Router may touch several pools in one call (wraps, fee
//! transfers, sweeps). The trade is read from the last V3 `Swap` event of the
//! transaction, which is the pool the output leg came from.

use super::{failed_trade, v3::build_v3_trade};
use crate::chain::{ChainData, DecodedEvent, EventKind, IntoTxHash, ReceiptData, TransactionData};
use crate::decoder::decode_execute;
use crate::error::{AnalysisError, SwapSetProblem};
use crate::types::TradeAnalysis;
use alloy::primitives::B256;
use tracing::{debug, info};

/// Fetch transaction and receipt, then analyse them.
pub async fn analyse_trade_by_hash<C, H>(chain_data: &C, tx_hash: H) -> Result<TradeAnalysis, AnalysisError>
where
    C: ChainData + ?Sized,
    H: IntoTxHash,
{
    let tx_hash = tx_hash.into_tx_hash()?;
    let tx = chain_data.transaction(tx_hash).await?;
    let receipt = chain_data.receipt(tx_hash).await?;
    analyse_trade_by_receipt(chain_data, &tx, tx_hash, &receipt).await
}

/// Analyse a Universal Router trade from an already fetched transaction and receipt.
///
/// Assumes one trade per transaction.
pub async fn analyse_trade_by_receipt<C: ChainData + ?Sized>(
    chain_data: &C,
    tx: &TransactionData,
    tx_hash: B256,
    receipt: &ReceiptData,
) -> Result<TradeAnalysis, AnalysisError> {
    if !receipt.status {
        let fail = failed_trade(chain_data, tx_hash, receipt).await;
        info!(tx = %tx_hash, "Universal Router trade reverted: {:?}", fail.revert_reason);
        return Ok(TradeAnalysis::Fail(fail));
    }

    let execute = decode_execute(&tx.input)?;
    let swap_ops = execute.swap_operations();

    let op = match swap_ops.as_slice() {
        [] => return Err(AnalysisError::MalformedSwapSet(SwapSetProblem::NoSwapOperation)),
        [op] => *op,
        ops => {
            return Err(AnalysisError::MalformedSwapSet(
                SwapSetProblem::MultipleSwapOperations(ops.len()),
            ))
        }
    };
    if op.command.is_v2_swap() {
        return Err(AnalysisError::UnsupportedProtocolPath(
            "uniswap v2 trades through the universal router".to_string(),
        ));
    }

    let swap = op.decode_v3_swap()?;
    debug!(tx = %tx_hash, "Universal Router {} over {} tokens", op.command, swap.path.len());

    let events = chain_data.transaction_events(tx_hash).await?;
    let event = last_swap_event(&events)?;

    let trade = build_v3_trade(chain_data, receipt, swap.path, swap.amount_out_min, event).await?;
    Ok(TradeAnalysis::Success(trade))
}

/// The last V3 `Swap` event in log order
fn last_swap_event(events: &[DecodedEvent]) -> Result<&DecodedEvent, AnalysisError> {
    let mut last = None;
    for event in events {
        if event.kind == EventKind::UniswapV3Swap {
            last = Some(event);
        }
    }
    last.ok_or(AnalysisError::MalformedSwapSet(SwapSetProblem::NoSwapEvent))
}
