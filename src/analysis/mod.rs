//! Trade analysis
//!
//! Purpose:
//!     Turn a swap transaction and its receipt into a `TradeAnalysis`.
//!     The dispatcher classifies the destination router and hands the
//!     transaction to the V2 or V3 analysis; Universal Router trades go
//!     through `universal::analyse_trade_by_receipt`.
//!
//! Every analysis is a short sequence of awaited reads through `ChainData`.
//! Nothing is cached or shared between calls.

mod v2;
mod v3;
pub mod universal;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::chain::{ChainData, DecodedEvent, EventKind, IntoTxHash, ReceiptData, TransactionData};
use crate::error::{AnalysisError, SwapSetProblem};
use crate::routers::{RouterKind, RouterTable};
use crate::types::{TradeAnalysis, TradeFail};
use alloy::primitives::B256;
use tracing::{debug, info, warn};

/// Uniswap V2 charges 0.30% on the input amount
pub const DEFAULT_V2_LP_FEE_BPS: u32 = 30;

/// Knobs for analyses that cannot read everything from chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// LP fee of V2 pairs in basis points (V2 pairs expose no fee getter)
    pub v2_lp_fee_bps: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            v2_lp_fee_bps: DEFAULT_V2_LP_FEE_BPS,
        }
    }
}

/// Fetch transaction and receipt, then dispatch on the destination router.
pub async fn analyse_trade_by_hash<C, H>(
    chain_data: &C,
    routers: &RouterTable,
    chain: &str,
    tx_hash: H,
    options: &AnalysisOptions,
) -> Result<TradeAnalysis, AnalysisError>
where
    C: ChainData + ?Sized,
    H: IntoTxHash,
{
    let tx_hash = tx_hash.into_tx_hash()?;
    let tx = chain_data.transaction(tx_hash).await?;
    let receipt = chain_data.receipt(tx_hash).await?;
    analyse_trade_by_receipt(chain_data, routers, chain, &tx, tx_hash, &receipt, options).await
}

/// Dispatch an already fetched transaction on its destination router.
///
/// V2 and V3 routers are analysed; a Universal Router destination is
/// reported as not implemented here (use `universal::analyse_trade_by_receipt`).
pub async fn analyse_trade_by_receipt<C: ChainData + ?Sized>(
    chain_data: &C,
    routers: &RouterTable,
    chain: &str,
    tx: &TransactionData,
    tx_hash: B256,
    receipt: &ReceiptData,
    options: &AnalysisOptions,
) -> Result<TradeAnalysis, AnalysisError> {
    let Some(router) = tx.to else {
        return Err(AnalysisError::UnrecognizedRouter {
            chain: chain.to_string(),
            address: None,
        });
    };

    let kind = routers.classify(chain, router);
    debug!(tx = %tx_hash, router = %router, "Dispatching to {}", kind);

    let result = match kind {
        RouterKind::V2 => v2::analyse_trade(chain_data, tx, tx_hash, receipt, options).await,
        RouterKind::V3 => v3::analyse_trade(chain_data, tx, tx_hash, receipt).await,
        RouterKind::Universal => Err(AnalysisError::UnsupportedProtocolPath(
            "universal router not implemented in the v2/v3 dispatcher".to_string(),
        )),
        RouterKind::Unknown => Err(AnalysisError::UnrecognizedRouter {
            chain: chain.to_string(),
            address: Some(router),
        }),
    };

    if let Ok(analysis) = &result {
        info!(tx = %tx_hash, "{}", analysis);
    }
    result
}

/// Failure record for a reverted transaction. The revert reason is best effort.
pub(crate) async fn failed_trade<C: ChainData + ?Sized>(
    chain_data: &C,
    tx_hash: B256,
    receipt: &ReceiptData,
) -> TradeFail {
    let revert_reason = match chain_data.revert_reason(tx_hash).await {
        Ok(reason) => reason,
        Err(e) => {
            warn!(tx = %tx_hash, "Could not fetch revert reason: {:#}", e);
            None
        }
    };

    TradeFail {
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
        revert_reason,
    }
}

/// The only event of `kind`; none or several is a malformed swap set.
pub(crate) fn single_swap_event(
    events: &[DecodedEvent],
    kind: EventKind,
) -> Result<&DecodedEvent, AnalysisError> {
    let swaps: Vec<&DecodedEvent> = events.iter().filter(|e| e.kind == kind).collect();
    match swaps.as_slice() {
        [] => Err(AnalysisError::MalformedSwapSet(SwapSetProblem::NoSwapEvent)),
        [event] => Ok(*event),
        many => Err(AnalysisError::MalformedSwapSet(
            SwapSetProblem::MultipleSwapEvents(many.len()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::chain::mock::MockChain;
    use crate::contracts::{ISwapRouter02, IUniswapV2Router02};
    use alloy::primitives::aliases::U24;
    use alloy::primitives::{address, U256};
    use alloy::sol_types::SolCall;

    fn v3_input() -> Vec<u8> {
        ISwapRouter02::exactInputSingleCall {
            params: ISwapRouter02::ExactInputSingleParams {
                tokenIn: USDC,
                tokenOut: WETH,
                fee: U24::from_limbs([500]),
                recipient: TRADER,
                amountIn: U256::from(USDC_IN),
                amountOutMinimum: U256::ZERO,
                sqrtPriceLimitX96: Default::default(),
            },
        }
        .abi_encode()
    }

    async fn dispatch(chain: &MockChain, tx: TransactionData) -> Result<TradeAnalysis, AnalysisError> {
        analyse_trade_by_receipt(
            chain,
            RouterTable::builtin(),
            "base",
            &tx,
            tx_hash(),
            &receipt(true, vec![usdc_to_weth_log(0)]),
            &AnalysisOptions::default(),
        )
        .await
    }

    #[tokio::test]
    async fn test_universal_router_is_not_dispatched() {
        let err = dispatch(&base_chain(), transaction(UNIVERSAL_ROUTER, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedProtocolPath(_)));
    }

    #[tokio::test]
    async fn test_unknown_router() {
        let stranger = address!("000000000000000000000000000000000000dEaD");
        let err = dispatch(&base_chain(), transaction(stranger, v3_input()))
            .await
            .unwrap_err();
        match err {
            AnalysisError::UnrecognizedRouter { chain, address } => {
                assert_eq!(chain, "base");
                assert_eq!(address, Some(stranger));
            }
            other => panic!("expected UnrecognizedRouter, got {:?}", other),
        }

        // V3 router of another chain
        let err = analyse_trade_by_receipt(
            &base_chain(),
            RouterTable::builtin(),
            "ethereum",
            &transaction(V3_ROUTER, v3_input()),
            tx_hash(),
            &receipt(true, vec![]),
            &AnalysisOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AnalysisError::UnrecognizedRouter { .. }));
    }

    #[tokio::test]
    async fn test_contract_creation() {
        let mut tx = transaction(V3_ROUTER, vec![]);
        tx.to = None;
        let err = dispatch(&base_chain(), tx).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UnrecognizedRouter { address: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_v3_router_is_dispatched() {
        let chain = base_chain().with_transaction(
            tx_hash(),
            transaction(V3_ROUTER, v3_input()),
            receipt(true, vec![usdc_to_weth_log(0)]),
        );

        let result = analyse_trade_by_hash(
            &chain,
            RouterTable::builtin(),
            "base",
            tx_hash(),
            &AnalysisOptions::default(),
        )
        .await
        .unwrap();
        assert!(result.is_success());
        assert_eq!(result.as_success().unwrap().amount_out, U256::from(WETH_OUT));
    }

    #[tokio::test]
    async fn test_v2_router_is_dispatched() {
        let input = IUniswapV2Router02::swapExactTokensForTokensCall {
            amountIn: U256::from(USDC_IN),
            amountOutMin: U256::ZERO,
            path: vec![USDC, WETH],
            to: TRADER,
            deadline: U256::from(1u64),
        }
        .abi_encode();
        let chain = base_chain().with_transaction(
            tx_hash(),
            transaction(V2_ROUTER, input),
            receipt(true, vec![v2_usdc_to_weth_log(0)]),
        );

        let hash = format!("{}", tx_hash());
        let result = analyse_trade_by_hash(
            &chain,
            RouterTable::builtin(),
            "Base",
            hash.as_str(),
            &AnalysisOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(result.as_success().unwrap().token0, WETH);
    }

    #[tokio::test]
    async fn test_wrong_calldata_for_router() {
        // V2 calldata sent to a V3 router
        let input = IUniswapV2Router02::swapExactTokensForTokensCall {
            amountIn: U256::from(USDC_IN),
            amountOutMin: U256::ZERO,
            path: vec![USDC, WETH],
            to: TRADER,
            deadline: U256::from(1u64),
        }
        .abi_encode();
        let err = dispatch(&base_chain(), transaction(V3_ROUTER, input)).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InputDecode(_)));
    }

    #[tokio::test]
    async fn test_invalid_hash() {
        let err = analyse_trade_by_hash(
            &base_chain(),
            RouterTable::builtin(),
            "base",
            "0x1234",
            &AnalysisOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidTxHash(_)));
    }

    #[test]
    fn test_single_swap_event() {
        let events = crate::chain::decode_receipt_events(&[
            usdc_to_weth_log(0),
            v2_usdc_to_weth_log(1),
        ]);
        assert_eq!(
            single_swap_event(&events, EventKind::UniswapV3Swap).unwrap().log_index,
            Some(0)
        );
        assert_eq!(
            single_swap_event(&events, EventKind::UniswapV2Swap).unwrap().log_index,
            Some(1)
        );
        assert!(matches!(
            single_swap_event(&events, EventKind::Transfer),
            Err(AnalysisError::MalformedSwapSet(SwapSetProblem::NoSwapEvent))
        ));
    }
}
