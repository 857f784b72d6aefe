//! Router calldata decoders
//!
//! Supported functions:
//!     V2 Router02:
//!       swapExactTokensForTokens, swapTokensForExactTokens,
//!       swapExactETHForTokens, swapETHForExactTokens,
//!       swapExactTokensForETH, swapTokensForExactETH,
//!       and the three ...SupportingFeeOnTransferTokens variants
//!     V3 SwapRouter (deadline inside the params struct):
//!       exactInputSingle, exactInput, exactOutputSingle, exactOutput, multicall(bytes[])
//!     V3 SwapRouter02 (no deadline in the struct):
//!       the same four swaps, multicall(uint256,bytes[]), multicall(bytes32,bytes[])
//!
//! A multicall must wrap exactly one swap; refundETH, unwrapWETH9 and other
//! helper calls are skipped. Multicalls do not nest.

use super::path::decode_v3_path;
use super::{selector_hex, SwapCall};
use crate::contracts::{
    ISwapRouter, ISwapRouter::ISwapRouterCalls, ISwapRouter02, ISwapRouter02::ISwapRouter02Calls,
    IUniswapV2Router02::IUniswapV2Router02Calls,
};
use crate::error::{AnalysisError, SwapSetProblem};
use alloy::primitives::aliases::U24;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolInterface};
use tracing::trace;

// ── V2 Router02 ─────────────────────────────────────────────────────

/// Decode a Uniswap V2 Router02 swap call.
pub fn decode_v2_router_call(input: &[u8]) -> Result<SwapCall, AnalysisError> {
    let call = IUniswapV2Router02Calls::abi_decode(input).map_err(|e| {
        AnalysisError::InputDecode(format!(
            "not a V2 router swap ({}): {}",
            selector_hex(input),
            e
        ))
    })?;

    let swap = match call {
        IUniswapV2Router02Calls::swapExactTokensForTokens(c) => {
            v2_exact_in("swapExactTokensForTokens", c.path, Some(c.amountIn), c.amountOutMin)
        }
        IUniswapV2Router02Calls::swapExactTokensForETH(c) => {
            v2_exact_in("swapExactTokensForETH", c.path, Some(c.amountIn), c.amountOutMin)
        }
        IUniswapV2Router02Calls::swapExactETHForTokens(c) => {
            v2_exact_in("swapExactETHForTokens", c.path, None, c.amountOutMin)
        }
        IUniswapV2Router02Calls::swapExactTokensForTokensSupportingFeeOnTransferTokens(c) => v2_exact_in(
            "swapExactTokensForTokensSupportingFeeOnTransferTokens",
            c.path,
            Some(c.amountIn),
            c.amountOutMin,
        ),
        IUniswapV2Router02Calls::swapExactTokensForETHSupportingFeeOnTransferTokens(c) => v2_exact_in(
            "swapExactTokensForETHSupportingFeeOnTransferTokens",
            c.path,
            Some(c.amountIn),
            c.amountOutMin,
        ),
        IUniswapV2Router02Calls::swapExactETHForTokensSupportingFeeOnTransferTokens(c) => v2_exact_in(
            "swapExactETHForTokensSupportingFeeOnTransferTokens",
            c.path,
            None,
            c.amountOutMin,
        ),
        IUniswapV2Router02Calls::swapTokensForExactTokens(c) => {
            v2_exact_out("swapTokensForExactTokens", c.path, Some(c.amountInMax), c.amountOut)
        }
        IUniswapV2Router02Calls::swapTokensForExactETH(c) => {
            v2_exact_out("swapTokensForExactETH", c.path, Some(c.amountInMax), c.amountOut)
        }
        IUniswapV2Router02Calls::swapETHForExactTokens(c) => {
            v2_exact_out("swapETHForExactTokens", c.path, None, c.amountOut)
        }
    };

    if swap.path.len() < 2 {
        return Err(AnalysisError::InputDecode(format!(
            "{} path has {} tokens",
            swap.function,
            swap.path.len()
        )));
    }
    trace!("Decoded {} over {} tokens", swap.function, swap.path.len());
    Ok(swap)
}

fn v2_exact_in(
    function: &'static str,
    path: Vec<Address>,
    amount_in: Option<U256>,
    amount_out_min: U256,
) -> SwapCall {
    SwapCall {
        function,
        path,
        fees: Vec::new(),
        amount_in,
        amount_in_max: None,
        amount_out_min,
        exact_output: false,
    }
}

fn v2_exact_out(
    function: &'static str,
    path: Vec<Address>,
    amount_in_max: Option<U256>,
    amount_out: U256,
) -> SwapCall {
    SwapCall {
        function,
        path,
        fees: Vec::new(),
        amount_in: None,
        amount_in_max,
        amount_out_min: amount_out,
        exact_output: true,
    }
}

// ── V3 SwapRouter / SwapRouter02 ────────────────────────────────────

const MULTICALL_SELECTORS: [[u8; 4]; 3] = [
    ISwapRouter::multicallCall::SELECTOR,
    ISwapRouter02::multicall_0Call::SELECTOR,
    ISwapRouter02::multicall_1Call::SELECTOR,
];

fn is_multicall(input: &[u8]) -> bool {
    input.len() >= 4 && MULTICALL_SELECTORS.iter().any(|s| input[..4] == s[..])
}

/// Decode a Uniswap V3 SwapRouter or SwapRouter02 swap call (possibly wrapped in multicall).
pub fn decode_v3_router_call(input: &[u8]) -> Result<SwapCall, AnalysisError> {
    if let Ok(call) = ISwapRouterCalls::abi_decode(input) {
        return match call {
            ISwapRouterCalls::exactInputSingle(c) => Ok(single_hop_exact_in(
                c.params.tokenIn,
                c.params.tokenOut,
                c.params.fee,
                c.params.amountIn,
                c.params.amountOutMinimum,
            )),
            ISwapRouterCalls::exactInput(c) => {
                multi_hop_exact_in(&c.params.path, c.params.amountIn, c.params.amountOutMinimum)
            }
            ISwapRouterCalls::exactOutputSingle(c) => Ok(single_hop_exact_out(
                c.params.tokenIn,
                c.params.tokenOut,
                c.params.fee,
                c.params.amountOut,
                c.params.amountInMaximum,
            )),
            ISwapRouterCalls::exactOutput(c) => {
                multi_hop_exact_out(&c.params.path, c.params.amountOut, c.params.amountInMaximum)
            }
            ISwapRouterCalls::multicall(c) => decode_multicall(&c.data),
        };
    }

    let call = ISwapRouter02Calls::abi_decode(input).map_err(|e| {
        AnalysisError::InputDecode(format!(
            "not a V3 router swap ({}): {}",
            selector_hex(input),
            e
        ))
    })?;

    match call {
        ISwapRouter02Calls::exactInputSingle(c) => Ok(single_hop_exact_in(
            c.params.tokenIn,
            c.params.tokenOut,
            c.params.fee,
            c.params.amountIn,
            c.params.amountOutMinimum,
        )),
        ISwapRouter02Calls::exactInput(c) => {
            multi_hop_exact_in(&c.params.path, c.params.amountIn, c.params.amountOutMinimum)
        }
        ISwapRouter02Calls::exactOutputSingle(c) => Ok(single_hop_exact_out(
            c.params.tokenIn,
            c.params.tokenOut,
            c.params.fee,
            c.params.amountOut,
            c.params.amountInMaximum,
        )),
        ISwapRouter02Calls::exactOutput(c) => {
            multi_hop_exact_out(&c.params.path, c.params.amountOut, c.params.amountInMaximum)
        }
        ISwapRouter02Calls::multicall_0(c) => decode_multicall(&c.data),
        ISwapRouter02Calls::multicall_1(c) => decode_multicall(&c.data),
    }
}

/// Decode each inner call; exactly one of them must be a swap.
fn decode_multicall(calls: &[Bytes]) -> Result<SwapCall, AnalysisError> {
    // Inner entries recurse into decode_v3_router_call, which is only bounded
    // while a multicall cannot contain another one
    if let Some(nested) = calls.iter().find(|inner| is_multicall(inner)) {
        return Err(AnalysisError::InputDecode(format!(
            "nested multicall ({}) inside multicall",
            selector_hex(nested)
        )));
    }

    let mut swaps: Vec<SwapCall> = calls
        .iter()
        .filter_map(|inner| match decode_v3_router_call(inner) {
            Ok(swap) => Some(swap),
            Err(e) => {
                trace!("Skipping multicall entry {}: {}", selector_hex(inner), e);
                None
            }
        })
        .collect();

    match swaps.len() {
        0 => Err(AnalysisError::MalformedSwapSet(SwapSetProblem::NoSwapOperation)),
        1 => Ok(swaps.remove(0)),
        n => Err(AnalysisError::MalformedSwapSet(
            SwapSetProblem::MultipleSwapOperations(n),
        )),
    }
}

fn single_hop_exact_in(
    token_in: Address,
    token_out: Address,
    fee: U24,
    amount_in: U256,
    amount_out_min: U256,
) -> SwapCall {
    SwapCall {
        function: "exactInputSingle",
        path: vec![token_in, token_out],
        fees: vec![fee.to::<u32>()],
        amount_in: Some(amount_in),
        amount_in_max: None,
        amount_out_min,
        exact_output: false,
    }
}

fn single_hop_exact_out(
    token_in: Address,
    token_out: Address,
    fee: U24,
    amount_out: U256,
    amount_in_max: U256,
) -> SwapCall {
    SwapCall {
        function: "exactOutputSingle",
        path: vec![token_in, token_out],
        fees: vec![fee.to::<u32>()],
        amount_in: None,
        amount_in_max: Some(amount_in_max),
        amount_out_min: amount_out,
        exact_output: true,
    }
}

fn multi_hop_exact_in(
    path: &[u8],
    amount_in: U256,
    amount_out_min: U256,
) -> Result<SwapCall, AnalysisError> {
    let path = decode_v3_path(path)?;
    Ok(SwapCall {
        function: "exactInput",
        path: path.tokens,
        fees: path.fees,
        amount_in: Some(amount_in),
        amount_in_max: None,
        amount_out_min,
        exact_output: false,
    })
}

/// Exact-output paths are encoded output token first
fn multi_hop_exact_out(
    path: &[u8],
    amount_out: U256,
    amount_in_max: U256,
) -> Result<SwapCall, AnalysisError> {
    let path = decode_v3_path(path)?.reversed();
    Ok(SwapCall {
        function: "exactOutput",
        path: path.tokens,
        fees: path.fees,
        amount_in: None,
        amount_in_max: Some(amount_in_max),
        amount_out_min: amount_out,
        exact_output: true,
    })
}
