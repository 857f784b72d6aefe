//! Universal Router `execute` decoding
//!
//! The Universal Router uses a command-based dispatch pattern:
//!     - `execute(bytes commands, bytes[] inputs, uint256 deadline)`
//!     - `execute(bytes commands, bytes[] inputs)`
//!
//! Each byte in `commands` names one operation and `inputs[i]` holds its
//! ABI-encoded parameters. The low six bits are the command type; the top
//! bit marks an operation that may revert without failing the transaction.

use super::path::decode_v3_path;
use super::{selector_hex, SwapCall};
use crate::contracts::{
    v2SwapExactInCall, v2SwapExactOutCall, v3SwapExactInCall, v3SwapExactOutCall,
    IUniversalRouter::IUniversalRouterCalls,
};
use crate::error::AnalysisError;
use alloy::primitives::{Bytes, U256};
use alloy::sol_types::{SolCall, SolInterface};
use std::fmt;
use tracing::trace;

const COMMAND_TYPE_MASK: u8 = 0x3f;
const FLAG_ALLOW_REVERT: u8 = 0x80;

/// Universal Router command type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterCommand {
    V3SwapExactIn,
    V3SwapExactOut,
    Permit2TransferFrom,
    Permit2PermitBatch,
    Sweep,
    Transfer,
    PayPortion,
    V2SwapExactIn,
    V2SwapExactOut,
    Permit2Permit,
    WrapEth,
    UnwrapWeth,
    Permit2TransferFromBatch,
    BalanceCheckErc20,
    V4Swap,
    V3PositionManagerPermit,
    V3PositionManagerCall,
    V4InitializePool,
    V4PositionManagerCall,
    ExecuteSubPlan,
    Unknown(u8),
}

impl RouterCommand {
    /// Decode a command byte; flag bits are ignored.
    pub fn from_byte(byte: u8) -> Self {
        match byte & COMMAND_TYPE_MASK {
            0x00 => RouterCommand::V3SwapExactIn,
            0x01 => RouterCommand::V3SwapExactOut,
            0x02 => RouterCommand::Permit2TransferFrom,
            0x03 => RouterCommand::Permit2PermitBatch,
            0x04 => RouterCommand::Sweep,
            0x05 => RouterCommand::Transfer,
            0x06 => RouterCommand::PayPortion,
            0x08 => RouterCommand::V2SwapExactIn,
            0x09 => RouterCommand::V2SwapExactOut,
            0x0a => RouterCommand::Permit2Permit,
            0x0b => RouterCommand::WrapEth,
            0x0c => RouterCommand::UnwrapWeth,
            0x0d => RouterCommand::Permit2TransferFromBatch,
            0x0e => RouterCommand::BalanceCheckErc20,
            0x10 => RouterCommand::V4Swap,
            0x11 => RouterCommand::V3PositionManagerPermit,
            0x12 => RouterCommand::V3PositionManagerCall,
            0x13 => RouterCommand::V4InitializePool,
            0x14 => RouterCommand::V4PositionManagerCall,
            0x21 => RouterCommand::ExecuteSubPlan,
            other => RouterCommand::Unknown(other),
        }
    }

    /// Command name as used in the router's Commands library
    pub fn name(&self) -> &'static str {
        match self {
            RouterCommand::V3SwapExactIn => "V3_SWAP_EXACT_IN",
            RouterCommand::V3SwapExactOut => "V3_SWAP_EXACT_OUT",
            RouterCommand::Permit2TransferFrom => "PERMIT2_TRANSFER_FROM",
            RouterCommand::Permit2PermitBatch => "PERMIT2_PERMIT_BATCH",
            RouterCommand::Sweep => "SWEEP",
            RouterCommand::Transfer => "TRANSFER",
            RouterCommand::PayPortion => "PAY_PORTION",
            RouterCommand::V2SwapExactIn => "V2_SWAP_EXACT_IN",
            RouterCommand::V2SwapExactOut => "V2_SWAP_EXACT_OUT",
            RouterCommand::Permit2Permit => "PERMIT2_PERMIT",
            RouterCommand::WrapEth => "WRAP_ETH",
            RouterCommand::UnwrapWeth => "UNWRAP_WETH",
            RouterCommand::Permit2TransferFromBatch => "PERMIT2_TRANSFER_FROM_BATCH",
            RouterCommand::BalanceCheckErc20 => "BALANCE_CHECK_ERC20",
            RouterCommand::V4Swap => "V4_SWAP",
            RouterCommand::V3PositionManagerPermit => "V3_POSITION_MANAGER_PERMIT",
            RouterCommand::V3PositionManagerCall => "V3_POSITION_MANAGER_CALL",
            RouterCommand::V4InitializePool => "V4_INITIALIZE_POOL",
            RouterCommand::V4PositionManagerCall => "V4_POSITION_MANAGER_CALL",
            RouterCommand::ExecuteSubPlan => "EXECUTE_SUB_PLAN",
            RouterCommand::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn is_v3_swap(&self) -> bool {
        matches!(self, RouterCommand::V3SwapExactIn | RouterCommand::V3SwapExactOut)
    }

    pub fn is_v2_swap(&self) -> bool {
        matches!(self, RouterCommand::V2SwapExactIn | RouterCommand::V2SwapExactOut)
    }
}

impl fmt::Display for RouterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterCommand::Unknown(byte) => write!(f, "UNKNOWN(0x{:02x})", byte),
            other => f.write_str(other.name()),
        }
    }
}

/// One command of an `execute` call with its raw input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterOperation {
    pub command: RouterCommand,
    pub allow_revert: bool,
    pub input: Bytes,
}

impl RouterOperation {
    /// Decode a V3_SWAP_EXACT_IN / V3_SWAP_EXACT_OUT input.
    ///
    /// The returned path starts at the input token: exact-out paths are
    /// stored output-first and get flipped here.
    pub fn decode_v3_swap(&self) -> Result<SwapCall, AnalysisError> {
        match self.command {
            RouterCommand::V3SwapExactIn => {
                let decoded = v3SwapExactInCall::abi_decode_raw(&self.input)
                    .map_err(|e| input_error(self.command, e))?;
                let path = decode_v3_path(&decoded.path)?;
                Ok(SwapCall {
                    function: self.command.name(),
                    path: path.tokens,
                    fees: path.fees,
                    amount_in: Some(decoded.amountIn),
                    amount_in_max: None,
                    amount_out_min: decoded.amountOutMin,
                    exact_output: false,
                })
            }
            RouterCommand::V3SwapExactOut => {
                let decoded = v3SwapExactOutCall::abi_decode_raw(&self.input)
                    .map_err(|e| input_error(self.command, e))?;
                let path = decode_v3_path(&decoded.path)?.reversed();
                Ok(SwapCall {
                    function: self.command.name(),
                    path: path.tokens,
                    fees: path.fees,
                    amount_in: None,
                    amount_in_max: Some(decoded.amountInMax),
                    amount_out_min: decoded.amountOut,
                    exact_output: true,
                })
            }
            other => Err(AnalysisError::InputDecode(format!("{} is not a V3 swap", other))),
        }
    }

    /// Decode a V2_SWAP_EXACT_IN / V2_SWAP_EXACT_OUT input.
    pub fn decode_v2_swap(&self) -> Result<SwapCall, AnalysisError> {
        match self.command {
            RouterCommand::V2SwapExactIn => {
                let decoded = v2SwapExactInCall::abi_decode_raw(&self.input)
                    .map_err(|e| input_error(self.command, e))?;
                Ok(SwapCall {
                    function: self.command.name(),
                    path: decoded.path,
                    fees: Vec::new(),
                    amount_in: Some(decoded.amountIn),
                    amount_in_max: None,
                    amount_out_min: decoded.amountOutMin,
                    exact_output: false,
                })
            }
            RouterCommand::V2SwapExactOut => {
                let decoded = v2SwapExactOutCall::abi_decode_raw(&self.input)
                    .map_err(|e| input_error(self.command, e))?;
                Ok(SwapCall {
                    function: self.command.name(),
                    path: decoded.path,
                    fees: Vec::new(),
                    amount_in: None,
                    amount_in_max: Some(decoded.amountInMax),
                    amount_out_min: decoded.amountOut,
                    exact_output: true,
                })
            }
            other => Err(AnalysisError::InputDecode(format!("{} is not a V2 swap", other))),
        }
    }
}

fn input_error(command: RouterCommand, e: alloy::sol_types::Error) -> AnalysisError {
    AnalysisError::InputDecode(format!("{} input: {}", command, e))
}

/// A decoded `execute` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteCall {
    pub operations: Vec<RouterOperation>,
    pub deadline: Option<U256>,
}

impl ExecuteCall {
    /// V2 and V3 swap operations, in command order
    pub fn swap_operations(&self) -> Vec<&RouterOperation> {
        self.operations
            .iter()
            .filter(|op| op.command.is_v3_swap() || op.command.is_v2_swap())
            .collect()
    }
}

/// Decode Universal Router `execute` calldata into its ordered operations.
pub fn decode_execute(input: &[u8]) -> Result<ExecuteCall, AnalysisError> {
    let call = IUniversalRouterCalls::abi_decode(input).map_err(|e| {
        AnalysisError::InputDecode(format!(
            "not a Universal Router execute ({}): {}",
            selector_hex(input),
            e
        ))
    })?;

    let (commands, inputs, deadline) = match call {
        IUniversalRouterCalls::execute_0(c) => (c.commands, c.inputs, Some(c.deadline)),
        IUniversalRouterCalls::execute_1(c) => (c.commands, c.inputs, None),
    };

    if commands.len() != inputs.len() {
        return Err(AnalysisError::InputDecode(format!(
            "{} commands but {} inputs",
            commands.len(),
            inputs.len()
        )));
    }

    let operations: Vec<RouterOperation> = commands
        .iter()
        .zip(inputs)
        .map(|(&byte, input)| RouterOperation {
            command: RouterCommand::from_byte(byte),
            allow_revert: byte & FLAG_ALLOW_REVERT != 0,
            input,
        })
        .collect();

    trace!(
        "Decoded execute: [{}]",
        operations
            .iter()
            .map(|op| op.command.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(ExecuteCall {
        operations,
        deadline,
    })
}
