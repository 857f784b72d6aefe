//! Analysis error taxonomy
//!
//! Every way a trade analysis can refuse to produce an outcome. A reverted
//! transaction is NOT an error: it comes back as `TradeAnalysis::Fail`.
//!
//! Variants fall in three groups:
//!     - input outside what we decode (router, swap set, swap shape, calldata)
//!     - numeric range problems converting raw values to `Decimal`
//!     - collaborator failures from the chain-data seam, passed through as-is

use alloy::primitives::{Address, U256};
use std::fmt;
use thiserror::Error;

/// Why a transaction did not fit the single-swap assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapSetProblem {
    /// Calldata contained no swap command / call
    NoSwapOperation,
    /// Calldata contained more than one swap command / call
    MultipleSwapOperations(usize),
    /// Receipt carried no `Swap` event
    NoSwapEvent,
    /// Receipt carried more than one `Swap` event where exactly one is required
    MultipleSwapEvents(usize),
}

impl fmt::Display for SwapSetProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapSetProblem::NoSwapOperation => write!(f, "no swap operation detected in the transaction"),
            SwapSetProblem::MultipleSwapOperations(n) => {
                write!(f, "multiple swap operations detected in the transaction ({})", n)
            }
            SwapSetProblem::NoSwapEvent => write!(f, "no Swap event emitted by the transaction"),
            SwapSetProblem::MultipleSwapEvents(n) => {
                write!(f, "multiple Swap events emitted by the transaction ({})", n)
            }
        }
    }
}

/// Errors raised by trade analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Destination matches no router family for the chain. Fix the router table, don't retry.
    #[error("unrecognized router {} on chain '{chain}'", display_destination(.address))]
    UnrecognizedRouter {
        chain: String,
        address: Option<Address>,
    },

    /// Recognized input that this crate does not decode yet.
    #[error("not implemented: {0}")]
    UnsupportedProtocolPath(String),

    #[error("malformed swap set: {0}")]
    MalformedSwapSet(SwapSetProblem),

    #[error("unsupported swap type: {0}")]
    UnsupportedSwapShape(String),

    #[error("failed to decode transaction input: {0}")]
    InputDecode(String),

    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("price for tick {tick} is outside decimal range")]
    PriceOutOfRange { tick: i32 },

    #[error("amount {0} is outside decimal range")]
    AmountOutOfRange(U256),

    /// Chain-data retrieval failed (network, missing tx, contract call).
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

fn display_destination(address: &Option<Address>) -> String {
    match address {
        Some(addr) => format!("{:?}", addr),
        None => "<contract creation>".to_string(),
    }
}

impl AnalysisError {
    /// True for failures of the chain-data provider, the only kind worth retrying.
    pub fn is_collaborator(&self) -> bool {
        matches!(self, AnalysisError::Collaborator(_))
    }
}
