//! Uniswap Trade Analyzer Library
//!
//! Decodes Uniswap V2, V3 and Universal Router swap transactions into a
//! normalized outcome: `TradeSuccess` (route, amounts, price, LP fee) or
//! `TradeFail` (gas spent, revert reason).
//!
//! Node access goes through the `ChainData` trait; `RpcChainData` implements
//! it on any alloy Provider.

pub mod analysis;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod decoder;
pub mod error;
pub mod pool;
pub mod routers;
pub mod types;

// Re-export commonly used types
pub use analysis::{analyse_trade_by_hash, analyse_trade_by_receipt, AnalysisOptions};
pub use chain::{ChainData, IntoTxHash, ReceiptData, RpcChainData, TransactionData};
pub use config::AppConfig;
pub use error::{AnalysisError, SwapSetProblem};
pub use pool::{PoolDetails, TokenDetails};
pub use routers::{RouterKind, RouterTable};
pub use types::{TradeAnalysis, TradeFail, TradeSuccess};
