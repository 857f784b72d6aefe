//! Configuration management
//! Load settings from .env file
//!
//! Variables:
//!     RPC_URL        JSON-RPC endpoint (optional here, required by the CLI)
//!     CHAIN          chain name used for router lookup (default: base)
//!     ROUTER_TABLE   path to a router table TOML (default: built-in table)
//!     V2_LP_FEE_BPS  V2 pair LP fee in basis points (default: 30)

use crate::analysis::{AnalysisOptions, DEFAULT_V2_LP_FEE_BPS};
use crate::routers::RouterTable;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_CHAIN: &str = "base";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub rpc_url: Option<String>,
    pub chain: String,
    pub router_table: Option<PathBuf>,
    pub v2_lp_fee_bps: u32,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let v2_lp_fee_bps = match get("V2_LP_FEE_BPS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("V2_LP_FEE_BPS is not a whole number of bps: {}", raw))?,
            None => DEFAULT_V2_LP_FEE_BPS,
        };

        Ok(Self {
            rpc_url: get("RPC_URL"),
            chain: get("CHAIN")
                .map(|c| c.trim().to_lowercase())
                .unwrap_or_else(|| DEFAULT_CHAIN.to_string()),
            router_table: get("ROUTER_TABLE").map(PathBuf::from),
            v2_lp_fee_bps,
        })
    }

    /// The configured router table, or the built-in one
    pub fn routers(&self) -> Result<RouterTable> {
        match &self.router_table {
            Some(path) => {
                let table = RouterTable::load(path)?;
                info!("Router table loaded from {}", path.display());
                Ok(table)
            }
            None => Ok(RouterTable::builtin().clone()),
        }
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            v2_lp_fee_bps: self.v2_lp_fee_bps,
        }
    }

    pub fn require_rpc_url(&self) -> Result<&str> {
        self.rpc_url
            .as_deref()
            .context("RPC_URL not set (pass --rpc-url or add it to .env)")
    }
}
