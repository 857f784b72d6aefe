//! Uniswap Trade Analyzer CLI
//!
//! Analyses one swap transaction and prints the outcome as JSON.
//!
//! Usage:
//!   swap-analyzer 0xe3e1a992...6245
//!   swap-analyzer --chain ethereum --rpc-url https://eth.llamarpc.com 0x...
//!   swap-analyzer --universal --compact 0x...
//!
//! Settings not given on the command line come from `.env` / the environment
//! (RPC_URL, CHAIN, ROUTER_TABLE, V2_LP_FEE_BPS).

use alloy::providers::ProviderBuilder;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use swap_analyzer::analysis::universal;
use swap_analyzer::{analyse_trade_by_hash, AppConfig, IntoTxHash, RpcChainData};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Uniswap trade analyzer (V2, V3, Universal Router)
#[derive(Parser)]
#[command(name = "swap-analyzer")]
struct Args {
    /// Transaction hash (0x-prefixed hex)
    tx_hash: String,

    /// Chain name for router lookup (base, ethereum)
    #[arg(short, long)]
    chain: Option<String>,

    /// JSON-RPC endpoint
    #[arg(long)]
    rpc_url: Option<String>,

    /// Router table TOML replacing the built-in one
    #[arg(long)]
    routers: Option<PathBuf>,

    /// Analyse as a Universal Router trade, skipping router lookup
    #[arg(long)]
    universal: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Log output format (pretty, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::from_env()?;

    // Initialize logging (stderr, stdout carries the JSON result)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match args.log_format.as_str() {
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }

    if let Some(chain) = args.chain {
        config.chain = chain.to_lowercase();
    }
    if let Some(rpc_url) = args.rpc_url {
        config.rpc_url = Some(rpc_url);
    }
    if let Some(path) = args.routers {
        config.router_table = Some(path);
    }

    let tx_hash = args.tx_hash.as_str().into_tx_hash()?;
    let rpc_url = config.require_rpc_url()?;
    let provider = ProviderBuilder::new().connect_http(
        rpc_url
            .parse()
            .with_context(|| format!("Invalid RPC URL: {}", rpc_url))?,
    );
    let chain_data = RpcChainData::new(Arc::new(provider));

    info!("Analysing {} on {}", tx_hash, config.chain);

    let analysis = if args.universal {
        universal::analyse_trade_by_hash(&chain_data, tx_hash).await?
    } else {
        let routers = config.routers()?;
        analyse_trade_by_hash(
            &chain_data,
            &routers,
            &config.chain,
            tx_hash,
            &config.analysis_options(),
        )
        .await?
    };

    let json = if args.compact {
        serde_json::to_string(&analysis)?
    } else {
        serde_json::to_string_pretty(&analysis)?
    };
    println!("{}", json);

    Ok(())
}
