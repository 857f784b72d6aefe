//! Shared trade fixtures: a Base-like chain with WETH/USDC pools and routers

use crate::chain::mock::{int, log_entry, tick, MockChain};
use crate::chain::{LogEntry, ReceiptData, TransactionData};
use crate::contracts::{IUniswapV2Pair, UniswapV3Pool};
use crate::pool::{PoolDetails, TokenDetails};
use alloy::primitives::{address, Address, Bytes, B256, U256};

pub const WETH: Address = address!("4200000000000000000000000000000000000006");
pub const USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const V3_POOL: Address = address!("d0b53D9277642d899DF5C87A3966A349A798F224");
pub const V2_PAIR: Address = address!("88A43bbDF9D098eEC7bCEda4e2494615dfD9bB9C");
pub const TRADER: Address = address!("1111111111111111111111111111111111111111");

pub const V2_ROUTER: Address = address!("4752ba5DBc23f44D87826276BF6Fd6b1C372aD24");
pub const V3_ROUTER: Address = address!("2626664c2603336E57B271c5C0b26F421741e481");
pub const UNIVERSAL_ROUTER: Address = address!("3fC91A3afd70395Cd496C647d5a6CC9D4B2b7FAD");

pub const GAS_USED: u64 = 150_000;
pub const GAS_PRICE: u128 = 2_500_000_000;

/// 1000 USDC
pub const USDC_IN: u64 = 1_000_000_000;
/// 0.484 WETH
pub const WETH_OUT: u128 = 484_000_000_000_000_000;
/// USDC per WETH around 2063
pub const TICK: i32 = -200_000;

pub fn tx_hash() -> B256 {
    B256::repeat_byte(0xab)
}

pub fn weth_usdc_pool() -> PoolDetails {
    PoolDetails {
        address: V3_POOL,
        token0: TokenDetails::new(WETH, 18, Some("WETH".to_string())),
        token1: TokenDetails::new(USDC, 6, Some("USDC".to_string())),
        fee: 500,
    }
}

/// Tokens, the V3 pool and the V2 pair, no transactions yet
pub fn base_chain() -> MockChain {
    MockChain::new()
        .with_token(WETH, 18, "WETH")
        .with_token(USDC, 6, "USDC")
        .with_pool(weth_usdc_pool())
        .with_pair(V2_PAIR, WETH, USDC)
}

pub fn transaction(to: Address, input: Vec<u8>) -> TransactionData {
    TransactionData {
        from: TRADER,
        to: Some(to),
        input: Bytes::from(input),
        value: U256::ZERO,
    }
}

pub fn receipt(status: bool, logs: Vec<LogEntry>) -> ReceiptData {
    ReceiptData {
        status,
        gas_used: GAS_USED,
        effective_gas_price: GAS_PRICE,
        block_number: Some(21_000_000),
        logs,
    }
}

pub fn v3_swap_log(amount0: i128, amount1: i128, log_index: u64) -> LogEntry {
    let event = UniswapV3Pool::Swap {
        sender: V3_ROUTER,
        recipient: TRADER,
        amount0: int(amount0),
        amount1: int(amount1),
        sqrtPriceX96: Default::default(),
        liquidity: 1_000_000,
        tick: tick(TICK),
    };
    log_entry(V3_POOL, &event, log_index)
}

/// USDC in, WETH out through the V3 pool
pub fn usdc_to_weth_log(log_index: u64) -> LogEntry {
    v3_swap_log(-(WETH_OUT as i128), i128::from(USDC_IN), log_index)
}

/// USDC (token1) in, WETH (token0) out through the V2 pair
pub fn v2_usdc_to_weth_log(log_index: u64) -> LogEntry {
    let event = IUniswapV2Pair::Swap {
        sender: V2_ROUTER,
        amount0In: U256::ZERO,
        amount1In: U256::from(USDC_IN),
        amount0Out: U256::from(WETH_OUT),
        amount1Out: U256::ZERO,
        to: TRADER,
    };
    log_entry(V2_PAIR, &event, log_index)
}
