//! Receipt event decoding
//!
//! Turns raw receipt logs into named events with named arguments. Only the
//! events swap analysis cares about are recognised; any other log (unknown
//! topic, ERC-721 Transfer with an indexed token id, malformed data) is
//! skipped.
//!
//! Both Uniswap V2 and V3 pools emit an event called `Swap`. They differ in
//! signature and are told apart by `EventKind`.

use super::LogEntry;
use crate::contracts::{IUniswapV2Pair, IWETH9, UniswapV3Pool, IERC20};
use alloy::primitives::{Address, LogData, I256, U256};
use alloy::sol_types::SolEvent;
use std::collections::BTreeMap;
use tracing::trace;

/// Recognised event signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Swap(address,address,int256,int256,uint160,uint128,int24)
    UniswapV3Swap,
    /// Swap(address,uint256,uint256,uint256,uint256,address)
    UniswapV2Swap,
    UniswapV2Sync,
    Transfer,
    Deposit,
    Withdrawal,
}

impl EventKind {
    /// Solidity event name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::UniswapV3Swap | EventKind::UniswapV2Swap => "Swap",
            EventKind::UniswapV2Sync => "Sync",
            EventKind::Transfer => "Transfer",
            EventKind::Deposit => "Deposit",
            EventKind::Withdrawal => "Withdrawal",
        }
    }
}

/// A decoded argument value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventValue {
    Address(Address),
    Uint(U256),
    Int(I256),
}

/// One decoded receipt log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub kind: EventKind,
    /// Emitting contract (the pool for swaps)
    pub address: Address,
    pub log_index: Option<u64>,
    pub args: BTreeMap<&'static str, EventValue>,
}

impl DecodedEvent {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn address_arg(&self, name: &str) -> Option<Address> {
        match self.args.get(name)? {
            EventValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn uint_arg(&self, name: &str) -> Option<U256> {
        match self.args.get(name)? {
            EventValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn int_arg(&self, name: &str) -> Option<I256> {
        match self.args.get(name)? {
            EventValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// Decode every recognised log of a receipt, preserving log order.
pub fn decode_receipt_events(logs: &[LogEntry]) -> Vec<DecodedEvent> {
    logs.iter().filter_map(decode_log).collect()
}

/// Decode a single log, or None when it is not one of the recognised events.
pub fn decode_log(log: &LogEntry) -> Option<DecodedEvent> {
    let topic0 = *log.topics.first()?;
    let data = LogData::new(log.topics.clone(), log.data.clone())?;

    let (kind, args) = if topic0 == UniswapV3Pool::Swap::SIGNATURE_HASH {
        let ev = UniswapV3Pool::Swap::decode_log_data(&data).ok()?;
        let tick = I256::try_from(i32::try_from(ev.tick).ok()?).ok()?;
        let args = BTreeMap::from([
            ("sender", EventValue::Address(ev.sender)),
            ("recipient", EventValue::Address(ev.recipient)),
            ("amount0", EventValue::Int(ev.amount0)),
            ("amount1", EventValue::Int(ev.amount1)),
            ("sqrtPriceX96", EventValue::Uint(U256::from(ev.sqrtPriceX96))),
            ("liquidity", EventValue::Uint(U256::from(ev.liquidity))),
            ("tick", EventValue::Int(tick)),
        ]);
        (EventKind::UniswapV3Swap, args)
    } else if topic0 == IUniswapV2Pair::Swap::SIGNATURE_HASH {
        let ev = IUniswapV2Pair::Swap::decode_log_data(&data).ok()?;
        let args = BTreeMap::from([
            ("sender", EventValue::Address(ev.sender)),
            ("amount0In", EventValue::Uint(ev.amount0In)),
            ("amount1In", EventValue::Uint(ev.amount1In)),
            ("amount0Out", EventValue::Uint(ev.amount0Out)),
            ("amount1Out", EventValue::Uint(ev.amount1Out)),
            ("to", EventValue::Address(ev.to)),
        ]);
        (EventKind::UniswapV2Swap, args)
    } else if topic0 == IUniswapV2Pair::Sync::SIGNATURE_HASH {
        let ev = IUniswapV2Pair::Sync::decode_log_data(&data).ok()?;
        let args = BTreeMap::from([
            ("reserve0", EventValue::Uint(U256::from(ev.reserve0))),
            ("reserve1", EventValue::Uint(U256::from(ev.reserve1))),
        ]);
        (EventKind::UniswapV2Sync, args)
    } else if topic0 == IERC20::Transfer::SIGNATURE_HASH {
        let ev = IERC20::Transfer::decode_log_data(&data).ok()?;
        let args = BTreeMap::from([
            ("from", EventValue::Address(ev.from)),
            ("to", EventValue::Address(ev.to)),
            ("value", EventValue::Uint(ev.value)),
        ]);
        (EventKind::Transfer, args)
    } else if topic0 == IWETH9::Deposit::SIGNATURE_HASH {
        let ev = IWETH9::Deposit::decode_log_data(&data).ok()?;
        let args = BTreeMap::from([
            ("dst", EventValue::Address(ev.dst)),
            ("wad", EventValue::Uint(ev.wad)),
        ]);
        (EventKind::Deposit, args)
    } else if topic0 == IWETH9::Withdrawal::SIGNATURE_HASH {
        let ev = IWETH9::Withdrawal::decode_log_data(&data).ok()?;
        let args = BTreeMap::from([
            ("src", EventValue::Address(ev.src)),
            ("wad", EventValue::Uint(ev.wad)),
        ]);
        (EventKind::Withdrawal, args)
    } else {
        trace!("Skipping log with unknown topic {} from {}", topic0, log.address);
        return None;
    };

    Some(DecodedEvent {
        kind,
        address: log.address,
        log_index: log.log_index,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::{int, log_entry, tick};
    use alloy::primitives::{address, Bytes, B256};

    const POOL: Address = address!("d0b53D9277642d899DF5C87A3966A349A798F224");
    const PAIR: Address = address!("88A43bbDF9D098eEC7bCEda4e2494615dfD9bB9C");
    const ALICE: Address = address!("1111111111111111111111111111111111111111");
    const ROUTER: Address = address!("2626664c2603336E57B271c5C0b26F421741e481");

    fn v3_swap() -> UniswapV3Pool::Swap {
        UniswapV3Pool::Swap {
            sender: ROUTER,
            recipient: ALICE,
            amount0: int(-310_000_000_000_000_000),
            amount1: int(1_000_000_000),
            sqrtPriceX96: alloy::primitives::aliases::U160::from(1u64 << 40),
            liquidity: 42,
            tick: tick(-200_000),
        }
    }

    #[test]
    fn test_decode_v3_swap() {
        let events = decode_receipt_events(&[log_entry(POOL, &v3_swap(), 3)]);
        assert_eq!(events.len(), 1);

        let ev = &events[0];
        assert_eq!(ev.kind, EventKind::UniswapV3Swap);
        assert_eq!(ev.name(), "Swap");
        assert_eq!(ev.address, POOL);
        assert_eq!(ev.log_index, Some(3));
        assert_eq!(ev.address_arg("recipient"), Some(ALICE));
        assert_eq!(ev.int_arg("amount0"), Some(int(-310_000_000_000_000_000)));
        assert_eq!(ev.int_arg("amount1"), Some(int(1_000_000_000)));
        assert_eq!(ev.int_arg("tick"), Some(int(-200_000)));
        assert_eq!(ev.uint_arg("liquidity"), Some(U256::from(42u64)));
        // wrong type for the name
        assert_eq!(ev.uint_arg("amount0"), None);
    }

    #[test]
    fn test_decode_v2_swap_and_sync() {
        let swap = IUniswapV2Pair::Swap {
            sender: ROUTER,
            amount0In: U256::from(1_000u64),
            amount1In: U256::ZERO,
            amount0Out: U256::ZERO,
            amount1Out: U256::from(997u64),
            to: ALICE,
        };
        let sync = IUniswapV2Pair::Sync {
            reserve0: alloy::primitives::aliases::U112::from(5_000u64),
            reserve1: alloy::primitives::aliases::U112::from(6_000u64),
        };
        let events = decode_receipt_events(&[log_entry(PAIR, &sync, 0), log_entry(PAIR, &swap, 1)]);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::UniswapV2Sync);
        assert_eq!(events[0].uint_arg("reserve1"), Some(U256::from(6_000u64)));
        assert_eq!(events[1].kind, EventKind::UniswapV2Swap);
        assert_eq!(events[1].name(), "Swap");
        assert_eq!(events[1].uint_arg("amount1Out"), Some(U256::from(997u64)));
        assert_eq!(events[1].address_arg("to"), Some(ALICE));
    }

    #[test]
    fn test_decode_token_events() {
        let transfer = IERC20::Transfer {
            from: ALICE,
            to: POOL,
            value: U256::from(5u64),
        };
        let deposit = IWETH9::Deposit {
            dst: ROUTER,
            wad: U256::from(7u64),
        };
        let events = decode_receipt_events(&[log_entry(ALICE, &transfer, 0), log_entry(ALICE, &deposit, 1)]);

        assert_eq!(events[0].kind, EventKind::Transfer);
        assert_eq!(events[0].uint_arg("value"), Some(U256::from(5u64)));
        assert_eq!(events[1].kind, EventKind::Deposit);
        assert_eq!(events[1].address_arg("dst"), Some(ROUTER));
    }

    #[test]
    fn test_unknown_and_malformed_logs_are_skipped() {
        let unknown = LogEntry {
            address: POOL,
            topics: vec![B256::repeat_byte(0x42)],
            data: Bytes::new(),
            log_index: Some(0),
        };
        let anonymous = LogEntry {
            address: POOL,
            topics: vec![],
            data: Bytes::new(),
            log_index: Some(1),
        };
        let mut truncated = log_entry(POOL, &v3_swap(), 2);
        truncated.data = Bytes::from(vec![0u8; 10]);

        let events = decode_receipt_events(&[unknown, anonymous, truncated, log_entry(POOL, &v3_swap(), 3)]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].log_index, Some(3));
    }
}
