//! Swap Calldata Decoder
//!
//! Purpose:
//!     Decode router calldata into the swap the sender asked for: token
//!     route (input token first), declared input amount and minimum output.
//!
//! Supported routers:
//!     Uniswap V2 Router02        (`swap_router::decode_v2_router_call`)
//!     Uniswap V3 SwapRouter / 02 (`swap_router::decode_v3_router_call`)
//!     Uniswap Universal Router   (`universal::decode_execute`)

pub mod path;
pub mod swap_router;
pub mod universal;

pub use path::{decode_v3_path, encode_v3_path, V3Path};
pub use swap_router::{decode_v2_router_call, decode_v3_router_call};
pub use universal::{decode_execute, ExecuteCall, RouterCommand, RouterOperation};

use alloy::primitives::{Address, U256};

/// A single swap decoded from calldata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCall {
    /// Router function or Universal Router command name
    pub function: &'static str,
    /// Token route, input token first
    pub path: Vec<Address>,
    /// V3 pool fees per hop (empty for V2)
    pub fees: Vec<u32>,
    /// Exact input amount; None for exact-output swaps and ETH-in V2 swaps (msg.value)
    pub amount_in: Option<U256>,
    /// Input cap of exact-output swaps
    pub amount_in_max: Option<U256>,
    /// `amountOutMin` for exact-input swaps, the exact `amountOut` otherwise
    pub amount_out_min: U256,
    pub exact_output: bool,
}

impl SwapCall {
    pub fn token_in(&self) -> Option<Address> {
        self.path.first().copied()
    }

    pub fn token_out(&self) -> Option<Address> {
        self.path.last().copied()
    }
}

/// Return the 4-byte selector as a hex string for logging
pub fn selector_hex(input: &[u8]) -> String {
    if input.len() < 4 {
        return "0x????".to_string();
    }
    format!("0x{:02x}{:02x}{:02x}{:02x}", input[0], input[1], input[2], input[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_hex() {
        let data = vec![0x41, 0x4b, 0xf3, 0x89, 0x00];
        assert_eq!(selector_hex(&data), "0x414bf389");
    }

    #[test]
    fn test_selector_hex_short() {
        let data = vec![0x41, 0x4b];
        assert_eq!(selector_hex(&data), "0x????");
    }
}
