//! Uniswap V3 packed path codec
//!
//! A V3 path is `token(20) | fee(3) | token(20) | fee(3) | ... | token(20)`.
//! Exact-output swaps store the path output-first; callers flip it with
//! `V3Path::reversed` so the input token comes first.

use crate::error::AnalysisError;
use alloy::primitives::Address;

const ADDR_SIZE: usize = 20;
const FEE_SIZE: usize = 3;
const HOP_SIZE: usize = ADDR_SIZE + FEE_SIZE;

/// Decoded V3 path: `fees[i]` is the pool fee between `tokens[i]` and `tokens[i + 1]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Path {
    pub tokens: Vec<Address>,
    pub fees: Vec<u32>,
}

impl V3Path {
    /// Same route walked from the other end
    pub fn reversed(mut self) -> Self {
        self.tokens.reverse();
        self.fees.reverse();
        self
    }

    pub fn first_token(&self) -> Option<Address> {
        self.tokens.first().copied()
    }

    pub fn last_token(&self) -> Option<Address> {
        self.tokens.last().copied()
    }

    pub fn hops(&self) -> usize {
        self.fees.len()
    }
}

/// Decode a packed V3 path.
pub fn decode_v3_path(path: &[u8]) -> Result<V3Path, AnalysisError> {
    // Minimum path: token(20) + fee(3) + token(20) = 43 bytes
    if path.len() < ADDR_SIZE + HOP_SIZE || (path.len() - ADDR_SIZE) % HOP_SIZE != 0 {
        return Err(AnalysisError::InputDecode(format!(
            "invalid v3 path length {}",
            path.len()
        )));
    }

    let hops = (path.len() - ADDR_SIZE) / HOP_SIZE;
    let mut tokens = Vec::with_capacity(hops + 1);
    let mut fees = Vec::with_capacity(hops);

    for hop in 0..hops {
        let start = hop * HOP_SIZE;
        tokens.push(Address::from_slice(&path[start..start + ADDR_SIZE]));
        let fee = &path[start + ADDR_SIZE..start + HOP_SIZE];
        fees.push(u32::from(fee[0]) << 16 | u32::from(fee[1]) << 8 | u32::from(fee[2]));
    }
    // Last token starts 20 bytes from the end
    tokens.push(Address::from_slice(&path[path.len() - ADDR_SIZE..]));

    Ok(V3Path { tokens, fees })
}

/// Encode tokens and fees into a packed V3 path. `fees.len()` must be `tokens.len() - 1`.
pub fn encode_v3_path(tokens: &[Address], fees: &[u32]) -> Result<Vec<u8>, AnalysisError> {
    if tokens.len() < 2 || fees.len() + 1 != tokens.len() {
        return Err(AnalysisError::InputDecode(format!(
            "{} tokens need {} fees, got {}",
            tokens.len(),
            tokens.len().saturating_sub(1),
            fees.len()
        )));
    }

    let mut out = Vec::with_capacity(ADDR_SIZE + fees.len() * HOP_SIZE);
    for (token, fee) in tokens.iter().zip(fees) {
        out.extend_from_slice(token.as_slice());
        out.extend_from_slice(&fee.to_be_bytes()[1..]);
    }
    if let Some(last) = tokens.last() {
        out.extend_from_slice(last.as_slice());
    }
    Ok(out)
}
