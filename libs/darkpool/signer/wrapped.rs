//! Wrapped native token per chain
//!
//! Requests may name the native asset as the zero address; pair lookup
//! happens against the wrapped token instead.

use ethers::types::Address;
use std::collections::HashMap;

const DEFAULT_WRAPPED: [(u64, &str); 3] = [
    // Ethereum: WETH
    (1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
    // BSC: WBNB
    (56, "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
    // Base: WETH
    (8453, "0x4200000000000000000000000000000000000006"),
];

#[derive(Debug, Clone)]
pub struct WrappedTokens {
    tokens: HashMap<u64, Address>,
}

impl WrappedTokens {
    pub fn empty() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    pub fn insert(&mut self, chain_id: u64, token: Address) {
        self.tokens.insert(chain_id, token);
    }

    pub fn get(&self, chain_id: u64) -> Option<Address> {
        self.tokens.get(&chain_id).copied()
    }

    /// Swap the zero address for the chain's wrapped token
    ///
    /// `None` when substitution is needed but no mapping exists.
    pub fn resolve(&self, chain_id: u64, token: Address) -> Option<Address> {
        if token.is_zero() {
            self.get(chain_id)
        } else {
            Some(token)
        }
    }
}

impl Default for WrappedTokens {
    fn default() -> Self {
        let tokens = DEFAULT_WRAPPED
            .iter()
            .filter_map(|(chain, addr)| addr.parse().ok().map(|a| (*chain, a)))
            .collect();
        Self { tokens }
    }
}
