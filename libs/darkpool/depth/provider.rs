//! Depth provider contract
//!
//! Prices are ratios of native base units (quote wei per base wei, no
//! decimal adjustment). With WETH (18) against USDC (6) at 3400 the ratio
//! is 3400 * 10^6 / 10^18 = 3.4e-9. Amounts are base token native units.

use crate::config::PairConfig;
use async_trait::async_trait;
use ethers::types::U256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepthError {
    #[error("no price configured for pair {pair_id} on chain {chain_id}")]
    NoPrice { chain_id: u64, pair_id: String },

    #[error("invalid pair {0}")]
    InvalidPair(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBook {
    pub mid_price: f64,
    /// Percent
    pub spread: f64,
    /// Descending by price
    pub bids: Vec<PriceLevel>,
    /// Ascending by price
    pub asks: Vec<PriceLevel>,
    pub base_token: String,
    pub quote_token: String,
}

impl OrderBook {
    pub fn new(base_token: impl Into<String>, quote_token: impl Into<String>) -> Self {
        Self {
            mid_price: 0.0,
            spread: 0.0,
            bids: Vec::new(),
            asks: Vec::new(),
            base_token: base_token.into(),
            quote_token: quote_token.into(),
        }
    }

    /// (best ask - best bid) / best bid, in percent
    pub fn top_of_book_spread(&self) -> f64 {
        match (self.asks.first(), self.bids.first()) {
            (Some(ask), Some(bid)) if bid.price > 0.0 => (ask.price - bid.price) / bid.price * 100.0,
            _ => 0.0,
        }
    }
}

#[async_trait]
pub trait DepthProvider: Send + Sync {
    async fn order_book(&self, chain_id: u64, pair: &PairConfig) -> Result<OrderBook, DepthError>;
}
