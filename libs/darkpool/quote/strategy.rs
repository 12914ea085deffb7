//! Pricing strategy contract
//!
//! Market makers plug their own pricing in here; the pipeline only needs
//! an output amount, a floor and a couple of display figures.

use async_trait::async_trait;
use ethers::types::{Address, U256};
use thiserror::Error;

/// Result type for strategy operations
pub type StrategyResult<T> = Result<T, StrategyError>;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("price not found for {token_in:?} -> {token_out:?} on chain {chain_id}")]
    PriceNotFound {
        chain_id: u64,
        token_in: Address,
        token_out: Address,
    },

    #[error("calculated amount out is zero")]
    ZeroOutput,

    #[error("amount overflow")]
    Overflow,

    #[error("{0}")]
    Other(String),
}

/// Amounts are in native base units of each token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteParams {
    pub chain_id: u64,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub slippage_bps: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResult {
    pub amount_out: U256,
    /// Floor the signed order commits to
    pub amount_out_minimum: U256,
    /// Output per unit of input
    pub execution_price: f64,
    /// Percent, e.g. 0.5 means 0.5%
    pub price_impact: f64,
}

impl QuoteResult {
    /// No slippage deduction, no reported impact
    pub fn new(amount_out: U256) -> Self {
        Self {
            amount_out,
            amount_out_minimum: amount_out,
            execution_price: 0.0,
            price_impact: 0.0,
        }
    }
}

#[async_trait]
pub trait PricingStrategy: Send + Sync {
    async fn calculate_quote(&self, params: QuoteParams) -> StrategyResult<QuoteResult>;
}
