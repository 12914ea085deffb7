//! Fixed-price strategy for demos and tests

use super::strategy::{PricingStrategy, QuoteParams, QuoteResult, StrategyError, StrategyResult};
use crate::utils::u256_to_f64;
use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::collections::HashMap;

const BPS: u64 = 10_000;

/// 1e18 fixed point
fn price_scale() -> U256 {
    U256::exp10(18)
}

/// Quotes from a static price table minus a flat spread
///
/// Prices are output per input in native units, stored as 1e18 fixed
/// point. A pair priced in one direction is quoted in the other through
/// the reciprocal.
#[derive(Debug, Clone)]
pub struct MockStrategy {
    spread_bps: u32,
    prices: HashMap<(u64, Address, Address), U256>,
}

impl MockStrategy {
    pub fn new(spread_bps: u32) -> Self {
        Self {
            spread_bps: spread_bps.min(BPS as u32),
            prices: HashMap::new(),
        }
    }

    pub fn spread_bps(&self) -> u32 {
        self.spread_bps
    }

    pub fn set_price(&mut self, chain_id: u64, token_in: Address, token_out: Address, price: f64) {
        let scaled = (price * 1e18).round().max(0.0) as u128;
        self.set_price_scaled(chain_id, token_in, token_out, U256::from(scaled));
    }

    pub fn set_price_scaled(&mut self, chain_id: u64, token_in: Address, token_out: Address, price: U256) {
        self.prices.insert((chain_id, token_in, token_out), price);
    }

    /// Scaled price with reverse lookup
    pub fn price(&self, chain_id: u64, token_in: Address, token_out: Address) -> Option<U256> {
        if let Some(price) = self.prices.get(&(chain_id, token_in, token_out)) {
            return Some(*price);
        }

        self.prices
            .get(&(chain_id, token_out, token_in))
            .filter(|p| !p.is_zero())
            .map(|p| price_scale() * price_scale() / *p)
    }
}

impl Default for MockStrategy {
    /// 0.5% spread, WBNB/USDT on BSC and WETH/USDC on Base
    fn default() -> Self {
        let mut strategy = Self::new(50);

        let seeds: [(u64, &str, &str, f64); 2] = [
            (
                56,
                "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
                "0x55d398326f99059fF775485246999027B3197955",
                600.0,
            ),
            (
                8453,
                "0x4200000000000000000000000000000000000006",
                "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
                3500.0,
            ),
        ];
        for (chain_id, base, quote, price) in seeds {
            if let (Ok(base), Ok(quote)) = (base.parse(), quote.parse()) {
                strategy.set_price(chain_id, base, quote, price);
            }
        }

        strategy
    }
}

#[async_trait]
impl PricingStrategy for MockStrategy {
    async fn calculate_quote(&self, params: QuoteParams) -> StrategyResult<QuoteResult> {
        let price = self
            .price(params.chain_id, params.token_in, params.token_out)
            .ok_or(StrategyError::PriceNotFound {
                chain_id: params.chain_id,
                token_in: params.token_in,
                token_out: params.token_out,
            })?;

        // amount_out = amount_in * price * (1 - spread)
        let gross = params
            .amount_in
            .checked_mul(price)
            .ok_or(StrategyError::Overflow)?
            / price_scale();
        let amount_out = gross
            .checked_mul(U256::from(BPS - self.spread_bps as u64))
            .ok_or(StrategyError::Overflow)?
            / U256::from(BPS);

        if amount_out.is_zero() {
            return Err(StrategyError::ZeroOutput);
        }

        let slippage = (params.slippage_bps as u64).min(BPS);
        let amount_out_minimum = amount_out
            .checked_mul(U256::from(BPS - slippage))
            .ok_or(StrategyError::Overflow)?
            / U256::from(BPS);

        Ok(QuoteResult {
            amount_out,
            amount_out_minimum,
            execution_price: u256_to_f64(price) / 1e18,
            price_impact: self.spread_bps as f64 / 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wbnb() -> Address {
        "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c".parse().unwrap()
    }

    fn usdt() -> Address {
        "0x55d398326f99059fF775485246999027B3197955".parse().unwrap()
    }

    fn params(token_in: Address, token_out: Address, amount_in: U256, slippage_bps: u32) -> QuoteParams {
        QuoteParams {
            chain_id: 56,
            token_in,
            token_out,
            amount_in,
            slippage_bps,
        }
    }

    #[tokio::test]
    async fn test_forward_quote_applies_spread() {
        let strategy = MockStrategy::default();
        let result = strategy
            .calculate_quote(params(wbnb(), usdt(), U256::exp10(18), 0))
            .await
            .unwrap();

        // 600 * 0.995
        assert_eq!(result.amount_out, U256::from(597u64) * U256::exp10(18));
        assert_eq!(result.amount_out_minimum, result.amount_out);
        assert_eq!(result.execution_price, 600.0);
        assert_eq!(result.price_impact, 0.5);
    }

    #[tokio::test]
    async fn test_slippage_sets_minimum() {
        let strategy = MockStrategy::default();
        let result = strategy
            .calculate_quote(params(wbnb(), usdt(), U256::exp10(18), 100))
            .await
            .unwrap();

        // 597 * 0.99
        assert_eq!(result.amount_out_minimum, U256::from(59103u64) * U256::exp10(16));
        assert!(result.amount_out_minimum < result.amount_out);
    }

    #[tokio::test]
    async fn test_reverse_quote_uses_reciprocal() {
        let strategy = MockStrategy::default();
        let amount_in = U256::from(600u64) * U256::exp10(18);
        let result = strategy
            .calculate_quote(params(usdt(), wbnb(), amount_in, 0))
            .await
            .unwrap();

        // 600 USDT buys ~1 WBNB before the 0.5% spread
        let expected = U256::from(995u64) * U256::exp10(15);
        let diff = if result.amount_out > expected {
            result.amount_out - expected
        } else {
            expected - result.amount_out
        };
        assert!(diff < U256::exp10(6), "amount_out = {}", result.amount_out);
    }

    #[tokio::test]
    async fn test_unknown_pair() {
        let strategy = MockStrategy::default();
        let err = strategy
            .calculate_quote(params(wbnb(), Address::repeat_byte(0x11), U256::exp10(18), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::PriceNotFound { chain_id: 56, .. }));
    }

    #[tokio::test]
    async fn test_dust_rounds_to_zero() {
        let strategy = MockStrategy::default();
        let err = strategy
            .calculate_quote(params(usdt(), wbnb(), U256::one(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::ZeroOutput));
    }

    #[tokio::test]
    async fn test_overflow_is_reported() {
        let strategy = MockStrategy::default();
        let err = strategy
            .calculate_quote(params(wbnb(), usdt(), U256::MAX, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::Overflow));
    }
}
