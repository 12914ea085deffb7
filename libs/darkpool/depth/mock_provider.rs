//! Randomised ladders around a fixed mid price

use super::provider::{DepthError, DepthProvider, OrderBook, PriceLevel};
use crate::config::PairConfig;
use async_trait::async_trait;
use ethers::types::{Address, U256};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const LEVELS: usize = 10;
const STEP: f64 = 0.001;
const NOISE: f64 = 0.0005;

pub struct MockDepthProvider {
    /// Human price (quote per base) keyed by chain, base, quote
    prices: RwLock<HashMap<(u64, Address, Address), f64>>,
    rng: Mutex<StdRng>,
}

impl MockDepthProvider {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    pub fn set_base_price(&self, chain_id: u64, base: Address, quote: Address, price: f64) {
        self.prices.write().insert((chain_id, base, quote), price);
    }

    fn human_price(&self, chain_id: u64, base: Address, quote: Address) -> Option<f64> {
        let prices = self.prices.read();
        if let Some(price) = prices.get(&(chain_id, base, quote)) {
            return Some(*price);
        }
        prices
            .get(&(chain_id, quote, base))
            .filter(|p| **p > 0.0)
            .map(|p| 1.0 / p)
    }

    fn ladder(&self, mid: f64, base_decimals: u32, side: f64) -> Vec<PriceLevel> {
        let mut rng = self.rng.lock();
        (0..LEVELS)
            .map(|i| {
                let offset = STEP * (i + 1) as f64 + rng.gen::<f64>() * NOISE;
                let size = 1.0 + rng.gen::<f64>() * 99.0;
                PriceLevel {
                    price: mid * (1.0 + side * offset),
                    amount: scale_amount(size, base_decimals),
                }
            })
            .collect()
    }
}

impl Default for MockDepthProvider {
    /// Same markets as the default mock strategy
    fn default() -> Self {
        let provider = Self::new();
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
                provider.set_base_price(chain_id, base, quote, price);
            }
        }
        provider
    }
}

/// `size` whole tokens in native units, to six decimal places of the token
fn scale_amount(size: f64, decimals: u32) -> U256 {
    let micros = U256::from((size * 1e6) as u64);
    if decimals >= 6 {
        micros * U256::exp10((decimals - 6) as usize)
    } else {
        micros / U256::exp10((6 - decimals) as usize)
    }
}

#[async_trait]
impl DepthProvider for MockDepthProvider {
    async fn order_book(&self, chain_id: u64, pair: &PairConfig) -> Result<OrderBook, DepthError> {
        let base = pair
            .base_address()
            .map_err(|e| DepthError::InvalidPair(e.to_string()))?;
        let quote = pair
            .quote_address()
            .map_err(|e| DepthError::InvalidPair(e.to_string()))?;

        let human = self
            .human_price(chain_id, base, quote)
            .ok_or_else(|| DepthError::NoPrice {
                chain_id,
                pair_id: pair.pair_id.clone(),
            })?;

        let exponent = pair.quote_token_decimals as i32 - pair.base_token_decimals as i32;
        let mid = human * 10f64.powi(exponent);

        let mut book = OrderBook::new(pair.base_token.to_lowercase(), pair.quote_token.to_lowercase());
        book.mid_price = mid;
        book.asks = self.ladder(mid, pair.base_token_decimals, 1.0);
        book.bids = self.ladder(mid, pair.base_token_decimals, -1.0);
        book.spread = book.top_of_book_spread();

        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(chain_id: u64, base: &str, quote: &str, base_dec: u32, quote_dec: u32) -> PairConfig {
        PairConfig {
            chain_id,
            pair_id: "TEST".to_string(),
            pool_address: String::new(),
            base_token: base.to_string(),
            quote_token: quote.to_string(),
            base_token_decimals: base_dec,
            quote_token_decimals: quote_dec,
            fee_rate: 30,
        }
    }

    fn weth_usdc() -> PairConfig {
        pair(
            8453,
            "0x4200000000000000000000000000000000000006",
            "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            18,
            6,
        )
    }

    #[tokio::test]
    async fn test_native_ratio_mid_price() {
        let provider = MockDepthProvider::default();
        let book = provider.order_book(8453, &weth_usdc()).await.unwrap();

        // 3500 * 10^6 / 10^18
        assert!((book.mid_price - 3.5e-9).abs() < 1e-18);
        assert_eq!(book.base_token, "0x4200000000000000000000000000000000000006");
    }

    #[tokio::test]
    async fn test_ladders_are_ordered_and_straddle_mid() {
        let provider = MockDepthProvider::with_rng(StdRng::seed_from_u64(7));
        provider.set_base_price(
            56,
            "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c".parse().unwrap(),
            "0x55d398326f99059fF775485246999027B3197955".parse().unwrap(),
            600.0,
        );
        let wbnb_usdt = pair(
            56,
            "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
            "0x55d398326f99059fF775485246999027B3197955",
            18,
            18,
        );
        let book = provider.order_book(56, &wbnb_usdt).await.unwrap();

        assert_eq!(book.asks.len(), 10);
        assert_eq!(book.bids.len(), 10);
        assert!(book.asks.windows(2).all(|w| w[0].price < w[1].price));
        assert!(book.bids.windows(2).all(|w| w[0].price > w[1].price));
        assert!(book.bids[0].price < book.mid_price && book.mid_price < book.asks[0].price);

        let one = U256::exp10(18);
        for level in book.asks.iter().chain(book.bids.iter()) {
            assert!(level.amount >= one && level.amount <= one * 100);
        }

        let expected = (book.asks[0].price - book.bids[0].price) / book.bids[0].price * 100.0;
        assert!((book.spread - expected).abs() < 1e-12);
        assert!(book.spread > 0.0);
    }

    #[tokio::test]
    async fn test_reverse_orientation_uses_reciprocal() {
        let provider = MockDepthProvider::default();
        let reversed = pair(
            8453,
            "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            "0x4200000000000000000000000000000000000006",
            6,
            18,
        );
        let book = provider.order_book(8453, &reversed).await.unwrap();

        // 1/3500 * 10^12
        assert!((book.mid_price - 1e12 / 3500.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_unknown_pair() {
        let provider = MockDepthProvider::default();
        let unknown = pair(
            1,
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            "0xdAC17F958D2ee523a2206206994597C13D831ec7",
            18,
            6,
        );
        assert!(matches!(
            provider.order_book(1, &unknown).await,
            Err(DepthError::NoPrice { chain_id: 1, .. })
        ));
    }

    #[test]
    fn test_scale_amount() {
        assert_eq!(scale_amount(1.5, 18), U256::from(15u64) * U256::exp10(17));
        assert_eq!(scale_amount(2.0, 6), U256::from(2_000_000u64));
        assert_eq!(scale_amount(2.5, 0), U256::from(2u64));
    }

    #[test]
    fn test_scale_amount_at_precision_ceiling() {
        let max = crate::config::MAX_TOKEN_DECIMALS;
        // Largest ladder size is 100 whole tokens
        assert_eq!(scale_amount(100.0, max), U256::from(100u64) * U256::exp10(max as usize));
    }
}
