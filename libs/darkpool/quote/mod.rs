//! Quote pricing and signing

pub mod mock_strategy;
pub mod pipeline;
pub mod strategy;

pub use mock_strategy::MockStrategy;
pub use pipeline::QuotePipeline;
pub use strategy::{PricingStrategy, QuoteParams, QuoteResult, StrategyError, StrategyResult};
