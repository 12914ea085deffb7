//! Order book depth for the venue

pub mod mock_provider;
pub mod provider;
pub mod publisher;

pub use mock_provider::MockDepthProvider;
pub use provider::{DepthError, DepthProvider, OrderBook, PriceLevel};
pub use publisher::{build_snapshot, chain_name, DepthPublisher, MarketSession};
