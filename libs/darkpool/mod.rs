//! # DarkPool market maker
//!
//! Domain layer on top of [`hypersockets`]: the venue wire protocol,
//! EIP-712 quote signing, the quote pipeline, depth publication and the
//! runner that wires them to one authenticated session.

pub mod config;
pub mod depth;
pub mod logging;
pub mod protocol;
pub mod quote;
pub mod runner;
pub mod signer;
pub mod utils;

pub use config::{Config, ConfigError};
pub use depth::{DepthProvider, DepthPublisher, MockDepthProvider};
pub use protocol::{Envelope, EnvelopeCodec};
pub use quote::{MockStrategy, PricingStrategy, QuotePipeline};
pub use runner::{Runner, RunnerError};
pub use signer::{DomainRegistry, MmQuote, QuoteSigner, QuoteSigning, SignerError};
pub use utils::shutdown::ShutdownManager;
