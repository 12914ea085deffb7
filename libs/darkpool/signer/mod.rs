//! EIP-712 signing of market-maker quotes
//!
//! A [`DomainRegistry`] holds one domain per chain; the [`QuoteSigner`]
//! combines the chain's domain separator with an [`MmQuote`] struct hash
//! and signs the digest with the market maker's key.

pub mod domain;
pub mod encoding;
pub mod extra_data;
pub mod quote;
pub mod signer;
pub mod wrapped;

use thiserror::Error;

pub use domain::{DomainEntry, DomainRegistry, DEFAULT_DOMAIN_NAME, DEFAULT_DOMAIN_VERSION};
pub use extra_data::{
    build_callback_data, determine_zero_for_one, encode_extra_data, hash_extra_data,
    min_max_sqrt_price_x96,
};
pub use quote::MmQuote;
pub use signer::{QuoteSigner, QuoteSigning};
pub use wrapped::WrappedTokens;

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("No EIP-712 domain registered for chain {0}")]
    DomainNotFound(u64),

    #[error("Failed to sign: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, SignerError>;
