//! Quote signer backed by a local secp256k1 key

use super::domain::DomainRegistry;
use super::quote::MmQuote;
use super::{Result, SignerError};
use ethers::prelude::*;
use ethers::types::H256;
use ethers::utils::keccak256;

/// Seam between the quote pipeline and key material
pub trait QuoteSigning: Send + Sync {
    fn address(&self) -> Address;

    /// 65-byte `r || s || v` signature, v in {27, 28}
    fn sign_quote(&self, chain_id: u64, quote: &MmQuote) -> Result<Vec<u8>>;
}

pub struct QuoteSigner {
    wallet: LocalWallet,
    address: Address,
    domains: DomainRegistry,
}

impl QuoteSigner {
    /// Create a signer from a hex private key, with or without `0x`
    pub fn from_hex(private_key: &str, domains: DomainRegistry) -> Result<Self> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let wallet = key
            .parse::<LocalWallet>()
            .map_err(|_| SignerError::InvalidPrivateKey)?;
        let address = wallet.address();

        Ok(Self {
            wallet,
            address,
            domains,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn domains(&self) -> &DomainRegistry {
        &self.domains
    }

    /// hash = keccak256("\x19\x01" || domainSeparator || structHash)
    pub fn digest(&self, chain_id: u64, quote: &MmQuote) -> Result<[u8; 32]> {
        let domain_separator = self.domains.digest(chain_id)?;
        let struct_hash = quote.struct_hash();

        let mut message = Vec::with_capacity(66);
        message.extend_from_slice(b"\x19\x01");
        message.extend_from_slice(&domain_separator);
        message.extend_from_slice(&struct_hash);

        Ok(keccak256(&message))
    }

    pub fn sign(&self, chain_id: u64, quote: &MmQuote) -> Result<Vec<u8>> {
        let digest = self.digest(chain_id, quote)?;

        let mut signature = self
            .wallet
            .sign_hash(H256::from(digest))
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        if signature.v < 27 {
            signature.v += 27;
        }

        Ok(signature.to_vec())
    }
}

impl QuoteSigning for QuoteSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_quote(&self, chain_id: u64, quote: &MmQuote) -> Result<Vec<u8>> {
        self.sign(chain_id, quote)
    }
}

impl std::fmt::Debug for QuoteSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteSigner")
            .field("address", &self.address)
            .field("chains", &self.domains.chain_ids())
            .finish()
    }
}
