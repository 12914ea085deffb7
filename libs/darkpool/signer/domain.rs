//! Per-chain EIP-712 domains

use super::encoding::{encode_address, encode_dynamic, encode_u64, hash_words};
use super::{Result, SignerError};
use ethers::types::Address;
use ethers::utils::keccak256;
use std::collections::HashMap;

pub const DEFAULT_DOMAIN_NAME: &str = "DarkPool Pool";
pub const DEFAULT_DOMAIN_VERSION: &str = "1";

const DOMAIN_TYPE: &[u8] =
    b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl DomainEntry {
    /// domainSeparator = keccak256(
    ///     typeHash || keccak256(name) || keccak256(version) || chainId || verifyingContract
    /// )
    pub fn separator(&self) -> [u8; 32] {
        hash_words(&[
            keccak256(DOMAIN_TYPE),
            encode_dynamic(self.name.as_bytes()),
            encode_dynamic(self.version.as_bytes()),
            encode_u64(self.chain_id),
            encode_address(self.verifying_contract),
        ])
    }
}

/// Domains keyed by chain id, populated once at startup
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    domains: HashMap<u64, DomainEntry>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the domain for a chain
    ///
    /// Empty name or version fall back to the defaults.
    pub fn register(&mut self, chain_id: u64, name: &str, version: &str, verifying_contract: Address) {
        let name = if name.is_empty() { DEFAULT_DOMAIN_NAME } else { name };
        let version = if version.is_empty() { DEFAULT_DOMAIN_VERSION } else { version };

        self.domains.insert(
            chain_id,
            DomainEntry {
                name: name.to_string(),
                version: version.to_string(),
                chain_id,
                verifying_contract,
            },
        );
    }

    pub fn register_default(&mut self, chain_id: u64, verifying_contract: Address) {
        self.register(chain_id, "", "", verifying_contract);
    }

    pub fn get(&self, chain_id: u64) -> Option<&DomainEntry> {
        self.domains.get(&chain_id)
    }

    pub fn contains(&self, chain_id: u64) -> bool {
        self.domains.contains_key(&chain_id)
    }

    pub fn chain_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.domains.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn digest(&self, chain_id: u64) -> Result<[u8; 32]> {
        self.get(chain_id)
            .map(DomainEntry::separator)
            .ok_or(SignerError::DomainNotFound(chain_id))
    }
}
