//! ABI word encoding for EIP-712 hashing

use ethers::types::{Address, U256};
use ethers::utils::keccak256;

/// Encode a U256 as 32 bytes (big-endian, left-padded)
pub fn encode_uint256(value: U256) -> [u8; 32] {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    buf
}

/// Encode a u64 as a uint256 word
pub fn encode_u64(value: u64) -> [u8; 32] {
    encode_uint256(U256::from(value))
}

/// Encode an address as 32 bytes (left-padded with zeros)
pub fn encode_address(addr: Address) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf[12..].copy_from_slice(addr.as_bytes());
    buf
}

/// Dynamic `string`/`bytes` members are hashed in place
pub fn encode_dynamic(value: &[u8]) -> [u8; 32] {
    keccak256(value)
}

/// Concatenate words and hash them
pub fn hash_words(words: &[[u8; 32]]) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(words.len() * 32);
    for word in words {
        encoded.extend_from_slice(word);
    }
    keccak256(&encoded)
}
