//! The quote a market maker commits to

use super::encoding::{encode_address, encode_u64, encode_uint256, hash_words};
use super::extra_data::hash_extra_data;
use ethers::types::{Address, U256};
use ethers::utils::keccak256;

const MM_QUOTE_TYPE: &[u8] = b"MMQuote(address pool,address from,address to,address inputToken,address outputToken,uint256 amountIn,uint256 amountOut,uint256 deadline,uint256 nonce,bytes32 extraDataHash)";

/// Signed terms for one swap
///
/// `from` and `to` are the taker's addresses, not the signer's. Amounts are
/// in each token's native base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmQuote {
    /// Verifying contract of the chain's domain
    pub pool: Address,
    pub from: Address,
    pub to: Address,
    pub input_token: Address,
    pub output_token: Address,
    pub amount_in: U256,
    /// Minimum guaranteed output
    pub amount_out: U256,
    /// Unix seconds
    pub deadline: u64,
    pub nonce: U256,
    pub extra_data: Vec<u8>,
}

impl MmQuote {
    pub fn type_hash() -> [u8; 32] {
        keccak256(MM_QUOTE_TYPE)
    }

    /// Fields are hashed in declaration order behind the type hash
    pub fn struct_hash(&self) -> [u8; 32] {
        hash_words(&[
            Self::type_hash(),
            encode_address(self.pool),
            encode_address(self.from),
            encode_address(self.to),
            encode_address(self.input_token),
            encode_address(self.output_token),
            encode_uint256(self.amount_in),
            encode_uint256(self.amount_out),
            encode_u64(self.deadline),
            encode_uint256(self.nonce),
            hash_extra_data(&self.extra_data),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quote() -> MmQuote {
        let user: Address = "0x1234567890123456789012345678901234567890".parse().unwrap();
        MmQuote {
            pool: "0x28D3a265f6d40867986004029ee91F4C9532fCC5".parse().unwrap(),
            from: user,
            to: user,
            input_token: "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c".parse().unwrap(),
            output_token: "0x55d398326f99059fF775485246999027B3197955".parse().unwrap(),
            amount_in: U256::exp10(18),
            amount_out: U256::from(600u64) * U256::exp10(18),
            deadline: 1735084800,
            nonce: U256::one(),
            extra_data: Vec::new(),
        }
    }

    #[test]
    fn test_type_hash_is_hash_of_type_string() {
        assert_eq!(
            MmQuote::type_hash(),
            keccak256(
                "MMQuote(address pool,address from,address to,address inputToken,address outputToken,uint256 amountIn,uint256 amountOut,uint256 deadline,uint256 nonce,bytes32 extraDataHash)"
                    .as_bytes()
            )
        );
    }

    #[test]
    fn test_struct_hash_matches_manual_encoding() {
        let quote = sample_quote();

        let mut encoded = Vec::new();
        encoded.extend_from_slice(&MmQuote::type_hash());
        for addr in [quote.pool, quote.from, quote.to, quote.input_token, quote.output_token] {
            encoded.extend_from_slice(&[0u8; 12]);
            encoded.extend_from_slice(addr.as_bytes());
        }
        for value in [quote.amount_in, quote.amount_out, U256::from(quote.deadline), quote.nonce] {
            let mut word = [0u8; 32];
            value.to_big_endian(&mut word);
            encoded.extend_from_slice(&word);
        }
        encoded.extend_from_slice(&keccak256([]));

        assert_eq!(quote.struct_hash(), keccak256(&encoded));
    }

    #[test]
    fn test_every_field_changes_the_hash() {
        let base = sample_quote();
        let base_hash = base.struct_hash();

        let mut q = base.clone();
        q.nonce = U256::from(2u64);
        assert_ne!(q.struct_hash(), base_hash);

        let mut q = base.clone();
        q.extra_data = vec![0x01];
        assert_ne!(q.struct_hash(), base_hash);

        // Swapping from and to is visible even when tokens are untouched
        let mut q = base.clone();
        q.to = Address::zero();
        assert_ne!(q.struct_hash(), base_hash);
    }
}
