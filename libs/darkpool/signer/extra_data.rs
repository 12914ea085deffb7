//! Swap routing data carried in `MmQuote::extra_data`
//!
//! Layout is `abi.encode(address pool, bool zeroForOne, uint160 sqrtPriceLimitX96, bytes callbackData)`.

use ethers::abi::{encode, Token};
use ethers::types::{Address, U256};
use ethers::utils::keccak256;

const MIN_SQRT_RATIO: u64 = 4295128739;
const MAX_SQRT_RATIO: &str = "1461446703485210103287273052203988822378723970342";

/// Price limit just inside the V3 bounds for the swap direction
pub fn min_max_sqrt_price_x96(zero_for_one: bool) -> U256 {
    if zero_for_one {
        U256::from(MIN_SQRT_RATIO) + U256::one()
    } else {
        // constant is a valid decimal literal
        U256::from_dec_str(MAX_SQRT_RATIO).unwrap_or_default() - U256::one()
    }
}

/// Selling token0 means swapping zero for one
pub fn determine_zero_for_one(seller_token: Address, token0: Address) -> bool {
    seller_token == token0
}

/// `abi.encode(payToken)`
pub fn build_callback_data(pay_token: Address) -> Vec<u8> {
    encode(&[Token::Address(pay_token)])
}

/// A missing limit falls back to [`min_max_sqrt_price_x96`]
pub fn encode_extra_data(
    pool: Address,
    zero_for_one: bool,
    sqrt_price_limit_x96: Option<U256>,
    callback_data: &[u8],
) -> Vec<u8> {
    let limit = sqrt_price_limit_x96.unwrap_or_else(|| min_max_sqrt_price_x96(zero_for_one));
    encode(&[
        Token::Address(pool),
        Token::Bool(zero_for_one),
        Token::Uint(limit),
        Token::Bytes(callback_data.to_vec()),
    ])
}

pub fn hash_extra_data(extra_data: &[u8]) -> [u8; 32] {
    keccak256(extra_data)
}
