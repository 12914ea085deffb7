pub mod shutdown;

use ethers::types::{Address, U256};

/// Full lowercase `0x`-prefixed hex
pub fn hex_address(addr: &Address) -> String {
    format!("{:?}", addr)
}

/// Accepts short forms such as `0x0`, left-padding to 20 bytes
pub fn parse_address_lenient(value: &str) -> Option<Address> {
    let value = value.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if digits.is_empty() || digits.len() > 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    format!("{:0>40}", digits).parse().ok()
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Lossy conversion for display and ratios
pub fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}
