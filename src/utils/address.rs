//! Token address validation

use alloy_primitives::Address;
use std::str::FromStr;

use crate::models::{DiscoveryError, ScoutResult};

/// Parse a user-supplied token address.
///
/// `0x` followed by 40 hex digits. All-lowercase and all-uppercase digits are
/// accepted as-is; mixed case must carry a valid EIP-55 checksum.
pub fn parse_token_address(input: &str) -> ScoutResult<Address> {
    let input = input.trim();
    let invalid = || DiscoveryError::invalid_input(format!("Invalid token address: {:?}", input));

    let hex = input.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(input, None).map_err(|_| {
            DiscoveryError::invalid_input(format!("Invalid token address checksum: {}", input))
        })
    } else {
        Address::from_str(input).map_err(|_| invalid())
    }
}
