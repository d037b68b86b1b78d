use std::str::FromStr;

use alloy::primitives::Address;

/// Helper functions to parse hex values from request bodies using alloy primitives.

/// Parse a hexadecimal address string into an `Address`.
///
/// Expects a string starting with "0x" and 40 hex digits (20 bytes).
///
/// # Arguments
///
/// * `hex` - The hexadecimal address string
///
/// # Returns
///
/// * `Result<Address, String>` - Parsed address or error message
pub fn parse_hex_address(hex: &str) -> Result<Address, String> {
    let hex = hex.trim();
    if !hex.starts_with("0x") {
        return Err("Address must start with 0x".to_string());
    }
    Address::from_str(hex).map_err(|e| format!("Invalid address: {}", e))
}

/// Parse an optional address field, keeping `None` and empty strings as `None`.
pub fn parse_optional_address(hex: Option<&str>) -> Result<Option<Address>, String> {
    match hex.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_hex_address(value).map(Some),
    }
}
