//! Wei / ether / gwei / USD conversions used for display and form input.

use alloy::primitives::{
    utils::{format_ether as alloy_format_ether, format_units, parse_ether},
    Address, U256,
};

use crate::error::ServiceError;

/// Render a wei amount as a full-precision ether string.
pub fn format_ether(wei: U256) -> String {
    alloy_format_ether(wei)
}

/// Render a wei amount as a gwei string.
pub fn format_gwei(wei: U256) -> String {
    // "gwei" is a known unit, formatting cannot fail
    format_units(wei, "gwei").unwrap_or_else(|_| "0".to_string())
}

/// Ether value of a wei amount rounded to `decimals` places, for display only.
pub fn round_ether(wei: U256, decimals: i32) -> f64 {
    let ether: f64 = format_ether(wei).parse().unwrap_or(0.0);
    let factor = 10f64.powi(decimals);
    (ether * factor).round() / factor
}

/// Parse a decimal ether amount typed into a form (e.g. "1" or "0.25") into wei.
pub fn parse_ether_amount(amount: &str) -> Result<U256, ServiceError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(ServiceError::InvalidInput("Amount is required".to_string()));
    }
    // parse_ether accepts a sign and returns the magnitude
    if amount.starts_with(['-', '+']) {
        return Err(ServiceError::InvalidInput(format!(
            "Invalid ether amount '{}': must be unsigned",
            amount
        )));
    }
    parse_ether(amount)
        .map_err(|e| ServiceError::InvalidInput(format!("Invalid ether amount '{}': {}", amount, e)))
}

/// Convert a USD amount into wei at `rate` USD per ETH.
///
/// Both figures are fixed to micro-USD before dividing so that round amounts
/// (50 USD at 2000 USD/ETH) come out exact.
pub fn usd_to_wei(usd: f64, rate: f64) -> Result<U256, ServiceError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ServiceError::InvalidInput(
            "Exchange rate is not available".to_string(),
        ));
    }
    if !usd.is_finite() || usd <= 0.0 {
        return Err(ServiceError::InvalidInput(
            "Please enter a valid USD amount.".to_string(),
        ));
    }
    let usd_micros = (usd * 1e6).round();
    let rate_micros = (rate * 1e6).round();
    let in_range = |micros: f64| (1.0..u128::MAX as f64).contains(&micros);
    if !in_range(usd_micros) || !in_range(rate_micros) {
        return Err(ServiceError::InvalidInput("Amount out of range".to_string()));
    }

    let wei_per_ether = U256::from(10u64).pow(U256::from(18));
    Ok(U256::from(usd_micros as u128) * wei_per_ether / U256::from(rate_micros as u128))
}

/// USD value of a wei amount at `rate` USD per ETH, with two decimals.
pub fn wei_to_usd(wei: U256, rate: f64) -> String {
    let ether: f64 = format_ether(wei).parse().unwrap_or(0.0);
    format!("{:.2}", ether * rate)
}

/// Shortened label such as `0xf39F...2266`.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
