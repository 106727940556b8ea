//! Denomination Conversions
//!
//! AVAX amounts are entered as decimal strings and converted with integer
//! arithmetic only: nAVAX (1e-9) on the UTXO chains, wei (1e-18) on the
//! contract chain.

use crate::error::{WalletError, WalletResult};

/// Decimal places of nAVAX
pub const NAVAX_DECIMALS: u8 = 9;
/// Decimal places of wei on the C chain
pub const WEI_DECIMALS: u8 = 18;
/// wei per nAVAX
pub const WEI_PER_NAVAX: u128 = 1_000_000_000;

/// Parse a decimal AVAX string into nAVAX.
pub fn avax_to_navax(amount: &str) -> WalletResult<u64> {
    let raw = parse_decimal(amount, NAVAX_DECIMALS)?;
    u64::try_from(raw)
        .map_err(|_| WalletError::invalid_parameters("amount", format!("{} AVAX overflows nAVAX", amount)))
}

/// Parse a decimal AVAX string into wei.
pub fn avax_to_wei(amount: &str) -> WalletResult<u128> {
    parse_decimal(amount, WEI_DECIMALS)
}

pub fn navax_to_wei(navax: u64) -> u128 {
    navax as u128 * WEI_PER_NAVAX
}

/// Convert wei to nAVAX, truncating sub-nAVAX dust.
pub fn wei_to_navax(wei: u128) -> WalletResult<u64> {
    u64::try_from(wei / WEI_PER_NAVAX)
        .map_err(|_| WalletError::invalid_parameters("amount", "wei amount overflows nAVAX"))
}

/// Render nAVAX as a trimmed decimal AVAX string.
pub fn navax_to_avax_string(navax: u64) -> String {
    format_decimal(navax as u128, NAVAX_DECIMALS)
}

pub fn wei_to_avax_string(wei: u128) -> String {
    format_decimal(wei, WEI_DECIMALS)
}

/// Parse a non-negative decimal string scaled by `10^decimals`.
pub fn parse_decimal(amount: &str, decimals: u8) -> WalletResult<u128> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(WalletError::invalid_parameters("amount", "amount is empty"));
    }

    let (integer_str, fractional_str) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if integer_str.is_empty() && fractional_str.is_empty() {
        return Err(WalletError::invalid_parameters("amount", format!("invalid amount '{}'", amount)));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(integer_str) || !all_digits(fractional_str) {
        return Err(WalletError::invalid_parameters("amount", format!("invalid amount '{}'", amount)));
    }
    if fractional_str.len() > decimals as usize {
        return Err(WalletError::invalid_parameters(
            "amount",
            format!("too many decimal places: '{}' allows at most {}", amount, decimals),
        ));
    }

    let integer: u128 = if integer_str.is_empty() {
        0
    } else {
        integer_str
            .parse()
            .map_err(|_| WalletError::invalid_parameters("amount", "integer part overflows"))?
    };

    // Pad fractional part to full precision
    let padded = format!("{:0<width$}", fractional_str, width = decimals as usize);
    let fractional: u128 = if padded.is_empty() {
        0
    } else {
        padded
            .parse()
            .map_err(|_| WalletError::invalid_parameters("amount", "fractional part overflows"))?
    };

    let multiplier = 10u128.pow(decimals as u32);
    integer
        .checked_mul(multiplier)
        .and_then(|v| v.checked_add(fractional))
        .ok_or_else(|| WalletError::invalid_parameters("amount", "amount overflow"))
}

fn format_decimal(raw: u128, decimals: u8) -> String {
    let multiplier = 10u128.pow(decimals as u32);
    let integer = raw / multiplier;
    let fractional = raw % multiplier;

    if fractional == 0 {
        integer.to_string()
    } else {
        let frac_str = format!("{:0>width$}", fractional, width = decimals as usize);
        format!("{}.{}", integer, frac_str.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avax_to_navax() {
        assert_eq!(avax_to_navax("1").unwrap(), 1_000_000_000);
        assert_eq!(avax_to_navax("0.1234").unwrap(), 123_400_000);
        assert_eq!(avax_to_navax(".5").unwrap(), 500_000_000);
        assert_eq!(avax_to_navax("0.000000001").unwrap(), 1);
    }

    #[test]
    fn test_no_float_drift() {
        // 0.1 + 0.2 style values must be exact
        assert_eq!(avax_to_navax("0.3").unwrap(), 300_000_000);
        assert_eq!(avax_to_wei("0.3").unwrap(), 300_000_000_000_000_000);
        assert_eq!(avax_to_wei("1.000000000000000001").unwrap(), 1_000_000_000_000_000_001);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(avax_to_navax("").is_err());
        assert!(avax_to_navax("-1").is_err());
        assert!(avax_to_navax("1.2.3").is_err());
        assert!(avax_to_navax("0.0000000001").is_err());
        assert!(avax_to_navax("1e9").is_err());
        assert!(avax_to_navax("99999999999999999999").is_err());
    }

    #[test]
    fn test_wei_navax_conversion() {
        assert_eq!(navax_to_wei(3), 3_000_000_000);
        assert_eq!(wei_to_navax(3_999_999_999).unwrap(), 3);
    }

    #[test]
    fn test_format() {
        assert_eq!(navax_to_avax_string(1_500_000_000), "1.5");
        assert_eq!(navax_to_avax_string(2_000_000_000), "2");
        assert_eq!(wei_to_avax_string(1), "0.000000000000000001");
    }
}
