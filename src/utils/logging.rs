//! Log Field Redaction
//!
//! Events are emitted through `tracing`. Addresses, ids and hashes that end
//! up in event fields go through these helpers first so logs never carry a
//! full owner address or key material.

/// Fully redact a sensitive value
pub fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    let len = value.len();
    if len <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", len)
    }
}

/// Partially redact an address (chain prefix and first 6 chars, last 4 chars)
pub fn redact_address(address: &str) -> String {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    // Keep the "P-" / "X-" / "C-" alias visible
    let (alias, body) = match trimmed.split_once('-') {
        Some((alias, body)) if alias.len() == 1 => (Some(alias), body),
        _ => (None, trimmed),
    };

    if body.len() <= 10 {
        return redact_value(body);
    }

    let prefix_len = if body.starts_with("0x") { 8 } else { 6 };
    let suffix_len = 4;

    if body.len() <= prefix_len + suffix_len + 3 {
        return redact_value(body);
    }

    let prefix = &body[..prefix_len];
    let suffix = &body[body.len() - suffix_len..];

    match alias {
        Some(alias) => format!("{}-{}...{}", alias, prefix, suffix),
        None => format!("{}...{}", prefix, suffix),
    }
}

/// Partially redact a hash or id (show first 10 and last 6 chars)
pub fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    if trimmed.len() <= 20 {
        return trimmed.to_string();
    }

    let prefix_len = if trimmed.starts_with("0x") { 12 } else { 10 };
    let suffix_len = 6;

    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Redact a list of addresses for a single log field
pub fn redact_addresses<S: AsRef<str>>(addresses: &[S]) -> String {
    let parts: Vec<String> = addresses.iter().map(|a| redact_address(a.as_ref())).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_value() {
        assert_eq!(redact_value(""), "[EMPTY]");
        assert_eq!(redact_value("abc"), "[REDACTED]");
        assert_eq!(redact_value("PrivateKey-abcdef"), "[REDACTED:17chars]");
    }

    #[test]
    fn test_redact_address() {
        assert_eq!(
            redact_address("P-fuji19fc97zn3mzmwr827j4d3n45refkksgms4y2yzz"),
            "P-fuji19...2yzz"
        );
        let evm = redact_address("0x8db97C7cEcE249c2b98bDC0226Cc4C2A57BF52FC");
        assert_eq!(evm, "0x8db97C...52FC");
        assert_eq!(redact_address("short"), "[REDACTED:5chars]");
    }

    #[test]
    fn test_redact_hash() {
        assert_eq!(redact_hash("abc"), "abc");
        assert_eq!(
            redact_hash("2iz1aRvPX2XPW7XLs6Nay9ECqtsWHVt1iEUnMKHskrsguZ14hi"),
            "2iz1aRvPX2...uZ14hi"
        );
    }

    #[test]
    fn test_redact_addresses() {
        let out = redact_addresses(&["P-avax1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq"]);
        assert_eq!(out, "[P-avax1q...qqqq]");
    }
}
