use crate::dex::parse_amount;

/// Validate Ethereum address format
pub fn is_valid_address(address: &str) -> bool {
    let Some(hex_part) = address.strip_prefix("0x") else {
        return false;
    };

    hex_part.len() == 40 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Check that a swap amount is a finite positive number
pub fn is_valid_amount(amount: &str) -> bool {
    parse_amount(amount).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_address() {
        assert!(is_valid_address("0xdAC17F958D2ee523a2206206994597C13D831ec7"));
        assert!(!is_valid_address("dAC17F958D2ee523a2206206994597C13D831ec7"));
        assert!(!is_valid_address("0xdAC17F958D2ee523a2206206994597C13D831e"));
        assert!(!is_valid_address("0xZZC17F958D2ee523a2206206994597C13D831ec7"));
    }

    #[test]
    fn test_is_valid_amount() {
        assert!(is_valid_amount("0.25"));
        assert!(!is_valid_amount("0"));
        assert!(!is_valid_amount("-5"));
        assert!(!is_valid_amount("ten"));
    }
}
