//! Radio bridge hardware address.
//!
//! The bridge is identified by its BLE hardware address as typed into the
//! host's settings. The accepted shape is deliberately loose and must not be
//! tightened: six groups of one or two hex digits, each followed by a colon
//! or the end of the string. That means the last group needs no colon, a
//! single trailing colon after the sixth group is tolerated, and case is
//! ignored.
//!
//! # Example
//!
//! ```
//! use bridge_link_gate::config::{BridgeAddress, ErrorKind};
//!
//! let addr: BridgeAddress = "1a:2B:03:4:5:6".parse().unwrap();
//! assert_eq!(addr.as_str(), "1a:2B:03:4:5:6");
//!
//! assert_eq!(BridgeAddress::parse(""), Err(ErrorKind::MissingIdentifier));
//! assert_eq!(
//!     BridgeAddress::parse("1a:2b:3c"),
//!     Err(ErrorKind::MalformedIdentifier)
//! );
//! ```

use super::ErrorKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Full-string match for the bridge address shape.
static ADDRESS_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9a-fA-F]{1,2}(?::|$)){6}$").ok());

/// Check a candidate against the bridge address shape.
///
/// Does not distinguish an empty string from a malformed one; use
/// [`BridgeAddress::parse`] for that.
pub fn is_valid_shape(candidate: &str) -> bool {
    ADDRESS_SHAPE
        .as_ref()
        .is_some_and(|re| re.is_match(candidate))
}

/// A bridge address that passed the shape check.
///
/// Holds the candidate exactly as configured. Two addresses are equal only
/// if their strings are equal, so `AA:BB:..` and `aa:bb:..` differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BridgeAddress(String);

impl BridgeAddress {
    /// Validate a candidate address.
    ///
    /// Empty input fails with [`ErrorKind::MissingIdentifier`], anything not
    /// matching the shape fails with [`ErrorKind::MalformedIdentifier`].
    pub fn parse(candidate: &str) -> Result<Self, ErrorKind> {
        if candidate.is_empty() {
            return Err(ErrorKind::MissingIdentifier);
        }
        if !is_valid_shape(candidate) {
            return Err(ErrorKind::MalformedIdentifier);
        }
        Ok(Self(candidate.to_string()))
    }

    /// The address as configured.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for BridgeAddress {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BridgeAddress {
    type Error = ErrorKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BridgeAddress> for String {
    fn from(addr: BridgeAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for BridgeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Accepted Shapes ====================

    #[test]
    fn test_full_lowercase_address() {
        let addr = BridgeAddress::parse("1a:2b:3c:4d:5e:6f").unwrap();
        assert_eq!(addr.as_str(), "1a:2b:3c:4d:5e:6f");
    }

    #[test]
    fn test_mixed_case_and_short_groups() {
        assert!(BridgeAddress::parse("1a:2B:03:4:5:6").is_ok());
        assert!(BridgeAddress::parse("00:11:22:AA:BB:CC").is_ok());
        assert!(BridgeAddress::parse("1:2:3:4:5:6").is_ok());
    }

    #[test]
    fn test_trailing_colon_after_last_group_tolerated() {
        assert!(BridgeAddress::parse("1a:2b:3c:4d:5e:6f:").is_ok());
    }

    // ==================== Rejected Shapes ====================

    #[test]
    fn test_empty_is_missing() {
        assert_eq!(BridgeAddress::parse(""), Err(ErrorKind::MissingIdentifier));
    }

    #[test]
    fn test_non_hex_is_malformed() {
        assert_eq!(
            BridgeAddress::parse("zz:zz:zz:zz:zz:zz"),
            Err(ErrorKind::MalformedIdentifier)
        );
    }

    #[test]
    fn test_too_few_groups() {
        assert_eq!(
            BridgeAddress::parse("1a:2b:3c"),
            Err(ErrorKind::MalformedIdentifier)
        );
        assert_eq!(
            BridgeAddress::parse("1a:2b:3c:4d:5e:"),
            Err(ErrorKind::MalformedIdentifier)
        );
    }

    #[test]
    fn test_missing_delimiters() {
        assert_eq!(
            BridgeAddress::parse("1a2b3c4d5e6f"),
            Err(ErrorKind::MalformedIdentifier)
        );
    }

    #[test]
    fn test_extra_group_or_colon() {
        assert!(BridgeAddress::parse("1a:2b:3c:4d:5e:6f:7a").is_err());
        assert!(BridgeAddress::parse("1a:2b:3c:4d:5e:6f::").is_err());
    }

    #[test]
    fn test_three_digit_group() {
        assert!(BridgeAddress::parse("1a2:2b:3c:4d:5e:6f").is_err());
    }

    #[test]
    fn test_whitespace_not_trimmed() {
        assert!(BridgeAddress::parse(" 1a:2b:3c:4d:5e:6f").is_err());
        assert!(BridgeAddress::parse("1a:2b:3c:4d:5e:6f ").is_err());
    }

    #[test]
    fn test_other_separators_rejected() {
        assert!(BridgeAddress::parse("1a-2b-3c-4d-5e-6f").is_err());
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic digits are Unicode `\d` but not hex
        assert!(BridgeAddress::parse("١:2:3:4:5:6").is_err());
    }

    // ==================== Conversions ====================

    #[test]
    fn test_equality_is_exact() {
        let lower = BridgeAddress::parse("aa:bb:cc:dd:ee:ff").unwrap();
        let upper = BridgeAddress::parse("AA:BB:CC:DD:EE:FF").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let addr: BridgeAddress = serde_json::from_str("\"1a:2b:3c:4d:5e:6f\"").unwrap();
        assert_eq!(addr.to_string(), "1a:2b:3c:4d:5e:6f");

        let bad: Result<BridgeAddress, _> = serde_json::from_str("\"1a:2b\"");
        assert!(bad.is_err());
    }
}
