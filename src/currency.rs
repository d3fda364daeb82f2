//! Currency codes and ISO 4217 recognition
//!
//! Account rows and transfer requests may carry arbitrary code strings;
//! recognition is checked during transfer validation, not at construction.
//! Validity is exact membership in the static table (uppercase codes only),
//! while equality between a transfer currency and an account currency is
//! case-insensitive.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ============================================================================
// ISO 4217 table
// ============================================================================

/// Active ISO 4217 alphabetic codes, plus the precious-metal and SDR codes.
/// The no-currency / testing codes (XXX, XTS) are deliberately absent: they
/// are not transferable denominations.
const ISO_4217_CODES: &[&str] = &[
    "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", //
    "AWG", "AZN", "BAM", "BBD", "BDT", "BGN", "BHD", "BIF", //
    "BMD", "BND", "BOB", "BRL", "BSD", "BTN", "BWP", "BYN", //
    "BZD", "CAD", "CDF", "CHF", "CLP", "CNY", "COP", "CRC", //
    "CUC", "CUP", "CVE", "CZK", "DJF", "DKK", "DOP", "DZD", //
    "EGP", "ERN", "ETB", "EUR", "FJD", "FKP", "GBP", "GEL", //
    "GHS", "GIP", "GMD", "GNF", "GTQ", "GYD", "HKD", "HNL", //
    "HRK", "HTG", "HUF", "IDR", "ILS", "INR", "IQD", "IRR", //
    "ISK", "JMD", "JOD", "JPY", "KES", "KGS", "KHR", "KMF", //
    "KPW", "KRW", "KWD", "KYD", "KZT", "LAK", "LBP", "LKR", //
    "LRD", "LSL", "LYD", "MAD", "MDL", "MGA", "MKD", "MMK", //
    "MNT", "MOP", "MRU", "MUR", "MVR", "MWK", "MXN", "MYR", //
    "MZN", "NAD", "NGN", "NIO", "NOK", "NPR", "NZD", "OMR", //
    "PAB", "PEN", "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", //
    "RON", "RSD", "RUB", "RWF", "SAR", "SBD", "SCR", "SDG", //
    "SEK", "SGD", "SHP", "SLE", "SLL", "SOS", "SRD", "SSP", //
    "STN", "SVC", "SYP", "SZL", "THB", "TJS", "TMT", "TND", //
    "TOP", "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", //
    "UYU", "UZS", "VES", "VND", "VUV", "WST", "XAF", "XAG", //
    "XAU", "XCD", "XDR", "XOF", "XPD", "XPF", "XPT", "YER", //
    "ZAR", "ZMW", "ZWL",
];

static ISO_4217: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ISO_4217_CODES.iter().copied().collect());

/// Check a raw code string against the static table (exact, case-sensitive).
pub fn is_recognized(code: &str) -> bool {
    ISO_4217.contains(code)
}

// ============================================================================
// CurrencyCode
// ============================================================================

/// A currency code as carried on accounts, rates, and transfer requests.
///
/// This is a thin wrapper, not a validated type: an unrecognized code is
/// representable on purpose so the validator can report it as the specific
/// business rejection it maps to.
///
/// # Examples
/// ```
/// use fundrail::currency::CurrencyCode;
///
/// let eur = CurrencyCode::new("EUR");
/// assert!(eur.is_recognized());
/// assert!(eur.matches(&CurrencyCode::new("eur"))); // matching is lenient
/// assert!(!CurrencyCode::new("eur").is_recognized()); // recognition is not
/// assert!(!CurrencyCode::new("XYZ").is_recognized());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Wrap a raw code string as given by the caller or stored on a row.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the raw code as &str
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the raw code is an exact member of the ISO 4217 table.
    pub fn is_recognized(&self) -> bool {
        is_recognized(&self.0)
    }

    /// Case-insensitive equality, used when comparing the transfer currency
    /// against an account currency.
    pub fn matches(&self, other: &CurrencyCode) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Uppercase form, used as the canonical key in the rate store.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_codes() {
        for code in ["EUR", "USD", "SGD", "CHF", "GBP", "JPY", "CUC"] {
            assert!(is_recognized(code), "{code} should be recognized");
        }
    }

    #[test]
    fn test_unrecognized_codes() {
        for code in ["XYZ", "EURO", "EU", "", "eur", "Usd", "XXX", "XTS"] {
            assert!(!is_recognized(code), "{code} should not be recognized");
        }
    }

    #[test]
    fn test_table_has_no_duplicates() {
        assert_eq!(ISO_4217.len(), ISO_4217_CODES.len());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let eur = CurrencyCode::new("EUR");
        assert!(eur.matches(&CurrencyCode::new("eur")));
        assert!(eur.matches(&CurrencyCode::new("Eur")));
        assert!(!eur.matches(&CurrencyCode::new("USD")));
    }

    #[test]
    fn test_recognition_is_case_sensitive() {
        assert!(CurrencyCode::new("EUR").is_recognized());
        assert!(!CurrencyCode::new("eur").is_recognized());
    }

    #[test]
    fn test_normalized() {
        assert_eq!(CurrencyCode::new("eur").normalized(), "EUR");
        assert_eq!(CurrencyCode::new("EUR").normalized(), "EUR");
    }

    #[test]
    fn test_serde_transparent() {
        let code = CurrencyCode::new("EUR");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"EUR\"");
        let back: CurrencyCode = serde_json::from_str("\"SGD\"").unwrap();
        assert_eq!(back.as_str(), "SGD");
    }
}
