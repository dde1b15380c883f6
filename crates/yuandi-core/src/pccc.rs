//! # PCCC Validation
//!
//! Validates Korea's Personal Customs Clearance Code (개인통관고유부호)
//! before an order is accepted.
//!
//! ## Format
//! A literal `P` followed by exactly 12 digits, e.g. `P123456789012`.
//! Input is trimmed and uppercased before checking, so `p123456789012`
//! normalizes cleanly.
//!
//! Each failure cause gets its own error variant so the order form can
//! highlight the specific problem instead of a generic "invalid code".

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Number of digits after the `P` prefix.
pub const PCCC_DIGIT_COUNT: usize = 12;

// =============================================================================
// Types
// =============================================================================

/// A validated, normalized customs clearance code.
///
/// Construction goes through [`validate_pccc`]; the inner string is
/// always `P` + 12 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PcccCode(String);

impl PcccCode {
    /// Returns the normalized code.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the normalized string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PcccCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customs code validation failures, one variant per cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PcccError {
    /// Input was empty (after trimming).
    #[error("customs code is required")]
    Empty,

    /// Input does not start with the literal `P`.
    #[error("customs code must start with 'P'")]
    MissingPrefix,

    /// Wrong number of characters after the prefix.
    #[error("customs code must have exactly 12 digits after 'P', got {actual}")]
    WrongLength { actual: usize },

    /// Non-digit characters after the prefix.
    #[error("customs code must contain only digits after 'P'")]
    NonDigit,
}

// =============================================================================
// Validation
// =============================================================================

/// Validates and normalizes a customs clearance code.
///
/// Pure: no side effects, no state.
///
/// ## Example
/// ```rust
/// use yuandi_core::pccc::{validate_pccc, PcccError};
///
/// let code = validate_pccc("p123456789012").unwrap();
/// assert_eq!(code.as_str(), "P123456789012");
///
/// assert_eq!(
///     validate_pccc("123456789012").unwrap_err(),
///     PcccError::MissingPrefix
/// );
/// ```
pub fn validate_pccc(raw: &str) -> Result<PcccCode, PcccError> {
    let normalized = raw.trim().to_ascii_uppercase();

    if normalized.is_empty() {
        return Err(PcccError::Empty);
    }

    if !normalized.starts_with('P') {
        return Err(PcccError::MissingPrefix);
    }

    // 'P' is ASCII, so slicing past it is char-boundary safe
    let digits = &normalized[1..];

    if digits.chars().count() != PCCC_DIGIT_COUNT {
        return Err(PcccError::WrongLength {
            actual: digits.chars().count(),
        });
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PcccError::NonDigit);
    }

    Ok(PcccCode(normalized))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code_is_normalized() {
        let code = validate_pccc("p123456789012").unwrap();
        assert_eq!(code.as_str(), "P123456789012");

        // Already-normalized input passes through
        let code = validate_pccc("P000000000000").unwrap();
        assert_eq!(code.as_str(), "P000000000000");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let code = validate_pccc("  P123456789012\n").unwrap();
        assert_eq!(code.as_str(), "P123456789012");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(validate_pccc("").unwrap_err(), PcccError::Empty);
        assert_eq!(validate_pccc("   ").unwrap_err(), PcccError::Empty);
    }

    #[test]
    fn test_missing_prefix() {
        assert_eq!(
            validate_pccc("123456789012").unwrap_err(),
            PcccError::MissingPrefix
        );
        assert_eq!(
            validate_pccc("Q123456789012").unwrap_err(),
            PcccError::MissingPrefix
        );
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(
            validate_pccc("P123").unwrap_err(),
            PcccError::WrongLength { actual: 3 }
        );
        assert_eq!(
            validate_pccc("P1234567890123").unwrap_err(),
            PcccError::WrongLength { actual: 13 }
        );
    }

    #[test]
    fn test_non_digit_characters() {
        assert_eq!(
            validate_pccc("P12345678901A").unwrap_err(),
            PcccError::NonDigit
        );
        // 12 chars after P, but one is an inner space
        assert_eq!(
            validate_pccc("P1234567890 1").unwrap_err(),
            PcccError::NonDigit
        );
    }

    #[test]
    fn test_each_cause_has_distinct_message() {
        let messages = [
            PcccError::Empty.to_string(),
            PcccError::MissingPrefix.to_string(),
            PcccError::WrongLength { actual: 3 }.to_string(),
            PcccError::NonDigit.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
