//! # SKU Generation
//!
//! Synthesizes a human-scannable, practically-unique product code from the
//! free-text catalog fields.
//!
//! ## SKU Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  BAG-CLAS-BK-CHA-A1B2C                                  │
//! │                                                                         │
//! │   BAG      category  (≤3 chars)                                         │
//! │   CLAS     model     (≤4 chars)                                         │
//! │   BK       color     (≤2 chars)                                         │
//! │   CHA      brand     (≤3 chars)                                         │
//! │   A1B2C    suffix    (5 chars, base-36)                                 │
//! │                                                                         │
//! │  Segments: ASCII alphanumerics, uppercased, truncated. Fields that      │
//! │  sanitize to nothing (e.g., Hangul/CJK-only input) fall back to         │
//! │  X-placeholders; short fields are padded with X.                        │
//! │                                                                         │
//! │  Suffix: SHA-256 over the raw inputs + a nanosecond timestamp + a       │
//! │  random salt, base-36 encoded. Collision-resistant under rapid          │
//! │  successive creation, but NOT guaranteed unique — the persistence       │
//! │  layer enforces a UNIQUE index and regenerates on collision.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use yuandi_core::sku::{generate_sku, matches_generated_format};
//!
//! let sku = generate_sku("bag", "Classic Flap", "black", "Chanel");
//! assert!(sku.starts_with("BAG-CLAS-BL-CHA-"));
//! assert!(matches_generated_format(&sku));
//!
//! // Degenerate input never fails
//! let sku = generate_sku("", "", "", "");
//! assert!(matches_generated_format(&sku));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};

// =============================================================================
// Segment Widths
// =============================================================================

const CATEGORY_MAX: usize = 3;
const MODEL_MAX: usize = 4;
const COLOR_MAX: usize = 2;
const BRAND_MAX: usize = 3;

// Minimum widths keep each segment recognizable after sanitization.
const CATEGORY_MIN: usize = 2;
const MODEL_MIN: usize = 2;
const COLOR_MIN: usize = 1;
const BRAND_MIN: usize = 2;

/// Length of the hash suffix segment.
pub const SUFFIX_LEN: usize = 5;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Public API
// =============================================================================

/// Generates a SKU from the four catalog free-text fields.
///
/// Never fails: empty or non-ASCII-only fields degrade to X-placeholders.
/// Uniqueness is probabilistic — callers that need DB-level uniqueness
/// must check against existing SKUs and regenerate on collision.
pub fn generate_sku(category: &str, model: &str, color: &str, brand: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or(0);
    let salt: u64 = rand::random();
    generate_sku_with_entropy(category, model, color, brand, nanos, salt)
}

/// Deterministic SKU generation with caller-supplied entropy.
///
/// [`generate_sku`] delegates here with the current wall clock and a
/// random salt; embedders and tests can pin both for reproducible output.
pub fn generate_sku_with_entropy(
    category: &str,
    model: &str,
    color: &str,
    brand: &str,
    timestamp_nanos: i64,
    salt: u64,
) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        segment(category, CATEGORY_MIN, CATEGORY_MAX),
        segment(model, MODEL_MIN, MODEL_MAX),
        segment(color, COLOR_MIN, COLOR_MAX),
        segment(brand, BRAND_MIN, BRAND_MAX),
        hash_suffix(category, model, color, brand, timestamp_nanos, salt)
    )
}

/// Checks whether a string has the shape this generator produces:
/// five `-`-separated segments of uppercase alphanumerics with the
/// documented width ranges.
pub fn matches_generated_format(sku: &str) -> bool {
    let widths: [(usize, usize); 5] = [(2, 6), (2, 6), (1, 3), (2, 4), (SUFFIX_LEN, SUFFIX_LEN)];

    let parts: Vec<&str> = sku.split('-').collect();
    if parts.len() != widths.len() {
        return false;
    }

    parts.iter().zip(widths.iter()).all(|(part, &(min, max))| {
        (min..=max).contains(&part.len())
            && part
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    })
}

// =============================================================================
// Internals
// =============================================================================

/// Sanitizes one free-text field into an uppercase ASCII segment.
///
/// - Keeps ASCII alphanumerics only (Hangul/CJK and punctuation dropped)
/// - Truncates to `max` characters
/// - Empty result becomes a full-width X-placeholder (e.g., "XXX")
/// - Short results are padded with X up to `min`
fn segment(raw: &str, min: usize, max: usize) -> String {
    let mut s: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(max)
        .collect::<String>()
        .to_ascii_uppercase();

    if s.is_empty() {
        return "X".repeat(max);
    }
    while s.len() < min {
        s.push('X');
    }
    s
}

/// Derives the 5-character base-36 suffix.
///
/// Hash input is the raw (unsanitized) fields, the timestamp, and the
/// salt — sanitization collisions ("블랙" vs "빨강" both → XX) still get
/// distinct suffixes.
fn hash_suffix(
    category: &str,
    model: &str,
    color: &str,
    brand: &str,
    timestamp_nanos: i64,
    salt: u64,
) -> String {
    let mut hasher = Sha256::new();
    for field in [category, model, color, brand] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]); // field separator so "ab"+"c" != "a"+"bc"
    }
    hasher.update(timestamp_nanos.to_be_bytes());
    hasher.update(salt.to_be_bytes());
    let digest = hasher.finalize();

    let mut n = 0u64;
    for &b in digest.iter().take(8) {
        n = (n << 8) | b as u64;
    }

    to_base36(n, SUFFIX_LEN)
}

/// Encodes `n` into exactly `len` base-36 digits (most significant first,
/// zero-padded, excess magnitude discarded).
fn to_base36(mut n: u64, len: usize) -> String {
    let mut buf = vec![b'0'; len];
    for slot in buf.iter_mut().rev() {
        *slot = BASE36[(n % 36) as usize];
        n /= 36;
    }
    // Safe: every byte comes from the BASE36 table
    String::from_utf8(buf).unwrap_or_else(|_| "0".repeat(len))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_are_sanitized_and_truncated() {
        let sku = generate_sku_with_entropy("bag", "Classic Flap", "black", "Chanel", 0, 0);
        assert!(sku.starts_with("BAG-CLAS-BL-CHA-"));
        assert!(matches_generated_format(&sku));
    }

    #[test]
    fn test_punctuation_is_stripped() {
        let sku = generate_sku_with_entropy("b.a-g!", "mo/del", "c,olor", "br&and", 0, 0);
        assert!(sku.starts_with("BAG-MODE-CO-BRA-"));
    }

    #[test]
    fn test_empty_inputs_fall_back_to_placeholders() {
        let sku = generate_sku_with_entropy("", "", "", "", 0, 0);
        assert!(sku.starts_with("XXX-XXXX-XX-XXX-"));
        assert!(matches_generated_format(&sku));
    }

    #[test]
    fn test_hangul_only_fields_fall_back_to_placeholders() {
        // Korean/Chinese catalog entry with no ASCII content
        let sku = generate_sku_with_entropy("가방", "클래식", "블랙", "샤넬", 0, 0);
        assert!(sku.starts_with("XXX-XXXX-XX-XXX-"));
        assert!(matches_generated_format(&sku));
    }

    #[test]
    fn test_short_fields_are_padded_to_minimum() {
        let sku = generate_sku_with_entropy("b", "m", "c", "b", 0, 0);
        assert!(sku.starts_with("BX-MX-C-BX-"));
        assert!(matches_generated_format(&sku));
    }

    #[test]
    fn test_suffix_is_deterministic_for_fixed_entropy() {
        let a = generate_sku_with_entropy("bag", "model", "black", "brand", 42, 7);
        let b = generate_sku_with_entropy("bag", "model", "black", "brand", 42, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_suffix_varies_with_entropy() {
        let a = generate_sku_with_entropy("bag", "model", "black", "brand", 42, 7);
        let b = generate_sku_with_entropy("bag", "model", "black", "brand", 42, 8);
        let c = generate_sku_with_entropy("bag", "model", "black", "brand", 43, 7);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_identical_sanitized_segments_get_distinct_suffixes() {
        // Two different Korean colors both sanitize to the XX placeholder,
        // but the raw input feeds the hash
        let a = generate_sku_with_entropy("가방", "클래식", "블랙", "샤넬", 42, 7);
        let b = generate_sku_with_entropy("가방", "클래식", "빨강", "샤넬", 42, 7);
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_sku_matches_format() {
        for _ in 0..50 {
            let sku = generate_sku("Bag", "Classic", "Black", "Chanel");
            assert!(matches_generated_format(&sku), "bad SKU: {sku}");
        }
    }

    #[test]
    fn test_format_checker_rejects_malformed() {
        assert!(!matches_generated_format(""));
        assert!(!matches_generated_format("BAG-CLAS-BK-CHA")); // missing suffix
        assert!(!matches_generated_format("BAG-CLAS-BK-CHA-A1B2")); // short suffix
        assert!(!matches_generated_format("bag-clas-bk-cha-a1b2c")); // lowercase
        assert!(!matches_generated_format("BAGGAGE-CLAS-BK-CHA-A1B2C")); // wide segment
    }

    #[test]
    fn test_to_base36_pads_and_truncates() {
        assert_eq!(to_base36(0, 5), "00000");
        assert_eq!(to_base36(35, 5), "0000Z");
        assert_eq!(to_base36(36, 5), "00010");
        // Only the low 5 digits survive
        assert_eq!(to_base36(36u64.pow(5), 5), "00000");
    }
}
