//! # Order Number Allocation
//!
//! Allocates strictly increasing, date-scoped order identifiers in the
//! form `ORD-YYMMDD-NNN`.
//!
//! ## Allocation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Number Allocation                              │
//! │                                                                         │
//! │  allocate(2024-08-23)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  date key "240823" ──► counter exists?                                 │
//! │       │                    │                                            │
//! │       │               no ──┴── create at 0                             │
//! │       ▼                                                                 │
//! │  increment ──► format ──► "ORD-240823-001"                             │
//! │                                                                         │
//! │  Next calendar day: counter starts fresh ──► "ORD-240824-001"          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Contract
//! [`OrderNumberGenerator`] is a plain in-memory map with `&mut self`
//! allocation — correct only when one thread allocates. Multi-instance
//! deployments MUST use the database-backed allocator (an atomic
//! upsert-returning increment on the `order_sequences` table in
//! yuandi-db); an order is never created without a number, so a failed
//! allocation aborts order creation.
//!
//! ## Business Day
//! The date key rolls over at midnight KST (UTC+9), the business
//! timezone, not UTC.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Order number prefix.
pub const ORDER_NO_PREFIX: &str = "ORD";

/// Korea Standard Time offset from UTC, in seconds.
const KST_OFFSET_SECS: i32 = 9 * 3600;

// =============================================================================
// Formatting
// =============================================================================

/// Formats a date into the `YYMMDD` key used to scope sequences.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use yuandi_core::order_number::date_key;
///
/// let date = NaiveDate::from_ymd_opt(2024, 8, 23).unwrap();
/// assert_eq!(date_key(date), "240823");
/// ```
pub fn date_key(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// Formats a date key and sequence into the full order number.
///
/// The sequence is zero-padded to 3 digits; a day with more than 999
/// orders simply widens the field (numbers stay unique and ordered).
///
/// ## Example
/// ```rust
/// use yuandi_core::order_number::format_order_no;
///
/// assert_eq!(format_order_no("240823", 1), "ORD-240823-001");
/// assert_eq!(format_order_no("240823", 42), "ORD-240823-042");
/// assert_eq!(format_order_no("240823", 1000), "ORD-240823-1000");
/// ```
pub fn format_order_no(date_key: &str, sequence: u32) -> String {
    format!("{}-{}-{:03}", ORDER_NO_PREFIX, date_key, sequence)
}

/// Returns the current business date (KST) for a given instant.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use yuandi_core::order_number::business_date;
///
/// // 16:30 UTC = 01:30 KST next day
/// let instant = Utc.with_ymd_and_hms(2024, 8, 23, 16, 30, 0).unwrap();
/// assert_eq!(business_date(instant).to_string(), "2024-08-24");
/// ```
pub fn business_date(instant: DateTime<Utc>) -> NaiveDate {
    // +09:00 is always a valid offset
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS).expect("KST offset");
    instant.with_timezone(&kst).date_naive()
}

/// Returns today's business date (KST).
pub fn business_today() -> NaiveDate {
    business_date(Utc::now())
}

// =============================================================================
// In-Memory Generator
// =============================================================================

/// In-memory, per-date order number allocator.
///
/// ## When To Use
/// Single-threaded embeddings and tests only. The map increment is not
/// atomic across threads or processes; concurrent deployments must
/// allocate through the persistent counter instead.
#[derive(Debug, Default)]
pub struct OrderNumberGenerator {
    /// One counter per YYMMDD key, holding the last allocated sequence.
    counters: HashMap<String, u32>,
}

impl OrderNumberGenerator {
    /// Creates a generator with no allocated numbers.
    pub fn new() -> Self {
        OrderNumberGenerator {
            counters: HashMap::new(),
        }
    }

    /// Allocates the next order number for the given business date.
    ///
    /// The first allocation for a date yields sequence 1; each subsequent
    /// allocation increments by exactly 1. Other dates are unaffected.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use yuandi_core::order_number::OrderNumberGenerator;
    ///
    /// let mut gen = OrderNumberGenerator::new();
    /// let date = NaiveDate::from_ymd_opt(2024, 8, 23).unwrap();
    ///
    /// assert_eq!(gen.allocate(date), "ORD-240823-001");
    /// assert_eq!(gen.allocate(date), "ORD-240823-002");
    /// ```
    pub fn allocate(&mut self, date: NaiveDate) -> String {
        let key = date_key(date);
        let counter = self.counters.entry(key.clone()).or_insert(0);
        *counter += 1;
        format_order_no(&key, *counter)
    }

    /// Returns the last sequence allocated for a date (0 if none).
    pub fn last_sequence(&self, date: NaiveDate) -> u32 {
        self.counters.get(&date_key(date)).copied().unwrap_or(0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
