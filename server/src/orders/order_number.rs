//! Human-facing order numbers
//!
//! Format: `ORD-<year>-<6-digit sequence>`, sequence scoped per calendar
//! year. The next number is derived from the current maximum inside the
//! placement transaction; a UNIQUE constraint plus bounded retry closes the
//! race between concurrent placements.

use chrono::Datelike;

/// Width of the zero-padded sequence part
const SEQUENCE_WIDTH: usize = 6;

/// Prefix for a given year, e.g. `ORD-2026-`
pub fn year_prefix(year: i32) -> String {
    format!("ORD-{year}-")
}

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Format a full order number from year and sequence
pub fn format_number(year: i32, sequence: u32) -> String {
    format!("ORD-{year}-{sequence:0SEQUENCE_WIDTH$}")
}

/// Parse the sequence out of an order number; None if malformed
pub fn parse_sequence(order_number: &str) -> Option<u32> {
    let suffix = order_number.rsplit('-').next()?;
    if suffix.len() < SEQUENCE_WIDTH {
        return None;
    }
    suffix.parse().ok()
}

/// Next order number after the current per-year maximum
///
/// `current_max` is the greatest existing number for this year's prefix, or
/// None when the year has no orders yet. An unparseable maximum falls back
/// to sequence 1 rather than failing placement; the UNIQUE constraint still
/// guards against a collision.
pub fn next_number(year: i32, current_max: Option<&str>) -> String {
    let next_seq = current_max
        .and_then(parse_sequence)
        .map(|seq| seq + 1)
        .unwrap_or(1);
    format_number(year, next_seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_six_digits() {
        assert_eq!(format_number(2026, 1), "ORD-2026-000001");
        assert_eq!(format_number(2026, 42), "ORD-2026-000042");
        assert_eq!(format_number(2026, 123456), "ORD-2026-123456");
    }

    #[test]
    fn test_sequence_can_exceed_padding() {
        assert_eq!(format_number(2026, 1_000_000), "ORD-2026-1000000");
        assert_eq!(parse_sequence("ORD-2026-1000000"), Some(1_000_000));
    }

    #[test]
    fn test_parse_roundtrip() {
        assert_eq!(parse_sequence("ORD-2026-000317"), Some(317));
        assert_eq!(parse_sequence("ORD-2026-00317"), None);
        assert_eq!(parse_sequence("ORD-2026-abcdef"), None);
        assert_eq!(parse_sequence(""), None);
    }

    #[test]
    fn test_next_number() {
        assert_eq!(next_number(2026, None), "ORD-2026-000001");
        assert_eq!(
            next_number(2026, Some("ORD-2026-000009")),
            "ORD-2026-000010"
        );
        // Malformed maximum falls back to the start of the sequence
        assert_eq!(next_number(2026, Some("garbage")), "ORD-2026-000001");
    }

    #[test]
    fn test_year_prefix() {
        assert_eq!(year_prefix(2026), "ORD-2026-");
    }
}
