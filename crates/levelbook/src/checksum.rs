//! Canonical checksum bytes for orderbook integrity checks
//!
//! Kraken publishes a CRC32 of the top of book with every update. This module
//! produces the bytes that hash is computed over; applying the hash is left to
//! the caller.
//!
//! # Algorithm
//!
//! 1. Walk the visible levels best-first (asks low→high, bids high→low)
//! 2. Format price with exactly `price_precision` decimal places
//! 3. Remove the decimal point and strip leading zeros
//! 4. Same for volume with `volume_precision`
//! 5. Concatenate without separators
//!
//! For the whole book the ask bytes come first, followed by the bid bytes.

use levelbook_types::{Decimal, Level};
use rust_decimal::RoundingStrategy;

/// Round `value` to `precision` fractional digits and pin the scale
///
/// The result always prints with exactly `precision` digits after the point,
/// so `round_to(dec!(1.5), 3).to_string() == "1.500"`.
pub fn round_to(value: Decimal, precision: u32) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(precision);
    rounded
}

/// Fixed-point text of `value` at `precision` digits
pub fn format_fixed(value: Decimal, precision: u32) -> String {
    round_to(value, precision).to_string()
}

/// Format a decimal for checksum with specified precision
///
/// The value is formatted with exactly `precision` decimal places, then:
/// 1. Remove the decimal point
/// 2. Strip leading zeros
///
/// # Examples
///
/// With price_precision=1:
/// - 88813.5 → "88813.5" → "888135"
///
/// With volume_precision=8:
/// - 0.00460208 → "0.00460208" → "000460208" → "460208"
/// - 0.001 → "0.00100000" → "000100000" → "100000"
pub fn format_for_checksum(value: Decimal, precision: u32) -> String {
    let formatted = format_fixed(value, precision);
    let without_decimal = formatted.replacen('.', "", 1);
    without_decimal.trim_start_matches('0').to_string()
}

/// Append the checksum form of each level to `buf`
pub fn write_levels<'a>(
    buf: &mut Vec<u8>,
    levels: impl IntoIterator<Item = &'a Level>,
    price_precision: u32,
    volume_precision: u32,
) {
    for level in levels {
        buf.extend_from_slice(format_for_checksum(level.price, price_precision).as_bytes());
        buf.extend_from_slice(format_for_checksum(level.volume, volume_precision).as_bytes());
    }
}

/// Canonical bytes for a best-first slice of levels
pub fn canonical_bytes(levels: &[Level], price_precision: u32, volume_precision: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(levels.len() * 16);
    write_levels(&mut buf, levels, price_precision, volume_precision);
    buf
}
