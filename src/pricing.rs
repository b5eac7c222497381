// Price and seat parsing helpers. Everything here is total: bad input degrades
// to 0 / None instead of failing.

use crate::models::RawPrice;

/// Parses a catalog price into whole rand.
///
/// Whole numbers are returned unchanged; other numbers are rounded, with
/// negative and non-finite values giving 0. Strings have every non-digit character
/// stripped and the rest is read as a base-10 integer; an empty remainder (or
/// one too large for `u64`) gives 0.
pub fn parse_price(raw: &RawPrice) -> u64 {
    match raw {
        RawPrice::Amount(n) => *n,
        RawPrice::Decimal(n) if n.is_finite() && *n > 0.0 => n.round() as u64,
        RawPrice::Decimal(_) => 0,
        RawPrice::Text(s) => parse_price_text(s),
    }
}

pub fn parse_price_text(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().unwrap_or(0)
}

// Leading digits of a seat value: "5" -> 5, "7 seats" -> 7, "" -> None
pub fn parse_seats(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok()
}

// Numeric seat values: 5.0 -> 5; negative or non-finite -> None
pub fn round_seats(raw: f64) -> Option<u32> {
    Some(raw.round())
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u32)
}

/// Formats an amount the way prices are shown on the site: `R300 000`.
pub fn format_rand(amount: u64) -> String {
    format!("R{}", group_thousands(amount))
}

// en-ZA grouping: a space every three digits
pub fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
