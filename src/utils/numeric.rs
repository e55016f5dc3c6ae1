//! Lenient integer parsing for export cells.

/// Parse the leading integer of a cell, `parseInt`-style.
///
/// Leading whitespace and a single sign are accepted, parsing stops at the
/// first non-digit. Returns `None` when no digit is found.
///
/// ```
/// use ajsr_reports::utils::parse_leading_int;
///
/// assert_eq!(parse_leading_int("12 days"), Some(12));
/// assert_eq!(parse_leading_int("n/a"), None);
/// ```
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
