//! Lenient conversion of raw form text into settings values.
//!
//! Numeric fields never reject input: text without a leading integer falls back to a default
//! instead of surfacing a parse error.

/// Parse the leading integer of `raw`, ignoring surrounding whitespace.
///
/// An optional sign followed by at least one digit is required; anything after the digits is
/// ignored (`"12px"` → 12, `"3.7"` → 3). Values beyond the `i64` range saturate.
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut seen_digit = false;
    let mut magnitude: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        let digit = i64::from(b - b'0');
        magnitude = if negative {
            magnitude.saturating_mul(10).saturating_sub(digit)
        } else {
            magnitude.saturating_mul(10).saturating_add(digit)
        };
    }

    seen_digit.then_some(magnitude)
}

pub fn int_or(raw: &str, default: i64) -> i64 {
    parse_int(raw).unwrap_or(default)
}

/// Free-text fields: an empty string means "not set".
pub fn optional_text(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_signed_integers() {
        assert_eq!(parse_int("7"), Some(7));
        assert_eq!(parse_int("  -12 "), Some(-12));
        assert_eq!(parse_int("+3"), Some(3));
    }

    #[test]
    fn keeps_leading_integer_of_mixed_text() {
        assert_eq!(parse_int("12px"), Some(12));
        assert_eq!(parse_int("3.7"), Some(3));
        assert_eq!(parse_int("-0.5"), Some(0));
    }

    #[test]
    fn rejects_text_without_leading_digits() {
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int(".5"), None);
    }

    #[test]
    fn saturates_out_of_range_numbers() {
        assert_eq!(parse_int("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_int("-99999999999999999999999"), Some(i64::MIN));
    }

    #[test]
    fn substitutes_default_for_non_numeric_input() {
        assert_eq!(int_or("abc", 0), 0);
        assert_eq!(int_or("abc", 1), 1);
        assert_eq!(int_or("0", 1), 0);
    }

    #[test]
    fn empty_text_is_absent() {
        assert_eq!(optional_text(""), None);
        assert_eq!(optional_text("out.txt"), Some("out.txt".to_owned()));
        assert_eq!(optional_text(" "), Some(" ".to_owned()));
    }
}
