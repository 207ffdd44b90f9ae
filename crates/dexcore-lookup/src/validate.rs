use dexcore_catalog::LookupKey;

pub const MIN_KEY: LookupKey = 1;
pub const MAX_KEY: LookupKey = 1025;

/// Inclusive range of accepted lookup keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRange {
    pub min: LookupKey,
    pub max: LookupKey,
}

impl Default for KeyRange {
    fn default() -> Self {
        Self {
            min: MIN_KEY,
            max: MAX_KEY,
        }
    }
}

impl KeyRange {
    pub fn new(min: LookupKey, max: LookupKey) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, key: i64) -> bool {
        key >= i64::from(self.min) && key <= i64::from(self.max)
    }

    pub fn hint(&self) -> String {
        format!("Search by number: ({} to {}!)", self.min, self.max)
    }
}

/// Validates settled input against the default range.
pub fn validate(settled: &str) -> Option<LookupKey> {
    validate_in(settled, KeyRange::default())
}

/// Maps settled input to a key in `range`, or `None` for "leave the current
/// key alone".
///
/// The leading integer is parsed and trailing characters are ignored, so
/// `"12x"` yields 12. Decimal and exponent forms (`"12.5"`, `"1e3"`) are
/// rejected outright rather than truncated.
pub fn validate_in(settled: &str, range: KeyRange) -> Option<LookupKey> {
    let value = parse_leading_integer(settled)?;
    if !range.contains(value) {
        return None;
    }
    LookupKey::try_from(value).ok()
}

fn parse_leading_integer(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = unsigned
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return None;
    }

    let (digits, rest) = unsigned.split_at(digits_len);
    if is_fractional_or_exponent(rest) {
        return None;
    }

    // Overflow saturates; such values are out of range anyway.
    let significant = digits.trim_start_matches('0');
    let magnitude = if significant.is_empty() {
        0
    } else {
        significant.parse::<i64>().unwrap_or(i64::MAX)
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn is_fractional_or_exponent(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    match bytes.first() {
        Some(b'.') => true,
        Some(b'e' | b'E') => {
            let exponent = match bytes.get(1) {
                Some(b'+' | b'-') => &bytes[2..],
                _ => &bytes[1..],
            };
            exponent.first().is_some_and(u8::is_ascii_digit)
        }
        _ => false,
    }
}
