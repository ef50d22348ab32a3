//! Read-only binary, hexadecimal and octal views of the display

use serde::Serialize;

/// Shown when the display has no leading integer
pub const NOT_AVAILABLE: &str = "N/A";

/// Parses the leading integer of `input` like a browser's `parseInt`
///
/// Accepts leading whitespace, an optional sign, and either decimal digits
/// or a `0x` prefix followed by hex digits. Trailing text is ignored.
#[must_use]
pub fn parse_int_prefix(input: &str) -> Option<i128> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value: i128 = 0;
    let mut seen = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        value = value.checked_mul(i128::from(radix))?.checked_add(i128::from(d))?;
        seen = true;
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// The three radix renderings of one display value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadixView {
    /// Base 2
    pub binary: String,
    /// Base 16, uppercase
    pub hex: String,
    /// Base 8
    pub octal: String,
}

impl RadixView {
    /// Renders the leading integer of `display`, or `N/A` for each view
    #[must_use]
    pub fn of(display: &str) -> Self {
        match parse_int_prefix(display) {
            Some(n) => {
                let sign = if n < 0 { "-" } else { "" };
                let magnitude = n.unsigned_abs();
                Self {
                    binary: format!("{sign}{magnitude:b}"),
                    hex: format!("{sign}{magnitude:X}"),
                    octal: format!("{sign}{magnitude:o}"),
                }
            }
            None => Self {
                binary: NOT_AVAILABLE.to_string(),
                hex: NOT_AVAILABLE.to_string(),
                octal: NOT_AVAILABLE.to_string(),
            },
        }
    }

    /// Returns true if the display had no integer to show
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.binary != NOT_AVAILABLE
    }
}
