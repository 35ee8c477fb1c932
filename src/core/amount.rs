//! Amount input normalization.
//!
//! Free-form keyboard or clipboard text is reduced to a canonical decimal
//! string: digits plus at most one separator (`.` or `,`), with bounded
//! integer and fraction lengths. The canonical string is what gets stored;
//! [`parse_numeric`] turns it into an `f64` when a value is needed.

pub const MAX_INTEGER_DIGITS: usize = 15;
pub const MAX_FRACTION_DIGITS: usize = 10;

fn is_separator(c: char) -> bool {
    c == '.' || c == ','
}

/// Normalizes raw input into a canonical decimal string.
///
/// The first `.` or `,` seen becomes the separator and every later separator
/// character of either kind is dropped. A dangling separator (`"12."`) is kept
/// so the user can keep typing fraction digits.
pub fn sanitize(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut separator: Option<char> = None;

    for c in raw.chars() {
        if c.is_ascii_digit() {
            result.push(c);
        } else if is_separator(c) && separator.is_none() {
            separator = Some(c);
            result.push(c);
        }
    }

    if result.starts_with(is_separator) {
        result.insert(0, '0');
    }

    let Some(separator) = separator else {
        result.truncate(MAX_INTEGER_DIGITS);
        return result;
    };

    let (int_raw, frac_raw) = result
        .split_once(separator)
        .unwrap_or((result.as_str(), ""));
    // Only ASCII digits remain, so byte offsets are char offsets.
    let int_part = &int_raw[..int_raw.len().min(MAX_INTEGER_DIGITS)];
    let frac_part = &frac_raw[..frac_raw.len().min(MAX_FRACTION_DIGITS)];

    if !frac_part.is_empty() {
        format!("{int_part}{separator}{frac_part}")
    } else if MAX_FRACTION_DIGITS > 0 {
        format!("{int_part}{separator}")
    } else {
        int_part.to_string()
    }
}

/// Splices pasted text into the current amount at the selection and
/// re-sanitizes the result.
///
/// Returns the new amount and the caret position just after the inserted
/// text. Out-of-range selections are clamped to the amount's length.
pub fn splice_paste(amount: &str, start: usize, end: usize, pasted: &str) -> (String, usize) {
    let cleaned = sanitize(pasted);
    let end = end.min(amount.len());
    let start = start.min(end);

    let (head, tail) = match (amount.get(..start), amount.get(end..)) {
        (Some(head), Some(tail)) => (head, tail),
        _ => (amount, ""),
    };
    let next = sanitize(&format!("{head}{cleaned}{tail}"));
    let caret = (start + cleaned.len()).min(next.len());
    (next, caret)
}

/// Something that can be read as a number for conversion.
pub trait NumericInput {
    fn to_numeric(&self) -> f64;
}

impl NumericInput for str {
    fn to_numeric(&self) -> f64 {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return f64::NAN;
        }

        let with_dot = trimmed.replace(',', ".");
        let canonical = match with_dot.split_once('.') {
            Some((int_part, rest)) => format!("{int_part}.{}", rest.replace('.', "")),
            None => with_dot,
        };

        match canonical.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => f64::NAN,
        }
    }
}

impl NumericInput for String {
    fn to_numeric(&self) -> f64 {
        self.as_str().to_numeric()
    }
}

impl NumericInput for f64 {
    fn to_numeric(&self) -> f64 {
        *self
    }
}

impl<T: NumericInput> NumericInput for Option<T> {
    fn to_numeric(&self) -> f64 {
        self.as_ref().map_or(f64::NAN, NumericInput::to_numeric)
    }
}

/// Parses a canonical amount (or passes a raw number through).
///
/// Returns `NaN` for empty or unparseable input instead of failing.
pub fn parse_numeric<T: NumericInput + ?Sized>(input: &T) -> f64 {
    input.to_numeric()
}
