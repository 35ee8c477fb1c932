//! Display formatting for amounts and rates

/// Inserts `,` between groups of three integer digits.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn format_fixed(value: f64, fraction_digits: usize, trim_zeros: bool) -> String {
    let fixed = format!("{:.*}", fraction_digits, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = if trim_zeros {
        frac_part.trim_end_matches('0')
    } else {
        frac_part
    };

    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    let int_part = group_thousands(int_part);
    if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    }
}

/// Formats an amount with at most two fraction digits.
///
/// With a currency code the value always shows two digits and is suffixed
/// with the code (`1,234.50 USD`); without one, trailing zeros are dropped.
/// Non-finite values format as an empty string.
pub fn format_amount(value: f64, currency: Option<&str>) -> String {
    if !value.is_finite() {
        return String::new();
    }
    match currency {
        Some(code) => format!("{} {}", format_fixed(value, 2, false), code),
        None => format_fixed(value, 2, true),
    }
}

/// Formats a raw rate with six fraction digits.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_with_currency() {
        assert_eq!(format_amount(1234.5, Some("USD")), "1,234.50 USD");
        assert_eq!(format_amount(0.0, Some("EUR")), "0.00 EUR");
        assert_eq!(format_amount(1_000_000.25, Some("JPY")), "1,000,000.25 JPY");
        assert_eq!(format_amount(-42.0, Some("GBP")), "-42.00 GBP");
        assert_eq!(format_amount(-0.001, Some("GBP")), "0.00 GBP");
    }

    #[test]
    fn test_format_amount_plain() {
        assert_eq!(format_amount(1234.5, None), "1,234.5");
        assert_eq!(format_amount(100.0, None), "100");
        assert_eq!(format_amount(999.999, None), "1,000");
        assert_eq!(format_amount(f64::NAN, None), "");
        assert_eq!(format_amount(f64::INFINITY, Some("USD")), "");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1.1), "1.100000");
        assert_eq!(format_rate(160.0 / 1.1), "145.454545");
    }
}
