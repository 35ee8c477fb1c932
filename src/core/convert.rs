//! Cross-rate arithmetic over a rate table.
//!
//! All rates in a table are quoted against the same base, so the factor
//! between any two currencies is `rates[to] / rates[from]`. Nothing here
//! rounds; precision is a display concern.

use crate::core::amount::parse_numeric;
use crate::core::error::ConversionError;
use crate::core::rates::Rates;

fn lookup(rates: &Rates, code: &str) -> Result<f64, ConversionError> {
    rates
        .get(code)
        .copied()
        .ok_or_else(|| ConversionError::UnknownCurrency(code.to_string()))
}

/// Conversion factor from `from` to `to`. Identical codes always yield 1.
pub fn get_rate(rates: &Rates, from: &str, to: &str) -> Result<f64, ConversionError> {
    if from == to {
        return Ok(1.0);
    }
    let from_rate = lookup(rates, from)?;
    let to_rate = lookup(rates, to)?;
    Ok(to_rate / from_rate)
}

/// Converts `amount` from one currency to another.
///
/// Zero amounts and identical codes are returned unchanged without looking
/// at the table.
pub fn convert(rates: &Rates, from: &str, to: &str, amount: f64) -> Result<f64, ConversionError> {
    if !amount.is_finite() {
        return Err(ConversionError::InvalidAmount);
    }
    if amount == 0.0 || from == to {
        return Ok(amount);
    }
    let from_rate = lookup(rates, from)?;
    let to_rate = lookup(rates, to)?;
    Ok(amount * (to_rate / from_rate))
}

/// Reciprocal of a rate, if it has one.
pub fn inverse_rate(rate: f64) -> Option<f64> {
    (rate.is_finite() && rate != 0.0).then(|| 1.0 / rate)
}

/// Everything the result view needs for one from/to/amount selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSummary {
    pub amount: f64,
    pub converted: Option<f64>,
    pub rate: Option<f64>,
    pub inverse_rate: Option<f64>,
}

fn has_usable_rate(rates: &Rates, code: &str) -> bool {
    rates.get(code).is_some_and(|rate| *rate != 0.0)
}

/// Computes the displayable conversion for a canonical amount string.
///
/// Conversion errors suppress the affected value instead of failing.
pub fn summarize(rates: &Rates, from: &str, to: &str, amount: &str) -> ConversionSummary {
    let amount = parse_numeric(amount);
    let usable = has_usable_rate(rates, from) && has_usable_rate(rates, to);

    let converted = if usable && amount.is_finite() {
        convert(rates, from, to, amount).ok()
    } else {
        None
    };
    let rate = if usable {
        get_rate(rates, from, to).ok()
    } else {
        None
    };

    ConversionSummary {
        amount,
        converted,
        rate,
        inverse_rate: rate.and_then(inverse_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rates() -> Rates {
        Rates::from([
            ("EUR".to_string(), 1.0),
            ("USD".to_string(), 1.1),
            ("JPY".to_string(), 160.0),
        ])
    }

    #[test]
    fn test_convert_scenario() {
        let rates = sample_rates();
        let usd = convert(&rates, "EUR", "USD", 100.0).unwrap();
        assert!((usd - 110.0).abs() < 1e-9);

        let rate = get_rate(&rates, "USD", "JPY").unwrap();
        assert!((rate - 145.4545).abs() < 1e-4);
    }

    #[test]
    fn test_same_currency_short_circuits() {
        let rates = sample_rates();
        assert_eq!(get_rate(&rates, "XYZ", "XYZ"), Ok(1.0));
        assert_eq!(convert(&rates, "XYZ", "XYZ", 42.5), Ok(42.5));
        assert_eq!(get_rate(&Rates::new(), "EUR", "EUR"), Ok(1.0));
    }

    #[test]
    fn test_zero_amount_short_circuits() {
        let rates = sample_rates();
        assert_eq!(convert(&rates, "EUR", "JPY", 0.0), Ok(0.0));
        assert_eq!(convert(&rates, "ABC", "XYZ", 0.0), Ok(0.0));
    }

    #[test]
    fn test_unknown_currency() {
        let rates = sample_rates();
        assert_eq!(
            get_rate(&rates, "GBP", "USD"),
            Err(ConversionError::UnknownCurrency("GBP".to_string()))
        );
        assert_eq!(
            convert(&rates, "USD", "CHF", 5.0),
            Err(ConversionError::UnknownCurrency("CHF".to_string()))
        );
    }

    #[test]
    fn test_invalid_amount() {
        let rates = sample_rates();
        assert_eq!(
            convert(&rates, "EUR", "USD", f64::NAN),
            Err(ConversionError::InvalidAmount)
        );
        assert_eq!(
            convert(&rates, "EUR", "EUR", f64::INFINITY),
            Err(ConversionError::InvalidAmount)
        );
    }

    #[test]
    fn test_round_trip_rate() {
        let rates = sample_rates();
        for (a, b) in [("EUR", "USD"), ("USD", "JPY"), ("JPY", "EUR")] {
            let product = get_rate(&rates, a, b).unwrap() * get_rate(&rates, b, a).unwrap();
            assert!((product - 1.0).abs() < 1e-12, "{a}/{b}");
        }
    }

    #[test]
    fn test_inverse_rate() {
        assert_eq!(inverse_rate(4.0), Some(0.25));
        assert_eq!(inverse_rate(0.0), None);
        assert_eq!(inverse_rate(f64::NAN), None);
    }

    #[test]
    fn test_summarize() {
        let rates = sample_rates();
        let summary = summarize(&rates, "EUR", "USD", "100,");
        assert_eq!(summary.amount, 100.0);
        assert!((summary.converted.unwrap() - 110.0).abs() < 1e-9);
        assert!((summary.rate.unwrap() - 1.1).abs() < 1e-12);
        assert!((summary.inverse_rate.unwrap() - 1.0 / 1.1).abs() < 1e-12);

        let empty_amount = summarize(&rates, "EUR", "USD", "");
        assert!(empty_amount.amount.is_nan());
        assert!(empty_amount.converted.is_none());
        assert!(empty_amount.rate.is_some());

        let unknown = summarize(&rates, "EUR", "GBP", "10");
        assert_eq!(unknown.converted, None);
        assert_eq!(unknown.rate, None);
        assert_eq!(unknown.inverse_rate, None);
    }

    #[test]
    fn test_summarize_ignores_zero_rates() {
        let mut rates = sample_rates();
        rates.insert("ZZZ".to_string(), 0.0);
        let summary = summarize(&rates, "ZZZ", "USD", "1");
        assert_eq!(summary.converted, None);
        assert_eq!(summary.rate, None);
    }
}
