//! Field classification: decides whether a raw cell denotes a number.
//!
//! A field is numeric when, after removing every thousands separator (`,`) and
//! currency symbol (`$`), what remains is an optional leading `-`, digits, and
//! at most one `.`. Everything else (empty cells, `N.A.`, `-`, `1.2.3`) is
//! categorical and is kept verbatim.

use std::{borrow::Cow, cmp::Ordering, fmt};

use serde::Serialize;

use crate::error::{Error, Result};

const THOUSANDS_SEPARATOR: char = ',';
const CURRENCY_SYMBOL: char = '$';

/// Strips thousands separators and currency symbols from `field`.
pub fn normalize(field: &str) -> Cow<'_, str> {
    if field.contains([THOUSANDS_SEPARATOR, CURRENCY_SYMBOL]) {
        Cow::Owned(
            field
                .chars()
                .filter(|c| !matches!(*c, THOUSANDS_SEPARATOR | CURRENCY_SYMBOL))
                .collect(),
        )
    } else {
        Cow::Borrowed(field)
    }
}

pub fn is_numeric(field: &str) -> bool {
    let normalized = normalize(field);
    let unsigned = normalized.strip_prefix('-').unwrap_or(&normalized);
    let digits = unsigned.replacen('.', "", 1);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Converts a numeric field into an integer (no decimal point) or a float
/// (exactly one decimal point).
///
/// Integers too large for `i64` fall back to a float. Callers are expected to
/// gate this with [`is_numeric`]; ungated input that does not denote a single
/// number yields [`Error::Conversion`].
pub fn to_number(field: &str) -> Result<Number> {
    let normalized = normalize(field);
    let conversion_error = || Error::Conversion {
        value: field.to_string(),
    };
    match normalized.matches('.').count() {
        0 => match normalized.parse::<i64>() {
            Ok(integer) => Ok(Number::Integer(integer)),
            Err(_) if is_numeric(field) => normalized
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|_| conversion_error()),
            Err(_) => Err(conversion_error()),
        },
        1 if is_numeric(field) => normalized
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| conversion_error()),
        _ => Err(conversion_error()),
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(&b)),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
            (Number::Integer(a), Number::Float(b)) => compare_integer_float(a, b),
            (Number::Float(a), Number::Integer(b)) => {
                compare_integer_float(b, a).map(Ordering::reverse)
            }
        }
    }
}

/// Orders an integer against a float without rounding the integer through `f64`.
fn compare_integer_float(integer: i64, float: f64) -> Option<Ordering> {
    // 2^63: the first float above every i64.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if float.is_nan() {
        return None;
    }
    if float >= I64_BOUND {
        return Some(Ordering::Less);
    }
    if float < -I64_BOUND {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    match integer.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        unequal => Some(unequal),
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A classified field: either the raw categorical text or its numeric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(Number),
}

impl Value {
    /// Classifies a raw field, converting it when it is numeric.
    pub fn classify(raw: &str) -> Value {
        if is_numeric(raw)
            && let Ok(number) = to_number(raw)
        {
            return Value::Number(number);
        }
        Value::Text(raw.to_string())
    }
}

impl PartialOrd for Value {
    /// Numbers order numerically and text orders lexicographically; a number
    /// and a text value are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Integer(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_currency_and_thousands_separators() {
        assert!(is_numeric("$15,000"));
        assert!(is_numeric("75,000"));
        assert!(is_numeric("-1"));
        assert!(is_numeric("25.4"));
        assert_eq!(to_number("$15,000").unwrap(), Number::Integer(15000));
        assert_eq!(to_number("25.4").unwrap(), Number::Float(25.4));
    }

    #[test]
    fn rejects_sentinels_and_malformed_numbers() {
        for raw in ["", "$", "-", ".", "N.A.", "1.2.3", "--1", "1-", "12a", " 12"] {
            assert!(!is_numeric(raw), "{raw:?} should be categorical");
        }
    }

    #[test]
    fn conversion_rejects_multiple_decimal_points() {
        let err = to_number("1.2.3").unwrap_err();
        assert!(matches!(err, Error::Conversion { ref value } if value == "1.2.3"));
        assert!(to_number("abc").is_err());
    }

    #[test]
    fn oversized_integers_fall_back_to_float() {
        let number = to_number("99999999999999999999").unwrap();
        assert!(matches!(number, Number::Float(_)));
    }

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert_eq!(Number::Integer(3), Number::Float(3.0));
        assert!(Number::Integer(2) < Number::Float(2.5));
        assert!(Number::Integer(-1) > Number::Float(-1.5));
        assert!(Number::Float(f64::INFINITY) > Number::Integer(i64::MAX));
        assert_eq!(Number::Float(f64::NAN).partial_cmp(&Number::Integer(0)), None);
        assert_eq!(Value::classify("75,000"), Value::from(75000));
    }

    #[test]
    fn large_integers_compare_exactly_against_floats() {
        let float = Number::Float(9_007_199_254_740_992.0);
        assert_ne!(Number::Integer(9_007_199_254_740_993), float);
        assert!(Number::Integer(9_007_199_254_740_993) > float);
        assert_eq!(Number::Integer(9_007_199_254_740_992), float);
        assert_eq!(Number::Integer(i64::MIN), Number::Float(-9_223_372_036_854_775_808.0));
    }

    #[test]
    fn text_and_numbers_are_unordered() {
        let text = Value::from("10");
        let number = Value::from(10);
        assert_ne!(text, number);
        assert_eq!(text.partial_cmp(&number), None);
        assert!(Value::from("apple") < Value::from("banana"));
    }
}
