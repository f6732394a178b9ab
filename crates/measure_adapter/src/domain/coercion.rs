//! Value coercions for vendor payload fields.
//!
//! Providers report most numeric readings as strings ("12", " 3.5 ", "-7,2"),
//! sometimes as JSON numbers. These helpers read them with loose numeric
//! rules: surrounding whitespace is ignored, an empty string reads as zero,
//! and anything else that is not a plain decimal literal is "not a number".

use crate::domain::NormalizeError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Number, Value};

/// Largest magnitude below which an integral float is emitted as a JSON integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Reads a value as a number. `None` means "not a number".
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_number(text),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses a decimal (or `0x` hexadecimal) literal with surrounding whitespace.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }

    // f64::from_str also accepts "inf" and "nan" spellings; those are not numbers here
    let is_decimal_literal = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !is_decimal_literal {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Reads the leading integer of `text`, ignoring whatever follows it
/// ("12abc" is 12, "abc" is `None`). A `0x` prefix switches to hexadecimal.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map_or(digits.len(), |(index, _)| index);
    if end == 0 {
        return None;
    }

    let magnitude = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Reads the leading integer of a value; numbers are truncated toward zero.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|n| n.abs() < 1e21).map(|n| n.trunc() as i64)),
        Value::String(text) => parse_int_prefix(text),
        _ => None,
    }
}

/// Converts a float to a JSON number, emitting integral values as integers.
/// Non-finite values become `null`.
pub fn number_value(number: f64) -> Value {
    if !number.is_finite() {
        return Value::Null;
    }
    if number.fract() == 0.0 && number.abs() < MAX_SAFE_INTEGER {
        return Value::from(number as i64);
    }
    Number::from_f64(number).map_or(Value::Null, Value::Number)
}

/// `to_number` as a JSON value; "not a number" becomes `null`.
pub fn coerce_number(value: &Value) -> Value {
    to_number(value).map_or(Value::Null, number_value)
}

/// Rounds the exact binary value of `number` half away from zero to two
/// decimal places, so 0.015 (stored as 0.01499...) rounds down to 0.01.
pub fn round2(number: f64) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(number) else {
        return number;
    };
    let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Reparse the decimal text so the result is the nearest double
    rounded.to_string().parse().unwrap_or(number)
}

/// Divides a bit/s reading down to Mbit/s, rounded to two decimals.
pub fn to_megabits(number: f64) -> f64 {
    round2(number / 1_000_000.0)
}

/// Null, false, zero and the empty string.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().map_or(false, |n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Renders a scalar for use inside a string (lookup keys, request ids).
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| if item.is_null() { String::new() } else { display_value(item) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

/// Borrows a string field or fails with the field name.
pub fn expect_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, NormalizeError> {
    value
        .as_str()
        .ok_or_else(|| NormalizeError::NotAString(field.to_string()))
}

/// Upper-cases a string field.
pub fn uppercase(value: &Value, field: &str) -> Result<Value, NormalizeError> {
    expect_str(value, field).map(|text| Value::String(text.to_uppercase()))
}

/// Numeric fields pass through as numbers, anything else must be a string
/// and is upper-cased.
pub fn number_or_uppercase(value: &Value, field: &str) -> Result<Value, NormalizeError> {
    match to_number(value) {
        Some(number) => Ok(number_value(number)),
        None => uppercase(value, field),
    }
}

/// Reads a string field that may use a comma as decimal separator.
pub fn decimal_comma(value: &Value, field: &str) -> Result<Value, NormalizeError> {
    let text = expect_str(value, field)?;
    Ok(parse_number(&text.replacen(',', ".", 1)).map_or(Value::Null, number_value))
}
