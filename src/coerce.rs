//! Coercing leaves. The input is converted with host-style primitive
//! conversion first, then validated like the plain leaf.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::leaf::{BigIntSchema, DateSchema, NumberSchema, PrimitiveSchema, StringSchema};
use crate::value::Value;

pub fn string() -> StringSchema { StringSchema::coerced() }
pub fn number() -> NumberSchema { NumberSchema::coerced() }
pub fn boolean() -> PrimitiveSchema { PrimitiveSchema::coerced_boolean() }
pub fn bigint() -> BigIntSchema { BigIntSchema::coerced() }
pub fn date() -> DateSchema { DateSchema::coerced() }

// ------------------------------ Conversions ------------------------------ //

pub(crate) fn to_string(v: Value) -> Value {
    match v {
        Value::String(_) => v,
        other => Value::String(stringify(&other)),
    }
}

fn stringify(v: &Value) -> String {
    match v {
        Value::Undefined => "undefined".into(),
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::BigInt(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Date(Some(d)) => d.to_rfc2822(),
        Value::Date(None) => "Invalid Date".into(),
        Value::Array(xs) => xs
            .iter()
            .map(|x| if x.is_null() || x.is_undefined() { String::new() } else { stringify(x) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Symbol(s) => format!("Symbol({})", s.description().unwrap_or("")),
        Value::Map(_) => "[object Map]".into(),
        Value::Set(_) => "[object Set]".into(),
        Value::Object(_) | Value::Blob(_) | Value::Instance(_) => "[object Object]".into(),
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        n.to_string()
    }
}

pub(crate) fn to_number(v: Value) -> Value {
    let n = match &v {
        Value::Number(_) => return v,
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::BigInt(n) => *n as f64,
        Value::String(s) => parse_number(s),
        Value::Date(Some(d)) => d.timestamp_millis() as f64,
        Value::Date(None) => f64::NAN,
        Value::Array(xs) => match xs.as_slice() {
            [] => 0.0,
            [one] => parse_number(&stringify(one)),
            _ => f64::NAN,
        },
        _ => f64::NAN,
    };
    Value::Number(n)
}

fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = |prefix: &str, radix: u32| {
        t.strip_prefix(prefix)
            .or_else(|| t.strip_prefix(&prefix.to_uppercase()))
            .map(|digits| u64::from_str_radix(digits, radix).map(|n| n as f64).unwrap_or(f64::NAN))
    };
    if let Some(n) = radix("0x", 16).or_else(|| radix("0o", 8)).or_else(|| radix("0b", 2)) {
        return n;
    }
    // Rust accepts "inf"/"nan" spellings the host does not.
    if !t.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

pub(crate) fn to_boolean(v: Value) -> Value {
    let truthy = match &v {
        Value::Bool(_) => return v,
        Value::Undefined | Value::Null => false,
        Value::Number(n) => !(n.is_nan() || *n == 0.0),
        Value::BigInt(n) => *n != 0,
        Value::String(s) => !s.is_empty(),
        _ => true,
    };
    Value::Bool(truthy)
}

/// Unconvertible input is returned unchanged so the type check reports it.
pub(crate) fn to_bigint(v: Value) -> Value {
    match &v {
        Value::Bool(b) => Value::BigInt(i128::from(*b)),
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 => Value::BigInt(*n as i128),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                Value::BigInt(0)
            } else {
                t.parse::<i128>().map(Value::BigInt).unwrap_or(v)
            }
        }
        _ => v,
    }
}

pub(crate) fn to_date(v: Value) -> Value {
    let d = match &v {
        Value::Date(_) => return v,
        Value::Null => Utc.timestamp_millis_opt(0).single(),
        Value::Bool(b) => Utc.timestamp_millis_opt(i64::from(*b)).single(),
        Value::Number(n) if n.is_finite() => Utc.timestamp_millis_opt(*n as i64).single(),
        Value::String(s) => parse_date(s.trim()),
        _ => None,
    };
    Value::Date(d)
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc2822(s) {
        return Some(d.with_timezone(&Utc));
    }
    // date-only forms are UTC midnight
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorCode, Schema, coerce};

    #[test]
    fn strings_from_primitives() {
        assert_eq!(to_string(Value::Number(42.0)), Value::from("42"));
        assert_eq!(to_string(Value::Number(1.5)), Value::from("1.5"));
        assert_eq!(to_string(Value::Bool(true)), Value::from("true"));
        assert_eq!(to_string(Value::Null), Value::from("null"));
        assert_eq!(to_string(Value::from(vec![Value::from(1), Value::from(2)])), Value::from("1,2"));
    }

    #[test]
    fn numbers_follow_host_rules() {
        assert_eq!(to_number(Value::from(" 12 ")), Value::Number(12.0));
        assert_eq!(to_number(Value::from("")), Value::Number(0.0));
        assert_eq!(to_number(Value::from("0x10")), Value::Number(16.0));
        assert_eq!(to_number(Value::Bool(true)), Value::Number(1.0));
        assert!(matches!(to_number(Value::from("inf")), Value::Number(n) if n.is_nan()));
        assert!(matches!(to_number(Value::Undefined), Value::Number(n) if n.is_nan()));
    }

    #[test]
    fn truthiness() {
        assert_eq!(to_boolean(Value::from("")), Value::Bool(false));
        assert_eq!(to_boolean(Value::from("false")), Value::Bool(true));
        assert_eq!(to_boolean(Value::Number(0.0)), Value::Bool(false));
        assert_eq!(to_boolean(Value::from(Vec::new())), Value::Bool(true));
    }

    #[test]
    fn coerced_leaves_validate_after_conversion() {
        assert_eq!(coerce::number().parse("3.5").unwrap(), Value::Number(3.5));
        let err = coerce::number().parse("abc").unwrap_err();
        assert_eq!(err.issues()[0].message, "Expected number, received nan");
        assert_eq!(coerce::string().min(2).parse(12).unwrap(), Value::from("12"));
        assert_eq!(coerce::bigint().parse("900").unwrap(), Value::BigInt(900));
        assert_eq!(coerce::bigint().parse("x").unwrap_err().issues()[0].code, ErrorCode::InvalidType);
    }

    #[test]
    fn dates_from_strings_and_numbers() {
        let d = coerce::date().parse("2024-03-01").unwrap();
        assert_eq!(d.to_json(), serde_json::json!("2024-03-01T00:00:00.000Z"));
        assert_eq!(coerce::date().parse(0).unwrap().to_json(), serde_json::json!("1970-01-01T00:00:00.000Z"));
        let err = coerce::date().parse("not a date").unwrap_err();
        assert_eq!(err.issues()[0].code, ErrorCode::InvalidDate);
    }
}
