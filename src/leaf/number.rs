use serde_json::{Value as Json, json};

use crate::coerce;
use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::RefTracker;
use crate::schema::{Meta, SchemaNode, SchemaType, node_common};
use crate::value::{Value, json_num_pref_i64};

pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
pub const MIN_SAFE_INTEGER: f64 = -9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bound<T> {
    pub value: T,
    pub inclusive: bool,
}

/// Order of checks: range (lower, upper) → integer → multiple-of → finite.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    meta: Meta,
    coerce: bool,
    lower: Option<Bound<f64>>,
    upper: Option<Bound<f64>>,
    int: bool,
    multiple_of: Option<f64>,
    finite: bool,
}

impl NumberSchema {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn coerced() -> Self { Self { coerce: true, ..Self::default() } }

    pub fn gt(mut self, n: f64) -> Self { self.lower = Some(Bound { value: n, inclusive: false }); self }
    pub fn gte(mut self, n: f64) -> Self { self.lower = Some(Bound { value: n, inclusive: true }); self }
    pub fn lt(mut self, n: f64) -> Self { self.upper = Some(Bound { value: n, inclusive: false }); self }
    pub fn lte(mut self, n: f64) -> Self { self.upper = Some(Bound { value: n, inclusive: true }); self }
    pub fn min(self, n: f64) -> Self { self.gte(n) }
    pub fn max(self, n: f64) -> Self { self.lte(n) }

    pub fn positive(self) -> Self { self.gt(0.0) }
    pub fn nonnegative(self) -> Self { self.gte(0.0) }
    pub fn negative(self) -> Self { self.lt(0.0) }
    pub fn nonpositive(self) -> Self { self.lte(0.0) }

    pub fn int(mut self) -> Self { self.int = true; self }
    pub fn multiple_of(mut self, step: f64) -> Self { self.multiple_of = Some(step); self }
    pub fn step(self, step: f64) -> Self { self.multiple_of(step) }
    pub fn finite(mut self) -> Self { self.finite = true; self }

    /// Integer within the host's exactly-representable range.
    pub fn safe(self) -> Self { self.int().gte(MIN_SAFE_INTEGER).lte(MAX_SAFE_INTEGER) }

    pub fn is_int(&self) -> bool { self.int }
    pub fn min_value(&self) -> Option<f64> { self.lower.map(|b| b.value) }
    pub fn max_value(&self) -> Option<f64> { self.upper.map(|b| b.value) }
}

impl SchemaNode for NumberSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Number }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let input = if self.coerce { coerce::to_number(input) } else { input };
        let n = match input {
            Value::Number(n) if !n.is_nan() => n,
            other => {
                ctx.invalid_type("number", &other);
                return other;
            }
        };

        if let Some(b) = self.lower {
            let failed = if b.inclusive { n < b.value } else { n <= b.value };
            if failed {
                let rel = if b.inclusive { "greater than or equal to" } else { "greater than" };
                ctx.report(
                    Issue::new(ErrorCode::TooSmall, format!("Number must be {rel} {}", b.value))
                        .with_expected(b.value.to_string())
                        .with_received(n.to_string()),
                );
            }
        }
        if let Some(b) = self.upper {
            let failed = if b.inclusive { n > b.value } else { n >= b.value };
            if failed {
                let rel = if b.inclusive { "less than or equal to" } else { "less than" };
                ctx.report(
                    Issue::new(ErrorCode::TooBig, format!("Number must be {rel} {}", b.value))
                        .with_expected(b.value.to_string())
                        .with_received(n.to_string()),
                );
            }
        }
        if self.int && (!n.is_finite() || n.fract() != 0.0) {
            ctx.report(
                Issue::new(ErrorCode::InvalidType, "Expected integer, received float")
                    .with_expected("integer")
                    .with_received("float"),
            );
        }
        if let Some(step) = self.multiple_of {
            if float_safe_remainder(n, step) != 0.0 {
                ctx.report(
                    Issue::new(ErrorCode::NotMultipleOf, format!("Number must be a multiple of {step}"))
                        .with_expected(step.to_string()),
                );
            }
        }
        if self.finite && !n.is_finite() {
            ctx.add_issue(ErrorCode::NotFinite, "Number must be finite");
        }
        Value::Number(n)
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json {
        let mut out = json!({ "type": if self.int { "integer" } else { "number" } });
        if let Some(b) = self.lower {
            let key = if b.inclusive { "minimum" } else { "exclusiveMinimum" };
            out[key] = json_num_pref_i64(b.value);
        }
        if let Some(b) = self.upper {
            let key = if b.inclusive { "maximum" } else { "exclusiveMaximum" };
            out[key] = json_num_pref_i64(b.value);
        }
        if let Some(step) = self.multiple_of {
            out["multipleOf"] = json_num_pref_i64(step);
        }
        out
    }
}

fn decimals(x: f64) -> i32 {
    let s = x.to_string();
    s.split_once('.').map(|(_, frac)| frac.len() as i32).unwrap_or(0)
}

/// Remainder computed on scaled integers so `0.3 % 0.1` is 0.
fn float_safe_remainder(value: f64, step: f64) -> f64 {
    if !value.is_finite() || step == 0.0 {
        return f64::NAN;
    }
    let scale = 10f64.powi(decimals(value).max(decimals(step)));
    let v = (value * scale).round();
    let s = (step * scale).round();
    (v % s) / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Schema, number};

    fn codes(schema: &NumberSchema, input: impl Into<Value>) -> Vec<ErrorCode> {
        match schema.safe_parse(input).error() {
            Some(e) => e.issues().iter().map(|i| i.code).collect(),
            None => vec![],
        }
    }

    #[test]
    fn range_then_integer_then_multiple() {
        let s = number().gte(10.0).int().multiple_of(3.0);
        assert_eq!(
            codes(&s, 2.5),
            vec![ErrorCode::TooSmall, ErrorCode::InvalidType, ErrorCode::NotMultipleOf]
        );
        assert!(codes(&s, 12).is_empty());
    }

    #[test]
    fn exclusive_bounds() {
        assert_eq!(codes(&number().positive(), 0), vec![ErrorCode::TooSmall]);
        assert!(codes(&number().nonnegative(), 0).is_empty());
        assert_eq!(codes(&number().lt(5.0), 5), vec![ErrorCode::TooBig]);
        assert!(codes(&number().lte(5.0), 5).is_empty());
    }

    #[test]
    fn nan_is_a_type_error() {
        let err = number().parse(f64::NAN).unwrap_err();
        assert_eq!(err.issues()[0].message, "Expected number, received nan");
    }

    #[test]
    fn infinity_needs_finite() {
        assert!(codes(&number(), f64::INFINITY).is_empty());
        assert_eq!(codes(&number().finite(), f64::INFINITY), vec![ErrorCode::NotFinite]);
    }

    #[test]
    fn decimal_steps_are_exact() {
        assert!(codes(&number().multiple_of(0.1), 0.3).is_empty());
        assert!(codes(&number().step(0.01), 1.23).is_empty());
        assert_eq!(codes(&number().step(0.01), 1.234), vec![ErrorCode::NotMultipleOf]);
    }

    #[test]
    fn messages_render_bounds_without_fraction() {
        let err = number().gte(0.0).parse(-1).unwrap_err();
        assert_eq!(err.issues()[0].message, "Number must be greater than or equal to 0");
    }

    #[test]
    fn json_schema_uses_exclusive_keys() {
        assert_eq!(
            number().int().gt(0.0).lte(100.0).multiple_of(5.0).to_json_schema(),
            json!({"type": "integer", "exclusiveMinimum": 0, "maximum": 100, "multipleOf": 5})
        );
    }
}
