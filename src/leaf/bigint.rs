use serde_json::{Value as Json, json};

use super::number::Bound;
use crate::coerce;
use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::RefTracker;
use crate::schema::{Meta, SchemaNode, SchemaType, node_common};
use crate::value::Value;

/// Arbitrary-size integers, held as `i128`.
#[derive(Debug, Clone, Default)]
pub struct BigIntSchema {
    meta: Meta,
    coerce: bool,
    lower: Option<Bound<i128>>,
    upper: Option<Bound<i128>>,
    multiple_of: Option<i128>,
}

impl BigIntSchema {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn coerced() -> Self { Self { coerce: true, ..Self::default() } }

    pub fn gt(mut self, n: i128) -> Self { self.lower = Some(Bound { value: n, inclusive: false }); self }
    pub fn gte(mut self, n: i128) -> Self { self.lower = Some(Bound { value: n, inclusive: true }); self }
    pub fn lt(mut self, n: i128) -> Self { self.upper = Some(Bound { value: n, inclusive: false }); self }
    pub fn lte(mut self, n: i128) -> Self { self.upper = Some(Bound { value: n, inclusive: true }); self }
    pub fn positive(self) -> Self { self.gt(0) }
    pub fn nonnegative(self) -> Self { self.gte(0) }
    pub fn negative(self) -> Self { self.lt(0) }
    pub fn nonpositive(self) -> Self { self.lte(0) }
    pub fn multiple_of(mut self, step: i128) -> Self { self.multiple_of = Some(step); self }
}

impl SchemaNode for BigIntSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::BigInt }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let input = if self.coerce { coerce::to_bigint(input) } else { input };
        let n = match input {
            Value::BigInt(n) => n,
            other => {
                ctx.invalid_type("bigint", &other);
                return other;
            }
        };
        if let Some(b) = self.lower {
            if (b.inclusive && n < b.value) || (!b.inclusive && n <= b.value) {
                let rel = if b.inclusive { "greater than or equal to" } else { "greater than" };
                ctx.report(
                    Issue::new(ErrorCode::TooSmall, format!("BigInt must be {rel} {}", b.value))
                        .with_expected(b.value.to_string())
                        .with_received(n.to_string()),
                );
            }
        }
        if let Some(b) = self.upper {
            if (b.inclusive && n > b.value) || (!b.inclusive && n >= b.value) {
                let rel = if b.inclusive { "less than or equal to" } else { "less than" };
                ctx.report(
                    Issue::new(ErrorCode::TooBig, format!("BigInt must be {rel} {}", b.value))
                        .with_expected(b.value.to_string())
                        .with_received(n.to_string()),
                );
            }
        }
        if let Some(step) = self.multiple_of.filter(|s| *s == 0 || n.checked_rem(*s).is_some_and(|r| r != 0)) {
            ctx.report(
                Issue::new(ErrorCode::NotMultipleOf, format!("BigInt must be a multiple of {step}"))
                    .with_expected(step.to_string()),
            );
        }
        Value::BigInt(n)
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json {
        let mut out = json!({ "type": "integer", "format": "int64" });
        if let Some(b) = self.lower {
            out[if b.inclusive { "minimum" } else { "exclusiveMinimum" }] = Value::BigInt(b.value).to_json();
        }
        if let Some(b) = self.upper {
            out[if b.inclusive { "maximum" } else { "exclusiveMaximum" }] = Value::BigInt(b.value).to_json();
        }
        if let Some(step) = self.multiple_of {
            out["multipleOf"] = Value::BigInt(step).to_json();
        }
        out
    }
}
