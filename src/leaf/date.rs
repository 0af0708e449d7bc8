use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value as Json, json};

use crate::coerce;
use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::RefTracker;
use crate::schema::{Meta, SchemaNode, SchemaType, node_common};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct DateSchema {
    meta: Meta,
    coerce: bool,
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
}

impl DateSchema {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn coerced() -> Self { Self { coerce: true, ..Self::default() } }

    pub fn min(mut self, earliest: DateTime<Utc>) -> Self { self.min = Some(earliest); self }
    pub fn max(mut self, latest: DateTime<Utc>) -> Self { self.max = Some(latest); self }
}

fn iso(d: &DateTime<Utc>) -> String { d.to_rfc3339_opts(SecondsFormat::Millis, true) }

impl SchemaNode for DateSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Date }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let input = if self.coerce { coerce::to_date(input) } else { input };
        let d = match input {
            Value::Date(Some(d)) => d,
            Value::Date(None) => {
                ctx.add_issue(ErrorCode::InvalidDate, "Invalid date");
                return Value::Date(None);
            }
            other => {
                ctx.invalid_type("date", &other);
                return other;
            }
        };
        if let Some(min) = self.min.filter(|m| d < *m) {
            ctx.report(
                Issue::new(ErrorCode::TooSmall, format!("Date must be greater than or equal to {}", iso(&min)))
                    .with_expected(iso(&min))
                    .with_received(iso(&d)),
            );
        }
        if let Some(max) = self.max.filter(|m| d > *m) {
            ctx.report(
                Issue::new(ErrorCode::TooBig, format!("Date must be smaller than or equal to {}", iso(&max)))
                    .with_expected(iso(&max))
                    .with_received(iso(&d)),
            );
        }
        Value::Date(Some(d))
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json {
        json!({ "type": "string", "format": "date-time" })
    }
}
