//! Keyed and unordered collections: records, maps and sets.

use serde_json::{Value as Json, json};

use super::array::tuple_fragment;
use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::{self, RefTracker};
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::{Object, Value};

// -------------------------------- Record --------------------------------- //

/// Plain object with arbitrary keys. Keys are unconstrained unless a key
/// schema is set.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    meta: Meta,
    key: Option<DynSchema>,
    value: DynSchema,
}

impl RecordSchema {
    pub fn new(value: impl Schema) -> Self { Self { meta: Meta::default(), key: None, value: value.into_dyn() } }

    pub fn keys(mut self, key: impl Schema) -> Self {
        self.key = Some(key.into_dyn());
        self
    }
}

impl SchemaNode for RecordSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Record }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let entries = match input {
            Value::Object(m) => m,
            other => {
                ctx.invalid_type("object", &other);
                return other;
            }
        };
        let mut out = Object::with_capacity(entries.len());
        for (k, v) in entries {
            let (key, value) = ctx.with_segment(k.as_str(), |ctx| {
                let key = match &self.key {
                    Some(ks) => match ks.validate(Value::String(k.clone()), ctx) {
                        Value::String(s) => s,
                        _ => k.clone(),
                    },
                    None => k.clone(),
                };
                (key, self.value.validate(v, ctx))
            });
            out.insert(key, value);
        }
        Value::Object(out)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let mut out = json!({ "type": "object", "additionalProperties": json_schema::emit(self.value.node(), refs) });
        if let Some(k) = &self.key {
            out["propertyNames"] = json_schema::emit(k.node(), refs);
        }
        out
    }
}

// --------------------------------- Map ----------------------------------- //

#[derive(Debug, Clone)]
pub struct MapSchema {
    meta: Meta,
    key: DynSchema,
    value: DynSchema,
}

impl MapSchema {
    pub fn new(key: impl Schema, value: impl Schema) -> Self {
        Self { meta: Meta::default(), key: key.into_dyn(), value: value.into_dyn() }
    }
}

impl SchemaNode for MapSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Map }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let entries = match input {
            Value::Map(es) => es,
            other => {
                ctx.invalid_type("map", &other);
                return other;
            }
        };
        let out = entries
            .into_iter()
            .enumerate()
            .map(|(i, (k, v))| {
                ctx.with_segment(i, |ctx| (self.key.validate(k, ctx), self.value.validate(v, ctx)))
            })
            .collect();
        Value::Map(out)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let pair = vec![json_schema::emit(self.key.node(), refs), json_schema::emit(self.value.node(), refs)];
        let mut entry = tuple_fragment(refs.target(), pair, Json::Bool(false));
        entry["minItems"] = json!(2);
        entry["maxItems"] = json!(2);
        json!({ "type": "array", "items": entry })
    }
}

// --------------------------------- Set ----------------------------------- //

#[derive(Debug, Clone)]
pub struct SetSchema {
    meta: Meta,
    element: DynSchema,
    min: Option<usize>,
    max: Option<usize>,
}

impl SetSchema {
    pub fn new(element: impl Schema) -> Self {
        Self { meta: Meta::default(), element: element.into_dyn(), min: None, max: None }
    }

    pub fn min(mut self, n: usize) -> Self { self.min = Some(n); self }
    pub fn max(mut self, n: usize) -> Self { self.max = Some(n); self }
    pub fn size(self, n: usize) -> Self { self.min(n).max(n) }
    pub fn nonempty(self) -> Self { self.min(1) }
}

impl SchemaNode for SetSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Set }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let members = match input {
            Value::Set(xs) => xs,
            other => {
                ctx.invalid_type("set", &other);
                return other;
            }
        };
        let len = members.len();
        if let Some(n) = self.min.filter(|n| len < *n) {
            ctx.report(
                Issue::new(ErrorCode::TooSmall, format!("Set must contain at least {n} element(s)"))
                    .with_expected(n.to_string())
                    .with_received(len.to_string()),
            );
        }
        if let Some(n) = self.max.filter(|n| len > *n) {
            ctx.report(
                Issue::new(ErrorCode::TooBig, format!("Set must contain at most {n} element(s)"))
                    .with_expected(n.to_string())
                    .with_received(len.to_string()),
            );
        }
        let out = members
            .into_iter()
            .enumerate()
            .map(|(i, x)| ctx.with_segment(i, |ctx| self.element.validate(x, ctx)))
            .collect();
        Value::Set(out)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let mut out = json!({
            "type": "array",
            "uniqueItems": true,
            "items": json_schema::emit(self.element.node(), refs),
        });
        if let Some(n) = self.min {
            out["minItems"] = json!(n);
        }
        if let Some(n) = self.max {
            out["maxItems"] = json!(n);
        }
        out
    }
}
