use serde_json::{Value as Json, json};

use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::{self, RefTracker, Target};
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::Value;

// -------------------------------- Array ---------------------------------- //

#[derive(Debug, Clone)]
pub struct ArraySchema {
    meta: Meta,
    element: DynSchema,
    min: Option<usize>,
    max: Option<usize>,
    length: Option<usize>,
}

impl ArraySchema {
    pub fn new(element: impl Schema) -> Self {
        Self { meta: Meta::default(), element: element.into_dyn(), min: None, max: None, length: None }
    }

    pub fn element(&self) -> &DynSchema { &self.element }

    pub fn min(mut self, n: usize) -> Self { self.min = Some(n); self }
    pub fn max(mut self, n: usize) -> Self { self.max = Some(n); self }
    pub fn length(mut self, n: usize) -> Self { self.length = Some(n); self }
    pub fn nonempty(self) -> Self { self.min(1) }

    fn check_length(&self, len: usize, ctx: &mut ParseContext) {
        if let Some(n) = self.min.filter(|n| len < *n) {
            ctx.report(
                Issue::new(ErrorCode::TooSmall, format!("Array must contain at least {n} element(s)"))
                    .with_expected(n.to_string())
                    .with_received(len.to_string()),
            );
        }
        if let Some(n) = self.max.filter(|n| len > *n) {
            ctx.report(
                Issue::new(ErrorCode::TooBig, format!("Array must contain at most {n} element(s)"))
                    .with_expected(n.to_string())
                    .with_received(len.to_string()),
            );
        }
        if let Some(n) = self.length.filter(|n| len != *n) {
            ctx.report(
                Issue::new(ErrorCode::InvalidType, format!("Array must contain exactly {n} element(s)"))
                    .with_expected(n.to_string())
                    .with_received(len.to_string()),
            );
        }
    }
}

impl SchemaNode for ArraySchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Array }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let items = match input {
            Value::Array(xs) => xs,
            other => {
                ctx.invalid_type("array", &other);
                return other;
            }
        };
        self.check_length(items.len(), ctx);
        let out = items
            .into_iter()
            .enumerate()
            .map(|(i, x)| ctx.with_segment(i, |ctx| self.element.validate(x, ctx)))
            .collect();
        Value::Array(out)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let mut out = json!({ "type": "array", "items": json_schema::emit(self.element.node(), refs) });
        if let Some(n) = self.min.or(self.length) {
            out["minItems"] = json!(n);
        }
        if let Some(n) = self.max.or(self.length) {
            out["maxItems"] = json!(n);
        }
        out
    }
}

// -------------------------------- Tuple ---------------------------------- //

#[derive(Debug, Clone)]
pub struct TupleSchema {
    meta: Meta,
    items: Vec<DynSchema>,
    rest: Option<DynSchema>,
}

impl TupleSchema {
    pub fn new(items: Vec<DynSchema>) -> Self { Self { meta: Meta::default(), items, rest: None } }

    /// Schema for every element past the fixed prefix.
    pub fn rest(mut self, schema: impl Schema) -> Self {
        self.rest = Some(schema.into_dyn());
        self
    }

    pub fn items(&self) -> &[DynSchema] { &self.items }
}

impl SchemaNode for TupleSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Tuple }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let values = match input {
            Value::Array(xs) => xs,
            other => {
                ctx.invalid_type("array", &other);
                return other;
            }
        };
        let arity = self.items.len();
        let len = values.len();
        if len < arity || (self.rest.is_none() && len > arity) {
            let message = if self.rest.is_some() {
                format!("Tuple must contain at least {arity} element(s)")
            } else {
                format!("Tuple must contain exactly {arity} element(s)")
            };
            ctx.report(
                Issue::new(ErrorCode::InvalidType, message)
                    .with_expected(arity.to_string())
                    .with_received(len.to_string()),
            );
        }
        let out = values
            .into_iter()
            .enumerate()
            .map(|(i, x)| match self.items.get(i).or(self.rest.as_ref()) {
                Some(schema) => ctx.with_segment(i, |ctx| schema.validate(x, ctx)),
                None => x,
            })
            .collect();
        Value::Array(out)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let prefix: Vec<Json> = self.items.iter().map(|s| json_schema::emit(s.node(), refs)).collect();
        let rest = match &self.rest {
            Some(r) => json_schema::emit(r.node(), refs),
            None => Json::Bool(false),
        };
        let mut out = tuple_fragment(refs.target(), prefix, rest);
        out["minItems"] = json!(self.items.len());
        out
    }
}

/// Positional array fragment in the target draft's vocabulary.
pub(crate) fn tuple_fragment(target: Target, prefix: Vec<Json>, rest: Json) -> Json {
    match target {
        Target::Draft2020_12 => json!({ "type": "array", "prefixItems": prefix, "items": rest }),
        Target::Draft07 => json!({ "type": "array", "items": prefix, "additionalItems": rest }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::PathSegment;
    use crate::json_schema::JsonSchemaOptions;
    use crate::{array, number, string, tuple};

    #[test]
    fn element_issues_carry_their_index() {
        let err = array(number()).parse(json!([1, "a", 2, "b"])).unwrap_err();
        let paths: Vec<_> = err.issues().iter().map(|i| i.path.clone()).collect();
        assert_eq!(paths, vec![vec![PathSegment::from(1usize)], vec![PathSegment::from(3usize)]]);
    }

    #[test]
    fn length_constraints() {
        let s = array(string()).min(2).max(3);
        assert_eq!(s.parse(json!(["a"])).unwrap_err().issues()[0].code, ErrorCode::TooSmall);
        assert_eq!(s.parse(json!(["a", "b", "c", "d"])).unwrap_err().issues()[0].code, ErrorCode::TooBig);
        let exact = array(string()).length(2);
        let err = exact.parse(json!(["a"])).unwrap_err();
        assert_eq!(err.issues()[0].code, ErrorCode::InvalidType);
        assert_eq!(err.issues()[0].message, "Array must contain exactly 2 element(s)");
        assert!(array(string()).nonempty().parse(json!([])).is_err());
    }

    #[test]
    fn non_arrays_are_type_errors() {
        let err = array(number()).parse(json!({"0": 1})).unwrap_err();
        assert_eq!(err.issues()[0].message, "Expected array, received object");
    }

    #[test]
    fn tuple_checks_arity_and_positions() {
        let t = tuple(vec![string().into_dyn(), number().into_dyn()]);
        assert!(t.is_valid(json!(["a", 1])));
        assert_eq!(t.parse(json!(["a"])).unwrap_err().issues()[0].code, ErrorCode::InvalidType);
        assert!(!t.is_valid(json!(["a", 1, 2])));
        let err = t.parse(json!([1, 1])).unwrap_err();
        assert_eq!(err.issues()[0].path, vec![PathSegment::from(0usize)]);
    }

    #[test]
    fn tuple_rest_validates_the_tail() {
        let t = tuple(vec![string().into_dyn()]).rest(number());
        assert!(t.is_valid(json!(["a", 1, 2, 3])));
        let err = t.parse(json!(["a", 1, "x"])).unwrap_err();
        assert_eq!(err.issues()[0].path, vec![PathSegment::from(2usize)]);
    }

    #[test]
    fn json_fragments() {
        assert_eq!(
            array(number()).min(1).max(10).to_json_schema(),
            json!({"type": "array", "items": {"type": "number"}, "minItems": 1, "maxItems": 10})
        );
        let t = tuple(vec![string().into_dyn()]);
        assert_eq!(
            t.to_json_schema(),
            json!({"type": "array", "prefixItems": [{"type": "string"}], "items": false, "minItems": 1})
        );
        let draft07 = t.to_json_schema_with(&JsonSchemaOptions::new().target(Target::Draft07));
        assert_eq!(draft07["additionalItems"], json!(false));
    }
}
