use serde_json::{Value as Json, json};

use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::{self, RefTracker};
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::Value;

/// Both sides must accept the input. Object outputs are shallow-merged with
/// the right side winning; anything else yields the left output.
#[derive(Debug, Clone)]
pub struct IntersectionSchema {
    meta: Meta,
    left: DynSchema,
    right: DynSchema,
}

impl IntersectionSchema {
    pub fn new(left: impl Schema, right: impl Schema) -> Self {
        Self { meta: Meta::default(), left: left.into_dyn(), right: right.into_dyn() }
    }

    pub fn left(&self) -> &DynSchema { &self.left }
    pub fn right(&self) -> &DynSchema { &self.right }
}

impl SchemaNode for IntersectionSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Intersection }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let mut left_ctx = ctx.isolated();
        let left = self.left.validate(input.clone(), &mut left_ctx);
        let mut right_ctx = ctx.isolated();
        let right = self.right.validate(input.clone(), &mut right_ctx);

        if left_ctx.has_issues() || right_ctx.has_issues() {
            ctx.report(Issue::new(
                ErrorCode::InvalidIntersection,
                "Input does not satisfy both sides of the intersection",
            ));
            return input;
        }
        match (left, right) {
            (Value::Object(mut l), Value::Object(r)) => {
                l.extend(r);
                Value::Object(l)
            }
            (l, _) => l,
        }
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let l = json_schema::emit(self.left.node(), refs);
        let r = json_schema::emit(self.right.node(), refs);
        json!({ "allOf": [l, r] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{intersection, number, object, string};

    #[test]
    fn merges_object_outputs() {
        let both = intersection(object().field("name", string()), object().field("age", number()));
        let out = both.parse(json!({"name": "Alice", "age": 30})).unwrap();
        assert_eq!(out.to_json(), json!({"name": "Alice", "age": 30}));
    }

    #[test]
    fn right_side_wins_shared_keys() {
        let both = intersection(object().field("name", string()), object().field("name", string().trim()));
        let out = both.parse(json!({"name": "  Alice "})).unwrap();
        assert_eq!(out.to_json(), json!({"name": "Alice"}));

        let flipped = intersection(object().field("name", string().trim()), object().field("name", string()));
        assert_eq!(flipped.parse(json!({"name": " Bo "})).unwrap().to_json(), json!({"name": " Bo "}));
    }

    #[test]
    fn one_issue_when_a_side_fails() {
        let both = intersection(object().field("name", string()), object().field("age", number()));
        let err = both.parse(json!({"name": "Alice"})).unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].code, ErrorCode::InvalidIntersection);
    }

    #[test]
    fn non_objects_keep_left_output() {
        let both = string().trim().and(string().min(1));
        assert_eq!(both.parse(" a ").unwrap(), Value::from("a"));
        assert!(!number().int().and(number().positive()).is_valid(-1));
    }

    #[test]
    fn json_fragment() {
        let both = intersection(string(), string().min(1));
        assert_eq!(both.to_json_schema(), json!({"allOf": [{"type": "string"}, {"type": "string", "minLength": 1}]}));
    }
}
