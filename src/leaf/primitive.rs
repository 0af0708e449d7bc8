use serde_json::{Value as Json, json};

use crate::coerce;
use crate::issue::ParseContext;
use crate::json_schema::RefTracker;
use crate::schema::{Meta, SchemaNode, SchemaType, node_common};
use crate::value::Value;

/// Constraint-free leaves that only type-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Symbol,
    Null,
    Undefined,
    /// Accepts undefined; the "no value" return type.
    Void,
    Any,
    Unknown,
    Never,
    Nan,
}

impl Primitive {
    fn accepts(self, v: &Value) -> bool {
        match self {
            Primitive::Boolean => matches!(v, Value::Bool(_)),
            Primitive::Symbol => matches!(v, Value::Symbol(_)),
            Primitive::Null => v.is_null(),
            Primitive::Undefined | Primitive::Void => v.is_undefined(),
            Primitive::Any | Primitive::Unknown => true,
            Primitive::Never => false,
            Primitive::Nan => matches!(v, Value::Number(n) if n.is_nan()),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Symbol => "symbol",
            Primitive::Null => "null",
            Primitive::Undefined | Primitive::Void => "undefined",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
            Primitive::Never => "never",
            Primitive::Nan => "nan",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrimitiveSchema {
    meta: Meta,
    kind: Primitive,
    coerce: bool,
}

impl PrimitiveSchema {
    pub fn new(kind: Primitive) -> Self { Self { meta: Meta::default(), kind, coerce: false } }

    pub(crate) fn coerced_boolean() -> Self {
        Self { coerce: true, ..Self::new(Primitive::Boolean) }
    }

    pub fn kind(&self) -> Primitive { self.kind }
}

impl SchemaNode for PrimitiveSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType {
        match self.kind {
            Primitive::Boolean => SchemaType::Boolean,
            Primitive::Symbol => SchemaType::Symbol,
            Primitive::Null => SchemaType::Null,
            Primitive::Undefined => SchemaType::Undefined,
            Primitive::Void => SchemaType::Void,
            Primitive::Any => SchemaType::Any,
            Primitive::Unknown => SchemaType::Unknown,
            Primitive::Never => SchemaType::Never,
            Primitive::Nan => SchemaType::Nan,
        }
    }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let input = if self.coerce { coerce::to_boolean(input) } else { input };
        if !self.kind.accepts(&input) {
            ctx.invalid_type(self.kind.expected(), &input);
        }
        input
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json {
        match self.kind {
            Primitive::Boolean => json!({ "type": "boolean" }),
            Primitive::Null => json!({ "type": "null" }),
            Primitive::Any | Primitive::Unknown => json!({}),
            Primitive::Symbol | Primitive::Undefined | Primitive::Void | Primitive::Never | Primitive::Nan => {
                json!({ "not": {} })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Schema, any, boolean, nan, never, null, undefined, void};
    use serde_json::json;

    #[test]
    fn each_kind_accepts_only_its_shape() {
        assert!(boolean().is_valid(true));
        assert!(!boolean().is_valid("true"));
        assert!(null().is_valid(json!(null)));
        assert!(!null().is_valid(Value::Undefined));
        assert!(undefined().is_valid(Value::Undefined));
        assert!(void().is_valid(Value::Undefined));
        assert!(nan().is_valid(f64::NAN));
        assert!(!nan().is_valid(1));
        assert!(any().is_valid(json!({"x": [1]})));
    }

    #[test]
    fn never_rejects_everything() {
        let err = never().parse(1).unwrap_err();
        assert_eq!(err.issues()[0].message, "Expected never, received number");
    }

    #[test]
    fn json_fragments() {
        assert_eq!(boolean().to_json_schema(), json!({"type": "boolean"}));
        assert_eq!(any().to_json_schema(), json!({}));
        assert_eq!(never().to_json_schema(), json!({"not": {}}));
    }
}
