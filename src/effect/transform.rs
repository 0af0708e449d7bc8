use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::issue::{ErrorCode, ParseContext};
use crate::json_schema::{self, RefTracker};
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::Value;

type Mapping = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// Runs a fallible user mapping; `Err` becomes a `Custom` issue.
fn apply(f: &Mapping, input: Value, ctx: &mut ParseContext) -> Value {
    match f(input) {
        Ok(v) => v,
        Err(err) => {
            tracing::debug!(error = %err, "user mapping failed");
            ctx.add_issue(ErrorCode::Custom, err.to_string());
            Value::Undefined
        }
    }
}

// ------------------------------- Transform ------------------------------- //

#[derive(Clone)]
pub struct TransformSchema {
    meta: Meta,
    inner: DynSchema,
    mapping: Mapping,
}

impl TransformSchema {
    pub fn new(inner: impl Schema, f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static) -> Self {
        Self { meta: Meta::default(), inner: inner.into_dyn(), mapping: Arc::new(f) }
    }

    pub fn inner(&self) -> &DynSchema { &self.inner }
}

impl fmt::Debug for TransformSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSchema").field("meta", &self.meta).field("inner", &self.inner).finish()
    }
}

impl SchemaNode for TransformSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Transform }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let before = ctx.issue_count();
        let out = self.inner.validate(input, ctx);
        if ctx.issue_count() > before {
            return out;
        }
        apply(&self.mapping, out, ctx)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json { json_schema::emit(self.inner.node(), refs) }

    fn is_optional(&self) -> bool { self.inner.is_optional() }
}

// --------------------------------- Pipe ---------------------------------- //

/// Output of `first` becomes input of `second`, unless `first` failed.
#[derive(Debug, Clone)]
pub struct PipeSchema {
    meta: Meta,
    first: DynSchema,
    second: DynSchema,
}

impl PipeSchema {
    pub fn new(first: impl Schema, second: impl Schema) -> Self {
        Self { meta: Meta::default(), first: first.into_dyn(), second: second.into_dyn() }
    }

    pub fn first(&self) -> &DynSchema { &self.first }
    pub fn second(&self) -> &DynSchema { &self.second }
}

impl SchemaNode for PipeSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Pipe }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let before = ctx.issue_count();
        let mid = self.first.validate(input, ctx);
        if ctx.issue_count() > before {
            return mid;
        }
        self.second.validate(mid, ctx)
    }

    // documents what callers send, which is the first stage
    fn json_schema_body(&self, refs: &mut RefTracker) -> Json { json_schema::emit(self.first.node(), refs) }

    fn is_optional(&self) -> bool { self.first.is_optional() }
}

// ------------------------------ Preprocess ------------------------------- //

/// Maps the raw input before the inner schema sees it.
#[derive(Clone)]
pub struct PreprocessSchema {
    meta: Meta,
    mapping: Mapping,
    inner: DynSchema,
}

impl PreprocessSchema {
    pub fn new(f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static, inner: impl Schema) -> Self {
        Self { meta: Meta::default(), mapping: Arc::new(f), inner: inner.into_dyn() }
    }

    pub fn inner(&self) -> &DynSchema { &self.inner }
}

impl fmt::Debug for PreprocessSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreprocessSchema").field("meta", &self.meta).field("inner", &self.inner).finish()
    }
}

impl SchemaNode for PreprocessSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Preprocess }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let before = ctx.issue_count();
        let mapped = apply(&self.mapping, input, ctx);
        if ctx.issue_count() > before {
            return mapped;
        }
        self.inner.validate(mapped, ctx)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json { json_schema::emit(self.inner.node(), refs) }

    fn is_optional(&self) -> bool { self.inner.is_optional() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coerce, number, preprocess, string};
    use anyhow::bail;
    use serde_json::json;

    fn length() -> TransformSchema {
        string().transform(|v| Ok(Value::from(v.as_str().map_or(0, |s| s.chars().count()) as f64)))
    }

    #[test]
    fn transform_maps_valid_output() {
        assert_eq!(length().parse("hello").unwrap(), Value::Number(5.0));
        let err = length().parse(1).unwrap_err();
        assert_eq!(err.issues()[0].code, ErrorCode::InvalidType);
    }

    #[test]
    fn transform_errors_become_custom_issues() {
        let s = string().transform(|v| match v.as_str() {
            Some(s) if s.contains('@') => Ok(v),
            _ => bail!("missing @"),
        });
        let err = s.parse("nope").unwrap_err();
        assert_eq!(err.issues()[0].code, ErrorCode::Custom);
        assert_eq!(err.issues()[0].message, "missing @");
    }

    #[test]
    fn pipe_short_circuits() {
        let p = length().pipe(number().min(3.0));
        assert!(p.is_valid("abc"));
        let err = p.parse("ab").unwrap_err();
        assert_eq!(err.issues()[0].code, ErrorCode::TooSmall);
        let err = p.parse(5).unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].code, ErrorCode::InvalidType);

        let trimmed = string().trim().pipe(coerce::number());
        assert_eq!(trimmed.parse(" 42 ").unwrap(), Value::Number(42.0));
    }

    #[test]
    fn preprocess_runs_before_validation() {
        let split = preprocess(
            |v| match v {
                Value::String(s) => Ok(Value::Array(s.split(',').map(Value::from).collect())),
                other => Ok(other),
            },
            string().array(),
        );
        assert_eq!(split.parse("a,b").unwrap().to_json(), json!(["a", "b"]));

        let failing = preprocess(|_| Err(anyhow::anyhow!("cannot read")), string());
        let err = failing.parse("x").unwrap_err();
        assert_eq!(err.issues()[0].code, ErrorCode::Custom);
        assert_eq!(err.issues()[0].message, "cannot read");
    }
}
