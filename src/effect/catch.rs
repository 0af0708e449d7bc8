use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::error::ParseError;
use crate::issue::ParseContext;
use crate::json_schema::{self, RefTracker};
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::Value;

// --------------------------------- Catch --------------------------------- //

#[derive(Clone)]
enum Recovery {
    Value(Value),
    Handler(Arc<dyn Fn(&ParseError) -> Value + Send + Sync>),
}

/// Never fails: inner issues are swallowed and replaced by a fallback.
#[derive(Clone)]
pub struct CatchSchema {
    meta: Meta,
    inner: DynSchema,
    recovery: Recovery,
}

impl CatchSchema {
    pub fn new(inner: impl Schema, fallback: Value) -> Self {
        Self { meta: Meta::default(), inner: inner.into_dyn(), recovery: Recovery::Value(fallback) }
    }

    /// `handler` sees the swallowed error and supplies the replacement.
    pub fn with_handler(inner: impl Schema, handler: impl Fn(&ParseError) -> Value + Send + Sync + 'static) -> Self {
        Self { meta: Meta::default(), inner: inner.into_dyn(), recovery: Recovery::Handler(Arc::new(handler)) }
    }

    pub fn inner(&self) -> &DynSchema { &self.inner }
}

impl fmt::Debug for CatchSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("CatchSchema");
        d.field("meta", &self.meta).field("inner", &self.inner);
        if let Recovery::Value(v) = &self.recovery {
            d.field("fallback", v);
        }
        d.finish()
    }
}

impl SchemaNode for CatchSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Catch }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let mut trial = ctx.isolated();
        let out = self.inner.validate(input, &mut trial);
        if !trial.has_issues() {
            return out;
        }
        match &self.recovery {
            Recovery::Value(v) => v.clone(),
            Recovery::Handler(f) => f(&ParseError::new(trial.into_issues())),
        }
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json { json_schema::emit(self.inner.node(), refs) }

    fn is_optional(&self) -> bool { true }
}

// --------------------------------- Brand --------------------------------- //

/// Runtime no-op; the brand name is kept for introspection.
#[derive(Debug, Clone)]
pub struct BrandedSchema {
    meta: Meta,
    inner: DynSchema,
    brand: String,
}

impl BrandedSchema {
    pub fn new(inner: impl Schema, brand: impl Into<String>) -> Self {
        Self { meta: Meta::default(), inner: inner.into_dyn(), brand: brand.into() }
    }

    pub fn brand_name(&self) -> &str { &self.brand }
    pub fn unwrap(&self) -> &DynSchema { &self.inner }
}

impl SchemaNode for BrandedSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Branded }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value { self.inner.validate(input, ctx) }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json { json_schema::emit(self.inner.node(), refs) }

    fn is_optional(&self) -> bool { self.inner.is_optional() }
}

// ------------------------------- Readonly -------------------------------- //

/// Passes the inner output through unchanged: the output is not frozen, it
/// is an owned `Value` the caller is free to mutate. The marker only shows
/// up as `readOnly` in JSON Schema.
#[derive(Debug, Clone)]
pub struct ReadonlySchema {
    meta: Meta,
    inner: DynSchema,
}

impl ReadonlySchema {
    pub fn new(inner: impl Schema) -> Self { Self { meta: Meta::default(), inner: inner.into_dyn() } }
    pub fn unwrap(&self) -> &DynSchema { &self.inner }
}

impl SchemaNode for ReadonlySchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Readonly }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value { self.inner.validate(input, ctx) }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        json_schema::with_key(json_schema::emit(self.inner.node(), refs), "readOnly", Json::Bool(true))
    }

    fn is_optional(&self) -> bool { self.inner.is_optional() }
}
