use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::issue::ParseContext;
use crate::json_schema::{self, RefTracker};
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::Value;

// ------------------------------- Optional -------------------------------- //

/// Undefined passes untouched; anything else goes to the inner schema.
#[derive(Debug, Clone)]
pub struct OptionalSchema {
    meta: Meta,
    inner: DynSchema,
}

impl OptionalSchema {
    pub fn new(inner: impl Schema) -> Self { Self { meta: Meta::default(), inner: inner.into_dyn() } }
    pub fn inner(&self) -> &DynSchema { &self.inner }
    pub fn unwrap(&self) -> &DynSchema { &self.inner }
}

impl SchemaNode for OptionalSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Optional }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        if input.is_undefined() { input } else { self.inner.validate(input, ctx) }
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json { json_schema::emit(self.inner.node(), refs) }

    fn is_optional(&self) -> bool { true }
}

// ------------------------------- Nullable -------------------------------- //

#[derive(Debug, Clone)]
pub struct NullableSchema {
    meta: Meta,
    inner: DynSchema,
}

impl NullableSchema {
    pub fn new(inner: impl Schema) -> Self { Self { meta: Meta::default(), inner: inner.into_dyn() } }
    pub fn inner(&self) -> &DynSchema { &self.inner }
}

impl SchemaNode for NullableSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Nullable }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        if input.is_null() { input } else { self.inner.validate(input, ctx) }
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        json_schema::nullable(json_schema::emit(self.inner.node(), refs))
    }

    fn is_optional(&self) -> bool { self.inner.is_optional() }
}

// -------------------------------- Default -------------------------------- //

#[derive(Clone)]
enum Fallback {
    Value(Value),
    Supplier(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl Fallback {
    fn get(&self) -> Value {
        match self {
            Fallback::Value(v) => v.clone(),
            Fallback::Supplier(f) => f(),
        }
    }
}

/// Substitutes a value for undefined input, then validates it.
#[derive(Clone)]
pub struct DefaultSchema {
    meta: Meta,
    inner: DynSchema,
    default: Fallback,
}

impl DefaultSchema {
    pub fn new(inner: impl Schema, value: Value) -> Self {
        Self { meta: Meta::default(), inner: inner.into_dyn(), default: Fallback::Value(value) }
    }

    /// `supplier` runs on every undefined input, so each parse gets a fresh value.
    pub fn with_supplier(inner: impl Schema, supplier: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self { meta: Meta::default(), inner: inner.into_dyn(), default: Fallback::Supplier(Arc::new(supplier)) }
    }

    pub fn inner(&self) -> &DynSchema { &self.inner }
    pub fn remove_default(&self) -> &DynSchema { &self.inner }
    pub fn default_value(&self) -> Value { self.default.get() }
}

impl fmt::Debug for DefaultSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("DefaultSchema");
        d.field("meta", &self.meta).field("inner", &self.inner);
        match &self.default {
            Fallback::Value(v) => d.field("default", v),
            Fallback::Supplier(_) => d.field("default", &"<supplier>"),
        };
        d.finish()
    }
}

impl SchemaNode for DefaultSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Default }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let input = if input.is_undefined() { self.default.get() } else { input };
        self.inner.validate(input, ctx)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let inner = json_schema::emit(self.inner.node(), refs);
        json_schema::with_key(inner, "default", self.default.get().to_json())
    }

    fn is_optional(&self) -> bool { true }
}
