//! Base schema contract.
//!
//! `SchemaNode` is the object-safe core every schema implements: a type tag,
//! metadata, the validation routine and the JSON-Schema body. `Schema` is the
//! user-facing extension trait (entry points, metadata setters, combinators),
//! blanket-implemented for every clonable node. `DynSchema` erases the concrete
//! type so schemas can be stored in shapes, option lists and the registry.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde::de::DeserializeOwned;

use crate::composite::{ArraySchema, IntersectionSchema, UnionSchema};
use crate::effect::{
    BrandedSchema, CatchSchema, DefaultSchema, NullableSchema, OptionalSchema, PipeSchema,
    ReadonlySchema, RefineOptions, RefinedSchema, RefinementCtx, SuperRefinedSchema, TransformSchema,
};
use crate::error::{Error, ParseError};
use crate::issue::{ParseContext, PathSegment};
use crate::json_schema::{self, JsonSchemaOptions, RefTracker};
use crate::registry;
use crate::value::Value;

/// Discriminant of every node kind. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    // leaves
    String,
    Number,
    BigInt,
    Boolean,
    Date,
    Symbol,
    Literal,
    Enum,
    Any,
    Unknown,
    Null,
    Undefined,
    Void,
    Never,
    Nan,
    Custom,
    InstanceOf,
    Blob,
    // composites
    Object,
    Array,
    Tuple,
    Record,
    Map,
    Set,
    Union,
    DiscriminatedUnion,
    Intersection,
    Lazy,
    // effects
    Optional,
    Nullable,
    Default,
    Refined,
    SuperRefined,
    Transform,
    Pipe,
    Catch,
    Branded,
    Readonly,
    Preprocess,
}

/// Identifying and descriptive data carried by every node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub metadata: IndexMap<String, serde_json::Value>,
    pub examples: Vec<Value>,
}

pub trait SchemaNode: fmt::Debug + Send + Sync + 'static {
    fn schema_type(&self) -> SchemaType;
    fn meta(&self) -> &Meta;
    fn meta_mut(&mut self) -> &mut Meta;

    /// Validates `input`, recording issues in `ctx`. Always returns a value;
    /// when issues were recorded it is a best-effort intermediate.
    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value;

    /// JSON-Schema fragment for this node without annotations. Children go
    /// through [`json_schema::emit`] so named nodes become references.
    fn json_schema_body(&self, refs: &mut RefTracker) -> serde_json::Value;

    /// Optional-like nodes may be absent from an object.
    fn is_optional(&self) -> bool { false }

    fn as_any(&self) -> &dyn Any;
    fn clone_node(&self) -> Box<dyn SchemaNode>;
}

/// `meta`, `meta_mut`, `as_any`, `clone_node` for structs with a `meta` field.
macro_rules! node_common {
    () => {
        fn meta(&self) -> &$crate::schema::Meta { &self.meta }
        fn meta_mut(&mut self) -> &mut $crate::schema::Meta { &mut self.meta }
        fn as_any(&self) -> &dyn ::std::any::Any { self }
        fn clone_node(&self) -> Box<dyn $crate::schema::SchemaNode> { Box::new(self.clone()) }
    };
}
pub(crate) use node_common;

// ------------------------------- Pipeline -------------------------------- //

/// Fresh context → validate → aggregate.
pub(crate) fn run(node: &dyn SchemaNode, input: Value) -> Result<Value, ParseError> {
    let mut ctx = ParseContext::new();
    let out = node.validate(input, &mut ctx);
    let issues = ctx.into_issues();
    tracing::trace!(schema_type = ?node.schema_type(), issues = issues.len(), "parse finished");
    if issues.is_empty() { Ok(out) } else { Err(ParseError::new(issues)) }
}

/// Outcome of [`Schema::safe_parse`]. Serialises as
/// `{"success": true, "data": ..}` / `{"success": false, "error": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParse {
    Success(Value),
    Failure(ParseError),
}

impl SafeParse {
    pub fn is_success(&self) -> bool { matches!(self, SafeParse::Success(_)) }
    pub fn data(&self) -> Option<&Value> {
        match self { SafeParse::Success(v) => Some(v), SafeParse::Failure(_) => None }
    }
    pub fn error(&self) -> Option<&ParseError> {
        match self { SafeParse::Failure(e) => Some(e), SafeParse::Success(_) => None }
    }
    pub fn into_result(self) -> Result<Value, ParseError> { self.into() }
}

impl From<Result<Value, ParseError>> for SafeParse {
    fn from(r: Result<Value, ParseError>) -> Self {
        match r { Ok(v) => SafeParse::Success(v), Err(e) => SafeParse::Failure(e) }
    }
}

impl From<SafeParse> for Result<Value, ParseError> {
    fn from(r: SafeParse) -> Self {
        match r { SafeParse::Success(v) => Ok(v), SafeParse::Failure(e) => Err(e) }
    }
}

impl Serialize for SafeParse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            SafeParse::Success(v) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", &v.to_json())?;
            }
            SafeParse::Failure(e) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", e)?;
            }
        }
        map.end()
    }
}

// ------------------------------ Front API -------------------------------- //

/// Entry points, metadata setters and combinators. Every configuring method
/// consumes `self` and returns the reconfigured value; clone first to keep the
/// original.
pub trait Schema: SchemaNode + Clone + Sized {
    fn parse(&self, input: impl Into<Value>) -> Result<Value, ParseError> {
        run(self, input.into())
    }

    fn safe_parse(&self, input: impl Into<Value>) -> SafeParse {
        run(self, input.into()).into()
    }

    fn is_valid(&self, input: impl Into<Value>) -> bool {
        run(self, input.into()).is_ok()
    }

    /// Validates, then deserialises the output into `T`.
    fn parse_as<T: DeserializeOwned>(&self, input: impl Into<Value>) -> Result<T, Error> {
        let json = run(self, input.into())?.to_json();
        serde_path_to_error::deserialize::<_, T>(json).map_err(|err| Error::Deserialize {
            path: err.path().to_string(),
            message: err.into_inner().to_string(),
        })
    }

    fn name(&self) -> Option<&str> { self.meta().name.as_deref() }
    fn description(&self) -> Option<&str> { self.meta().description.as_deref() }
    fn metadata(&self) -> &IndexMap<String, serde_json::Value> { &self.meta().metadata }
    fn examples(&self) -> &[Value] { &self.meta().examples }

    fn describe(mut self, description: impl Into<String>) -> Self {
        self.meta_mut().description = Some(description.into());
        self
    }

    fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta_mut().metadata.insert(key.into(), value.into());
        self
    }

    fn example(mut self, example: impl Into<Value>) -> Self {
        self.meta_mut().examples.push(example.into());
        self
    }

    /// Names the schema and registers it globally under `name`.
    fn id(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.meta_mut().name = Some(name.clone());
        registry::register(name, self.clone());
        self
    }

    fn to_json_schema(&self) -> serde_json::Value {
        json_schema::to_document(self, &JsonSchemaOptions::default())
    }

    fn to_json_schema_with(&self, options: &JsonSchemaOptions) -> serde_json::Value {
        json_schema::to_document(self, options)
    }

    fn into_dyn(self) -> DynSchema { DynSchema::new(self) }

    // ------------------------------ combinators ------------------------------ //

    fn optional(self) -> OptionalSchema { OptionalSchema::new(self) }
    fn nullable(self) -> NullableSchema { NullableSchema::new(self) }
    fn nullish(self) -> OptionalSchema { OptionalSchema::new(NullableSchema::new(self)) }

    fn default(self, value: impl Into<Value>) -> DefaultSchema {
        DefaultSchema::new(self, value.into())
    }

    /// Supplier runs once per undefined input.
    fn default_with(self, supplier: impl Fn() -> Value + Send + Sync + 'static) -> DefaultSchema {
        DefaultSchema::with_supplier(self, supplier)
    }

    fn refine(
        self,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> RefinedSchema {
        RefinedSchema::new(self, predicate, RefineOptions::new(message))
    }

    /// Like [`Schema::refine`], reporting at `path` relative to this node.
    fn refine_at(
        self,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
        path: Vec<PathSegment>,
    ) -> RefinedSchema {
        RefinedSchema::new(self, predicate, RefineOptions::new(message).at(path))
    }

    fn super_refine(
        self,
        refinement: impl Fn(&Value, &mut RefinementCtx<'_>) + Send + Sync + 'static,
    ) -> SuperRefinedSchema {
        SuperRefinedSchema::new(self, refinement)
    }

    fn check(
        self,
        refinement: impl Fn(&Value, &mut RefinementCtx<'_>) + Send + Sync + 'static,
    ) -> SuperRefinedSchema {
        self.super_refine(refinement)
    }

    fn transform(
        self,
        f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> TransformSchema {
        TransformSchema::new(self, f)
    }

    fn pipe(self, next: impl Schema) -> PipeSchema { PipeSchema::new(self, next) }

    fn catch(self, fallback: impl Into<Value>) -> CatchSchema { CatchSchema::new(self, fallback.into()) }

    fn catch_with(self, f: impl Fn(&ParseError) -> Value + Send + Sync + 'static) -> CatchSchema {
        CatchSchema::with_handler(self, f)
    }

    fn brand(self, brand: impl Into<String>) -> BrandedSchema { BrandedSchema::new(self, brand) }
    fn readonly(self) -> ReadonlySchema { ReadonlySchema::new(self) }

    fn or(self, other: impl Schema) -> UnionSchema {
        UnionSchema::new(vec![self.into_dyn(), other.into_dyn()])
    }
    fn and(self, other: impl Schema) -> IntersectionSchema { IntersectionSchema::new(self, other) }
    fn array(self) -> ArraySchema { ArraySchema::new(self) }
}

impl<T: SchemaNode + Clone> Schema for T {}

// ------------------------------ DynSchema -------------------------------- //

/// Shared, type-erased schema handle. Cloning is a reference-count bump.
#[derive(Clone)]
pub struct DynSchema(Arc<dyn SchemaNode>);

impl DynSchema {
    pub fn new<S: SchemaNode + Clone>(node: S) -> Self {
        if let Some(already) = (&node as &dyn Any).downcast_ref::<DynSchema>() {
            return already.clone();
        }
        DynSchema(Arc::new(node))
    }

    pub fn node(&self) -> &dyn SchemaNode { &*self.0 }

    /// Concrete node behind the handle.
    pub fn downcast_ref<T: SchemaNode>(&self) -> Option<&T> { self.0.as_any().downcast_ref::<T>() }
}

impl fmt::Debug for DynSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl SchemaNode for DynSchema {
    fn schema_type(&self) -> SchemaType { self.0.schema_type() }
    fn meta(&self) -> &Meta { self.0.meta() }

    // copy-on-write: the shared node is never touched
    fn meta_mut(&mut self) -> &mut Meta {
        if Arc::get_mut(&mut self.0).is_none() {
            self.0 = Arc::from(self.0.clone_node());
        }
        match Arc::get_mut(&mut self.0) {
            Some(node) => node.meta_mut(),
            None => unreachable!("freshly cloned node is uniquely owned"),
        }
    }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value { self.0.validate(input, ctx) }
    fn json_schema_body(&self, refs: &mut RefTracker) -> serde_json::Value { self.0.json_schema_body(refs) }
    fn is_optional(&self) -> bool { self.0.is_optional() }
    fn as_any(&self) -> &dyn Any { self.0.as_any() }
    fn clone_node(&self) -> Box<dyn SchemaNode> { Box::new(self.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{number, object, string, ErrorCode};
    use serde_json::json;

    #[test]
    fn configuring_never_mutates_the_receiver() {
        let base = string().min(2);
        let described = base.clone().describe("a name");
        assert_eq!(base.description(), None);
        assert_eq!(described.description(), Some("a name"));
        assert!(base.is_valid("ab"));
    }

    #[test]
    fn dyn_meta_is_copy_on_write() {
        let shared = string().into_dyn();
        let other = shared.clone().describe("changed");
        assert_eq!(shared.description(), None);
        assert_eq!(other.description(), Some("changed"));
    }

    #[test]
    fn into_dyn_does_not_double_wrap() {
        let d = number().into_dyn();
        let again = d.clone().into_dyn();
        assert!(again.downcast_ref::<crate::NumberSchema>().is_some());
    }

    #[test]
    fn safe_parse_serializes_success_shape() {
        let ok = serde_json::to_value(string().safe_parse("x")).unwrap();
        assert_eq!(ok, json!({"success": true, "data": "x"}));
        let bad = serde_json::to_value(string().safe_parse(1)).unwrap();
        assert_eq!(bad["success"], json!(false));
        assert_eq!(bad["error"]["issues"][0]["code"], json!("invalid_type"));
    }

    #[test]
    fn parse_as_deserializes_validated_output() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct User { name: String, age: u32 }

        let schema = object().field("name", string()).field("age", number().int());
        let user: User = schema.parse_as(json!({"name": "Ada", "age": 36, "extra": true})).unwrap();
        assert_eq!(user, User { name: "Ada".into(), age: 36 });

        match schema.parse_as::<User>(json!({"name": 1, "age": 36})) {
            Err(Error::Parse(e)) => assert_eq!(e.issues()[0].code, ErrorCode::InvalidType),
            other => panic!("unexpected {other:?}"),
        }
    }
}
