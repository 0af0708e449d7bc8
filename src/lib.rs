//! Declarative schema validation for dynamic values.
//!
//! Schemas are built from constructor functions and combinators, validate a
//! [`Value`] collecting every issue with its path, and can describe themselves
//! as JSON Schema.
//!
//! ```
//! use shape_guard::{Schema, number, object, string};
//! use serde_json::json;
//!
//! let user = object()
//!     .field("name", string().min(1))
//!     .field("age", number().int().gte(0.0));
//!
//! let err = user.parse(json!({"name": "", "age": -1})).unwrap_err();
//! assert_eq!(err.issues().len(), 2);
//! assert_eq!(err.to_string(), "name: String must contain at least 1 character(s); age: Number must be greater than or equal to 0");
//! ```

pub mod coerce;
pub mod composite;
pub mod effect;
pub mod error;
pub mod issue;
pub mod json_schema;
pub mod leaf;
pub mod registry;
pub mod schema;
pub mod value;

pub use composite::{
    ArraySchema, DiscriminatedUnionSchema, IntersectionSchema, LazySchema, MapSchema, ObjectSchema, RecordSchema,
    SetSchema, TupleSchema, UnionSchema, UnknownKeys, array, discriminated_union, intersection, lazy, map, object,
    record, set, tuple, union,
};
pub use effect::{
    BrandedSchema, CatchSchema, DefaultSchema, NullableSchema, OptionalSchema, PipeSchema, PreprocessSchema,
    ReadonlySchema, RefineOptions, RefinedSchema, RefinementCtx, SuperRefinedSchema, TransformSchema, nullable,
    optional, preprocess,
};
pub use error::{Error, FlattenedErrors, ParseError, RegistryError, SchemaError};
pub use issue::{ErrorCode, Issue, ParseContext, PathSegment};
pub use json_schema::{JsonSchemaOptions, Target};
pub use leaf::{
    BigIntSchema, BlobSchema, CustomSchema, DateSchema, EnumSchema, InstanceOfSchema, Literal, LiteralSchema,
    NumberSchema, Primitive, PrimitiveSchema, StringFormat, StringSchema, any, bigint, blob, boolean, custom, date,
    enumeration, instance_of, literal, nan, never, null, number, string, symbol, undefined, unknown, void,
};
pub use registry::SchemaRegistry;
pub use schema::{DynSchema, Meta, SafeParse, Schema, SchemaNode, SchemaType};
pub use value::{Blob, Instance, Object, Symbol, Value};
