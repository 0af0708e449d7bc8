//! Composite schemas: structured values validated through child schemas.

pub mod array;
pub mod collection;
pub mod intersection;
pub mod lazy;
pub mod object;
pub mod union;

pub use array::{ArraySchema, TupleSchema};
pub use collection::{MapSchema, RecordSchema, SetSchema};
pub use intersection::IntersectionSchema;
pub use lazy::LazySchema;
pub use object::{ObjectSchema, UnknownKeys};
pub use union::{DiscriminatedUnionSchema, UnionSchema};

use crate::error::SchemaError;
use crate::schema::{DynSchema, Schema};

// ----------------------------- Constructors ------------------------------ //

pub fn object() -> ObjectSchema { ObjectSchema::new() }
pub fn array(element: impl Schema) -> ArraySchema { ArraySchema::new(element) }
pub fn tuple(items: Vec<DynSchema>) -> TupleSchema { TupleSchema::new(items) }

/// Record with unconstrained string keys; see [`RecordSchema::keys`].
pub fn record(value: impl Schema) -> RecordSchema { RecordSchema::new(value) }
pub fn map(key: impl Schema, value: impl Schema) -> MapSchema { MapSchema::new(key, value) }
pub fn set(element: impl Schema) -> SetSchema { SetSchema::new(element) }

pub fn union(options: Vec<DynSchema>) -> UnionSchema { UnionSchema::new(options) }

pub fn discriminated_union(
    discriminator: impl Into<String>,
    options: Vec<ObjectSchema>,
) -> Result<DiscriminatedUnionSchema, SchemaError> {
    DiscriminatedUnionSchema::new(discriminator, options)
}

pub fn intersection(left: impl Schema, right: impl Schema) -> IntersectionSchema {
    IntersectionSchema::new(left, right)
}

pub fn lazy<S, F>(getter: F) -> LazySchema
where
    S: Schema,
    F: Fn() -> S + Send + Sync + 'static,
{
    LazySchema::new(getter)
}
