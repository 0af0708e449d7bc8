//! Decorators that wrap an inner schema without changing it.

pub mod catch;
pub mod optional;
pub mod refine;
pub mod transform;

pub use catch::{BrandedSchema, CatchSchema, ReadonlySchema};
pub use optional::{DefaultSchema, NullableSchema, OptionalSchema};
pub use refine::{RefineOptions, RefinedSchema, RefinementCtx, SuperRefinedSchema};
pub use transform::{PipeSchema, PreprocessSchema, TransformSchema};

use crate::schema::Schema;
use crate::value::Value;

pub fn optional(inner: impl Schema) -> OptionalSchema { OptionalSchema::new(inner) }
pub fn nullable(inner: impl Schema) -> NullableSchema { NullableSchema::new(inner) }

/// Applies `f` to the raw input, then validates its result with `inner`.
pub fn preprocess(
    f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    inner: impl Schema,
) -> PreprocessSchema {
    PreprocessSchema::new(f, inner)
}
