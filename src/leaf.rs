//! Leaf schemas: primitives, literals, enums and opaque host values.

pub mod bigint;
pub mod custom;
pub mod date;
pub mod format;
pub mod literal;
pub mod number;
pub mod primitive;
pub mod string;

use std::any::Any;

pub use bigint::BigIntSchema;
pub use custom::{BlobSchema, CustomSchema, InstanceOfSchema};
pub use date::DateSchema;
pub use format::StringFormat;
pub use literal::{EnumSchema, Literal, LiteralSchema};
pub use number::{MAX_SAFE_INTEGER, MIN_SAFE_INTEGER, NumberSchema};
pub use primitive::{Primitive, PrimitiveSchema};
pub use string::StringSchema;

use crate::value::Value;

// ----------------------------- Constructors ------------------------------ //

pub fn string() -> StringSchema { StringSchema::new() }
pub fn number() -> NumberSchema { NumberSchema::new() }
pub fn bigint() -> BigIntSchema { BigIntSchema::new() }
pub fn date() -> DateSchema { DateSchema::new() }

pub fn boolean() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Boolean) }
pub fn symbol() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Symbol) }
pub fn null() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Null) }
pub fn undefined() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Undefined) }
pub fn void() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Void) }
pub fn any() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Any) }
pub fn unknown() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Unknown) }
pub fn never() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Never) }
pub fn nan() -> PrimitiveSchema { PrimitiveSchema::new(Primitive::Nan) }

pub fn literal(value: impl Into<Literal>) -> LiteralSchema { LiteralSchema::new(value) }

/// String enum over `values`, in the given order, duplicates dropped.
pub fn enumeration<I, S>(values: I) -> EnumSchema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    EnumSchema::new(values)
}

pub fn custom(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> CustomSchema {
    CustomSchema::new(predicate)
}

pub fn instance_of<T: Any + Send + Sync>() -> InstanceOfSchema { InstanceOfSchema::new::<T>() }

pub fn blob() -> BlobSchema { BlobSchema::new() }
