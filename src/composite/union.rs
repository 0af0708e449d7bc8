use indexmap::IndexMap;
use serde_json::{Value as Json, json};

use super::object::ObjectSchema;
use crate::error::SchemaError;
use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::{self, RefTracker};
use crate::leaf::{EnumSchema, Literal, LiteralSchema};
use crate::schema::{DynSchema, Meta, SchemaNode, SchemaType, node_common};
use crate::value::Value;

// -------------------------------- Union ---------------------------------- //

/// First option that validates cleanly wins. Trials run in private contexts,
/// so a failed union surfaces one issue and nothing from its options.
#[derive(Debug, Clone)]
pub struct UnionSchema {
    meta: Meta,
    options: Vec<DynSchema>,
}

impl UnionSchema {
    pub fn new(options: Vec<DynSchema>) -> Self { Self { meta: Meta::default(), options } }
    pub fn options(&self) -> &[DynSchema] { &self.options }
}

impl SchemaNode for UnionSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Union }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        for option in &self.options {
            let mut trial = ctx.isolated();
            let out = option.validate(input.clone(), &mut trial);
            if !trial.has_issues() {
                return out;
            }
        }
        ctx.report(Issue::new(ErrorCode::InvalidUnion, "Invalid input").with_received(input.type_name()));
        input
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let any_of: Vec<Json> = self.options.iter().map(|o| json_schema::emit(o.node(), refs)).collect();
        json!({ "anyOf": any_of })
    }

    fn is_optional(&self) -> bool { self.options.iter().any(|o| o.is_optional()) }
}

// ------------------------- Discriminated union --------------------------- //

/// Object options keyed by a literal-valued field. The lookup is built once
/// at construction.
#[derive(Debug, Clone)]
pub struct DiscriminatedUnionSchema {
    meta: Meta,
    discriminator: String,
    options: Vec<ObjectSchema>,
    lookup: IndexMap<Literal, usize>,
}

impl DiscriminatedUnionSchema {
    pub fn new(discriminator: impl Into<String>, options: Vec<ObjectSchema>) -> Result<Self, SchemaError> {
        let discriminator = discriminator.into();
        let mut lookup = IndexMap::new();
        for (index, option) in options.iter().enumerate() {
            let values = option
                .shape()
                .get(&discriminator)
                .and_then(literal_values)
                .ok_or_else(|| SchemaError::NonLiteralDiscriminator { discriminator: discriminator.clone(), index })?;
            for value in values {
                if lookup.insert(value.clone(), index).is_some() {
                    return Err(SchemaError::DuplicateDiscriminator {
                        discriminator: discriminator.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(Self { meta: Meta::default(), discriminator, options, lookup })
    }

    pub fn discriminator(&self) -> &str { &self.discriminator }
    pub fn options(&self) -> &[ObjectSchema] { &self.options }

    fn expected(&self) -> String {
        self.lookup.keys().map(ToString::to_string).collect::<Vec<_>>().join(" | ")
    }
}

/// Literal values a discriminator field can take, or `None` when the field
/// schema is not literal-valued.
fn literal_values(field: &DynSchema) -> Option<Vec<Literal>> {
    if let Some(lit) = field.downcast_ref::<LiteralSchema>() {
        return Some(vec![lit.value().clone()]);
    }
    field
        .downcast_ref::<EnumSchema>()
        .map(|e| e.options().iter().map(|v| Literal::String(v.clone())).collect())
}

impl SchemaNode for DiscriminatedUnionSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::DiscriminatedUnion }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let Some(obj) = input.as_object() else {
            ctx.invalid_type("object", &input);
            return input;
        };
        let Some(tag) = obj.get(&self.discriminator) else {
            ctx.with_segment(self.discriminator.as_str(), |ctx| {
                ctx.report(
                    Issue::new(ErrorCode::InvalidUnion, format!("Missing discriminator '{}'", self.discriminator))
                        .with_expected(self.expected()),
                );
            });
            return input;
        };
        let index = Literal::from_value(tag).and_then(|l| self.lookup.get(&l).copied());
        match index {
            Some(i) => self.options[i].validate(input, ctx),
            None => {
                let received = tag.to_string();
                ctx.with_segment(self.discriminator.as_str(), |ctx| {
                    ctx.report(
                        Issue::new(
                            ErrorCode::InvalidUnion,
                            format!("Invalid discriminator value. Expected {}", self.expected()),
                        )
                        .with_expected(self.expected())
                        .with_received(received),
                    );
                });
                input
            }
        }
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let one_of: Vec<Json> = self.options.iter().map(|o| json_schema::emit(o, refs)).collect();
        json!({ "oneOf": one_of, "discriminator": { "propertyName": self.discriminator } })
    }
}
