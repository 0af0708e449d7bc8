use std::fmt;

use ordered_float::OrderedFloat;
use serde_json::{Value as Json, json};

use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::RefTracker;
use crate::schema::{Meta, SchemaNode, SchemaType, node_common};
use crate::value::{Value, json_num_pref_i64};

/// A primitive usable as a literal. Hashable so it can key lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Number(OrderedFloat<f64>),
    BigInt(i128),
    Bool(bool),
    Null,
    Undefined,
}

impl Literal {
    /// Literal view of a primitive value; `None` for composites.
    pub fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::String(s) => Some(Literal::String(s.clone())),
            Value::Number(n) => Some(Literal::Number(OrderedFloat(*n))),
            Value::BigInt(n) => Some(Literal::BigInt(*n)),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Null => Some(Literal::Null),
            Value::Undefined => Some(Literal::Undefined),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Number(n) => Value::Number(n.0),
            Literal::BigInt(n) => Value::BigInt(*n),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
            Literal::Undefined => Value::Undefined,
        }
    }

    pub fn matches(&self, v: &Value) -> bool {
        Literal::from_value(v).is_some_and(|l| l == *self)
    }

    fn json_type(&self) -> Option<&'static str> {
        match self {
            Literal::String(_) => Some("string"),
            Literal::Number(n) if n.0.fract() == 0.0 => Some("integer"),
            Literal::Number(_) => Some("number"),
            Literal::BigInt(_) => Some("integer"),
            Literal::Bool(_) => Some("boolean"),
            Literal::Null => Some("null"),
            Literal::Undefined => None,
        }
    }
}

/// Strings render single-quoted, everything else as written.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{s}'"),
            Literal::Number(n) => write!(f, "{}", n.0),
            Literal::BigInt(n) => write!(f, "{n}n"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => f.write_str("null"),
            Literal::Undefined => f.write_str("undefined"),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self { Literal::String(s.to_string()) }
}
impl From<String> for Literal {
    fn from(s: String) -> Self { Literal::String(s) }
}
impl From<f64> for Literal {
    fn from(n: f64) -> Self { Literal::Number(OrderedFloat(n)) }
}
impl From<i32> for Literal {
    fn from(n: i32) -> Self { Literal::Number(OrderedFloat(f64::from(n))) }
}
impl From<i128> for Literal {
    fn from(n: i128) -> Self { Literal::BigInt(n) }
}
impl From<bool> for Literal {
    fn from(b: bool) -> Self { Literal::Bool(b) }
}

// ------------------------------- Literal --------------------------------- //

#[derive(Debug, Clone)]
pub struct LiteralSchema {
    meta: Meta,
    value: Literal,
}

impl LiteralSchema {
    pub fn new(value: impl Into<Literal>) -> Self { Self { meta: Meta::default(), value: value.into() } }
    pub fn value(&self) -> &Literal { &self.value }
}

impl SchemaNode for LiteralSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Literal }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        if !self.value.matches(&input) {
            ctx.report(
                Issue::new(ErrorCode::InvalidLiteral, format!("Invalid literal value, expected {}", self.value))
                    .with_expected(self.value.to_string())
                    .with_received(input.to_string()),
            );
        }
        input
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json {
        let constant = match &self.value {
            Literal::Number(n) => json_num_pref_i64(n.0),
            other => other.to_value().to_json(),
        };
        match self.value.json_type() {
            Some(ty) => json!({ "type": ty, "const": constant }),
            None => json!({ "not": {} }),
        }
    }
}

// --------------------------------- Enum ---------------------------------- //

#[derive(Debug, Clone)]
pub struct EnumSchema {
    meta: Meta,
    values: Vec<String>,
}

impl EnumSchema {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for v in values {
            let v = v.into();
            if !out.contains(&v) {
                out.push(v);
            }
        }
        Self { meta: Meta::default(), values: out }
    }

    pub fn options(&self) -> &[String] { &self.values }

    /// New enum over the listed members only.
    pub fn extract(&self, keep: &[&str]) -> EnumSchema {
        EnumSchema::new(self.values.iter().filter(|v| keep.contains(&v.as_str())).cloned())
    }

    /// New enum without the listed members.
    pub fn exclude(&self, drop: &[&str]) -> EnumSchema {
        EnumSchema::new(self.values.iter().filter(|v| !drop.contains(&v.as_str())).cloned())
    }

    fn expected(&self) -> String {
        self.values.iter().map(|v| format!("'{v}'")).collect::<Vec<_>>().join(" | ")
    }
}

impl SchemaNode for EnumSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Enum }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let Some(s) = input.as_str() else {
            ctx.invalid_type(&self.expected(), &input);
            return input;
        };
        if !self.values.iter().any(|v| v == s) {
            ctx.report(
                Issue::new(
                    ErrorCode::InvalidEnumValue,
                    format!("Invalid enum value. Expected {}, received '{s}'", self.expected()),
                )
                .with_expected(self.expected())
                .with_received(s),
            );
        }
        input
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json {
        json!({ "type": "string", "enum": self.values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Schema, enumeration, literal};

    #[test]
    fn literal_matches_exact_primitive() {
        assert!(literal("a").is_valid("a"));
        assert!(!literal("a").is_valid("b"));
        assert!(literal(3).is_valid(3.0));
        assert!(!literal(3).is_valid("3"));
        assert!(literal(true).is_valid(true));
        let err = literal("a").parse("b").unwrap_err();
        assert_eq!(err.issues()[0].code, ErrorCode::InvalidLiteral);
        assert_eq!(err.issues()[0].message, "Invalid literal value, expected 'a'");
    }

    #[test]
    fn enum_reports_members() {
        let e = enumeration(["red", "green"]);
        let err = e.parse("blue").unwrap_err();
        assert_eq!(err.issues()[0].code, ErrorCode::InvalidEnumValue);
        assert_eq!(err.issues()[0].message, "Invalid enum value. Expected 'red' | 'green', received 'blue'");
        assert_eq!(e.parse(1).unwrap_err().issues()[0].code, ErrorCode::InvalidType);
    }

    #[test]
    fn extract_and_exclude_build_new_enums() {
        let e = enumeration(["a", "b", "c"]);
        assert_eq!(e.extract(&["a", "c"]).options(), ["a", "c"]);
        assert_eq!(e.exclude(&["a"]).options(), ["b", "c"]);
        assert_eq!(e.options().len(), 3);
    }

    #[test]
    fn json_fragments() {
        assert_eq!(literal("x").to_json_schema(), json!({"type": "string", "const": "x"}));
        assert_eq!(literal(2).to_json_schema(), json!({"type": "integer", "const": 2}));
        assert_eq!(enumeration(["a", "b"]).to_json_schema(), json!({"type": "string", "enum": ["a", "b"]}));
    }
}
