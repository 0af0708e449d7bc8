use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use crate::effect::{DefaultSchema, OptionalSchema};
use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::{self, RefTracker};
use crate::leaf::EnumSchema;
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::{Object, Value};

/// What happens to input keys the shape does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Dropped silently.
    #[default]
    Strip,
    /// One `UnrecognizedKeys` issue naming all of them.
    Strict,
    /// Copied to the output unvalidated.
    Passthrough,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    meta: Meta,
    shape: IndexMap<String, DynSchema>,
    unknown_keys: UnknownKeys,
    catchall: Option<DynSchema>,
}

impl ObjectSchema {
    pub fn new() -> Self { <Self as Default>::default() }

    /// Adds or replaces one property, keeping its original position on replace.
    pub fn field(mut self, key: impl Into<String>, schema: impl Schema) -> Self {
        self.shape.insert(key.into(), schema.into_dyn());
        self
    }

    pub fn fields<K, I>(mut self, entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynSchema)>,
    {
        self.shape.extend(entries.into_iter().map(|(k, s)| (k.into(), s)));
        self
    }

    pub fn shape(&self) -> &IndexMap<String, DynSchema> { &self.shape }
    pub fn unknown_keys(&self) -> UnknownKeys { self.unknown_keys }
    pub fn get_catchall(&self) -> Option<&DynSchema> { self.catchall.as_ref() }

    pub fn strip(mut self) -> Self { self.unknown_keys = UnknownKeys::Strip; self }
    pub fn strict(mut self) -> Self { self.unknown_keys = UnknownKeys::Strict; self }
    pub fn passthrough(mut self) -> Self { self.unknown_keys = UnknownKeys::Passthrough; self }

    /// Validates every undeclared key's value; wins over the unknown-key mode.
    pub fn catchall(mut self, schema: impl Schema) -> Self {
        self.catchall = Some(schema.into_dyn());
        self
    }

    // ------------------------------ reshaping ------------------------------- //

    pub fn extend<K, I>(self, entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynSchema)>,
    {
        self.fields(entries)
    }

    /// Shape union where `other` wins key conflicts; `other`'s unknown-key
    /// policy and catchall are taken too.
    pub fn merge(mut self, other: ObjectSchema) -> Self {
        self.shape.extend(other.shape);
        self.unknown_keys = other.unknown_keys;
        self.catchall = other.catchall;
        self
    }

    pub fn pick(mut self, keys: &[&str]) -> Self {
        self.shape.retain(|k, _| keys.contains(&k.as_str()));
        self
    }

    pub fn omit(mut self, keys: &[&str]) -> Self {
        self.shape.retain(|k, _| !keys.contains(&k.as_str()));
        self
    }

    pub fn partial(mut self) -> Self {
        for s in self.shape.values_mut() {
            *s = make_optional(s);
        }
        self
    }

    /// `partial` restricted to `keys`.
    pub fn partial_keys(mut self, keys: &[&str]) -> Self {
        for (k, s) in self.shape.iter_mut() {
            if keys.contains(&k.as_str()) {
                *s = make_optional(s);
            }
        }
        self
    }

    pub fn required(mut self) -> Self {
        for s in self.shape.values_mut() {
            *s = unwrap_optional(s);
        }
        self
    }

    pub fn keyof(&self) -> EnumSchema { EnumSchema::new(self.shape.keys().cloned()) }

    fn unknown(&self, rest: Object, out: &mut Object, ctx: &mut ParseContext) {
        if let Some(catchall) = &self.catchall {
            for (key, raw) in rest {
                let v = ctx.with_segment(key.as_str(), |ctx| catchall.validate(raw, ctx));
                out.insert(key, v);
            }
            return;
        }
        match self.unknown_keys {
            UnknownKeys::Strip => {}
            UnknownKeys::Passthrough => out.extend(rest),
            UnknownKeys::Strict if rest.is_empty() => {}
            UnknownKeys::Strict => {
                let keys: Vec<String> = rest.keys().map(|k| format!("'{k}'")).collect();
                let listed = keys.join(", ");
                ctx.report(
                    Issue::new(ErrorCode::UnrecognizedKeys, format!("Unrecognized key(s) in object: {listed}"))
                        .with_received(listed),
                );
            }
        }
    }
}

fn make_optional(s: &DynSchema) -> DynSchema {
    if s.is_optional() { s.clone() } else { OptionalSchema::new(s.clone()).into_dyn() }
}

fn unwrap_optional(s: &DynSchema) -> DynSchema {
    let mut cur = s.clone();
    loop {
        let next = if let Some(o) = cur.downcast_ref::<OptionalSchema>() {
            o.inner().clone()
        } else if let Some(d) = cur.downcast_ref::<DefaultSchema>() {
            d.inner().clone()
        } else {
            return cur;
        };
        cur = next;
    }
}

impl SchemaNode for ObjectSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Object }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let mut rest = match input {
            Value::Object(m) => m,
            other => {
                ctx.invalid_type("object", &other);
                return other;
            }
        };
        let mut out = Object::with_capacity(self.shape.len());
        for (key, child) in &self.shape {
            match rest.shift_remove(key) {
                Some(raw) => {
                    let v = ctx.with_segment(key.as_str(), |ctx| child.validate(raw, ctx));
                    out.insert(key.clone(), v);
                }
                None if child.is_optional() => {
                    let v = ctx.with_segment(key.as_str(), |ctx| child.validate(Value::Undefined, ctx));
                    if !v.is_undefined() {
                        out.insert(key.clone(), v);
                    }
                }
                None => {
                    ctx.with_segment(key.as_str(), |ctx| {
                        ctx.report(Issue::new(ErrorCode::MissingProperty, "Required").with_expected(key.clone()));
                    });
                }
            }
        }
        self.unknown(rest, &mut out, ctx);
        Value::Object(out)
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (key, child) in &self.shape {
            properties.insert(key.clone(), json_schema::emit(child.node(), refs));
            if !child.is_optional() {
                required.push(Json::from(key.clone()));
            }
        }
        let mut out = Map::new();
        out.insert("type".into(), Json::from("object"));
        out.insert("properties".into(), Json::Object(properties));
        if !required.is_empty() {
            out.insert("required".into(), Json::Array(required));
        }
        match (&self.catchall, self.unknown_keys) {
            (Some(c), _) => {
                out.insert("additionalProperties".into(), json_schema::emit(c.node(), refs));
            }
            (None, UnknownKeys::Passthrough) => {}
            (None, _) => {
                out.insert("additionalProperties".into(), Json::Bool(false));
            }
        }
        Json::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::PathSegment;
    use crate::{number, object, string};
    use serde_json::json;

    fn user() -> ObjectSchema {
        object().field("name", string()).field("age", number())
    }

    #[test]
    fn missing_keys_reported_at_their_path() {
        let err = user().parse(json!({})).unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.code == ErrorCode::MissingProperty && i.message == "Required"));
        assert_eq!(issues[0].path, vec![PathSegment::from("name")]);
        assert_eq!(issues[1].path, vec![PathSegment::from("age")]);
    }

    #[test]
    fn output_follows_shape_order_and_strips() {
        let out = user().parse(json!({"age": 3, "extra": 1, "name": "x"})).unwrap();
        assert_eq!(out.to_json().to_string(), r#"{"name":"x","age":3}"#);
    }

    #[test]
    fn strict_names_every_unknown_key() {
        let err = user().strict().parse(json!({"name": "x", "age": 1, "a": 1, "b": 2})).unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].code, ErrorCode::UnrecognizedKeys);
        assert_eq!(err.issues()[0].message, "Unrecognized key(s) in object: 'a', 'b'");
    }

    #[test]
    fn passthrough_and_catchall() {
        let out = user().passthrough().parse(json!({"name": "x", "age": 1, "z": true})).unwrap();
        assert_eq!(out.get("z"), Some(&Value::Bool(true)));

        let s = user().strict().catchall(number());
        assert!(s.is_valid(json!({"name": "x", "age": 1, "z": 2})));
        let err = s.parse(json!({"name": "x", "age": 1, "z": "no"})).unwrap_err();
        assert_eq!(err.issues()[0].path, vec![PathSegment::from("z")]);
        assert_eq!(err.issues()[0].code, ErrorCode::InvalidType);
    }

    #[test]
    fn absent_optional_keys_are_omitted() {
        let s = object().field("a", string().optional()).field("b", number().default(5));
        let out = s.parse(json!({})).unwrap();
        assert_eq!(out.to_json(), json!({"b": 5}));
        assert!(out.get("a").is_none());
    }

    #[test]
    fn reshaping_returns_new_schemas() {
        let base = user();
        let picked = base.clone().pick(&["name"]);
        assert_eq!(picked.shape().len(), 1);
        assert_eq!(base.shape().len(), 2);

        let omitted = base.clone().omit(&["name"]);
        assert_eq!(omitted.shape().keys().collect::<Vec<_>>(), vec!["age"]);

        let partial = base.clone().partial();
        assert!(partial.is_valid(json!({})));
        assert!(!base.is_valid(json!({})));

        let required = partial.required();
        assert!(!required.is_valid(json!({"name": "x"})));

        let some = base.clone().partial_keys(&["age"]);
        assert!(some.is_valid(json!({"name": "x"})));
        assert!(!some.is_valid(json!({"age": 1})));
    }

    #[test]
    fn merge_and_extend_let_later_shapes_win() {
        let a = object().field("id", string()).field("n", number());
        let b = object().field("id", number()).strict();
        let merged = a.clone().merge(b);
        assert!(merged.is_valid(json!({"id": 1, "n": 2})));
        assert!(!merged.is_valid(json!({"id": 1, "n": 2, "x": 0})));

        let extended = a.extend([("tag", string().into_dyn())]);
        assert_eq!(extended.shape().keys().collect::<Vec<_>>(), vec!["id", "n", "tag"]);
    }

    #[test]
    fn keyof_lists_shape_keys() {
        let k = user().keyof();
        assert_eq!(k.options(), ["name", "age"]);
    }

    #[test]
    fn json_schema_modes() {
        let s = object().field("a", string()).field("b", number().optional());
        assert_eq!(
            s.clone().to_json_schema(),
            json!({
                "type": "object",
                "properties": {"a": {"type": "string"}, "b": {"type": "number"}},
                "required": ["a"],
                "additionalProperties": false
            })
        );
        assert!(s.clone().passthrough().to_json_schema().get("additionalProperties").is_none());
        assert_eq!(s.catchall(number()).to_json_schema()["additionalProperties"], json!({"type": "number"}));
    }
}
