use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::{Value as Json, json};

use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::RefTracker;
use crate::schema::{Meta, SchemaNode, SchemaType, node_common};
use crate::value::{Instance, Value};

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

// -------------------------------- Custom --------------------------------- //

/// Accepts whatever the predicate accepts.
#[derive(Clone)]
pub struct CustomSchema {
    meta: Meta,
    predicate: Predicate,
    message: String,
}

impl CustomSchema {
    pub fn new(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self { meta: Meta::default(), predicate: Arc::new(predicate), message: "Invalid input".into() }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl fmt::Debug for CustomSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSchema").field("meta", &self.meta).field("message", &self.message).finish()
    }
}

impl SchemaNode for CustomSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Custom }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        if !(self.predicate)(&input) {
            ctx.add_issue(ErrorCode::Custom, self.message.clone());
        }
        input
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json { json!({}) }
}

// ------------------------------ InstanceOf ------------------------------- //

/// Accepts host objects of one concrete Rust type.
#[derive(Debug, Clone)]
pub struct InstanceOfSchema {
    meta: Meta,
    check: fn(&Instance) -> bool,
    type_name: &'static str,
}

impl InstanceOfSchema {
    pub fn new<T: Any + Send + Sync>() -> Self {
        Self { meta: Meta::default(), check: Instance::is::<T>, type_name: short_type_name::<T>() }
    }

    pub fn type_name(&self) -> &'static str { self.type_name }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

impl SchemaNode for InstanceOfSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::InstanceOf }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let ok = matches!(&input, Value::Instance(i) if (self.check)(i));
        if !ok {
            let received = match &input {
                Value::Instance(i) => i.type_name().to_string(),
                other => other.type_name().to_string(),
            };
            ctx.report(
                Issue::new(ErrorCode::InvalidType, format!("Input not instance of {}", self.type_name))
                    .with_expected(self.type_name)
                    .with_received(received),
            );
        }
        input
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json { json!({}) }
}

// --------------------------------- Blob ---------------------------------- //

/// Binary payloads with optional size bounds and MIME allow-list.
#[derive(Debug, Clone, Default)]
pub struct BlobSchema {
    meta: Meta,
    min: Option<usize>,
    max: Option<usize>,
    mime: Vec<String>,
}

impl BlobSchema {
    pub fn new() -> Self { Self::default() }

    pub fn min(mut self, bytes: usize) -> Self { self.min = Some(bytes); self }
    pub fn max(mut self, bytes: usize) -> Self { self.max = Some(bytes); self }

    pub fn mime<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mime = types.into_iter().map(Into::into).collect();
        self
    }
}

impl SchemaNode for BlobSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Blob }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let Value::Blob(blob) = &input else {
            ctx.invalid_type("blob", &input);
            return input;
        };
        let size = blob.size();
        if let Some(min) = self.min.filter(|m| size < *m) {
            ctx.report(
                Issue::new(ErrorCode::TooSmall, format!("File must be at least {min} bytes"))
                    .with_expected(min.to_string())
                    .with_received(size.to_string()),
            );
        }
        if let Some(max) = self.max.filter(|m| size > *m) {
            ctx.report(
                Issue::new(ErrorCode::TooBig, format!("File must be at most {max} bytes"))
                    .with_expected(max.to_string())
                    .with_received(size.to_string()),
            );
        }
        if !self.mime.is_empty() && !self.mime.iter().any(|m| *m == blob.mime_type) {
            let expected = self.mime.join(" | ");
            let received = blob.mime_type.clone();
            ctx.report(
                Issue::new(ErrorCode::InvalidType, format!("Expected {expected}, received {received}"))
                    .with_expected(expected)
                    .with_received(received),
            );
        }
        input
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json {
        let mut out = json!({ "type": "string", "format": "binary", "contentEncoding": "binary" });
        if let Some(min) = self.min {
            out["minLength"] = json!(min);
        }
        if let Some(max) = self.max {
            out["maxLength"] = json!(max);
        }
        match self.mime.as_slice() {
            [] => {}
            [one] => out["contentMediaType"] = json!(one),
            many => {
                let alts: Vec<Json> = many.iter().map(|m| json!({ "contentMediaType": m })).collect();
                out["anyOf"] = Json::Array(alts);
            }
        }
        out
    }
}
