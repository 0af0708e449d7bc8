//! JSON-Schema emission.
//!
//! Walks a schema tree and produces a JSON-Schema document. Named nodes are
//! emitted once into `$defs` and referenced everywhere else with `$ref`; that
//! is also what terminates recursive schema graphs. Unnamed nodes inline.

use std::any::TypeId;
use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value as Json, json};

use crate::schema::SchemaNode;

// ------------------------------- Policy ---------------------------------- //

const DRAFT_2020_12_URI: &str = "https://json-schema.org/draft/2020-12/schema";
const DRAFT_07_URI: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// `$defs`, `prefixItems`.
    #[default]
    Draft2020_12,
    /// `definitions`, array-form `items` + `additionalItems` for tuples.
    Draft07,
}

impl Target {
    pub fn defs_key(self) -> &'static str {
        match self { Target::Draft2020_12 => "$defs", Target::Draft07 => "definitions" }
    }
    pub fn schema_uri(self) -> &'static str {
        match self { Target::Draft2020_12 => DRAFT_2020_12_URI, Target::Draft07 => DRAFT_07_URI }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonSchemaOptions {
    pub target: Target,
    /// Emit a leading `$schema` keyword.
    pub include_schema_uri: bool,
}

impl JsonSchemaOptions {
    pub fn new() -> Self { Self::default() }
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }
    pub fn include_schema_uri(mut self, yes: bool) -> Self {
        self.include_schema_uri = yes;
        self
    }
}

// ------------------------------ RefTracker ------------------------------- //

/// Per-call state: names already emitted and the accumulated definitions.
#[derive(Debug, Default)]
pub struct RefTracker {
    seen: HashSet<String>,
    defs: IndexMap<String, Json>,
    target: Target,
    /// Deferred nodes currently being expanded.
    expanding: HashSet<ExpansionKey>,
}

/// Identity of a deferred node's getter. Stateless getters are told apart by
/// type, since each call of a recursive fn builds a fresh getter; capturing
/// getters share a type across unrelated instances and go by allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ExpansionKey {
    Type(TypeId),
    Getter(usize),
}

impl RefTracker {
    pub fn new(target: Target) -> Self {
        Self { target, ..Self::default() }
    }
    pub fn target(&self) -> Target { self.target }
    pub fn defs(&self) -> &IndexMap<String, Json> { &self.defs }
    pub fn has_seen(&self, name: &str) -> bool { self.seen.contains(name) }

    pub fn ref_to(&self, name: &str) -> Json {
        json!({ "$ref": format!("#/{}/{}", self.target.defs_key(), name) })
    }

    /// Marks `key` as being expanded; false if it already is.
    pub(crate) fn enter(&mut self, key: ExpansionKey) -> bool { self.expanding.insert(key) }
    pub(crate) fn leave(&mut self, key: ExpansionKey) { self.expanding.remove(&key); }
}

// ------------------------------- Emission -------------------------------- //

/// Fragment for `node`: a `$ref` when named, the annotated body otherwise.
pub fn emit(node: &dyn SchemaNode, refs: &mut RefTracker) -> Json {
    let Some(name) = node.meta().name.clone() else {
        return annotated(node, refs);
    };
    if !refs.seen.insert(name.clone()) {
        return refs.ref_to(&name);
    }
    // reserve the slot so parents precede the definitions they pull in
    refs.defs.insert(name.clone(), Json::Null);
    let body = annotated(node, refs);
    refs.defs.insert(name.clone(), body);
    refs.ref_to(&name)
}

fn annotated(node: &dyn SchemaNode, refs: &mut RefTracker) -> Json {
    let mut body = node.json_schema_body(refs);
    if let Json::Object(obj) = &mut body {
        let meta = node.meta();
        if let Some(d) = &meta.description {
            obj.insert("description".into(), Json::from(d.clone()));
        }
        if !meta.examples.is_empty() {
            obj.insert("examples".into(), Json::Array(meta.examples.iter().map(|e| e.to_json()).collect()));
        }
        for (k, v) in &meta.metadata {
            obj.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
    body
}

/// Complete document with `$defs` attached when any named node was reached.
pub fn to_document(node: &dyn SchemaNode, options: &JsonSchemaOptions) -> Json {
    let mut refs = RefTracker::new(options.target);
    let root = emit(node, &mut refs);

    let mut doc = Map::new();
    if options.include_schema_uri {
        doc.insert("$schema".into(), Json::from(options.target.schema_uri()));
    }
    match root {
        Json::Object(m) => doc.extend(m),
        other => { doc.insert("allOf".into(), Json::Array(vec![other])); }
    }
    if !refs.defs.is_empty() {
        let defs: Map<String, Json> = refs.defs.into_iter().collect();
        doc.insert(options.target.defs_key().into(), Json::Object(defs));
    }
    tracing::debug!(keys = doc.len(), "json schema emitted");
    Json::Object(doc)
}

// ------------------------------- Helpers --------------------------------- //

/// `type` widened with `"null"`, or an `anyOf` when there is no bare type.
pub(crate) fn nullable(inner: Json) -> Json {
    match inner {
        Json::Object(mut m) if m.get("type").is_some_and(Json::is_string) && !m.contains_key("$ref") => {
            if let Some(ty) = m.get_mut("type") {
                *ty = json!([ty.take(), "null"]);
            }
            if let Some(c) = m.shift_remove("const") {
                m.insert("enum".into(), json!([c]));
            }
            if let Some(Json::Array(values)) = m.get_mut("enum") {
                values.push(Json::Null);
            }
            Json::Object(m)
        }
        other => json!({ "anyOf": [other, { "type": "null" }] }),
    }
}

/// Sets `key` on an object fragment; non-objects are left alone.
pub(crate) fn with_key(mut fragment: Json, key: &str, value: Json) -> Json {
    if let Json::Object(m) = &mut fragment {
        m.insert(key.to_string(), value);
    }
    fragment
}
