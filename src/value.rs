//! Dynamic value model. No schema logic here.
//!
//! Schemas validate `Value`s and hand back `Value`s. The variant set mirrors the
//! host values the validators are expected to see at a trust boundary: JSON
//! shapes plus the few non-JSON kinds (undefined, bigint, dates, symbols,
//! maps, sets, binary blobs, opaque class instances).

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;

/// Ordered property bag. Insertion order is preserved end to end.
pub type Object = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    /// `None` is an invalid date (unparseable input, out-of-range timestamp).
    Date(Option<DateTime<Utc>>),
    Symbol(Symbol),
    Array(Vec<Value>),
    Object(Object),
    /// Entries in insertion order; keys are arbitrary values.
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    Blob(Blob),
    Instance(Instance),
}

// ------------------------------- Symbols --------------------------------- //

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity. Two symbols with the same description differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new(description: Option<&str>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: description.map(Arc::from),
        }
    }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
}

// -------------------------------- Blobs ---------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl Blob {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self { data: data.into(), mime_type: mime_type.into() }
    }
    pub fn size(&self) -> usize { self.data.len() }
}

// ------------------------------ Instances -------------------------------- //

/// Opaque host object. Equality is identity, like object references.
#[derive(Clone)]
pub struct Instance {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self { type_name: std::any::type_name::<T>(), inner: Arc::new(value) }
    }
    pub fn is<T: Any>(&self) -> bool { self.inner.is::<T>() }
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> { self.inner.downcast_ref::<T>() }
    pub fn type_name(&self) -> &'static str { self.type_name }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>", self.type_name)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.inner, &other.inner) }
}

// ------------------------------ Accessors -------------------------------- //

impl Value {
    /// Host-style type name used in `InvalidType` messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_nan() => "nan",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Blob(_) => "blob",
            Value::Instance(_) => "instance",
        }
    }

    pub fn is_undefined(&self) -> bool { matches!(self, Value::Undefined) }
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn as_str(&self) -> Option<&str> {
        match self { Value::String(s) => Some(s), _ => None }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self { Value::Number(n) => Some(*n), _ => None }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self { Value::Bool(b) => Some(*b), _ => None }
    }
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self { Value::Array(xs) => Some(xs), _ => None }
    }
    pub fn as_object(&self) -> Option<&Object> {
        match self { Value::Object(m) => Some(m), _ => None }
    }

    /// Property lookup on objects; `None` for every other variant.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|m| m.get(key))
    }

    pub fn object<K, I>(entries: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Lossy JSON view. Undefined object members are dropped, undefined and
    /// symbols elsewhere become null, dates become RFC 3339 strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Undefined | Value::Null | Value::Symbol(_) | Value::Instance(_) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => json_num_pref_i64(*n),
            Value::BigInt(n) => match i64::try_from(*n) {
                Ok(i) => Json::from(i),
                Err(_) => Json::String(n.to_string()),
            },
            Value::String(s) => Json::String(s.clone()),
            Value::Date(Some(d)) => Json::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Date(None) => Json::Null,
            Value::Array(xs) | Value::Set(xs) => Json::Array(xs.iter().map(Value::to_json).collect()),
            Value::Object(m) => Json::Object(
                m.iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Map(entries) => Json::Array(
                entries.iter().map(|(k, v)| Json::Array(vec![k.to_json(), v.to_json()])).collect(),
            ),
            Value::Blob(b) => Json::Array(b.data.iter().map(|x| Json::from(*x)).collect()),
        }
    }
}

// Prefer emitting integers when exact
pub(crate) fn json_num_pref_i64(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::Number(n) if !n.is_finite() => write!(f, "{n}"),
            Value::Symbol(s) => write!(f, "Symbol({})", s.description().unwrap_or("")),
            Value::Date(None) => f.write_str("Invalid Date"),
            Value::Instance(i) => write!(f, "[{}]", i.type_name()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

// ----------------------------- Conversions ------------------------------- //

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            Json::Object(m) => Value::Object(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self { Value::from(v.clone()) }
}

macro_rules! from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self { Value::Number(n as f64) }
        })*
    };
}

from_number!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}
impl From<i128> for Value {
    fn from(n: i128) -> Self { Value::BigInt(n) }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}
impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}
impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self { Value::Array(xs) }
}
impl From<Object> for Value {
    fn from(m: Object) -> Self { Value::Object(m) }
}
impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self { Value::Date(Some(d)) }
}
impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self { Value::Symbol(s) }
}
impl From<Blob> for Value {
    fn from(b: Blob) -> Self { Value::Blob(b) }
}
impl From<Instance> for Value {
    fn from(i: Instance) -> Self { Value::Instance(i) }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Undefined) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_keep_key_order() {
        let v = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn to_json_drops_undefined_members_and_prefers_integers() {
        let v = Value::object([("a", Value::Undefined), ("b", Value::Number(3.0))]);
        assert_eq!(v.to_json(), json!({"b": 3}));
        assert_eq!(Value::Number(1.5).to_json(), json!(1.5));
        assert_eq!(Value::Number(f64::NAN).to_json(), json!(null));
    }

    #[test]
    fn type_names_follow_host_conventions() {
        assert_eq!(Value::Number(f64::NAN).type_name(), "nan");
        assert_eq!(Value::from(json!([])).type_name(), "array");
        assert_eq!(Value::Undefined.type_name(), "undefined");
        assert_eq!(Value::BigInt(1).type_name(), "bigint");
    }

    #[test]
    fn instances_compare_by_identity() {
        let a = Instance::new(5u8);
        let b = Instance::new(5u8);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert!(a.is::<u8>());
        assert_eq!(a.downcast_ref::<u8>(), Some(&5));
    }

    #[test]
    fn symbols_are_unique() {
        assert_ne!(Symbol::new(Some("x")), Symbol::new(Some("x")));
    }
}
