use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::{Value as Json, json};

use crate::issue::ParseContext;
use crate::json_schema::{self, ExpansionKey, RefTracker};
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::Value;

type Getter = Arc<dyn Fn() -> DynSchema + Send + Sync>;

/// Deferred schema. The getter runs at most once; clones share the resolved
/// schema.
#[derive(Clone)]
pub struct LazySchema {
    meta: Meta,
    getter: Getter,
    getter_key: Option<TypeId>,
    resolved: Arc<OnceCell<DynSchema>>,
}

impl LazySchema {
    pub fn new<S, F>(getter: F) -> Self
    where
        S: Schema,
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            meta: Meta::default(),
            getter: Arc::new(move || getter().into_dyn()),
            getter_key: (std::mem::size_of::<F>() == 0).then(TypeId::of::<F>),
            resolved: Arc::new(OnceCell::new()),
        }
    }

    pub fn resolve(&self) -> &DynSchema {
        self.resolved.get_or_init(|| {
            let schema = (self.getter)();
            tracing::debug!(schema_type = ?schema.schema_type(), name = ?schema.meta().name, "lazy schema resolved");
            schema
        })
    }

    pub fn is_resolved(&self) -> bool { self.resolved.get().is_some() }

    fn expansion_key(&self) -> ExpansionKey {
        match self.getter_key {
            Some(ty) => ExpansionKey::Type(ty),
            None => ExpansionKey::Getter(Arc::as_ptr(&self.getter) as *const () as usize),
        }
    }
}

impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySchema").field("meta", &self.meta).field("resolved", &self.is_resolved()).finish()
    }
}

impl SchemaNode for LazySchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Lazy }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value { self.resolve().validate(input, ctx) }

    // an unnamed cycle has no $defs entry to point at; it widens to `{}`
    fn json_schema_body(&self, refs: &mut RefTracker) -> Json {
        let key = self.expansion_key();
        if !refs.enter(key) {
            tracing::warn!("unnamed recursive schema emitted as an unconstrained fragment");
            return json!({});
        }
        let out = json_schema::emit(self.resolve().node(), refs);
        refs.leave(key);
        out
    }

    fn is_optional(&self) -> bool { self.resolve().is_optional() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::issue::PathSegment;
    use crate::{array, lazy, number, object, string};

    fn category() -> DynSchema {
        object().field("name", string()).field("subcategories", array(lazy(category))).into_dyn()
    }

    #[test]
    fn getter_runs_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let l = lazy(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            number()
        });
        assert!(!l.is_resolved());
        let copy = l.clone();
        assert!(l.is_valid(1));
        assert!(copy.is_valid(2));
        assert!(!l.is_valid("x"));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recursive_values_validate_at_depth() {
        let input = json!({
            "name": "root",
            "subcategories": [{"name": "a", "subcategories": [{"name": 5, "subcategories": []}]}]
        });
        let err = category().parse(input).unwrap_err();
        let path: Vec<PathSegment> =
            vec!["subcategories".into(), 0usize.into(), "subcategories".into(), 0usize.into(), "name".into()];
        assert_eq!(err.issues()[0].path, path);
    }

    fn deferred(s: DynSchema) -> LazySchema { lazy(move || s.clone()) }

    #[test]
    fn nested_capturing_getters_are_not_a_cycle() {
        let inner = deferred(object().field("name", string()).into_dyn());
        let outer = deferred(object().field("child", inner).into_dyn());
        let doc = outer.to_json_schema();
        assert_eq!(doc["properties"]["child"]["type"], json!("object"));
        assert_eq!(doc["properties"]["child"]["properties"]["name"], json!({"type": "string"}));
    }

    #[test]
    fn unnamed_cycles_still_emit() {
        let doc = category().to_json_schema();
        assert_eq!(doc["properties"]["subcategories"]["items"]["type"], json!("object"));
        assert_eq!(doc["properties"]["subcategories"]["items"]["properties"]["subcategories"]["items"], json!({}));
    }
}
