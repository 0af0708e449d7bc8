use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::issue::{ErrorCode, Issue, ParseContext, PathSegment};
use crate::json_schema::{self, RefTracker};
use crate::schema::{DynSchema, Meta, Schema, SchemaNode, SchemaType, node_common};
use crate::value::Value;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type Refinement = Arc<dyn for<'a> Fn(&Value, &mut RefinementCtx<'a>) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct RefineOptions {
    pub message: String,
    /// Relative to the refined node.
    pub path: Vec<PathSegment>,
}

impl RefineOptions {
    pub fn new(message: impl Into<String>) -> Self { Self { message: message.into(), path: Vec::new() } }

    pub fn at(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }
}

// -------------------------------- Refine --------------------------------- //

/// Predicate over the validated value. Skipped when the inner schema failed.
#[derive(Clone)]
pub struct RefinedSchema {
    meta: Meta,
    inner: DynSchema,
    predicate: Predicate,
    options: RefineOptions,
}

impl RefinedSchema {
    pub fn new(
        inner: impl Schema,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        options: RefineOptions,
    ) -> Self {
        Self { meta: Meta::default(), inner: inner.into_dyn(), predicate: Arc::new(predicate), options }
    }

    pub fn inner(&self) -> &DynSchema { &self.inner }
}

impl fmt::Debug for RefinedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefinedSchema")
            .field("meta", &self.meta)
            .field("inner", &self.inner)
            .field("options", &self.options)
            .finish()
    }
}

impl SchemaNode for RefinedSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::Refined }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let before = ctx.issue_count();
        let out = self.inner.validate(input, ctx);
        if ctx.issue_count() == before && !(self.predicate)(&out) {
            ctx.add_issue_at(ErrorCode::Custom, self.options.message.clone(), &self.options.path);
        }
        out
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json { json_schema::emit(self.inner.node(), refs) }

    fn is_optional(&self) -> bool { self.inner.is_optional() }
}

// ----------------------------- Super-refine ------------------------------ //

/// Handle given to super-refinements for reporting any number of issues.
pub struct RefinementCtx<'a> {
    ctx: &'a mut ParseContext,
}

impl<'a> RefinementCtx<'a> {
    pub(crate) fn new(ctx: &'a mut ParseContext) -> Self { Self { ctx } }

    /// Path of the value being refined.
    pub fn path(&self) -> &[PathSegment] { self.ctx.path() }

    pub fn add_issue(&mut self, message: impl Into<String>) { self.ctx.add_issue(ErrorCode::Custom, message); }

    /// Custom issue at `relative` below the refined value.
    pub fn add_issue_at(&mut self, relative: Vec<PathSegment>, message: impl Into<String>) {
        self.ctx.add_issue_at(ErrorCode::Custom, message, &relative);
    }

    /// Fully-built issue; its path is relative to the refined value.
    pub fn report(&mut self, mut issue: Issue) {
        let mut path = self.ctx.path().to_vec();
        path.append(&mut issue.path);
        self.ctx.report(issue.with_path(path));
    }
}

#[derive(Clone)]
pub struct SuperRefinedSchema {
    meta: Meta,
    inner: DynSchema,
    refinement: Refinement,
}

impl SuperRefinedSchema {
    pub fn new(
        inner: impl Schema,
        refinement: impl Fn(&Value, &mut RefinementCtx<'_>) + Send + Sync + 'static,
    ) -> Self {
        Self { meta: Meta::default(), inner: inner.into_dyn(), refinement: Arc::new(refinement) }
    }

    pub fn inner(&self) -> &DynSchema { &self.inner }
}

impl fmt::Debug for SuperRefinedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperRefinedSchema").field("meta", &self.meta).field("inner", &self.inner).finish()
    }
}

impl SchemaNode for SuperRefinedSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::SuperRefined }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let before = ctx.issue_count();
        let out = self.inner.validate(input, ctx);
        if ctx.issue_count() == before {
            (self.refinement)(&out, &mut RefinementCtx::new(ctx));
        }
        out
    }

    fn json_schema_body(&self, refs: &mut RefTracker) -> Json { json_schema::emit(self.inner.node(), refs) }

    fn is_optional(&self) -> bool { self.inner.is_optional() }
}
