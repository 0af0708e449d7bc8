//! Error types.
//!
//! `ParseError` is the aggregated validation failure. Everything else here is a
//! programmer or lookup error and is never produced by ordinary bad input.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::issue::{Issue, PathSegment};

/// Every issue found by one parse call, in detection order.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{}", join_issues(.issues))]
pub struct ParseError {
    issues: Vec<Issue>,
}

impl ParseError {
    pub fn new(issues: Vec<Issue>) -> Self { Self { issues } }
    pub fn issues(&self) -> &[Issue] { &self.issues }
    pub fn into_issues(self) -> Vec<Issue> { self.issues }
    pub fn first(&self) -> Option<&Issue> { self.issues.first() }

    /// Root-level messages plus messages grouped by first path segment.
    pub fn flatten(&self) -> FlattenedErrors {
        let mut out = FlattenedErrors::default();
        for issue in &self.issues {
            match issue.path.first() {
                None => out.form_errors.push(issue.message.clone()),
                Some(head) => out
                    .field_errors
                    .entry(head.to_string())
                    .or_default()
                    .push(issue.message.clone()),
            }
        }
        out
    }

    /// Issues whose path starts with `prefix`.
    pub fn issues_under<'a>(&'a self, prefix: &'a [PathSegment]) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| i.path.starts_with(prefix))
    }
}

fn join_issues(issues: &[Issue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlattenedErrors {
    pub form_errors: Vec<String>,
    pub field_errors: IndexMap<String, Vec<String>>,
}

/// Bad schema construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("discriminated union option {index} has no literal schema for discriminator '{discriminator}'")]
    NonLiteralDiscriminator { discriminator: String, index: usize },
    #[error("discriminator value {value} is used by more than one option of '{discriminator}'")]
    DuplicateDiscriminator { discriminator: String, value: String },
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("schema '{0}' not found in registry")]
    NotFound(String),
}

/// Umbrella error for the typed entry points.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("at path {path} → {message}")]
    Deserialize { path: String, message: String },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
