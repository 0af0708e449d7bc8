//! Issue model and the per-invocation parse context.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidType,
    TooSmall,
    TooBig,
    InvalidString,
    InvalidEnumValue,
    InvalidLiteral,
    InvalidUnion,
    InvalidDate,
    MissingProperty,
    UnrecognizedKeys,
    Custom,
    InvalidIntersection,
    NotMultipleOf,
    NotFinite,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(k: &str) -> Self { PathSegment::Key(k.to_string()) }
}
impl From<String> for PathSegment {
    fn from(k: String) -> Self { PathSegment::Key(k) }
}
impl From<usize> for PathSegment {
    fn from(i: usize) -> Self { PathSegment::Index(i) }
}

/// Joins a path with dots: `items.0.name`.
pub fn dotted(path: &[PathSegment]) -> String {
    path.iter().map(ToString::to_string).collect::<Vec<_>>().join(".")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub code: ErrorCode,
    pub message: String,
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl Issue {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), path: Vec::new(), expected: None, received: None }
    }
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
    pub fn with_received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", dotted(&self.path), self.message)
        }
    }
}

// ------------------------------- Context --------------------------------- //

/// Mutable state for one parse invocation: the path stack and the issues
/// found so far, in detection order.
#[derive(Debug, Default)]
pub struct ParseContext {
    issues: Vec<Issue>,
    path: Vec<PathSegment>,
}

impl ParseContext {
    pub fn new() -> Self { Self::default() }

    /// Private context for a trial evaluation. Starts at the current path so
    /// nested issues stay well-formed, but shares no issues with `self`.
    pub fn isolated(&self) -> Self {
        Self { issues: Vec::new(), path: self.path.clone() }
    }

    pub fn path(&self) -> &[PathSegment] { &self.path }
    pub fn issues(&self) -> &[Issue] { &self.issues }
    pub fn issue_count(&self) -> usize { self.issues.len() }
    pub fn has_issues(&self) -> bool { !self.issues.is_empty() }
    pub fn into_issues(self) -> Vec<Issue> { self.issues }

    pub fn push(&mut self, segment: impl Into<PathSegment>) { self.path.push(segment.into()); }
    pub fn pop(&mut self) { self.path.pop(); }

    /// Runs `f` with `segment` pushed, popping it afterwards.
    pub fn with_segment<R>(&mut self, segment: impl Into<PathSegment>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push(segment);
        let out = f(self);
        self.pop();
        out
    }

    /// Records an issue at the current path.
    pub fn add_issue(&mut self, code: ErrorCode, message: impl Into<String>) {
        let issue = Issue::new(code, message).with_path(self.path.clone());
        self.issues.push(issue);
    }

    /// Records an issue at `current path + relative`.
    pub fn add_issue_at(&mut self, code: ErrorCode, message: impl Into<String>, relative: &[PathSegment]) {
        let mut path = self.path.clone();
        path.extend_from_slice(relative);
        self.issues.push(Issue::new(code, message).with_path(path));
    }

    /// Records a fully-built issue; an empty path is filled from the stack.
    pub fn report(&mut self, mut issue: Issue) {
        if issue.path.is_empty() {
            issue.path = self.path.clone();
        }
        self.issues.push(issue);
    }

    /// The common "wrong primitive type" issue.
    pub fn invalid_type(&mut self, expected: &str, received: &crate::Value) {
        let received = received.type_name();
        let issue = Issue::new(ErrorCode::InvalidType, format!("Expected {expected}, received {received}"))
            .with_expected(expected)
            .with_received(received);
        self.report(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_take_the_current_path() {
        let mut ctx = ParseContext::new();
        ctx.with_segment("items", |ctx| {
            ctx.with_segment(2usize, |ctx| ctx.add_issue(ErrorCode::Custom, "bad"));
        });
        ctx.add_issue(ErrorCode::Custom, "root");
        let issues = ctx.into_issues();
        assert_eq!(issues[0].path, vec![PathSegment::from("items"), PathSegment::from(2usize)]);
        assert!(issues[1].path.is_empty());
    }

    #[test]
    fn isolated_context_does_not_leak() {
        let mut ctx = ParseContext::new();
        ctx.push("a");
        let mut trial = ctx.isolated();
        trial.add_issue(ErrorCode::Custom, "nope");
        assert_eq!(trial.issues()[0].path, vec![PathSegment::from("a")]);
        assert!(!ctx.has_issues());
    }

    #[test]
    fn display_prefixes_dotted_path() {
        let issue = Issue::new(ErrorCode::TooSmall, "too small")
            .with_path(vec!["a".into(), 0usize.into(), "b".into()]);
        assert_eq!(issue.to_string(), "a.0.b: too small");
    }

    #[test]
    fn codes_serialize_snake_case() {
        let s = serde_json::to_string(&ErrorCode::InvalidIntersection).unwrap();
        assert_eq!(s, "\"invalid_intersection\"");
    }
}
