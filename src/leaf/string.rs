use regex::Regex;
use serde_json::{Value as Json, json};

use super::format::StringFormat;
use crate::coerce;
use crate::error::SchemaError;
use crate::issue::{ErrorCode, Issue, ParseContext};
use crate::json_schema::RefTracker;
use crate::schema::{Meta, SchemaNode, SchemaType, node_common};
use crate::value::Value;

/// Input rewrites applied before any check, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rewrite {
    Trim,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    meta: Meta,
    coerce: bool,
    rewrites: Vec<Rewrite>,
    min: Option<usize>,
    max: Option<usize>,
    length: Option<usize>,
    pattern: Option<Regex>,
    includes: Option<String>,
    starts_with: Option<String>,
    ends_with: Option<String>,
    format: Option<StringFormat>,
}

impl StringSchema {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn coerced() -> Self { Self { coerce: true, ..Self::default() } }

    pub fn min(mut self, n: usize) -> Self { self.min = Some(n); self }
    pub fn max(mut self, n: usize) -> Self { self.max = Some(n); self }
    pub fn length(mut self, n: usize) -> Self { self.length = Some(n); self }
    pub fn nonempty(self) -> Self { self.min(1) }

    pub fn regex(mut self, pattern: Regex) -> Self { self.pattern = Some(pattern); self }

    /// Compiles `pattern`; a bad pattern is a construction error.
    pub fn pattern(self, pattern: &str) -> Result<Self, SchemaError> {
        let re = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.regex(re))
    }

    pub fn includes(mut self, needle: impl Into<String>) -> Self { self.includes = Some(needle.into()); self }
    pub fn starts_with(mut self, prefix: impl Into<String>) -> Self { self.starts_with = Some(prefix.into()); self }
    pub fn ends_with(mut self, suffix: impl Into<String>) -> Self { self.ends_with = Some(suffix.into()); self }

    pub fn trim(mut self) -> Self { self.rewrites.push(Rewrite::Trim); self }
    pub fn to_lower_case(mut self) -> Self { self.rewrites.push(Rewrite::Lower); self }
    pub fn to_upper_case(mut self) -> Self { self.rewrites.push(Rewrite::Upper); self }

    pub fn format(mut self, format: StringFormat) -> Self { self.format = Some(format); self }
    pub fn email(self) -> Self { self.format(StringFormat::Email) }
    pub fn uuid(self) -> Self { self.format(StringFormat::Uuid) }
    pub fn url(self) -> Self { self.format(StringFormat::Url) }
    pub fn hostname(self) -> Self { self.format(StringFormat::Hostname) }
    pub fn ipv4(self) -> Self { self.format(StringFormat::Ipv4) }
    pub fn ipv6(self) -> Self { self.format(StringFormat::Ipv6) }
    pub fn base64(self) -> Self { self.format(StringFormat::Base64) }
    pub fn hex(self) -> Self { self.format(StringFormat::Hex) }
    pub fn jwt(self) -> Self { self.format(StringFormat::Jwt) }
    pub fn cuid(self) -> Self { self.format(StringFormat::Cuid) }
    pub fn cuid2(self) -> Self { self.format(StringFormat::Cuid2) }
    pub fn ulid(self) -> Self { self.format(StringFormat::Ulid) }
    pub fn nanoid(self) -> Self { self.format(StringFormat::Nanoid) }
    pub fn emoji(self) -> Self { self.format(StringFormat::Emoji) }
    pub fn iso_date(self) -> Self { self.format(StringFormat::IsoDate) }
    pub fn iso_time(self) -> Self { self.format(StringFormat::IsoTime) }
    pub fn iso_datetime(self) -> Self { self.format(StringFormat::IsoDateTime) }
    pub fn iso_duration(self) -> Self { self.format(StringFormat::IsoDuration) }

    pub fn min_length(&self) -> Option<usize> { self.min.or(self.length) }
    pub fn max_length(&self) -> Option<usize> { self.max.or(self.length) }
    pub fn string_format(&self) -> Option<StringFormat> { self.format }

    fn rewrite(&self, mut s: String) -> String {
        for rw in &self.rewrites {
            s = match rw {
                Rewrite::Trim => s.trim().to_string(),
                Rewrite::Lower => s.to_lowercase(),
                Rewrite::Upper => s.to_uppercase(),
            };
        }
        s
    }

    fn check_length(&self, len: usize, ctx: &mut ParseContext) {
        if let Some(n) = self.min.filter(|n| len < *n) {
            too_small(ctx, format!("String must contain at least {n} character(s)"), n, len);
        }
        if let Some(n) = self.max.filter(|n| len > *n) {
            too_big(ctx, format!("String must contain at most {n} character(s)"), n, len);
        }
        if let Some(n) = self.length {
            let message = format!("String must contain exactly {n} character(s)");
            if len < n {
                too_small(ctx, message, n, len);
            } else if len > n {
                too_big(ctx, message, n, len);
            }
        }
    }

    fn check_content(&self, s: &str, ctx: &mut ParseContext) {
        if let Some(re) = self.pattern.as_ref().filter(|re| !re.is_match(s)) {
            ctx.report(Issue::new(ErrorCode::InvalidString, "Invalid string: does not match pattern").with_expected(re.as_str()));
        }
        if let Some(needle) = self.includes.as_ref().filter(|n| !s.contains(n.as_str())) {
            ctx.add_issue(ErrorCode::InvalidString, format!("Invalid input: must include \"{needle}\""));
        }
        if let Some(prefix) = self.starts_with.as_ref().filter(|p| !s.starts_with(p.as_str())) {
            ctx.add_issue(ErrorCode::InvalidString, format!("Invalid input: must start with \"{prefix}\""));
        }
        if let Some(suffix) = self.ends_with.as_ref().filter(|p| !s.ends_with(p.as_str())) {
            ctx.add_issue(ErrorCode::InvalidString, format!("Invalid input: must end with \"{suffix}\""));
        }
        if let Some(format) = self.format.filter(|f| !f.is_valid(s)) {
            ctx.report(Issue::new(ErrorCode::InvalidString, format.message()).with_expected(format.label()));
        }
    }
}

fn too_small(ctx: &mut ParseContext, message: String, bound: usize, actual: usize) {
    ctx.report(Issue::new(ErrorCode::TooSmall, message).with_expected(bound.to_string()).with_received(actual.to_string()));
}

fn too_big(ctx: &mut ParseContext, message: String, bound: usize, actual: usize) {
    ctx.report(Issue::new(ErrorCode::TooBig, message).with_expected(bound.to_string()).with_received(actual.to_string()));
}

impl SchemaNode for StringSchema {
    node_common!();

    fn schema_type(&self) -> SchemaType { SchemaType::String }

    fn validate(&self, input: Value, ctx: &mut ParseContext) -> Value {
        let input = if self.coerce { coerce::to_string(input) } else { input };
        let s = match input {
            Value::String(s) => self.rewrite(s),
            other => {
                ctx.invalid_type("string", &other);
                return other;
            }
        };
        self.check_length(s.chars().count(), ctx);
        self.check_content(&s, ctx);
        Value::String(s)
    }

    fn json_schema_body(&self, _refs: &mut RefTracker) -> Json {
        let mut out = json!({ "type": "string" });
        if let Some(n) = self.min_length() {
            out["minLength"] = json!(n);
        }
        if let Some(n) = self.max_length() {
            out["maxLength"] = json!(n);
        }
        let affix = match (&self.starts_with, &self.ends_with) {
            (Some(p), Some(s)) => Some(format!("^{}.*{}$", regex::escape(p), regex::escape(s))),
            (Some(p), None) => Some(format!("^{}", regex::escape(p))),
            (None, Some(s)) => Some(format!("{}$", regex::escape(s))),
            (None, None) => self.includes.as_ref().map(|n| regex::escape(n)),
        };
        if let Some(p) = self.pattern.as_ref().map(|re| re.as_str().to_string()).or(affix) {
            out["pattern"] = json!(p);
        }
        if let (Some(format), Json::Object(obj)) = (self.format, &mut out) {
            if let Json::Object(extra) = format.annotation() {
                obj.extend(extra);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Schema, string};

    fn codes(schema: &StringSchema, input: impl Into<Value>) -> Vec<ErrorCode> {
        match schema.safe_parse(input).error() {
            Some(e) => e.issues().iter().map(|i| i.code).collect(),
            None => vec![],
        }
    }

    #[test]
    fn last_setter_wins() {
        let err = string().min(3).min(10).parse("ab").unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].code, ErrorCode::TooSmall);
        assert_eq!(err.issues()[0].expected.as_deref(), Some("10"));
        assert!(err.issues()[0].message.contains("10"));
    }

    #[test]
    fn all_constraints_are_reported() {
        let s = string().max(3).starts_with("x").email();
        assert_eq!(
            codes(&s, "hello"),
            vec![ErrorCode::TooBig, ErrorCode::InvalidString, ErrorCode::InvalidString]
        );
    }

    #[test]
    fn wrong_type_skips_constraints() {
        let err = string().min(5).parse(42).unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].message, "Expected string, received number");
    }

    #[test]
    fn rewrites_run_before_checks_in_chain_order() {
        let s = string().trim().to_lower_case().email();
        assert_eq!(s.parse("  Ada@Example.COM ").unwrap(), Value::from("ada@example.com"));
        assert_eq!(string().trim().length(2).parse(" ab ").unwrap(), Value::from("ab"));
        assert_eq!(string().to_lower_case().to_upper_case().parse("aB").unwrap(), Value::from("AB"));
    }

    #[test]
    fn exact_length_picks_direction() {
        assert_eq!(codes(&string().length(3), "ab"), vec![ErrorCode::TooSmall]);
        assert_eq!(codes(&string().length(3), "abcd"), vec![ErrorCode::TooBig]);
        assert!(codes(&string().length(3), "abc").is_empty());
    }

    #[test]
    fn bad_pattern_is_a_construction_error() {
        assert!(matches!(string().pattern("("), Err(SchemaError::InvalidPattern { .. })));
        let s = string().pattern(r"^\d+$").unwrap();
        assert_eq!(codes(&s, "12a"), vec![ErrorCode::InvalidString]);
    }

    #[test]
    fn json_schema_carries_bounds_and_format() {
        assert_eq!(
            string().min(1).max(5).email().to_json_schema(),
            json!({"type": "string", "minLength": 1, "maxLength": 5, "format": "email"})
        );
        assert_eq!(
            string().starts_with("a.b").to_json_schema(),
            json!({"type": "string", "pattern": "^a\\.b"})
        );
    }
}
