//! String format policies: a predicate, a failure message and a JSON-Schema
//! annotation, attached to a `StringSchema` rather than subclassing it.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value as Json, json};

// ------------------------------- Patterns -------------------------------- //

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("built-in pattern `{pattern}` failed to compile: {e}"))
}

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    rx(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
});
static UUID: Lazy<Regex> = Lazy::new(|| {
    rx(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
});
static URL: Lazy<Regex> = Lazy::new(|| rx(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$"));
static HOST_LABEL: Lazy<Regex> = Lazy::new(|| rx(r"^[A-Za-z0-9]([A-Za-z0-9\-]{0,61}[A-Za-z0-9])?$"));
static BASE64: Lazy<Regex> = Lazy::new(|| {
    rx(r"^([0-9A-Za-z+/]{4})*([0-9A-Za-z+/]{2}==|[0-9A-Za-z+/]{3}=)?$")
});
static HEX: Lazy<Regex> = Lazy::new(|| rx(r"^[0-9a-fA-F]+$"));
static JWT: Lazy<Regex> = Lazy::new(|| rx(r"^[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]*$"));
static CUID: Lazy<Regex> = Lazy::new(|| rx(r"^[cC][^\s\-]{8,}$"));
static CUID2: Lazy<Regex> = Lazy::new(|| rx(r"^[0-9a-z]+$"));
static ULID: Lazy<Regex> = Lazy::new(|| rx(r"^[0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{26}$"));
static NANOID: Lazy<Regex> = Lazy::new(|| rx(r"^[A-Za-z0-9_\-]{21}$"));
static EMOJI: Lazy<Regex> = Lazy::new(|| rx(r"^(\p{Extended_Pictographic}|\p{Emoji_Modifier}|[\x{1F1E6}-\x{1F1FF}]|\x{200D}|\x{FE0F})+$"));
static ISO_DATE: Lazy<Regex> = Lazy::new(|| rx(r"^\d{4}-\d{2}-\d{2}$"));
static ISO_TIME: Lazy<Regex> = Lazy::new(|| rx(r"^([01]\d|2[0-3]):[0-5]\d(:[0-5]\d(\.\d+)?)?$"));
static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    rx(r"^P(\d+W|(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?)$")
});

const HOSTNAME_MAX_LEN: usize = 253;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Email,
    Uuid,
    Url,
    Hostname,
    Ipv4,
    Ipv6,
    Base64,
    Hex,
    Jwt,
    Cuid,
    Cuid2,
    Ulid,
    Nanoid,
    Emoji,
    IsoDate,
    IsoTime,
    IsoDateTime,
    IsoDuration,
}

impl StringFormat {
    /// Short name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Uuid => "uuid",
            StringFormat::Url => "url",
            StringFormat::Hostname => "hostname",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
            StringFormat::Base64 => "base64",
            StringFormat::Hex => "hex",
            StringFormat::Jwt => "jwt",
            StringFormat::Cuid => "cuid",
            StringFormat::Cuid2 => "cuid2",
            StringFormat::Ulid => "ulid",
            StringFormat::Nanoid => "nanoid",
            StringFormat::Emoji => "emoji",
            StringFormat::IsoDate => "date",
            StringFormat::IsoTime => "time",
            StringFormat::IsoDateTime => "datetime",
            StringFormat::IsoDuration => "duration",
        }
    }

    pub fn message(self) -> String { format!("Invalid {}", self.label()) }

    pub fn is_valid(self, s: &str) -> bool {
        match self {
            StringFormat::Email => EMAIL.is_match(s),
            StringFormat::Uuid => UUID.is_match(s),
            StringFormat::Url => URL.is_match(s),
            StringFormat::Hostname => {
                !s.is_empty() && s.len() <= HOSTNAME_MAX_LEN && s.split('.').all(|l| HOST_LABEL.is_match(l))
            }
            StringFormat::Ipv4 => Ipv4Addr::from_str(s).is_ok(),
            StringFormat::Ipv6 => Ipv6Addr::from_str(s).is_ok(),
            StringFormat::Base64 => BASE64.is_match(s),
            StringFormat::Hex => HEX.is_match(s),
            StringFormat::Jwt => JWT.is_match(s),
            StringFormat::Cuid => CUID.is_match(s),
            StringFormat::Cuid2 => CUID2.is_match(s),
            StringFormat::Ulid => ULID.is_match(s),
            StringFormat::Nanoid => NANOID.is_match(s),
            StringFormat::Emoji => EMOJI.is_match(s),
            StringFormat::IsoDate => ISO_DATE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            StringFormat::IsoTime => ISO_TIME.is_match(s),
            StringFormat::IsoDateTime => DateTime::parse_from_rfc3339(s).is_ok(),
            // bare "P" and a dangling "T" match the pattern but are not durations
            StringFormat::IsoDuration => s != "P" && !s.ends_with('T') && ISO_DURATION.is_match(s),
        }
    }

    /// Keys merged into the string fragment.
    pub fn annotation(self) -> Json {
        match self {
            StringFormat::Email => json!({ "format": "email" }),
            StringFormat::Uuid => json!({ "format": "uuid" }),
            StringFormat::Url => json!({ "format": "uri" }),
            StringFormat::Hostname => json!({ "format": "hostname" }),
            StringFormat::Ipv4 => json!({ "format": "ipv4" }),
            StringFormat::Ipv6 => json!({ "format": "ipv6" }),
            StringFormat::Base64 => json!({ "contentEncoding": "base64" }),
            StringFormat::IsoDate => json!({ "format": "date" }),
            StringFormat::IsoTime => json!({ "format": "time" }),
            StringFormat::IsoDateTime => json!({ "format": "date-time" }),
            StringFormat::IsoDuration => json!({ "format": "duration" }),
            StringFormat::Emoji => json!({ "format": "emoji" }),
            StringFormat::Hex => json!({ "pattern": HEX.as_str() }),
            StringFormat::Jwt => json!({ "format": "jwt", "pattern": JWT.as_str() }),
            StringFormat::Cuid => json!({ "format": "cuid", "pattern": CUID.as_str() }),
            StringFormat::Cuid2 => json!({ "format": "cuid2", "pattern": CUID2.as_str() }),
            StringFormat::Ulid => json!({ "format": "ulid", "pattern": ULID.as_str() }),
            StringFormat::Nanoid => json!({ "format": "nanoid", "pattern": NANOID.as_str() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_values() {
        let cases = [
            (StringFormat::Email, "ada.lovelace+tag@example.co.uk"),
            (StringFormat::Uuid, "123e4567-e89b-12d3-a456-426614174000"),
            (StringFormat::Url, "https://example.com/a?b=c"),
            (StringFormat::Hostname, "api.example.com"),
            (StringFormat::Ipv4, "192.168.0.1"),
            (StringFormat::Ipv6, "::1"),
            (StringFormat::Base64, "aGVsbG8="),
            (StringFormat::Hex, "deadBEEF"),
            (StringFormat::Jwt, "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxIn0.sig"),
            (StringFormat::Cuid, "cjld2cjxh0000qzrmn831i7rn"),
            (StringFormat::Ulid, "01ARZ3NDEKTSV4RRFFQ69G5FAV"),
            (StringFormat::Nanoid, "V1StGXR8_Z5jdHi6B-myT"),
            (StringFormat::IsoDate, "2024-02-29"),
            (StringFormat::IsoTime, "23:59:59.123"),
            (StringFormat::IsoDateTime, "2024-01-01T00:00:00Z"),
            (StringFormat::IsoDuration, "P1Y2M3DT4H5M6.5S"),
        ];
        for (format, input) in cases {
            assert!(format.is_valid(input), "{format:?} should accept {input}");
        }
    }

    #[test]
    fn rejects_malformed_values() {
        let cases = [
            (StringFormat::Email, "not-an-email"),
            (StringFormat::Email, "a@b"),
            (StringFormat::Uuid, "123"),
            (StringFormat::Url, "example.com"),
            (StringFormat::Hostname, "-bad-.com"),
            (StringFormat::Ipv4, "256.0.0.1"),
            (StringFormat::Ipv6, "12345::"),
            (StringFormat::Base64, "abc"),
            (StringFormat::Hex, "xyz"),
            (StringFormat::IsoDate, "2023-02-29"),
            (StringFormat::IsoTime, "24:00"),
            (StringFormat::IsoDateTime, "yesterday"),
            (StringFormat::IsoDuration, "P"),
            (StringFormat::IsoDuration, "P1DT"),
        ];
        for (format, input) in cases {
            assert!(!format.is_valid(input), "{format:?} should reject {input}");
        }
    }
}
