//! Archive record model
//!
//! An [`ArchiveRecord`] is one already-decoded entry of a web-archive
//! container: a record type, header metadata, and a body. The core consumes
//! each record exactly once and never mutates it; how the bytes were
//! acquired is the record source's concern.

use chrono::{DateTime, Utc};

/// Name of the header carrying the captured page's origin URL
pub const TARGET_URI_HEADER: &str = "WARC-Target-URI";

/// Name of the header carrying the capture timestamp
pub const DATE_HEADER: &str = "WARC-Date";

/// Archive record type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// Captured HTTP response (the only type the pipeline cleans)
    Response,
    /// Captured HTTP request
    Request,
    /// Metadata about another record
    Metadata,
    /// Container-level information record
    Warcinfo,
    /// Directly harvested resource
    Resource,
    /// Revisit of previously captured content
    Revisit,
    /// Alternative rendition of another record
    Conversion,
    /// Continuation of a segmented record
    Continuation,
    /// Any record type not covered above
    Other(String),
}

impl RecordKind {
    /// Parse a record-type header value, case-insensitively
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "response" => RecordKind::Response,
            "request" => RecordKind::Request,
            "metadata" => RecordKind::Metadata,
            "warcinfo" => RecordKind::Warcinfo,
            "resource" => RecordKind::Resource,
            "revisit" => RecordKind::Revisit,
            "conversion" => RecordKind::Conversion,
            "continuation" => RecordKind::Continuation,
            other => RecordKind::Other(other.to_string()),
        }
    }

    /// Canonical lowercase name of this record type
    pub fn as_str(&self) -> &str {
        match self {
            RecordKind::Response => "response",
            RecordKind::Request => "request",
            RecordKind::Metadata => "metadata",
            RecordKind::Warcinfo => "warcinfo",
            RecordKind::Resource => "resource",
            RecordKind::Revisit => "revisit",
            RecordKind::Conversion => "conversion",
            RecordKind::Continuation => "continuation",
            RecordKind::Other(name) => name,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// One already-decoded archive record
#[derive(Clone, Debug)]
pub struct ArchiveRecord {
    /// Record type
    pub kind: RecordKind,
    /// Header name/value pairs, looked up case-insensitively by name
    pub headers: Vec<(String, String)>,
    /// Record payload; for response records this is the HTTP body with the
    /// HTTP header block already stripped
    pub body: Vec<u8>,
}

impl ArchiveRecord {
    /// Create a record from its parts
    pub fn new(kind: RecordKind, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            kind,
            headers,
            body,
        }
    }

    /// Create a response record with the given target URI and body
    ///
    /// Convenience constructor for embedders and tests that assemble record
    /// sequences in memory.
    pub fn response(uri: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(
            RecordKind::Response,
            vec![(TARGET_URI_HEADER.to_string(), uri.into())],
            body.into(),
        )
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The record's target URI, or the empty string when absent
    pub fn target_uri(&self) -> &str {
        self.header(TARGET_URI_HEADER).unwrap_or("")
    }

    /// The record's capture timestamp, when present and well-formed
    pub fn capture_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.header(DATE_HEADER)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }
}
