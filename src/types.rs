//! Core types for warc-clean

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cleaned page: its origin URI paired with normalized plain text
///
/// Invariants on `cleaned_text`: no HTML markup, no run of two or more
/// consecutive whitespace characters, no leading or trailing whitespace.
/// `cleaned_text` may be empty (a page whose visible content was entirely
/// stripped still counts as successfully cleaned).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedRecord {
    /// Origin URL of the page; empty when the record carried no target URI
    pub uri: String,
    /// Whitespace-normalized plain text extracted from the page
    pub cleaned_text: String,
}

impl CleanedRecord {
    /// Serialize this record as a single JSON object suitable for
    /// one-object-per-line persistence.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if JSON encoding fails.
    pub fn to_json_line(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Media element kind recognized by the cleaner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// `<img>` element
    Image,
    /// `<video>` element
    Video,
    /// `<audio>` element
    Audio,
}

impl MediaKind {
    /// Map an HTML tag name to its media kind, if it is a media tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "img" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            _ => None,
        }
    }

    /// Uppercase tag name used for the inline text token, e.g. `IMAGE` in
    /// `<IMAGE>https://example.com/pic.jpg</IMAGE>`
    pub fn token_tag(&self) -> &'static str {
        match self {
            MediaKind::Image => "IMAGE",
            MediaKind::Video => "VIDEO",
            MediaKind::Audio => "AUDIO",
        }
    }
}

/// Tally of one pipeline run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Records cleaned successfully (including empty-text pages)
    pub cleaned: u64,
    /// Records the cleaner reported as having no usable content
    pub absent: u64,
    /// Records dropped because cleaning them failed
    pub failed: u64,
    /// Records dropped before cleaning: non-response types, records the
    /// container could not decode, and records excluded by the URI filter
    pub skipped: u64,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

/// Event emitted during a pipeline run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A record was cleaned and collected
    RecordCleaned {
        /// Target URI of the cleaned record
        uri: String,
    },

    /// Cleaning one record failed; the record was dropped
    RecordFailed {
        /// Target URI of the failed record (may be empty)
        uri: String,
        /// Human-readable failure description
        error: String,
    },

    /// The run finished; all submitted work has completed
    RunCompleted {
        /// Final tally for the run
        stats: RunStats,
    },
}
