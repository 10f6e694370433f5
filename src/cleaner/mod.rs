//! HTML cleaning
//!
//! Turns one response record into a [`CleanedRecord`]. The transformation is
//! a fixed sequence of passes over the parsed document:
//! 1. Remove every `script`, `style`, `header`, `footer`, and `nav` element
//!    together with its subtree.
//! 2. Replace every `img`, `video`, and `audio` element with an inline text
//!    token of the form `<KIND>resolvedURL</KIND>`.
//! 3. Extract the remaining text in document order, treating tag boundaries
//!    as whitespace, and collapse every whitespace run to a single space.
//!
//! Parsing and tree manipulation are CPU-bound and run on the blocking pool.

use async_trait::async_trait;
use scraper::node::{Node, Text};
use scraper::{Html, Selector};

use crate::classify;
use crate::error::{CleanError, Error, Result};
use crate::record::ArchiveRecord;
use crate::types::{CleanedRecord, MediaKind};

/// Outcome of cleaning a single record
///
/// `Ok(Some(_))` is a cleaned record, `Ok(None)` marks a record that yielded
/// no usable content (Absent), and `Err(_)` is a per-record failure that the
/// dispatcher contains.
pub type CleanOutcome = std::result::Result<Option<CleanedRecord>, CleanError>;

/// A unit that turns one archive record into cleaned text
///
/// The production implementation is [`HtmlCleaner`]; embedders can inject
/// their own to customize the transformation.
#[async_trait]
pub trait Clean: Send + Sync {
    /// Clean one record
    ///
    /// Must consume the record exactly once and never touch shared mutable
    /// state; the dispatcher runs many cleans concurrently.
    async fn clean(&self, record: ArchiveRecord) -> CleanOutcome;
}

/// An embedded media reference derived from one media element
///
/// Ephemeral: it exists only between the media rewrite pass reading an
/// element and writing its replacement token.
#[derive(Clone, Debug, PartialEq, Eq)]
struct MediaReference {
    kind: MediaKind,
    resolved_url: String,
}

impl MediaReference {
    /// Resolve a media element's source against the page URI.
    ///
    /// The absolute-URL test is literal substring containment: a source
    /// containing `http` anywhere is used verbatim, anything else gets the
    /// page URI prepended unchanged (no path joining).
    fn resolve(kind: MediaKind, src: &str, page_uri: &str) -> Self {
        let resolved_url = if src.contains("http") {
            src.to_string()
        } else {
            format!("{page_uri}{src}")
        };
        Self { kind, resolved_url }
    }

    /// The inline text token that replaces the element in the document
    fn token(&self) -> String {
        format!(
            "<{tag}>{url}</{tag}>",
            tag = self.kind.token_tag(),
            url = self.resolved_url
        )
    }
}

/// HTML-to-text cleaner backed by a DOM parse of the record body
pub struct HtmlCleaner {
    strip: Selector,
    media: Selector,
}

impl HtmlCleaner {
    /// Elements removed wholesale, subtree included, before text extraction
    const STRIP_SELECTOR: &'static str = "script, style, header, footer, nav";

    /// Elements rewritten into inline media tokens
    const MEDIA_SELECTOR: &'static str = "img, video, audio";

    /// Create a cleaner, parsing its selectors once
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a selector fails to parse.
    pub fn new() -> Result<Self> {
        Ok(Self {
            strip: parse_selector(Self::STRIP_SELECTOR)?,
            media: parse_selector(Self::MEDIA_SELECTOR)?,
        })
    }
}

#[async_trait]
impl Clean for HtmlCleaner {
    async fn clean(&self, record: ArchiveRecord) -> CleanOutcome {
        // Defensive re-check; classification upstream should already have
        // excluded non-response records.
        if !classify::is_response(&record) {
            return Ok(None);
        }

        let uri = record.target_uri().to_string();
        let strip = self.strip.clone();
        let media = self.media.clone();

        let handle =
            tokio::task::spawn_blocking(move || clean_record(&strip, &media, record));
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(CleanError::Worker {
                uri,
                reason: e.to_string(),
            }),
        }
    }
}

/// Run the full cleaning pass over one record body
fn clean_record(strip: &Selector, media: &Selector, record: ArchiveRecord) -> CleanOutcome {
    let uri = record.target_uri().to_string();

    // The HTML parser itself recovers from arbitrary markup, so the
    // structural gate is text decoding.
    let html = String::from_utf8(record.body).map_err(|e| CleanError::Parse {
        uri: uri.clone(),
        reason: format!("body is not valid UTF-8: {e}"),
    })?;

    let mut document = Html::parse_document(&html);
    strip_elements(&mut document, strip);
    rewrite_media(&mut document, media, &uri);
    let cleaned_text = extract_text(&document);

    Ok(Some(CleanedRecord { uri, cleaned_text }))
}

/// Removal pass: detach every matching element and its subtree
fn strip_elements(document: &mut Html, selector: &Selector) {
    let ids: Vec<_> = document.select(selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Media rewrite pass: swap each media element for its inline text token
///
/// Elements inside a subtree the removal pass already detached are no longer
/// reachable from the root and emit no token. A media element nested inside
/// another media element gets its token inserted into the outer element's
/// detached subtree, which likewise keeps it out of the output.
fn rewrite_media(document: &mut Html, selector: &Selector, page_uri: &str) {
    let replacements: Vec<_> = document
        .select(selector)
        .filter_map(|el| {
            let kind = MediaKind::from_tag(el.value().name())?;
            let src = el.value().attr("src").unwrap_or("");
            Some((el.id(), MediaReference::resolve(kind, src, page_uri)))
        })
        .collect();

    for (id, media_ref) in replacements {
        if let Some(mut node) = document.tree.get_mut(id) {
            if node.parent().is_some() {
                node.insert_before(Node::Text(Text {
                    text: media_ref.token().as_str().into(),
                }));
            }
            node.detach();
        }
    }
}

/// Text extraction and whitespace normalization
///
/// Text nodes are gathered in document order; splitting each on whitespace
/// and rejoining with single spaces both separates adjacent tags and
/// collapses whitespace runs in one step.
fn extract_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Config {
        message: format!("invalid selector `{css}`: {e:?}"),
        key: None,
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
