//! Record sources
//!
//! The pipeline consumes archive records through the [`RecordSource`] seam:
//! anything that can hand over a forward-only sequence of decoded records.
//! [`WarcFileSource`] adapts a WARC container on disk; in-memory vectors
//! implement the trait directly for embedders and tests.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use warc::{WarcHeader, WarcReader};

use crate::error::{Error, Result};
use crate::record::{ArchiveRecord, DATE_HEADER, RecordKind, TARGET_URI_HEADER};

/// Supplier of a decoded archive record sequence
///
/// Failing to produce the iterator at all is the only fatal error of a run.
/// Individual items may still be `Err` (a record the container could not
/// decode), and the pipeline skips those with a warning.
pub trait RecordSource {
    /// Hand over the record sequence
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying container cannot be opened or
    /// decoded at all.
    fn records(self) -> Result<impl Iterator<Item = Result<ArchiveRecord>> + Send>;
}

impl RecordSource for Vec<ArchiveRecord> {
    fn records(self) -> Result<impl Iterator<Item = Result<ArchiveRecord>> + Send> {
        Ok(self.into_iter().map(Ok))
    }
}

/// WARC container on disk, optionally gzip-compressed
///
/// Decodes the whole container in a single-threaded pass before cleaning
/// starts; record bodies for a typical crawl segment fit in memory, and
/// decode throughput is dominated by the cleaning work that follows anyway.
pub struct WarcFileSource {
    path: PathBuf,
}

impl WarcFileSource {
    /// Reference a WARC file; `.gz` paths are read through a gzip decoder
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for WarcFileSource {
    fn records(self) -> Result<impl Iterator<Item = Result<ArchiveRecord>> + Send> {
        let records = if is_gzip(&self.path) {
            let mut reader = WarcReader::from_path_gzip(&self.path)
                .map_err(|e| Error::InvalidArchive(format!("{}: {e}", self.path.display())))?;
            drain_records(&mut reader)
        } else {
            let mut reader = WarcReader::from_path(&self.path)
                .map_err(|e| Error::InvalidArchive(format!("{}: {e}", self.path.display())))?;
            drain_records(&mut reader)
        };
        Ok(records.into_iter())
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Stream every record out of the reader, converting each into an
/// [`ArchiveRecord`] and mapping undecodable records to per-item errors.
fn drain_records<R: BufRead>(reader: &mut WarcReader<R>) -> Vec<Result<ArchiveRecord>> {
    let mut records = Vec::new();
    let mut stream = reader.stream_records();

    while let Some(item) = stream.next_item() {
        let raw = match item {
            Ok(raw) => raw,
            Err(e) => {
                records.push(Err(Error::InvalidArchive(format!(
                    "undecodable record: {e}"
                ))));
                continue;
            }
        };

        let kind = raw
            .header(WarcHeader::WarcType)
            .map(|value| RecordKind::parse(&value))
            .unwrap_or(RecordKind::Other(String::new()));

        let mut headers = Vec::new();
        if let Some(uri) = raw.header(WarcHeader::TargetURI) {
            headers.push((TARGET_URI_HEADER.to_string(), uri.to_string()));
        }
        if let Some(date) = raw.header(WarcHeader::Date) {
            headers.push((DATE_HEADER.to_string(), date.to_string()));
        }

        let buffered = match raw.into_buffered() {
            Ok(buffered) => buffered,
            Err(e) => {
                records.push(Err(Error::InvalidArchive(format!(
                    "undecodable record body: {e}"
                ))));
                continue;
            }
        };

        // Response record bodies are stored HTTP messages; keep only the
        // payload past the header block.
        let body = if kind == RecordKind::Response {
            http_payload(buffered.body()).to_vec()
        } else {
            buffered.body().to_vec()
        };

        records.push(Ok(ArchiveRecord::new(kind, headers, body)));
    }

    records
}

/// Slice off the HTTP header block at the first blank line
///
/// Falls back to bare-LF separators, and to the whole body when no blank
/// line exists at all.
fn http_payload(body: &[u8]) -> &[u8] {
    if let Some(pos) = body.windows(4).position(|window| window == b"\r\n\r\n") {
        return &body[pos + 4..];
    }
    if let Some(pos) = body.windows(2).position(|window| window == b"\n\n") {
        return &body[pos + 2..];
    }
    body
}
