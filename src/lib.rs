//! # warc-clean
//!
//! Concurrent web-archive HTML-to-text cleaning library.
//!
//! warc-clean ingests a web-archive container (a sequential log of captured
//! HTTP transactions), extracts each HTTP response's HTML body, and produces
//! a flat, plain-text representation of every page: non-content markup
//! stripped, embedded media rewritten into inline `<IMAGE>…</IMAGE>`-style
//! tokens, whitespace normalized.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Failure isolation** - A slow or malformed record never aborts a run;
//!   it is logged, counted, and dropped
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Order-insensitive** - Results arrive in completion order; sort after
//!   collection if order matters to you
//!
//! ## Quick Start
//!
//! ```no_run
//! use warc_clean::{Config, Pipeline, WarcFileSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = pipeline.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {event:?}");
//!         }
//!     });
//!
//!     let records = pipeline
//!         .run(WarcFileSource::new("crawl-segment.warc.gz"))
//!         .await?;
//!     for record in &records {
//!         println!("{}", record.to_json_line()?);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Record classification
pub mod classify;
/// HTML cleaning
pub mod cleaner;
/// Configuration types
pub mod config;
/// Concurrent dispatch of cleaning work
pub mod dispatcher;
/// Error types
pub mod error;
/// Pipeline orchestration
pub mod pipeline;
/// Archive record model
pub mod record;
/// Record sources
pub mod source;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use classify::is_response;
pub use cleaner::{Clean, CleanOutcome, HtmlCleaner};
pub use config::Config;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{CleanError, Error, Result};
pub use pipeline::Pipeline;
pub use record::{ArchiveRecord, RecordKind};
pub use source::{RecordSource, WarcFileSource};
pub use types::{CleanedRecord, Event, MediaKind, RunStats};
