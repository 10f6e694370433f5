//! Pipeline orchestration
//!
//! Thin composition of record source → classifier → dispatcher. The pipeline
//! owns the configuration, the cleaner, and the event channel; all of the
//! actual work happens in the components it wires together.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use regex::Regex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classify;
use crate::cleaner::{Clean, HtmlCleaner};
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::source::RecordSource;
use crate::types::{CleanedRecord, Event, RunStats};

/// Archive-to-text cleaning pipeline
///
/// See the crate-level documentation for a usage example.
pub struct Pipeline {
    cleaner: Arc<dyn Clean>,
    dispatcher: Dispatcher,
    event_tx: broadcast::Sender<Event>,
    uri_include: Option<Regex>,
}

impl Pipeline {
    /// Create a pipeline with the default HTML cleaner
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the config fails validation.
    pub fn new(config: Config) -> Result<Self> {
        let cleaner: Arc<dyn Clean> = Arc::new(HtmlCleaner::new()?);
        Self::with_cleaner(config, cleaner)
    }

    /// Create a pipeline around a custom cleaner implementation
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the config fails validation.
    pub fn with_cleaner(config: Config, cleaner: Arc<dyn Clean>) -> Result<Self> {
        config.validate()?;

        // validate() has already vetted the pattern.
        let uri_include = config
            .uri_include
            .as_deref()
            .and_then(|pattern| Regex::new(pattern).ok());

        let (event_tx, _) = broadcast::channel(config.event_capacity);
        let dispatcher = Dispatcher::new(config.effective_concurrency(), event_tx.clone());

        Ok(Self {
            cleaner,
            dispatcher,
            event_tx,
            uri_include,
        })
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Token that stops submission of further records when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.dispatcher.cancellation_token()
    }

    /// Run the pipeline over a record source and collect the cleaned records
    ///
    /// Non-response records are dropped silently, undecodable records are
    /// skipped with a warning, and per-record cleaning failures are contained
    /// by the dispatcher; all three are tallied into the [`RunStats`] emitted
    /// with [`Event::RunCompleted`]. Output order follows completion order,
    /// not input order.
    ///
    /// # Errors
    ///
    /// Returns an error only when the source fails to produce its record
    /// sequence at all.
    pub async fn run<S: RecordSource>(&self, source: S) -> Result<Vec<CleanedRecord>> {
        let started_at = Utc::now();
        let records = source.records()?;

        let skipped = Arc::new(AtomicU64::new(0));
        let skip_counter = Arc::clone(&skipped);
        let uri_include = self.uri_include.clone();

        let responses = records.filter_map(move |item| {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "skipping undecodable record");
                    skip_counter.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            };

            if !classify::is_response(&record) {
                skip_counter.fetch_add(1, Ordering::Relaxed);
                return None;
            }

            if let Some(filter) = &uri_include
                && !filter.is_match(record.target_uri())
            {
                debug!(uri = %record.target_uri(), "record excluded by uri filter");
                skip_counter.fetch_add(1, Ordering::Relaxed);
                return None;
            }

            Some(record)
        });

        let outcome = self
            .dispatcher
            .run(responses, Arc::clone(&self.cleaner))
            .await;

        let stats = RunStats {
            cleaned: outcome.cleaned,
            absent: outcome.absent,
            failed: outcome.failed,
            skipped: skipped.load(Ordering::Relaxed),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            cleaned = stats.cleaned,
            absent = stats.absent,
            failed = stats.failed,
            skipped = stats.skipped,
            "pipeline run complete"
        );
        self.event_tx.send(Event::RunCompleted { stats }).ok();

        Ok(outcome.records)
    }

    /// Sequentially clean up to `limit` records for a quick sample
    ///
    /// Single-threaded variant of [`run`] that examines at most `limit`
    /// records from the source, useful for eyeballing cleaning behavior on a
    /// large archive without processing all of it. Per-record isolation still
    /// applies; no events are emitted.
    ///
    /// # Errors
    ///
    /// Returns an error only when the source fails to produce its record
    /// sequence at all.
    ///
    /// [`run`]: Pipeline::run
    pub async fn run_sample<S: RecordSource>(
        &self,
        source: S,
        limit: usize,
    ) -> Result<Vec<CleanedRecord>> {
        let records = source.records()?;
        let mut cleaned = Vec::new();

        for (index, item) in records.take(limit).enumerate() {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    warn!(index, error = %e, "skipping undecodable record");
                    continue;
                }
            };
            if !classify::is_response(&record) {
                continue;
            }

            debug!(index, uri = %record.target_uri(), "cleaning sampled record");
            match self.cleaner.clean(record).await {
                Ok(Some(record)) => cleaned.push(record),
                Ok(None) => {}
                Err(e) => warn!(index, error = %e, "record cleaning failed, dropping record"),
            }
        }

        Ok(cleaned)
    }
}
