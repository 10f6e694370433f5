//! Concurrent dispatch of record cleaning
//!
//! Fans an already-filtered record sequence out to a bounded set of
//! concurrent cleaning units and collects the results. Each unit runs in its
//! own task, so a failure (including a panic) is contained to that one
//! record; results arrive in completion order, never input order.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cleaner::{Clean, CleanOutcome};
use crate::error::CleanError;
use crate::record::ArchiveRecord;
use crate::types::{CleanedRecord, Event};

/// Collected results of one dispatch run, with the per-run tally
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Successfully cleaned records, in completion order
    pub records: Vec<CleanedRecord>,
    /// Count of cleaned records (equals `records.len()`)
    pub cleaned: u64,
    /// Count of records the cleaner reported as Absent
    pub absent: u64,
    /// Count of records dropped because their cleaning unit failed
    pub failed: u64,
}

/// Bounded fan-out executor for record cleaning
pub struct Dispatcher {
    concurrency: usize,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
}

impl Dispatcher {
    /// Create a dispatcher with a fixed concurrency bound
    ///
    /// A bound of zero is clamped to one.
    pub fn new(concurrency: usize, event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops submission of further records when cancelled
    ///
    /// Units already in flight run to completion; the barrier in [`run`]
    /// still holds.
    ///
    /// [`run`]: Dispatcher::run
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Clean every record of the sequence concurrently and collect the results
    ///
    /// Submits each record as an independent unit of work, at most
    /// `concurrency` in flight at once. The submission loop drives the input
    /// iterator and may block on it; that is the accepted blocking point for
    /// slow record sources. Returns only after the whole sequence has been
    /// submitted and every submitted unit has completed.
    ///
    /// Per-unit failures are logged, emitted as [`Event::RecordFailed`], and
    /// excluded from the output; they never abort the run. No retries are
    /// attempted.
    pub async fn run<I>(&self, records: I, cleaner: Arc<dyn Clean>) -> DispatchOutcome
    where
        I: IntoIterator<Item = ArchiveRecord>,
        I::IntoIter: Send,
    {
        let cancel = self.cancel.clone();
        let submission = records
            .into_iter()
            .take_while(move |_| !cancel.is_cancelled());

        let outcomes: Vec<CleanOutcome> = stream::iter(submission)
            .map(|record| {
                let cleaner = Arc::clone(&cleaner);
                let event_tx = self.event_tx.clone();
                async move {
                    let uri = record.target_uri().to_string();

                    // A dedicated task per unit turns a panic into a join
                    // error instead of tearing down sibling units.
                    let outcome =
                        match tokio::spawn(async move { cleaner.clean(record).await }).await {
                            Ok(outcome) => outcome,
                            Err(e) => Err(CleanError::Worker {
                                uri: uri.clone(),
                                reason: e.to_string(),
                            }),
                        };

                    match &outcome {
                        Ok(Some(cleaned)) => {
                            event_tx
                                .send(Event::RecordCleaned {
                                    uri: cleaned.uri.clone(),
                                })
                                .ok();
                        }
                        Ok(None) => {
                            debug!(uri = %uri, "record yielded no usable content");
                        }
                        Err(e) => {
                            warn!(uri = %uri, error = %e, "record cleaning failed, dropping record");
                            event_tx
                                .send(Event::RecordFailed {
                                    uri,
                                    error: e.to_string(),
                                })
                                .ok();
                        }
                    }

                    outcome
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        tally_outcomes(outcomes)
    }
}

/// Fold per-unit outcomes into the collected records and tally
fn tally_outcomes(outcomes: Vec<CleanOutcome>) -> DispatchOutcome {
    let mut records = Vec::new();
    let mut absent: u64 = 0;
    let mut failed: u64 = 0;

    for outcome in outcomes {
        match outcome {
            Ok(Some(record)) => records.push(record),
            Ok(None) => absent += 1,
            Err(_) => failed += 1,
        }
    }

    DispatchOutcome {
        cleaned: records.len() as u64,
        absent,
        failed,
        records,
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
