//! Configuration types for warc-clean

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fallback worker count when host parallelism cannot be determined
const DEFAULT_CONCURRENCY: usize = 4;

/// Pipeline configuration
///
/// All fields have working defaults; `Config::default()` runs out of the box.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of records cleaned concurrently (default: 0 = derive
    /// from host parallelism)
    #[serde(default)]
    pub concurrency: usize,

    /// Event broadcast channel capacity (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Optional regex; when set, only response records whose target URI
    /// matches are cleaned (default: no filtering)
    #[serde(default)]
    pub uri_include: Option<String>,
}

fn default_event_capacity() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 0,
            event_capacity: default_event_capacity(),
            uri_include: None,
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending key when
    /// `event_capacity` is zero or `uri_include` is not a valid regex.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(Error::Config {
                message: "event_capacity must be greater than zero".to_string(),
                key: Some("event_capacity".to_string()),
            });
        }

        if let Some(pattern) = &self.uri_include {
            regex::Regex::new(pattern).map_err(|e| Error::Config {
                message: format!("invalid uri_include pattern: {e}"),
                key: Some("uri_include".to_string()),
            })?;
        }

        Ok(())
    }

    /// Resolve the worker count: the configured value, or the host's
    /// available parallelism when set to zero.
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency > 0 {
            return self.concurrency;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_CONCURRENCY)
    }
}
