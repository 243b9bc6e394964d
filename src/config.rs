//! Defaults and validated settings for the fetcher and the driver.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SetupError;

/// Default root directory for downloaded images.
pub const DEFAULT_OUTPUT_DIR: &str = "imagenes_obras";

/// Default pause between two identifiers, in seconds.
pub const DEFAULT_DELAY_SECS: f64 = 1.0;

/// Default per-request network timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Default first identifier.
pub const DEFAULT_START_ID: i64 = 0;

/// Default last identifier (inclusive).
pub const DEFAULT_END_ID: i64 = 2000;

/// User agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Bound on every request, headers and body included.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Build a config from a timeout given in seconds.
    pub fn with_timeout_secs(secs: f64) -> Result<Self, SetupError> {
        if secs <= 0.0 {
            return Err(SetupError::InvalidTimeout(secs));
        }
        let timeout =
            Duration::try_from_secs_f64(secs).map_err(|_| SetupError::InvalidTimeout(secs))?;
        Ok(Self {
            timeout,
            ..Self::default()
        })
    }
}

/// Settings for one driver run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root directory; images land in `<output_root>/<artist>/<title>.<ext>`.
    pub output_root: PathBuf,
    /// Pause between two identifiers.
    pub delay: Duration,
    /// Count an item as downloaded when its destination already exists.
    pub check_existing_files: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            check_existing_files: true,
        }
    }
}

impl RunOptions {
    /// Create options for `output_root` with the default delay.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    /// Set the delay from a value in seconds, rejecting negative, non-finite
    /// and unrepresentable values.
    pub fn with_delay_secs(mut self, secs: f64) -> Result<Self, SetupError> {
        self.delay =
            Duration::try_from_secs_f64(secs).map_err(|_| SetupError::InvalidDelay(secs))?;
        Ok(self)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_check_existing_files(mut self, check: bool) -> Self {
        self.check_existing_files = check;
        self
    }
}

/// Inclusive, non-empty range of numeric identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    start: u64,
    end: u64,
}

impl IdRange {
    /// Validate `[start, end]`; both ends must be non-negative and `start <= end`.
    pub fn new(start: i64, end: i64) -> Result<Self, SetupError> {
        if start < 0 || start > end {
            return Err(SetupError::InvalidRange { start, end });
        }
        Ok(Self {
            start: start as u64,
            end: end as u64,
        })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of identifiers in the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }
}
