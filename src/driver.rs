//! Extraction driver.
//!
//! The driver walks an identifier range in ascending order, asks the active
//! [`Source`] for each item, saves its image under
//! `<output_root>/<artist>/<title>.<ext>` and keeps the run's statistics.
//!
//! Per-item failures never abort a run: they are recorded and the loop moves
//! on. The only errors [`Driver::run`] returns are setup errors detected
//! before the first request.

use std::path::{Path, PathBuf};

use tokio::fs;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{IdRange, RunOptions};
use crate::error::{DownloadError, SetupError};
use crate::fetcher::{DownloadedFile, Fetcher};
use crate::models::{ImageFormat, ItemRecord, RunOutcome, RunStatistics};
use crate::sources::Source;

/// File created and removed to check that the output root is writable.
const WRITE_PROBE: &str = ".museo-dl-write-test";

/// Lifecycle of one driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Interrupted,
}

/// What happened to one item's image.
#[derive(Debug)]
enum Saved {
    Downloaded(DownloadedFile),
    AlreadyPresent(PathBuf),
}

/// Sequential extraction loop over one source.
///
/// # Example
///
/// ```rust,no_run
/// use museo_dl::{Driver, Fetcher, FetcherConfig, IdRange, RunOptions, SourceRegistry};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = Fetcher::new(&FetcherConfig::default())?;
///     let source = SourceRegistry::builtin().build("bellasartes", fetcher.clone())?;
///
///     let mut driver = Driver::new(source.as_ref(), fetcher, RunOptions::new("obras"));
///     let stats = driver.run(IdRange::new(100, 110)?).await?;
///     println!("{}", stats);
///     Ok(())
/// }
/// ```
pub struct Driver<'a> {
    source: &'a dyn Source,
    fetcher: Fetcher,
    options: RunOptions,
    cancel: CancellationToken,
    state: RunState,
}

impl<'a> Driver<'a> {
    pub fn new(source: &'a dyn Source, fetcher: Fetcher, options: RunOptions) -> Self {
        Self {
            source,
            fetcher,
            options,
            cancel: CancellationToken::new(),
            state: RunState::Idle,
        }
    }

    /// Stop the run when `token` is cancelled.
    ///
    /// Cancellation is checked between items and during the delay; an item
    /// already in progress always finishes.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that interrupts this driver's run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Process every identifier in `range`.
    ///
    /// Returns the statistics of the run, whether it completed or was
    /// interrupted. Fails only if the output root is unusable.
    pub async fn run(&mut self, range: IdRange) -> Result<RunStatistics, SetupError> {
        prepare_output_root(&self.options.output_root).await?;

        info!(
            "Starting extraction from {} from ID {} to {}",
            self.source.name(),
            range.start(),
            range.end()
        );
        info!("Delay between requests: {:?}", self.options.delay);
        info!("Output directory: {}", self.options.output_root.display());

        self.state = RunState::Running;
        let mut stats = RunStatistics::new();

        for id in range.iter() {
            if self.cancel.is_cancelled() {
                stats.outcome = RunOutcome::Interrupted;
                break;
            }

            self.process_item(&id.to_string(), &mut stats).await;

            if self.cancel.is_cancelled() {
                stats.outcome = RunOutcome::Interrupted;
                break;
            }

            if id < range.end() && !self.pause().await {
                stats.outcome = RunOutcome::Interrupted;
                break;
            }
        }

        self.state = match stats.outcome {
            RunOutcome::Completed => RunState::Completed,
            RunOutcome::Interrupted => {
                info!("Extraction interrupted after {} items", stats.attempted);
                RunState::Interrupted
            }
        };

        Ok(stats)
    }

    /// Sleep for the configured delay. Returns false if cancelled meanwhile.
    async fn pause(&self) -> bool {
        if self.options.delay.is_zero() {
            return true;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.options.delay) => true,
        }
    }

    async fn process_item(&self, identifier: &str, stats: &mut RunStatistics) {
        let record = match self.source.extract_item_info(identifier).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("[{}] Not found", identifier);
                stats.record_skip();
                return;
            }
            Err(e) => {
                warn!("[{}] Extraction failed: {}", identifier, e);
                stats.record_failure(identifier, e.to_string());
                return;
            }
        };

        info!(
            "Found [{}]: {} - {}",
            identifier,
            record.display_title(),
            record.display_artist()
        );
        for detail in &record.details {
            debug!("[{}]   {}", identifier, detail);
        }

        let Some(image_url) = record.image_url.as_deref() else {
            info!("[{}] No image available, skipping", identifier);
            stats.record_skip();
            return;
        };

        match self.save_image(&record, image_url).await {
            Ok(Saved::Downloaded(file)) => {
                info!(
                    "[{}] Downloaded {} ({} bytes)",
                    identifier,
                    file.path.display(),
                    file.size
                );
                stats.record_success();
            }
            Ok(Saved::AlreadyPresent(path)) => {
                debug!("[{}] Already present: {}", identifier, path.display());
                stats.record_success();
            }
            Err(e) => {
                warn!("[{}] Download failed: {}", identifier, e);
                stats.record_failure(identifier, e.to_string());
            }
        }
    }

    /// Save the record's image, choosing the extension from the URL or,
    /// failing that, from the response `Content-Type`.
    async fn save_image(&self, record: &ItemRecord, url: &str) -> Result<Saved, DownloadError> {
        let root = self.options.output_root.as_path();

        if let Some(format) = ImageFormat::from_url(url) {
            let destination = record.destination(root, format);
            if self.options.check_existing_files && file_exists(&destination).await {
                return Ok(Saved::AlreadyPresent(destination));
            }
            return self
                .fetcher
                .download_binary(url, &destination)
                .await
                .map(Saved::Downloaded);
        }

        if self.options.check_existing_files {
            for format in ImageFormat::ALL {
                let candidate = record.destination(root, format);
                if file_exists(&candidate).await {
                    return Ok(Saved::AlreadyPresent(candidate));
                }
            }
        }

        self.fetcher
            .download_binary_with(url, |content_type| {
                let format = content_type
                    .and_then(ImageFormat::from_content_type)
                    .unwrap_or_default();
                record.destination(root, format)
            })
            .await
            .map(Saved::Downloaded)
    }
}

/// Unreadable metadata counts as absent; the download then reports the error.
async fn file_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Create the output root and check that files can be written in it.
pub async fn prepare_output_root(root: &Path) -> Result<(), SetupError> {
    let not_writable = |source| SetupError::OutputNotWritable {
        path: root.to_path_buf(),
        source,
    };

    fs::create_dir_all(root).await.map_err(not_writable)?;

    let probe = root.join(WRITE_PROBE);
    drop(fs::File::create(&probe).await.map_err(not_writable)?);
    fs::remove_file(&probe).await.map_err(not_writable)?;

    Ok(())
}
