//! # museo-dl
//!
//! Download artwork images and metadata from museum collection websites,
//! organized by artist.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use museo_dl::{Driver, Fetcher, FetcherConfig, IdRange, RunOptions, SourceRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Fetcher::new(&FetcherConfig::default())?;
//!     let source = SourceRegistry::builtin().build("bellasartes", fetcher.clone())?;
//!
//!     // Images land in obras/<artist>/<title>.<ext>
//!     let options = RunOptions::new("obras").with_delay_secs(1.0)?;
//!     let mut driver = Driver::new(source.as_ref(), fetcher, options);
//!
//!     let stats = driver.run(IdRange::new(0, 50)?).await?;
//!     println!("{}", stats);
//!     Ok(())
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`Source`]: one implementation per museum, looked up in a [`SourceRegistry`]
//! - [`Fetcher`]: HTTP GET with a fixed timeout and atomic file downloads
//! - [`Driver`]: the sequential extraction loop and its [`RunStatistics`]
//! - [`sanitize`]: filesystem-safe artist and title names

pub mod config;
mod driver;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod sanitize;
pub mod sources;

pub use config::{FetcherConfig, IdRange, RunOptions};
pub use driver::{prepare_output_root, Driver, RunState};
pub use error::{DownloadError, ExtractionError, FetchError, SetupError};
pub use fetcher::{DownloadedFile, Fetcher};
pub use models::{Failure, ImageFormat, ItemRecord, RunOutcome, RunStatistics};
pub use sanitize::sanitize;
pub use sources::{Source, SourceEntry, SourceRegistry};
