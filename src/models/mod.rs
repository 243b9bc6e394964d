//! Data models shared by sources and the driver.

pub mod common;
pub mod item;
pub mod stats;

// Re-exports for convenience
pub use common::ImageFormat;
pub use item::ItemRecord;
pub use stats::{Failure, RunOutcome, RunStatistics};
