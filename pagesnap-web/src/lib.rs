//! Page snapshot extraction.
//!
//! - Main-content detection over a parsed document (`region`)
//! - Secondary structural views and noise removal (`structure`)
//! - The immutable [`Snapshot`] record and its text rendering (`snapshot`)
//! - Bounded retry around load/challenge/extract (`retry`)
//! - Broad selector recovery when a snapshot comes back weak (`fallback`)

pub mod fallback;
pub mod region;
pub mod retry;
pub mod snapshot;
pub mod structure;
mod text;

pub use fallback::FallbackContextBuilder;
pub use region::ContentRegionSelector;
pub use retry::{RetryPolicy, Sleeper, SnapshotError, SnapshotRetryController, TokioSleeper};
pub use snapshot::Snapshot;
pub use structure::{PageStructure, StructuralExtractor};
