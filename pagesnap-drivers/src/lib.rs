//! Driver layer for browser automation.
//!
//! The extraction pipeline only ever talks to a [`PageHandle`]; this crate
//! defines that seam and a WebDriver-backed implementation of it.
//!
//! - [`PageHandle`]: the four page capabilities snapshotting relies on
//! - [`snap_browser::driver::SnapDriver`]: WebDriver session wrapper
//! - [`snap_browser::page::SnapPage`]: [`PageHandle`] over a live session
//! - [`snap_browser::stealth`]: launch arguments, user-agent profiles, JS evasions
pub mod handle;
pub mod snap_browser;

pub use handle::{PageError, PageHandle};
