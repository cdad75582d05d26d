//! Context-to-artifact pipeline and the agent-facing tool surface.
//!
//! [`ArtifactFormatter`] rewrites page context through a generative backend,
//! [`FileSink`] persists the result, and [`tools::ToolRegistry`] exposes the
//! `webscraping` and `save_file` operations by name.

pub mod formatter;
pub mod save;
pub mod sink;
pub mod tools;

pub use formatter::{ArtifactFormatter, FormatError, FormatterOptions};
pub use save::{ArtifactRequest, SaveOutcome, SaveStatus};
pub use sink::FileSink;
pub use tools::{ToolContext, ToolDefinition, ToolError, ToolRegistry};
