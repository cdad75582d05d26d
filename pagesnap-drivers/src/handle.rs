use async_trait::async_trait;
use std::time::Duration;

/// Failures surfaced by a [`PageHandle`].
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    /// The page did not settle within the allotted time.
    #[error("timed out after {0:?} waiting for the page")]
    Timeout(Duration),

    /// Anything else the browser reported.
    #[error("page driver error: {0}")]
    Driver(#[from] anyhow::Error),
}

impl PageError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PageError::Timeout(_))
    }
}

/// A rendered page the extraction pipeline can read from.
///
/// Implementations are expected to be exclusively borrowed for the duration of
/// one extraction call; callers never issue overlapping requests.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Resolve once the page has finished loading and network activity has
    /// gone quiet, or fail with [`PageError::Timeout`].
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), PageError>;

    async fn current_url(&self) -> Result<String, PageError>;

    async fn title(&self) -> Result<String, PageError>;

    /// The full serialized document markup.
    async fn full_markup(&self) -> Result<String, PageError>;
}
