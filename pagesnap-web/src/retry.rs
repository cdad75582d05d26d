//! Bounded retry around a single load → inspect → extract pass.
//!
//! ```text
//! Loading ──idle──▶ title has "cloudflare" ──▶ ChallengeWait ──sleep──▶ Loading
//!    │                       │
//!    │ timeout               └──otherwise──▶ Extracted ──▶ Done
//!    ▼
//! TimeoutExit ──▶ Done (degraded snapshot, never retried)
//! ```
//!
//! Any other failure backs off for a random interval and re-enters `Loading`
//! until the attempt budget is spent, then propagates.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pagesnap_config::ExtractionSettings;
use pagesnap_drivers::{PageError, PageHandle};
use rand::Rng;
use scraper::Html;

use crate::region::ContentRegionSelector;
use crate::snapshot::Snapshot;
use crate::structure::StructuralExtractor;

const CHALLENGE_MARKER: &str = "cloudflare";

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("challenge page still present after {attempts} attempts")]
    ChallengeNotCleared { attempts: u32 },

    #[error(transparent)]
    Page(#[from] PageError),
}

/// Knobs for [`SnapshotRetryController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub load_timeout: Duration,
    pub challenge_wait: Duration,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            load_timeout: Duration::from_secs(10),
            challenge_wait: Duration::from_secs(5),
            backoff_min: Duration::from_secs(1),
            backoff_max: Duration::from_secs(3),
        }
    }
}

impl From<&ExtractionSettings> for RetryPolicy {
    fn from(settings: &ExtractionSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            load_timeout: Duration::from_millis(settings.load_timeout_ms),
            challenge_wait: Duration::from_millis(settings.challenge_wait_ms),
            backoff_min: Duration::from_millis(settings.backoff_min_ms),
            backoff_max: Duration::from_millis(settings.backoff_max_ms),
        }
    }
}

impl RetryPolicy {
    /// Uniform in `[backoff_min, backoff_max)`.
    fn jitter(&self) -> Duration {
        let min = self.backoff_min.as_millis() as u64;
        let max = self.backoff_max.as_millis() as u64;
        if max <= min {
            return self.backoff_min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..max))
    }
}

/// Suspends the retry loop between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// One pass through `Loading`; discarded once the next state is known.
#[derive(Debug, Clone)]
struct ExtractionAttempt {
    index: u32,
    title: Option<String>,
}

enum State {
    Loading(ExtractionAttempt),
    ChallengeWait(ExtractionAttempt),
    Backoff(ExtractionAttempt, PageError),
    TimeoutExit,
    Extracted(Snapshot),
}

pub struct SnapshotRetryController {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    selector: ContentRegionSelector,
    extractor: StructuralExtractor,
}

impl SnapshotRetryController {
    pub fn new(policy: RetryPolicy, extractor: StructuralExtractor) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
            selector: ContentRegionSelector::new(),
            extractor,
        }
    }

    pub fn from_settings(settings: &ExtractionSettings) -> Self {
        Self::new(
            RetryPolicy::from(settings),
            StructuralExtractor::new(settings.ignored_classes.iter().cloned()),
        )
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Produce a snapshot of the page, retrying challenges and transient
    /// failures within the attempt budget.
    pub async fn capture(&self, page: &mut dyn PageHandle) -> Result<Snapshot, SnapshotError> {
        let mut state = State::Loading(ExtractionAttempt {
            index: 1,
            title: None,
        });

        loop {
            state = match state {
                State::Loading(attempt) => self.load(&*page, attempt).await,

                State::ChallengeWait(attempt) => {
                    tracing::info!(
                        target: "snapshot.retry",
                        attempt = attempt.index,
                        title = attempt.title.as_deref().unwrap_or_default(),
                        "challenge page detected"
                    );
                    if attempt.index >= self.policy.max_attempts {
                        return Err(SnapshotError::ChallengeNotCleared {
                            attempts: attempt.index,
                        });
                    }
                    self.sleeper.sleep(self.policy.challenge_wait).await;
                    State::Loading(next(attempt))
                }

                State::Backoff(attempt, cause) => {
                    if attempt.index >= self.policy.max_attempts {
                        tracing::warn!(
                            target: "snapshot.retry",
                            attempts = attempt.index,
                            error = %cause,
                            "extraction failed, giving up"
                        );
                        return Err(SnapshotError::Page(cause));
                    }
                    let delay = self.policy.jitter();
                    tracing::debug!(
                        target: "snapshot.retry",
                        attempt = attempt.index,
                        delay_ms = delay.as_millis() as u64,
                        error = %cause,
                        "extraction failed, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                    State::Loading(next(attempt))
                }

                State::TimeoutExit => {
                    let url = page.current_url().await.unwrap_or_default();
                    tracing::info!(target: "snapshot.retry", %url, "page never settled");
                    return Ok(Snapshot::timed_out(url));
                }

                State::Extracted(snapshot) => {
                    tracing::debug!(
                        target: "snapshot.retry",
                        url = %snapshot.url,
                        main_chars = snapshot.main_content.chars().count(),
                        "snapshot extracted"
                    );
                    return Ok(snapshot);
                }
            };
        }
    }

    async fn load(&self, page: &dyn PageHandle, mut attempt: ExtractionAttempt) -> State {
        let waited = tokio::time::timeout(
            self.policy.load_timeout,
            page.wait_for_network_idle(self.policy.load_timeout),
        )
        .await;
        match waited {
            Err(_) => return State::TimeoutExit,
            Ok(Err(e)) => return failed(attempt, e),
            Ok(Ok(())) => {}
        }

        let title = match page.title().await {
            Ok(title) => title,
            Err(e) => return failed(attempt, e),
        };
        if title.to_lowercase().contains(CHALLENGE_MARKER) {
            attempt.title = Some(title);
            return State::ChallengeWait(attempt);
        }

        let url = match page.current_url().await {
            Ok(url) => url,
            Err(e) => return failed(attempt, e),
        };
        let markup = match page.full_markup().await {
            Ok(markup) => markup,
            Err(e) => return failed(attempt, e),
        };

        State::Extracted(self.build(url, title, &markup))
    }

    fn build(&self, url: String, title: String, markup: &str) -> Snapshot {
        let doc = Html::parse_document(markup);
        // region detection sees the tree before noise removal
        let main_content = self.selector.select(&doc);
        let structure = self.extractor.extract(&doc, &url);
        Snapshot::new(url, title, main_content, structure)
    }
}

fn next(attempt: ExtractionAttempt) -> ExtractionAttempt {
    ExtractionAttempt {
        index: attempt.index + 1,
        title: None,
    }
}

fn failed(attempt: ExtractionAttempt, error: PageError) -> State {
    if error.is_timeout() {
        State::TimeoutExit
    } else {
        State::Backoff(attempt, error)
    }
}
