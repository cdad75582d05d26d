use crate::handle::{PageError, PageHandle};
use crate::snap_browser::stealth::{evasion_scripts, StealthProfile, UserAgentProfile};
use anyhow::Result;
use async_trait::async_trait;
use fantoccini::Client;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long the resource count must stay flat before the network counts as idle.
const IDLE_WINDOW: Duration = Duration::from_millis(500);

const LOAD_PROBE: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

/// A live WebDriver page exposed as a [`PageHandle`].
pub struct SnapPage {
    pub(crate) client: Client,
    pub(crate) stealth_profile: StealthProfile,
    pub(crate) user_profile: UserAgentProfile,
}

impl SnapPage {
    pub fn new(
        client: Client,
        stealth_profile: StealthProfile,
        user_profile: UserAgentProfile,
    ) -> Self {
        Self {
            client,
            stealth_profile,
            user_profile,
        }
    }

    /// Navigate to `url` after a short human-like pause, then apply evasions.
    pub async fn goto(&mut self, url: &str) -> Result<()> {
        let pause = rand::thread_rng().gen_range(300..=1200);
        sleep(Duration::from_millis(pause)).await;

        self.client.goto(url).await?;
        for script in evasion_scripts(self.stealth_profile, &self.user_profile) {
            self.client.execute(&script, vec![]).await?;
        }
        Ok(())
    }

    async fn probe_load_state(&self) -> Result<(bool, u64), PageError> {
        let value = self
            .client
            .execute(LOAD_PROBE, vec![])
            .await
            .map_err(anyhow::Error::from)?;
        Ok(parse_load_probe(&value))
    }
}

fn parse_load_probe(value: &Value) -> (bool, u64) {
    let complete = value.get(0).and_then(Value::as_str) == Some("complete");
    let resources = value.get(1).and_then(Value::as_u64).unwrap_or(0);
    (complete, resources)
}

#[async_trait]
impl PageHandle for SnapPage {
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), PageError> {
        let deadline = Instant::now() + timeout;
        let mut last_count: Option<u64> = None;
        let mut quiet_since = Instant::now();

        loop {
            let (complete, count) = self.probe_load_state().await?;
            let now = Instant::now();
            if last_count != Some(count) {
                last_count = Some(count);
                quiet_since = now;
            }
            if complete && now.duration_since(quiet_since) >= IDLE_WINDOW {
                debug!(target: "browser.load", resources = count, "network idle");
                return Ok(());
            }
            if now >= deadline {
                return Err(PageError::Timeout(timeout));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn current_url(&self) -> Result<String, PageError> {
        let url = self
            .client
            .current_url()
            .await
            .map_err(anyhow::Error::from)?;
        Ok(url.to_string())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok(self.client.title().await.map_err(anyhow::Error::from)?)
    }

    async fn full_markup(&self) -> Result<String, PageError> {
        Ok(self.client.source().await.map_err(anyhow::Error::from)?)
    }
}
