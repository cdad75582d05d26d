use crate::snap_browser::{
    page::SnapPage,
    stealth::{launch_arguments, session_profile, StealthProfile, UserAgentProfile},
};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use url::Url;
use webdriver::capabilities::Capabilities;

/// Connection settings for a WebDriver session.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth: StealthProfile,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            stealth: StealthProfile::Balanced,
        }
    }
}

/// Thin wrapper around a `fantoccini` WebDriver client with stealth launch
/// settings.
pub struct SnapDriver {
    pub client: Client,
    pub stealth_profile: StealthProfile,
    pub user_profile: UserAgentProfile,
}

impl SnapDriver {
    /// Connect to a running WebDriver service (Chromedriver by default).
    pub async fn connect(options: &DriverOptions) -> Result<Self> {
        let user_profile = session_profile(options.stealth);
        let args = launch_arguments(options.stealth, &user_profile, options.headless);

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .with_context(|| format!("connecting to webdriver at {}", options.webdriver_url))?;

        tracing::info!(
            target: "browser.session",
            webdriver = %options.webdriver_url,
            headless = options.headless,
            stealth = ?options.stealth,
            "browser session started"
        );

        Ok(Self {
            client,
            stealth_profile: options.stealth,
            user_profile,
        })
    }

    /// Navigate to `url` and return the page with evasions applied.
    pub async fn goto(&mut self, url: &str) -> Result<SnapPage> {
        let parsed = Url::parse(url).with_context(|| format!("invalid url: {url}"))?;
        let mut page = SnapPage::new(
            self.client.clone(),
            self.stealth_profile,
            self.user_profile.clone(),
        );
        page.goto(parsed.as_str()).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
