use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pagesnap_drivers::{PageError, PageHandle};
use pagesnap_web::Sleeper;

/// How one `wait_for_network_idle` call behaves.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Load {
    Idle,
    /// Never resolves; only the outer timeout ends it.
    Hang,
    Timeout,
    Fail(&'static str),
}

/// Scripted in-memory page. Titles and load behaviours are consumed one per
/// attempt; the last entry repeats.
pub struct FakePage {
    pub url: String,
    pub markup: String,
    titles: Mutex<VecDeque<String>>,
    loads: Mutex<VecDeque<Load>>,
    pub load_calls: Mutex<u32>,
}

#[allow(dead_code)]
impl FakePage {
    pub fn new(url: &str, markup: &str) -> Self {
        Self {
            url: url.to_string(),
            markup: markup.to_string(),
            titles: Mutex::new(VecDeque::from(["Fake page".to_string()])),
            loads: Mutex::new(VecDeque::from([Load::Idle])),
            load_calls: Mutex::new(0),
        }
    }

    pub fn with_titles(self, titles: &[&str]) -> Self {
        *self.titles.lock().unwrap() = titles.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_loads(self, loads: Vec<Load>) -> Self {
        *self.loads.lock().unwrap() = loads.into();
        self
    }

    pub fn load_calls(&self) -> u32 {
        *self.load_calls.lock().unwrap()
    }
}

fn take<T: Clone>(queue: &Mutex<VecDeque<T>>) -> T {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().cloned().unwrap()
    }
}

#[async_trait]
impl PageHandle for FakePage {
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), PageError> {
        *self.load_calls.lock().unwrap() += 1;
        match take(&self.loads) {
            Load::Idle => Ok(()),
            Load::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Load::Timeout => Err(PageError::Timeout(timeout)),
            Load::Fail(msg) => Err(PageError::Driver(anyhow::anyhow!(msg))),
        }
    }

    async fn current_url(&self) -> Result<String, PageError> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok(take(&self.titles))
    }

    async fn full_markup(&self) -> Result<String, PageError> {
        Ok(self.markup.clone())
    }
}

/// Records requested sleeps without waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

#[allow(dead_code)]
impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
