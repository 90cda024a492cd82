//! 🕷️ A crawler that follows a script. Each snapshot pops the next scripted
//! state; once the script runs out it says READY forever.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backends::{Crawler, CrawlerSnapshot, CrawlerState};

#[derive(Debug, Default)]
struct Script {
    states: VecDeque<CrawlerState>,
    /// ♾️ when set, the crawler never finishes
    stuck: bool,
    last_crawl_failure: Option<String>,
    started: Vec<String>,
    polls: u32,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryCrawler {
    inner: Arc<Mutex<Script>>,
}

impl InMemoryCrawler {
    /// 🎬 States returned by successive polls before it settles on READY.
    pub(crate) fn scripted(states: impl IntoIterator<Item = CrawlerState>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Script {
                states: states.into_iter().collect(),
                ..Script::default()
            })),
        }
    }

    /// ♾️ A crawler that reports RUNNING forever.
    pub(crate) fn stuck() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Script {
                stuck: true,
                ..Script::default()
            })),
        }
    }

    pub(crate) async fn with_last_crawl_failure(self, message: &str) -> Self {
        self.inner.lock().await.last_crawl_failure = Some(message.to_string());
        self
    }

    pub(crate) async fn started(&self) -> Vec<String> {
        self.inner.lock().await.started.clone()
    }

    pub(crate) async fn polls(&self) -> u32 {
        self.inner.lock().await.polls
    }
}

#[async_trait]
impl Crawler for InMemoryCrawler {
    async fn start_crawler(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            bail!("💀 EntityNotFoundException: crawler name is empty");
        }
        self.inner.lock().await.started.push(name.to_string());
        Ok(())
    }

    async fn crawler_snapshot(&self, _name: &str) -> Result<CrawlerSnapshot> {
        let mut the_script = self.inner.lock().await;
        the_script.polls += 1;
        let the_state = if the_script.stuck {
            CrawlerState::Running
        } else {
            the_script.states.pop_front().unwrap_or(CrawlerState::Ready)
        };
        Ok(CrawlerSnapshot {
            state: the_state,
            last_crawl_failure: the_script.last_crawl_failure.clone(),
        })
    }
}
