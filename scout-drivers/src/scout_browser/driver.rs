use crate::scout_browser::{
    launch::build_capabilities,
    page::ScoutElement,
    session::{BrowserSession, SessionFactory},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{error::CmdError, Client, ClientBuilder, Locator};
use scout_config::BrowserConfig;
use std::time::Duration;
use tracing::{debug, warn};

/// Thin wrapper around a `fantoccini` WebDriver client implementing
/// [`BrowserSession`].
pub struct ScoutDriver {
    client: Client,
    closed: bool,
}

impl ScoutDriver {
    /// Create a new session on the WebDriver service at
    /// `config.webdriver_url` (chromedriver on `localhost:9515` by default).
    pub async fn new(config: &BrowserConfig) -> Result<Self> {
        let client = ClientBuilder::native()
            .capabilities(build_capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .with_context(|| format!("connecting to WebDriver at {}", config.webdriver_url))?;

        debug!(
            target: "browser.session",
            webdriver_url = %config.webdriver_url,
            headless = config.headless,
            "browser.session.opened"
        );

        Ok(Self {
            client,
            closed: false,
        })
    }
}

#[async_trait]
impl BrowserSession for ScoutDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigating to {url}"))
    }

    async fn submit_query(&mut self, input_selector: &str, text: &str) -> Result<()> {
        let input = self
            .client
            .find(Locator::Css(input_selector))
            .await
            .with_context(|| format!("no query input matches `{input_selector}`"))?;
        ScoutElement::new(input).type_and_submit(text).await
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(e).with_context(|| format!("waiting for `{selector}`")),
        }
    }

    async fn list_matches(&mut self, selector: &str, limit: usize) -> Result<Vec<String>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;

        let mut links = Vec::with_capacity(limit.min(elements.len()));
        for element in elements.into_iter().take(limit) {
            match ScoutElement::new(element).link_target().await? {
                Some(href) => links.push(href),
                None => debug!(target: "browser.session", %selector, "match without link target skipped"),
            }
        }
        Ok(links)
    }

    async fn current_markup(&mut self) -> Result<String> {
        self.client
            .source()
            .await
            .context("reading page source")
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.client.clone().close().await?;
        debug!(target: "browser.session", "browser.session.closed");
        Ok(())
    }
}

impl Drop for ScoutDriver {
    fn drop(&mut self) {
        if !self.closed {
            warn!(target: "browser.session", "browser session dropped without close");
        }
    }
}

/// Opens a fresh [`ScoutDriver`] per call.
#[derive(Debug, Clone)]
pub struct FantocciniFactory {
    config: BrowserConfig,
}

impl FantocciniFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for FantocciniFactory {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let driver = ScoutDriver::new(&self.config).await?;
        Ok(Box::new(driver))
    }
}
