use scout_common::{CandidateUrl, DiscoveryError, RawPage, Result};
use scout_config::LoaderConfig;
use scout_drivers::scout_browser::session::BrowserSession;
use tracing::info;

/// Loads the chosen candidate in the request's browser session.
///
/// Pages are given a fixed settle delay after navigation so client-side
/// rendering can finish; there is no readiness signal.
#[derive(Debug, Clone)]
pub struct PageLoader {
    config: LoaderConfig,
}

impl PageLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub async fn load(
        &self,
        session: &mut dyn BrowserSession,
        candidate: &CandidateUrl,
    ) -> Result<RawPage> {
        let url = candidate.url.as_str();
        let failed = |e: anyhow::Error| DiscoveryError::PageLoadFailed {
            url: url.to_string(),
            reason: format!("{e:#}"),
        };

        info!(
            target: "scout.loader",
            %url,
            provenance = %candidate.provenance,
            settle_ms = self.config.settle_delay_ms,
            "loader.navigate"
        );
        session.navigate(url).await.map_err(&failed)?;
        tokio::time::sleep(self.config.settle_delay()).await;

        let html = session.current_markup().await.map_err(&failed)?;
        info!(target: "scout.loader", %url, bytes = html.len(), "loader.loaded");
        Ok(RawPage {
            url: url.to_string(),
            html,
        })
    }
}
