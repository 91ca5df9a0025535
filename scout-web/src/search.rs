use scout_common::{CandidateUrl, DiscoveryError, Provenance, Result};
use scout_config::SearchConfig;
use scout_drivers::scout_browser::session::BrowserSession;
use tracing::{debug, info};

/// Search-engine fallback used when the direct probe misses.
#[derive(Debug, Clone)]
pub struct SearchFallback {
    config: SearchConfig,
}

impl SearchFallback {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Search for `domain`'s jobs page and pick a candidate from the results.
    pub async fn find(
        &self,
        session: &mut dyn BrowserSession,
        domain: &str,
    ) -> Result<CandidateUrl> {
        let query = self.config.query_for(domain);
        let failed = |e: anyhow::Error| DiscoveryError::SearchFailed {
            query: query.clone(),
            reason: format!("{e:#}"),
        };

        info!(
            target: "scout.search",
            %domain,
            %query,
            engine = %self.config.engine_url,
            "search.start"
        );
        session
            .navigate(&self.config.engine_url)
            .await
            .map_err(&failed)?;
        session
            .submit_query(&self.config.query_input_selector, &query)
            .await
            .map_err(&failed)?;

        let appeared = session
            .wait_for_selector(&self.config.result_selector, self.config.wait_timeout())
            .await
            .map_err(&failed)?;
        if !appeared {
            return Err(DiscoveryError::SearchTimeout {
                query,
                waited_ms: self.config.wait_timeout_ms,
            });
        }

        let results = session
            .list_matches(&self.config.result_selector, self.config.max_results)
            .await
            .map_err(&failed)?;
        for link in &results {
            debug!(target: "scout.search", %link, "search.result");
        }

        select_candidate(domain, &results).ok_or(DiscoveryError::NoSearchResults { query })
    }
}

/// Ordered, first-match selection over search results.
///
/// The first result containing `domain` wins. Otherwise the first result is
/// taken even though it may belong to an unrelated organization.
///
/// ```
/// use scout_common::Provenance;
/// use scout_web::search::select_candidate;
///
/// let results = vec![
///     "https://other.com/x".to_string(),
///     "https://acme.com/jobs".to_string(),
///     "https://acme.com/careers".to_string(),
/// ];
/// let picked = select_candidate("acme.com", &results).unwrap();
/// assert_eq!(picked.url, "https://acme.com/jobs");
/// assert_eq!(picked.provenance, Provenance::SearchExactMatch);
/// ```
pub fn select_candidate(domain: &str, results: &[String]) -> Option<CandidateUrl> {
    if let Some(hit) = results.iter().find(|link| link.contains(domain)) {
        info!(target: "scout.search", %domain, url = %hit, "search.select.exact_match");
        return Some(CandidateUrl::new(hit.clone(), Provenance::SearchExactMatch));
    }

    let first = results.first()?;
    info!(
        target: "scout.search",
        %domain,
        url = %first,
        "search.select.fallback_first"
    );
    Some(CandidateUrl::new(first.clone(), Provenance::SearchFallbackFirst))
}
