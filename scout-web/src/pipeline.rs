use crate::loader::PageLoader;
use crate::normalize::ContentNormalizer;
use crate::probe::{DirectProbe, ProbeOutcome};
use crate::resolver;
use crate::search::SearchFallback;
use scout_common::{
    CandidateUrl, DiscoveryError, OrganizationIdentity, RawPage, Result, ResultPayload,
};
use scout_config::ScoutConfig;
use scout_drivers::scout_browser::session::{BrowserSession, SessionFactory};
use scout_http::HttpError;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of discovery for one resolved organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    Found {
        candidate: CandidateUrl,
        content: String,
    },
    Failed {
        error: DiscoveryError,
    },
}

impl Discovery {
    pub fn into_payload(self, identity: &OrganizationIdentity) -> ResultPayload {
        match self {
            Discovery::Found { candidate, content } => {
                ResultPayload::found(identity, &candidate, content)
            }
            Discovery::Failed { error } => ResultPayload::failed(identity, &error),
        }
    }
}

/// Email → careers page content, one browser session per request.
///
/// A `Pipeline` holds no per-request state and can be shared across
/// concurrent requests behind an `Arc`.
pub struct Pipeline {
    probe: DirectProbe,
    search: SearchFallback,
    loader: PageLoader,
    normalizer: ContentNormalizer,
    sessions: Arc<dyn SessionFactory>,
}

impl Pipeline {
    pub fn new(
        config: &ScoutConfig,
        sessions: Arc<dyn SessionFactory>,
    ) -> std::result::Result<Self, HttpError> {
        Ok(Self {
            probe: DirectProbe::new(config.probe.clone())?,
            search: SearchFallback::new(config.search.clone()),
            loader: PageLoader::new(config.loader.clone()),
            normalizer: ContentNormalizer::new(config.extraction.mode),
            sessions,
        })
    }

    /// Process one email address.
    ///
    /// Only an address without a domain is an `Err`; every later failure is
    /// reported inside the returned payload.
    pub async fn run(&self, email: &str) -> Result<ResultPayload> {
        let identity = resolver::resolve(email)?;
        let started = Instant::now();
        let payload = self.discover(&identity).await.into_payload(&identity);

        info!(
            target: "scout.pipeline",
            domain = %payload.domain,
            success = payload.is_success(),
            careers_page_url = payload.careers_page_url.as_deref().unwrap_or(""),
            provenance = payload.provenance.map(|p| p.as_str()).unwrap_or(""),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline.done"
        );
        Ok(payload)
    }

    pub async fn discover(&self, identity: &OrganizationIdentity) -> Discovery {
        match self.try_discover(identity).await {
            Ok((candidate, content)) => Discovery::Found { candidate, content },
            Err(error) => {
                warn!(
                    target: "scout.pipeline",
                    domain = %identity.domain,
                    kind = error.kind(),
                    error = %error,
                    "pipeline.failed"
                );
                Discovery::Failed { error }
            }
        }
    }

    async fn try_discover(&self, identity: &OrganizationIdentity) -> Result<(CandidateUrl, String)> {
        let direct = match self.probe.probe(&identity.domain).await {
            ProbeOutcome::Found(candidate) => Some(candidate),
            ProbeOutcome::NotFound(_) => None,
        };

        let session = self
            .sessions
            .open()
            .await
            .map_err(|e| DiscoveryError::SessionUnavailable(format!("{e:#}")))?;
        let mut guard = SessionGuard::new(session, &identity.domain);

        let acquired = match guard.session.as_deref_mut() {
            Some(session) => self.acquire(session, identity, direct).await,
            None => Err(DiscoveryError::SessionUnavailable(
                "session already released".into(),
            )),
        };
        guard.close().await;

        let (candidate, page) = acquired?;
        let content = self.normalizer.normalize(&page)?;
        Ok((candidate, content))
    }

    /// Steps that need the browser: search fallback (when the probe missed)
    /// and the page load.
    async fn acquire(
        &self,
        session: &mut dyn BrowserSession,
        identity: &OrganizationIdentity,
        direct: Option<CandidateUrl>,
    ) -> Result<(CandidateUrl, RawPage)> {
        let candidate = match direct {
            Some(candidate) => candidate,
            None => self.search.find(session, &identity.domain).await?,
        };
        let page = self.loader.load(session, &candidate).await?;
        Ok((candidate, page))
    }
}

/// Owns the request's browser session.
///
/// [`SessionGuard::close`] is the normal exit. If the guard is dropped first,
/// because the request future was cancelled mid-flight, the session is closed
/// on a spawned task instead.
struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
    domain: String,
}

impl SessionGuard {
    fn new(session: Box<dyn BrowserSession>, domain: &str) -> Self {
        Self {
            session: Some(session),
            domain: domain.to_string(),
        }
    }

    async fn close(mut self) {
        if let Some(session) = self.session.take() {
            close_session(session, &self.domain).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let domain = std::mem::take(&mut self.domain);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                info!(target: "scout.pipeline", %domain, "pipeline.session_close_deferred");
                handle.spawn(async move { close_session(session, &domain).await });
            }
            Err(_) => warn!(
                target: "scout.pipeline",
                %domain,
                "pipeline.session_leaked"
            ),
        }
    }
}

async fn close_session(mut session: Box<dyn BrowserSession>, domain: &str) {
    if let Err(e) = session.close().await {
        warn!(
            target: "scout.pipeline",
            %domain,
            error = %format!("{e:#}"),
            "pipeline.session_close_failed"
        );
    }
}
