use scout_common::{CandidateUrl, Provenance};
use scout_config::ProbeConfig;
use scout_http::{HttpClient, HttpError, RequestOpts, StatusCode};
use tracing::info;

/// Result of the direct careers page check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found(CandidateUrl),
    NotFound(ProbeMiss),
}

/// Why the direct check did not produce a candidate. Never fatal; it only
/// routes the request to the search fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeMiss {
    /// The server answered with something other than 200.
    Status(u16),
    /// No response at all (DNS, TLS, connect, timeout, redirect loop).
    Transport(String),
}

/// Single GET against the well-known careers path of a domain.
#[derive(Clone)]
pub struct DirectProbe {
    http: HttpClient,
    config: ProbeConfig,
}

impl DirectProbe {
    pub fn new(config: ProbeConfig) -> Result<Self, HttpError> {
        let http = HttpClient::new()?
            .with_timeout(config.timeout())
            .with_user_agent(&config.user_agent)?;
        Ok(Self { http, config })
    }

    pub async fn probe(&self, domain: &str) -> ProbeOutcome {
        let url = self.config.candidate_url(domain);
        match self.http.get(&url, RequestOpts::default()).await {
            Ok(resp) if resp.status == StatusCode::OK => {
                info!(target: "scout.probe", %domain, %url, "probe.found");
                ProbeOutcome::Found(CandidateUrl::new(url, Provenance::Direct))
            }
            Ok(resp) => {
                info!(
                    target: "scout.probe",
                    %domain,
                    %url,
                    status = resp.status.as_u16(),
                    "probe.not_found"
                );
                ProbeOutcome::NotFound(ProbeMiss::Status(resp.status.as_u16()))
            }
            Err(err) => {
                info!(
                    target: "scout.probe",
                    %domain,
                    %url,
                    error = %err,
                    "probe.transport_error"
                );
                ProbeOutcome::NotFound(ProbeMiss::Transport(err.to_string()))
            }
        }
    }
}
