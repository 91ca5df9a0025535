//! Minimal status-only HTTP client with safe logging.
//!
//! - Request options: headers, timeout
//! - Redirects are followed (up to [`MAX_REDIRECTS`]); callers see the final status
//! - Response bodies are never read, so a truncated or endless body cannot fail a request
//! - Redacts sensitive query params and never logs secret header values
//! - Optional *raw* request/response logging via `SCOUT_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), scout_http::HttpError> {
//! let client = scout_http::HttpClient::new()?;
//! let resp = client
//!     .get("https://acme.com/careers", scout_http::RequestOpts::default())
//!     .await?;
//! println!("{}", resp.status);
//! # Ok(()) }
//! ```

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{redirect, Client, Url};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

pub use reqwest::StatusCode;

pub const MAX_REDIRECTS: usize = 10;

const RAW_ENV: &str = "SCOUT_HTTP_RAW";

const SECRET_PARAMS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(url: &Url, headers: &HeaderMap) -> String {
    let (host_path, query) = redact_query(url);
    let mut parts = vec!["curl".to_string(), "-L".to_string()];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    let query = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        parts.push(format!("'{}://{}'", url.scheme(), host_path));
    } else {
        parts.push(format!("'{}://{}?{}'", url.scheme(), host_path, query));
    }
    parts.join(" ")
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") || key.eq_ignore_ascii_case("cookie") {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use scout_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
}

/// Outcome of a request that reached a server. Any status is a response,
/// not an error; only transport failures surface as [`HttpError`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// URL after redirects were followed.
    pub final_url: Url,
    pub elapsed: Duration,
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: Option<HeaderValue>,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client that follows redirects.
    ///
    /// ```no_run
    /// use scout_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            user_agent: None,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Send `User-Agent: <agent>` with every request.
    pub fn with_user_agent(mut self, agent: &str) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(agent)
            .map_err(|e| HttpError::Build(format!("invalid user agent: {e}")))?;
        self.user_agent = Some(value);
        Ok(self)
    }

    /// GET `url`, following redirects, and report the final status.
    ///
    /// Only the status line and headers are awaited; the body is never read.
    pub async fn get(&self, url: &str, opts: RequestOpts) -> Result<HttpResponse, HttpError> {
        let url = Url::parse(url).map_err(|e| HttpError::Url(e.to_string()))?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let mut headers = opts.headers.unwrap_or_default();
        if let Some(agent) = &self.user_agent {
            headers.entry(USER_AGENT).or_insert_with(|| agent.clone());
        }

        let (host_path, redacted_q) = redact_query(&url);
        tracing::debug!(
            target: "http",
            %host_path,
            query = ?redacted_q,
            timeout_ms = timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&url, &headers);
            tracing::debug!(target: "http.raw", %curl, "request");
        }

        let started = Instant::now();
        let resp = self
            .inner
            .get(url.clone())
            .timeout(timeout)
            .headers(headers)
            .send()
            .await
            .map_err(|err| {
                let message = err.to_string();
                tracing::debug!(target: "http", %host_path, %message, "http.network_error");
                HttpError::Network(message)
            })?;
        let elapsed = started.elapsed();

        let status = resp.status();
        let final_url = resp.url().clone();
        tracing::debug!(
            target: "http",
            %status,
            final_url = %final_url,
            duration_ms = elapsed.as_millis() as u64,
            "http.response"
        );
        if raw_enabled() {
            tracing::debug!(
                target: "http.raw",
                %status,
                headers = ?redact_headers(resp.headers()),
                "response"
            );
        }

        Ok(HttpResponse {
            status,
            final_url,
            elapsed,
        })
    }
}

/// Return "host + path" and the query pairs with secret values redacted.
fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let is_secret = SECRET_PARAMS.contains(&k.to_ascii_lowercase().as_str());
            let v = if is_secret {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_secret_query_params() {
        let url = Url::parse("https://acme.com/careers?token=abc&team=eng").unwrap();
        let (host_path, q) = redact_query(&url);
        assert_eq!(host_path, "acme.com/careers");
        assert_eq!(
            q,
            vec![
                ("token".to_string(), "<redacted>".to_string()),
                ("team".to_string(), "eng".to_string()),
            ]
        );
    }

    #[test]
    fn curl_line_never_contains_secrets() {
        let url = Url::parse("https://acme.com/careers?api_key=s3cr3t").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer s3cr3t"));
        let curl = make_curl(&url, &headers);
        assert!(!curl.contains("s3cr3t"));
        assert!(curl.starts_with("curl -L"));
    }
}
