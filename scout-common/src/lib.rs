//! Common types and utilities shared across Scout crates.
//!
//! This crate defines the per-request data model, the discovery error
//! taxonomy, and observability helpers used throughout the Scout workspace.
//! It is intentionally lightweight so that every crate can depend on it
//! without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`OrganizationIdentity`]: domain + display name derived from an email
//! - [`CandidateUrl`] and [`Provenance`]: the selected careers page target
//! - [`RawPage`]: rendered markup handed from the loader to the normalizer
//! - [`ResultPayload`]: the response assembled for every request
//! - [`DiscoveryError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use scout_common::{CandidateUrl, OrganizationIdentity, Provenance, ResultPayload};
//!
//! let identity = OrganizationIdentity::from_domain("acme.com");
//! assert_eq!(identity.display_name, "Acme");
//!
//! let candidate = CandidateUrl::new("https://acme.com/careers", Provenance::Direct);
//! let payload = ResultPayload::found(&identity, &candidate, "<main></main>".into());
//! assert_eq!(payload.careers_page_url.as_deref(), Some("https://acme.com/careers"));
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod observability;

/// Organization derived from the domain part of an email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationIdentity {
    pub domain: String,
    pub display_name: String,
}

impl OrganizationIdentity {
    /// Build the identity for `domain`.
    ///
    /// The display name is the first dot-delimited label with only its first
    /// character upper-cased:
    ///
    /// ```
    /// use scout_common::OrganizationIdentity;
    ///
    /// assert_eq!(OrganizationIdentity::from_domain("my-co.io").display_name, "My-co");
    /// assert_eq!(OrganizationIdentity::from_domain("eBay.com").display_name, "EBay");
    /// ```
    pub fn from_domain(domain: &str) -> Self {
        let first_label = domain.split('.').next().unwrap_or_default();
        let mut chars = first_label.chars();
        let display_name = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self {
            domain: domain.to_string(),
            display_name,
        }
    }
}

/// Which discovery path produced a [`CandidateUrl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// `https://{domain}/careers` answered 200.
    Direct,
    /// First search result whose URL contains the domain.
    SearchExactMatch,
    /// No result matched; the first search result was taken as-is.
    SearchFallbackFirst,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Direct => "direct",
            Provenance::SearchExactMatch => "search-exact-match",
            Provenance::SearchFallbackFirst => "search-fallback-first",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single careers page target chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUrl {
    pub url: String,
    pub provenance: Provenance,
}

impl CandidateUrl {
    pub fn new(url: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            url: url.into(),
            provenance,
        }
    }
}

/// Rendered markup and the URL it was loaded from.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub html: String,
}

/// Output shape of the content normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Attribute-stripped markup; `href` survives on anchors.
    #[default]
    Markup,
    /// Newline-joined text nodes; link targets are discarded.
    Text,
}

/// Response assembled for every request that got past domain resolution.
///
/// `careers_page_url` is the success signal: when it is `None`, `body` holds
/// an error description instead of extracted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub name: String,
    pub domain: String,
    pub careers_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    pub body: String,
}

impl ResultPayload {
    pub fn found(identity: &OrganizationIdentity, candidate: &CandidateUrl, body: String) -> Self {
        Self {
            name: identity.display_name.clone(),
            domain: identity.domain.clone(),
            careers_page_url: Some(candidate.url.clone()),
            provenance: Some(candidate.provenance),
            body,
        }
    }

    pub fn failed(identity: &OrganizationIdentity, error: &DiscoveryError) -> Self {
        Self {
            name: identity.display_name.clone(),
            domain: identity.domain.clone(),
            careers_page_url: None,
            provenance: None,
            body: error.describe(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.careers_page_url.is_some()
    }
}

/// Error taxonomy of the discovery pipeline.
///
/// `InvalidFormat` is raised before an [`OrganizationIdentity`] exists and is
/// reported as a bad request. Every other variant is fatal for the request and
/// gets embedded into a [`ResultPayload`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("no domain found in email address {0:?}")]
    InvalidFormat(String),

    #[error("no search results appeared for `{query}` within {waited_ms}ms")]
    SearchTimeout { query: String, waited_ms: u64 },

    #[error("search for `{query}` returned no results")]
    NoSearchResults { query: String },

    #[error("search for `{query}` failed: {reason}")]
    SearchFailed { query: String, reason: String },

    #[error("browser session could not be opened: {0}")]
    SessionUnavailable(String),

    #[error("failed to load {url}: {reason}")]
    PageLoadFailed { url: String, reason: String },

    #[error("page {url} has no main or body element")]
    EmptyDocument { url: String },
}

impl DiscoveryError {
    /// Stable name of the variant, embedded in error bodies and log events.
    pub fn kind(&self) -> &'static str {
        match self {
            DiscoveryError::InvalidFormat(_) => "InvalidFormat",
            DiscoveryError::SearchTimeout { .. } => "SearchTimeout",
            DiscoveryError::NoSearchResults { .. } => "NoSearchResults",
            DiscoveryError::SearchFailed { .. } => "SearchFailed",
            DiscoveryError::SessionUnavailable(_) => "SessionUnavailable",
            DiscoveryError::PageLoadFailed { .. } => "PageLoadFailed",
            DiscoveryError::EmptyDocument { .. } => "EmptyDocument",
        }
    }

    /// Human-readable description used as the payload body.
    pub fn describe(&self) -> String {
        format!("An error occurred: {}: {}", self.kind(), self)
    }
}

/// Convenient alias for results that use [`DiscoveryError`].
pub type Result<T> = std::result::Result<T, DiscoveryError>;
