//! Careers page discovery and extraction.
//!
//! - [`resolver`]: email address → [`scout_common::OrganizationIdentity`]
//! - [`probe`]: direct `https://{domain}/careers` check
//! - [`search`]: search-engine fallback and the first-match selection heuristic
//! - [`loader`]: browser page load with a fixed settle delay
//! - [`normalize`]: primary-region isolation and attribute stripping
//! - [`pipeline`]: per-request orchestration and payload assembly

pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod probe;
pub mod resolver;
pub mod search;

pub use pipeline::{Discovery, Pipeline};
