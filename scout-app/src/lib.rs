//! HTTP surface of the careers page scout.
pub mod server;
