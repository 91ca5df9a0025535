//! Driver layer for browser automation and the browser environment check.
//!
//! - [`scout_browser::session::BrowserSession`]: the session interface the
//!   discovery pipeline is written against
//! - [`scout_browser::driver::ScoutDriver`]: WebDriver (fantoccini) backed session
//! - [`scout_browser::launch`]: Chrome switches derived from `BrowserConfig`
//! - [`environment`]: Chrome/ChromeDriver version precondition
pub mod environment;
pub mod scout_browser;
