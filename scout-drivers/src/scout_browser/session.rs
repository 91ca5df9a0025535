use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A controllable browser session, exclusively owned by one request.
///
/// Sessions are not reentrant; concurrent requests each open their own via a
/// [`SessionFactory`]. Callers must invoke [`BrowserSession::close`] on every
/// exit path once they are done.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url` in the current tab.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Type `text` into the element matching `input_selector` and press Enter.
    async fn submit_query(&mut self, input_selector: &str, text: &str) -> Result<()>;

    /// Wait until an element matches `selector`. `Ok(false)` means the bound
    /// elapsed without a match.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Link targets of the first `limit` elements matching `selector`, in page
    /// order. A match contributes the URL of its own `href` or of its nearest
    /// enclosing anchor; matches without either are skipped.
    async fn list_matches(&mut self, selector: &str, limit: usize) -> Result<Vec<String>>;

    /// Rendered markup of the current document.
    async fn current_markup(&mut self) -> Result<String>;

    /// Release the underlying browser. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Opens independent [`BrowserSession`]s.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}
