use anyhow::Result;
use fantoccini::{elements::Element, Locator};

/// WebDriver key code for Enter.
const ENTER: &str = "\u{E007}";

/// Wrapper for DOM elements with the helpers the session needs.
#[derive(Clone)]
pub struct ScoutElement {
    pub element: Element,
}

impl ScoutElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    /// Type `text` into the element, then press Enter.
    pub async fn type_and_submit(&self, text: &str) -> Result<()> {
        self.element.send_keys(text).await?;
        self.element.send_keys(ENTER).await?;
        Ok(())
    }

    /// Resolved `href` of this element or of its nearest enclosing anchor.
    pub async fn link_target(&self) -> Result<Option<String>> {
        if let Some(href) = self.href().await? {
            return Ok(Some(href));
        }
        match self.element.find(Locator::XPath("ancestor::a[1]")).await {
            Ok(anchor) => ScoutElement::new(anchor).href().await,
            Err(_) => Ok(None),
        }
    }

    /// The `href` property (absolute, as the browser resolved it).
    async fn href(&self) -> Result<Option<String>> {
        let href = self.element.prop("href").await?;
        Ok(href.filter(|h| !h.trim().is_empty()))
    }
}
