//! Primary-region isolation and attribute stripping.
//!
//! The region is the first `<main>` element, or `<body>` when the page has
//! none. `nav` and `script` subtrees never reach the output. In markup mode
//! the region is re-serialized with every attribute dropped except `href` on
//! anchors; in text mode only its trimmed text nodes survive. `<template>`
//! contents are emitted in place, inside the template element.
use scout_common::{DiscoveryError, ExtractionMode, RawPage, Result};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info};

const REMOVED: &[&str] = &["nav", "script"];

/// Elements whose text children are serialized without escaping.
const RAW_TEXT: &[&str] = &[
    "style", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

const LEADING_NEWLINE: &[&str] = &["pre", "textarea", "listing"];

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentNormalizer {
    mode: ExtractionMode,
}

impl ContentNormalizer {
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// Reduce `page` to the content returned to the caller.
    ///
    /// ```
    /// use scout_common::{ExtractionMode, RawPage};
    /// use scout_web::normalize::ContentNormalizer;
    ///
    /// let page = RawPage {
    ///     url: "https://acme.com/careers".into(),
    ///     html: r#"<body><nav>menu</nav><main class="c"><a class="x" href="/apply">Apply</a></main></body>"#.into(),
    /// };
    /// let out = ContentNormalizer::new(ExtractionMode::Markup).normalize(&page).unwrap();
    /// assert_eq!(out, r#"<main><a href="/apply">Apply</a></main>"#);
    /// ```
    pub fn normalize(&self, page: &RawPage) -> Result<String> {
        let empty = || DiscoveryError::EmptyDocument {
            url: page.url.clone(),
        };
        if page.html.trim().is_empty() {
            return Err(empty());
        }

        let document = Html::parse_document(&page.html);
        let region = first_match(&document, "main")
            .or_else(|| first_match(&document, "body"))
            .ok_or_else(empty)?;
        debug!(
            target: "scout.normalize",
            url = %page.url,
            region = region.value().name(),
            "normalize.region"
        );

        let content = match self.mode {
            ExtractionMode::Markup => {
                let mut out = String::with_capacity(page.html.len() / 2);
                write_element(region, &mut out);
                out
            }
            ExtractionMode::Text => {
                let mut lines = Vec::new();
                collect_text(region, &mut lines);
                lines.join("\n")
            }
        };

        info!(
            target: "scout.normalize",
            url = %page.url,
            mode = ?self.mode,
            input_bytes = page.html.len(),
            output_bytes = content.len(),
            "normalize.done"
        );
        Ok(content)
    }
}

fn first_match<'a>(document: &'a Html, tag: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(tag).ok()?;
    document.select(&selector).next()
}

/// Serialize `element`. Returns `true` once a `plaintext` element has been
/// written: it swallows the rest of the document when re-parsed, so nothing
/// may follow it, not even end tags.
fn write_element(element: ElementRef<'_>, out: &mut String) -> bool {
    let name = element.value().name();
    out.push('<');
    out.push_str(name);
    if name == "a" {
        if let Some(href) = element.value().attr("href") {
            out.push_str(" href=\"");
            push_escaped(out, href, true);
            out.push('"');
        }
    }
    out.push('>');

    if VOID.contains(&name) {
        return false;
    }

    // The parser eats one newline right after these start tags.
    if LEADING_NEWLINE.contains(&name) {
        let first = element.children().next().map(|child| child.value());
        if matches!(first, Some(Node::Text(text)) if text.starts_with('\n')) {
            out.push('\n');
        }
    }

    let raw = RAW_TEXT.contains(&name);
    // Template contents hang off a fragment node below the element.
    let children = element.children().flat_map(|child| match child.value() {
        Node::Fragment => child.children().collect::<Vec<_>>(),
        _ => vec![child],
    });
    for child in children {
        match child.value() {
            Node::Element(el) if REMOVED.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if write_element(child, out) {
                        return true;
                    }
                }
            }
            Node::Text(text) if raw => out.push_str(text),
            Node::Text(text) => push_escaped(out, text, false),
            _ => {}
        }
    }

    if name == "plaintext" {
        return true;
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    false
}

fn collect_text(element: ElementRef<'_>, lines: &mut Vec<String>) {
    let children = element.children().flat_map(|child| match child.value() {
        Node::Fragment => child.children().collect::<Vec<_>>(),
        _ => vec![child],
    });
    for child in children {
        match child.value() {
            Node::Element(el) if REMOVED.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, lines);
                }
            }
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed.to_string());
                }
            }
            _ => {}
        }
    }
}

fn push_escaped(out: &mut String, s: &str, attribute: bool) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
