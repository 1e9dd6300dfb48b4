//! One recolor pass over a page.
//!
//! A pass ties the pieces together:
//!
//! 1. gate on [`Config::applies_to`]
//! 2. collect the page's sources in order ([`SourceCollector`])
//! 3. parse each source and resolve its imports against its own URL
//! 4. recolor it ([`RecolorEngine`])
//! 5. hand each non-empty overlay to an [`OverlaySink`], in page order
//!
//! Nothing in a pass fails: unavailable sources and broken transforms only
//! shrink the overlay.

use crate::collector::{SourceCollector, SourceOrigin};
use crate::color::ColorLibrary;
use crate::config::Config;
use crate::engine::RecolorEngine;
use crate::fetch::Fetch;
use crate::stylesheet::{parse_stylesheet, resolve_href, resolve_imports};

/// Receives overlay CSS blocks in page order.
pub trait OverlaySink {
    fn append(&mut self, css: String);
}

/// Collects overlay blocks in memory. Empty blocks are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    blocks: Vec<String>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<String> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks as one stylesheet, one block per line.
    pub fn to_css(&self) -> String {
        self.blocks.join("\n")
    }
}

impl OverlaySink for Overlay {
    fn append(&mut self, css: String) {
        if css.trim().is_empty() {
            return;
        }
        self.blocks.push(css);
    }
}

impl OverlaySink for Vec<String> {
    fn append(&mut self, css: String) {
        self.push(css);
    }
}

/// The styles of one page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStyles {
    pub url: String,
    /// Text of the page's `<style>` blocks.
    pub resident: Vec<String>,
    /// Hrefs of the page's linked stylesheets, as written.
    pub linked: Vec<String>,
}

impl PageStyles {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_resident(mut self, css: impl Into<String>) -> Self {
        self.resident.push(css.into());
        self
    }

    pub fn with_linked(mut self, href: impl Into<String>) -> Self {
        self.linked.push(href.into());
        self
    }
}

/// A recolor pass: engine, config and fetcher for one page.
pub struct RecolorPass<'a, L: ColorLibrary, F: Fetch + ?Sized> {
    engine: &'a RecolorEngine<L>,
    config: &'a Config,
    fetcher: &'a F,
}

impl<'a, L: ColorLibrary, F: Fetch + ?Sized> RecolorPass<'a, L, F> {
    pub fn new(engine: &'a RecolorEngine<L>, config: &'a Config, fetcher: &'a F) -> Self {
        Self {
            engine,
            config,
            fetcher,
        }
    }

    /// Recolors every stylesheet of `page` into `sink`, in page order.
    ///
    /// Returns the number of overlay blocks appended.
    pub async fn run<S>(&self, page: &PageStyles, sink: &mut S) -> usize
    where
        S: OverlaySink + ?Sized,
    {
        if !self.config.applies_to(&page.url) {
            tracing::debug!(url = %page.url, "page excluded, not recoloring");
            return 0;
        }

        let mut collector = SourceCollector::new();
        for css in &page.resident {
            collector = collector.resident(css.clone());
        }
        for href in &page.linked {
            let url = resolve_href(&page.url, href).unwrap_or_else(|| href.clone());
            collector = collector.linked(url);
        }
        let sources = collector.gather(self.fetcher).await;

        let mut appended = 0;
        for source in sources {
            let text = source.text();
            if text.trim().is_empty() {
                continue;
            }
            let base_url = match &source.origin {
                SourceOrigin::Resident => page.url.as_str(),
                SourceOrigin::Linked(url) => url.as_str(),
            };
            let mut sheet = parse_stylesheet(text);
            resolve_imports(&mut sheet, self.fetcher, base_url).await;

            let overlay = self.engine.recolor_sheet(&sheet, self.config, &page.url);
            if overlay.is_empty() {
                tracing::debug!(origin = ?source.origin, "source has nothing to recolor");
                continue;
            }
            sink.append(overlay);
            appended += 1;
        }
        tracing::debug!(url = %page.url, appended, "recolor pass finished");
        appended
    }

    /// Override for an element's inline `style`: the original declarations
    /// followed by their recolored versions, or `None` if there is nothing
    /// to recolor.
    pub fn recolor_element_style(&self, style: &str, page_url: &str) -> Option<String> {
        if !self.config.applies_to(page_url) {
            return None;
        }
        let recolored = self
            .engine
            .recolor_inline_style(style, self.config, page_url)?;
        let original = style.trim();
        let separator = if original.ends_with(';') { " " } else { "; " };
        Some(format!("{original}{separator}{recolored}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MapFetcher;
    use crate::sandbox::Sandbox;

    fn black() -> Config {
        Config::default().with_transform(Sandbox::new("[0, 0, 0, 1]").unwrap())
    }

    #[test]
    fn test_overlay_drops_empty_blocks() {
        let mut overlay = Overlay::new();
        overlay.append(String::new());
        overlay.append("  ".to_string());
        overlay.append("a { color:red; }".to_string());
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.to_css(), "a { color:red; }");
    }

    #[tokio::test]
    async fn test_run_appends_in_page_order() {
        let engine = RecolorEngine::css().unwrap();
        let config = black();
        let fetcher = MapFetcher::new()
            .with("https://a.test/css/one.css", "@import 'two.css'; b { color: blue }")
            .with("https://a.test/css/two.css", "c { background: #fff }");
        let page = PageStyles::new("https://a.test/index.html")
            .with_resident("a { color: red; margin: 0 }")
            .with_resident("p { margin: 0 }")
            .with_linked("css/one.css")
            .with_linked("css/missing.css");

        let mut overlay = Overlay::new();
        let appended = RecolorPass::new(&engine, &config, &fetcher)
            .run(&page, &mut overlay)
            .await;

        assert_eq!(appended, 2);
        assert_eq!(
            overlay.blocks(),
            [
                "a { color:rgba(0,0,0,1); }".to_string(),
                "c { background:rgba(0,0,0,1); }\nb { color:rgba(0,0,0,1); }".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_excluded_page_is_left_alone() {
        let engine = RecolorEngine::css().unwrap();
        let mut config = black();
        config.exclude_url_pattern = Some(crate::config::UrlPattern::new("a\\.test").unwrap());
        let page = PageStyles::new("https://a.test/").with_resident("a { color: red }");

        let mut blocks: Vec<String> = Vec::new();
        let appended = RecolorPass::new(&engine, &config, &MapFetcher::new())
            .run(&page, &mut blocks)
            .await;
        assert_eq!(appended, 0);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_recolor_element_style_combines_original_and_overlay() {
        let engine = RecolorEngine::css().unwrap();
        let config = black();
        let fetcher = MapFetcher::new();
        let pass = RecolorPass::new(&engine, &config, &fetcher);
        assert_eq!(
            pass.recolor_element_style("color: red; margin: 0", "https://a.test/")
                .as_deref(),
            Some("color: red; margin: 0; color:rgba(0,0,0,1);")
        );
        assert_eq!(
            pass.recolor_element_style("color: red;", "https://a.test/").as_deref(),
            Some("color: red; color:rgba(0,0,0,1);")
        );
        assert_eq!(pass.recolor_element_style("margin: 0", "https://a.test/"), None);
    }
}
