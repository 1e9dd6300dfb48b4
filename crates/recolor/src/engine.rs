//! Parse → filter → palette → substitute, for one stylesheet.
//!
//! [`RecolorEngine::recolor`] turns a stylesheet into its color overlay: the
//! color-bearing declarations only, with every color token rewritten through
//! a palette built for this call. The overlay is appended after the original
//! sheet by the caller; it never replaces it.
//!
//! # Example
//!
//! ```rust
//! use recolor::{Config, RecolorEngine, Sandbox};
//!
//! let engine = RecolorEngine::css().unwrap();
//! let config = Config::default().with_transform(Sandbox::new("[0, 0, 0, 1]").unwrap());
//!
//! let overlay = engine.recolor("a { color: red; margin: 0 }", &config, "https://example.com/");
//! assert_eq!(overlay, "a { color:rgba(0,0,0,1); }");
//! ```

use crate::color::{ColorLibrary, ColorMatcher, CssColors, Palette};
use crate::config::Config;
use crate::error::RecolorError;
use crate::sandbox::Sandbox;
use crate::stylesheet::{parse_stylesheet, ColorFilter, Stylesheet};

/// Throwaway selector wrapping inline declaration blocks.
const INLINE_SELECTOR: &str = "_";

/// Overlay generator over a [`ColorLibrary`].
#[derive(Debug, Clone)]
pub struct RecolorEngine<L = CssColors> {
    library: L,
    matcher: ColorMatcher,
}

impl RecolorEngine<CssColors> {
    /// Engine over the CSS named colors.
    pub fn css() -> Result<Self, RecolorError> {
        Self::new(CssColors)
    }
}

impl<L: ColorLibrary> RecolorEngine<L> {
    /// Builds the color grammar from the library's named colors.
    pub fn new(library: L) -> Result<Self, RecolorError> {
        let matcher = ColorMatcher::new(library.named_colors())?;
        Ok(Self { library, matcher })
    }

    pub fn matcher(&self) -> &ColorMatcher {
        &self.matcher
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    /// Color overlay for `css`; empty if it carries no color.
    pub fn recolor(&self, css: &str, config: &Config, page_url: &str) -> String {
        self.recolor_sheet(&parse_stylesheet(css), config, page_url)
    }

    /// Color overlay for an already parsed (and import-resolved) sheet.
    ///
    /// Only declaration values are rewritten; selectors and group preludes
    /// stay as written even when they spell a color.
    pub fn recolor_sheet(&self, sheet: &Stylesheet, config: &Config, page_url: &str) -> String {
        let filter = ColorFilter::new(&self.matcher);
        let mut tokens: Vec<String> = Vec::new();
        let fragment = filter.extract_with(sheet, |value| {
            for token in self.matcher.distinct_tokens(value) {
                if !tokens.iter().any(|seen| seen == token) {
                    tokens.push(token.to_string());
                }
            }
            value.to_string()
        });
        if fragment.is_empty() {
            tracing::debug!(rules = sheet.rules.len(), "no color-bearing declarations");
            return String::new();
        }
        if tokens.is_empty() {
            tracing::debug!("fragment has no color tokens");
            return String::new();
        }

        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let palette = self.build_palette(&tokens, config, page_url);
        tracing::debug!(
            tokens = tokens.len(),
            mapped = palette.len(),
            "palette built"
        );
        filter.extract_with(sheet, |value| {
            self.matcher
                .replace_all(value, |token| palette.get(token).map(str::to_string))
                .into_owned()
        })
    }

    /// Palette for `tokens`: through the transform if configured, otherwise
    /// through the library (plus swap rules where the swap gate allows).
    pub fn build_palette(&self, tokens: &[&str], config: &Config, page_url: &str) -> Palette {
        if let Some(transform) = &config.transform_function {
            return self.transform_palette(tokens, transform);
        }
        let palette = self.library.derive_palette(tokens, &config.target_colors);
        if !config.swap_rules.is_empty() && config.swap_applies_to(page_url) {
            return self.library.apply_swap(palette, &config.swap_rules);
        }
        palette
    }

    fn transform_palette(&self, tokens: &[&str], transform: &Sandbox) -> Palette {
        let mut palette = Palette::new();
        for token in tokens {
            let Some(color) = self.library.parse(token) else {
                tracing::trace!(%token, "token does not parse, leaving it unmapped");
                continue;
            };
            match transform.call(color) {
                Ok(replacement) => {
                    let replacement = replacement.to_css();
                    tracing::trace!(%token, %replacement, "transformed");
                    palette.insert(*token, replacement);
                }
                Err(error) => {
                    tracing::warn!(%token, %error, "transform failed, leaving token unchanged");
                }
            }
        }
        palette
    }

    /// Recolors one inline declaration block (an element's `style`).
    ///
    /// Returns the recolored declarations, or `None` if the block has no
    /// color literal or nothing was recolored.
    pub fn recolor_inline_style(
        &self,
        style: &str,
        config: &Config,
        page_url: &str,
    ) -> Option<String> {
        if !self.matcher.is_match(style) {
            return None;
        }
        if style.contains(['{', '}']) {
            tracing::debug!(%style, "inline style contains braces, skipping");
            return None;
        }
        let wrapped = format!("{INLINE_SELECTOR} {{ {style} }}");
        let overlay = self.recolor(&wrapped, config, page_url);
        let body = overlay
            .strip_prefix(INLINE_SELECTOR)?
            .trim_start()
            .strip_prefix('{')?
            .strip_suffix('}')?
            .trim();
        if body.is_empty() {
            return None;
        }
        Some(body.replace('\n', " "))
    }
}
