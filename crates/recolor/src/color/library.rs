//! The color-library seam: named colors, token parsing and palette building.
//!
//! [`ColorLibrary`] is the boundary between the recolor pipeline and whatever
//! knows about colors. [`CssColors`] is the default implementation, backed by
//! the CSS named-color table and CIE LAB nearest-color matching.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::named::color_names;
use super::space::nearest;
use super::{Palette, Rgba};

/// Swap rules: `from-color -> to-color`, applied to palette replacements.
///
/// Keys and values are any color token [`CssColors`] can parse.
///
/// ```yaml
/// swap_rules:
///   "#282828": "#fbf1c7"
///   white: black
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SwapRules(BTreeMap<String, String>);

impl SwapRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.0.insert(from.into(), to.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Everything the pipeline needs to know about colors.
pub trait ColorLibrary {
    /// Names recognized as color keywords (besides `transparent`).
    fn named_colors(&self) -> Vec<String>;

    /// Parses one raw color token.
    fn parse(&self, token: &str) -> Option<Rgba>;

    /// Derives a palette mapping the found `tokens` onto `target_colors`.
    fn derive_palette(&self, tokens: &[&str], target_colors: &[String]) -> Palette;

    /// Rewrites palette replacements through `rules`.
    fn apply_swap(&self, palette: Palette, rules: &SwapRules) -> Palette;
}

/// Default [`ColorLibrary`] over the CSS color grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssColors;

impl ColorLibrary for CssColors {
    fn named_colors(&self) -> Vec<String> {
        color_names().map(str::to_string).collect()
    }

    fn parse(&self, token: &str) -> Option<Rgba> {
        Rgba::parse(token)
    }

    /// Maps each token to the perceptually nearest target color.
    ///
    /// Opaque tokens become the target's `#rrggbb`; translucent tokens keep
    /// their alpha and become `rgba(...)`.
    fn derive_palette(&self, tokens: &[&str], target_colors: &[String]) -> Palette {
        let targets: Vec<Rgba> = target_colors
            .iter()
            .filter_map(|target| {
                let parsed = self.parse(target);
                if parsed.is_none() {
                    tracing::warn!(target_color = %target, "ignoring unparseable target color");
                }
                parsed
            })
            .collect();

        let mut palette = Palette::new();
        if targets.is_empty() {
            return palette;
        }

        for token in tokens {
            let Some(color) = self.parse(token) else {
                tracing::trace!(%token, "token does not parse, leaving it unmapped");
                continue;
            };
            let Some(index) = nearest(&color, &targets) else {
                continue;
            };
            let target = targets[index];
            let replacement = if color.is_opaque() {
                target.to_hex()
            } else {
                target.with_alpha(color.a).to_css()
            };
            palette.insert(*token, replacement);
        }
        palette
    }

    fn apply_swap(&self, palette: Palette, rules: &SwapRules) -> Palette {
        let rules: Vec<(Rgba, &str)> = rules
            .iter()
            .filter_map(|(from, to)| self.parse(from).map(|rgba| (rgba, to)))
            .collect();
        if rules.is_empty() {
            return palette;
        }

        palette.map_replacements(|_, replacement| {
            let current = self.parse(replacement)?;
            let (_, to) = rules.iter().find(|(from, _)| from.same_rgb(&current))?;
            if current.is_opaque() {
                return Some(to.to_string());
            }
            Some(match self.parse(to) {
                Some(swapped) => swapped.with_alpha(current.a).to_css(),
                None => to.to_string(),
            })
        })
    }
}
