//! Recolor configuration.
//!
//! A [`Config`] is loaded once and read by every pass. All fields are
//! optional:
//!
//! ```yaml
//! include_url_pattern: '^https://docs\.'
//! exclude_url_pattern: '/print/'
//! target_colors: ["#282828", "#fbf1c7", "#cc241d"]
//! swap_rules:
//!   "#fbf1c7": "#ebdbb2"
//! swap_include_pattern: 'example\.com'
//! transform_function: "[255 - r, 255 - g, 255 - b, a]"
//! ```
//!
//! `transform_function`, when present, replaces the `target_colors` and
//! `swap_rules` path entirely.

use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::color::SwapRules;
use crate::error::ConfigError;
use crate::sandbox::Sandbox;

/// A URL-matching regular expression, validated at load.
#[derive(Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct UrlPattern(Regex);

impl UrlPattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.0.is_match(url)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for UrlPattern {
    type Error = ConfigError;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        UrlPattern::new(&pattern)
    }
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UrlPattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Caller-provided settings for recolor passes. Read-only during a pass.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pages the recolorer runs on. Absent: every page.
    pub include_url_pattern: Option<UrlPattern>,
    /// Pages the recolorer skips. Absent: none.
    pub exclude_url_pattern: Option<UrlPattern>,
    /// Palette the found colors are mapped onto.
    pub target_colors: Vec<String>,
    pub swap_rules: SwapRules,
    /// Pages the swap step runs on. Absent: every page.
    pub swap_include_pattern: Option<UrlPattern>,
    /// Pages the swap step skips. Absent: none.
    pub swap_exclude_pattern: Option<UrlPattern>,
    pub transform_function: Option<Sandbox>,
}

impl Config {
    /// Parses a YAML config document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Reads and parses a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&yaml).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    pub fn with_target_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_swap_rules(mut self, rules: SwapRules) -> Self {
        self.swap_rules = rules;
        self
    }

    pub fn with_transform(mut self, transform: Sandbox) -> Self {
        self.transform_function = Some(transform);
        self
    }

    /// Whether recoloring runs at all on `url`.
    pub fn applies_to(&self, url: &str) -> bool {
        gate(&self.include_url_pattern, &self.exclude_url_pattern, url)
    }

    /// Whether the swap step runs on `url`.
    pub fn swap_applies_to(&self, url: &str) -> bool {
        gate(&self.swap_include_pattern, &self.swap_exclude_pattern, url)
    }
}

fn gate(include: &Option<UrlPattern>, exclude: &Option<UrlPattern>, url: &str) -> bool {
    let included = include.as_ref().map_or(true, |p| p.is_match(url));
    let excluded = exclude.as_ref().is_some_and(|p| p.is_match(url));
    included && !excluded
}
