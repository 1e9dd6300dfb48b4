//! Parsed stylesheet rule trees and the color-only filter over them.
//!
//! - [`parse_stylesheet`]: CSS text → [`Stylesheet`] (error-recovering,
//!   built on `cssparser`)
//! - [`ColorFilter`]: [`Stylesheet`] → color-only CSS fragment
//! - [`resolve_imports`]: fetches and attaches `@import`ed sheets
//!
//! The rule kinds form a closed set, so [`RuleNode`] is an enum and every
//! consumer matches on it exhaustively.

mod imports;
mod parser;
mod walker;

use std::fmt;

pub(crate) use imports::resolve_href;
pub use imports::{resolve_imports, MAX_IMPORT_DEPTH};
pub use parser::{parse_stylesheet, MAX_NESTING};
pub use walker::{extract_color_fragment, ColorFilter, COLOR_PROPERTIES};

/// Root of a parsed stylesheet. Owns its top-level rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<RuleNode>,
}

/// One rule of a parsed stylesheet.
///
/// Text fields hold the source text verbatim (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleNode {
    /// `selector { declarations }`
    Style {
        selector: String,
        declarations: Vec<Declaration>,
    },
    /// `@media condition { rules }`
    Media { condition: String, rules: Vec<RuleNode> },
    /// `@supports condition { rules }`
    Supports { condition: String, rules: Vec<RuleNode> },
    /// `@keyframes name { keyframes }`. `keyword` keeps vendor prefixes,
    /// e.g. `-webkit-keyframes`.
    Keyframes {
        keyword: String,
        name: String,
        rules: Vec<RuleNode>,
    },
    /// `key { declarations }` inside a keyframes rule (`from`, `50%`, ...).
    Keyframe {
        key: String,
        declarations: Vec<Declaration>,
    },
    /// `@import href conditions;`. `sheet` is the imported stylesheet once
    /// resolved.
    Import {
        href: String,
        conditions: String,
        sheet: Option<Stylesheet>,
    },
    /// Any other at-rule (`@font-face`, `@page`, `@namespace`, ...), or a
    /// grouping rule nested beyond [`MAX_NESTING`].
    Other { name: String },
}

impl RuleNode {
    /// Short kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RuleNode::Style { .. } => "style",
            RuleNode::Media { .. } => "media",
            RuleNode::Supports { .. } => "supports",
            RuleNode::Keyframes { .. } => "keyframes",
            RuleNode::Keyframe { .. } => "keyframe",
            RuleNode::Import { .. } => "import",
            RuleNode::Other { .. } => "other",
        }
    }
}

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

/// `property:value`, with `!important` appended iff important.
impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.value)?;
        if self.important {
            f.write_str("!important")?;
        }
        Ok(())
    }
}
