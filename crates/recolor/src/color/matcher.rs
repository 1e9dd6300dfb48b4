//! Color literal recognition in CSS text.
//!
//! A single case-insensitive grammar recognizes:
//!
//! | Form | Example |
//! |------|---------|
//! | Hex, 3 or 4 digit groups | `#abc`, `#abcd`, `#aabbcc`, `#aabbccdd` |
//! | `rgb()` / `rgba()` | `rgb(1,2,3)`, `rgba(1,2,3,0.5)` |
//! | `hsl()` / `hsla()` | `hsl(0, 100%, 50%)` |
//! | Named colors (word boundary) | `red`, `rebeccapurple` |
//! | `transparent` | `transparent` |
//!
//! Functional forms match non-greedily up to the first closing parenthesis.
//!
//! `url(...)` references and quoted strings are consumed by a separate
//! alternative and never reported, so `url(red.png)` or `"Red Hat"` do not
//! yield color tokens. The presence test ([`ColorMatcher::is_match`]) and the
//! extraction/replacement passes all run the same regex, so any token that
//! extraction finds is one the presence test would flag.

use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Range;

use regex::{Captures, Regex, RegexBuilder};

use super::named::color_names;

const SKIP: &str = r#"\burl\([^)]*\)|"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#;
const LITERALS: &str = r"#(?:[0-9a-f]{3,4}){1,2}\b|\brgba?\(.+?\)|\bhsla?\(.+?\)";

/// A color literal found in CSS text.
///
/// The raw text is kept verbatim; it is the palette key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorToken<'t> {
    text: &'t str,
    range: Range<usize>,
}

impl<'t> ColorToken<'t> {
    pub fn as_str(&self) -> &'t str {
        self.text
    }

    /// Byte range of the token in the scanned text.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// Pattern-based recognizer for color literals.
#[derive(Debug, Clone)]
pub struct ColorMatcher {
    regex: Regex,
}

impl ColorMatcher {
    /// Builds a matcher recognizing the given color names besides the
    /// hex/functional forms and `transparent`.
    pub fn new<I, S>(names: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = names
            .into_iter()
            .map(|name| regex::escape(name.as_ref()))
            .collect();
        keywords.push("transparent".to_string());

        let pattern = format!(
            r"(?P<skip>{SKIP})|(?P<color>{LITERALS}|\b(?:{})\b)",
            keywords.join("|")
        );
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(1 << 24)
            .build()?;
        Ok(Self { regex })
    }

    /// Matcher over the CSS named colors.
    pub fn css() -> Result<Self, regex::Error> {
        Self::new(color_names())
    }

    /// Presence test: does `text` contain at least one color literal?
    pub fn is_match(&self, text: &str) -> bool {
        self.find_iter(text).next().is_some()
    }

    /// Iterates color tokens in text order, duplicates included.
    pub fn find_iter<'m, 't>(&'m self, text: &'t str) -> impl Iterator<Item = ColorToken<'t>> + 'm
    where
        't: 'm,
    {
        self.regex.captures_iter(text).filter_map(|caps| {
            caps.name("color").map(|m| ColorToken {
                text: m.as_str(),
                range: m.range(),
            })
        })
    }

    /// Distinct raw tokens, in order of first appearance.
    pub fn distinct_tokens<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut seen = HashSet::new();
        self.find_iter(text)
            .map(|token| token.as_str())
            .filter(|token| seen.insert(*token))
            .collect()
    }

    /// Replaces every color token for which `replacement` returns a value.
    ///
    /// Tokens mapped to `None`, and all skipped text, are left untouched.
    pub fn replace_all<'t, F>(&self, text: &'t str, mut replacement: F) -> Cow<'t, str>
    where
        F: FnMut(&str) -> Option<String>,
    {
        self.regex.replace_all(text, |caps: &Captures<'_>| match caps.name("color") {
            Some(m) => replacement(m.as_str()).unwrap_or_else(|| m.as_str().to_string()),
            None => caps[0].to_string(),
        })
    }
}
