//! Per-pass mapping from original color tokens to replacements.

use std::collections::HashMap;

/// Mapping from raw color token text to replacement text.
///
/// Keys are raw tokens exactly as they appear in the CSS (`#FFF` and `#fff`
/// are different keys). An insert whose replacement is empty or equal to the
/// key is ignored, so an absent key always means "leave the token alone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: HashMap<String, String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `token -> replacement`. Returns whether the entry was kept.
    pub fn insert(&mut self, token: impl Into<String>, replacement: impl Into<String>) -> bool {
        let token = token.into();
        let replacement = replacement.into();
        if replacement.trim().is_empty() || replacement == token {
            return false;
        }
        self.entries.insert(token, replacement);
        true
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rewrites every replacement through `f`. If `f` returns `None` the
    /// current replacement is kept.
    pub fn map_replacements<F>(self, mut f: F) -> Self
    where
        F: FnMut(&str, &str) -> Option<String>,
    {
        let mut out = Palette::new();
        for (token, replacement) in self.entries {
            let next = f(&token, &replacement).unwrap_or(replacement);
            out.insert(token, next);
        }
        out
    }
}

impl<K, V> FromIterator<(K, V)> for Palette
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut palette = Palette::new();
        for (token, replacement) in iter {
            palette.insert(token, replacement);
        }
        palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_ignores_empty_and_unchanged() {
        let mut palette = Palette::new();
        assert!(!palette.insert("red", ""));
        assert!(!palette.insert("red", "red"));
        assert!(palette.insert("red", "#000"));
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.get("red"), Some("#000"));
        assert_eq!(palette.get("RED"), None);
    }

    #[test]
    fn test_map_replacements_drops_entries_that_become_identity() {
        let palette: Palette = [("red", "#000"), ("blue", "#111")].into_iter().collect();
        let mapped = palette.map_replacements(|token, _| (token == "red").then(|| "red".into()));
        assert_eq!(mapped.get("red"), None);
        assert_eq!(mapped.get("blue"), Some("#111"));
    }
}
