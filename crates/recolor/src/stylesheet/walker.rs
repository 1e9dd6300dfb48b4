//! Rule tree → color-only CSS fragment.
//!
//! Walks a [`Stylesheet`] and rebuilds just enough CSS to carry its
//! color-bearing declarations: each surviving declaration keeps its selector
//! (or keyframe key), and grouping rules keep their condition prelude. Empty
//! groups vanish entirely rather than leaving `@media x {  }` shells.
//!
//! | Rule | Output |
//! |------|--------|
//! | style | `selector { decl;\ndecl; }` if any declaration survives |
//! | media / supports | `@media cond { child\nchild }` if any child survives |
//! | keyframes | `@keyframes name { key { decl; } }` if any keyframe survives |
//! | import (resolved) | the imported sheet's fragment, unwrapped |
//! | import (unresolved), other | nothing |
//!
//! Feeding the fragment back through [`parse_stylesheet`](super::parse_stylesheet)
//! and this filter reproduces it exactly.

use crate::color::ColorMatcher;

use super::{Declaration, RuleNode, Stylesheet};

/// Properties whose value is a color even when it does not look like one.
pub const COLOR_PROPERTIES: [&str; 3] = ["color", "background", "background-color"];

/// Recursive filter keeping only color-bearing declarations.
#[derive(Debug, Clone, Copy)]
pub struct ColorFilter<'m> {
    matcher: &'m ColorMatcher,
}

impl<'m> ColorFilter<'m> {
    pub fn new(matcher: &'m ColorMatcher) -> Self {
        Self { matcher }
    }

    /// The color-only fragment of `sheet`; empty if nothing qualifies.
    pub fn extract(&self, sheet: &Stylesheet) -> String {
        self.extract_with(sheet, |value| value.to_string())
    }

    /// Like [`extract`](Self::extract), with every kept declaration value
    /// passed through `value`. Selectors, keyframe keys and group preludes
    /// are emitted as parsed.
    pub fn extract_with<F>(&self, sheet: &Stylesheet, mut value: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        self.rule_list(&sheet.rules, &mut value)
    }

    /// Whether a declaration carries color.
    ///
    /// True if the value contains a color literal, or if the property is one
    /// of [`COLOR_PROPERTIES`] and the value does not reference a resource.
    pub fn keeps(&self, declaration: &Declaration) -> bool {
        if self.matcher.is_match(&declaration.value) {
            return true;
        }
        let color_property = COLOR_PROPERTIES
            .iter()
            .any(|p| declaration.property.eq_ignore_ascii_case(p));
        color_property && !references_resource(&declaration.value)
    }

    fn rule_list(&self, rules: &[RuleNode], value: &mut dyn FnMut(&str) -> String) -> String {
        rules
            .iter()
            .map(|rule| self.rule(rule, value))
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn rule(&self, rule: &RuleNode, value: &mut dyn FnMut(&str) -> String) -> String {
        match rule {
            RuleNode::Style {
                selector,
                declarations,
            } => self.declaration_block(selector, declarations, value),
            RuleNode::Keyframe { key, declarations } => {
                self.declaration_block(key, declarations, value)
            }
            RuleNode::Media { condition, rules } => {
                self.group(&at_prelude("media", condition), rules, value)
            }
            RuleNode::Supports { condition, rules } => {
                self.group(&at_prelude("supports", condition), rules, value)
            }
            RuleNode::Keyframes {
                keyword,
                name,
                rules,
            } => self.group(&at_prelude(keyword, name), rules, value),
            RuleNode::Import {
                sheet: Some(sheet), ..
            } => self.rule_list(&sheet.rules, value),
            RuleNode::Import { sheet: None, .. } | RuleNode::Other { .. } => String::new(),
        }
    }

    fn declaration_block(
        &self,
        prelude: &str,
        declarations: &[Declaration],
        value: &mut dyn FnMut(&str) -> String,
    ) -> String {
        let kept: Vec<String> = declarations
            .iter()
            .filter(|d| self.keeps(d))
            .map(|d| {
                let mapped = Declaration {
                    value: value(&d.value),
                    ..d.clone()
                };
                format!("{mapped};")
            })
            .collect();
        if kept.is_empty() {
            return String::new();
        }
        format!("{} {{ {} }}", prelude, kept.join("\n"))
    }

    fn group(
        &self,
        prelude: &str,
        rules: &[RuleNode],
        value: &mut dyn FnMut(&str) -> String,
    ) -> String {
        let body = self.rule_list(rules, value);
        if body.is_empty() {
            return String::new();
        }
        format!("{} {{ {} }}", prelude, body)
    }
}

/// Convenience for [`ColorFilter::extract`].
pub fn extract_color_fragment(sheet: &Stylesheet, matcher: &ColorMatcher) -> String {
    ColorFilter::new(matcher).extract(sheet)
}

fn at_prelude(keyword: &str, text: &str) -> String {
    if text.is_empty() {
        format!("@{keyword}")
    } else {
        format!("@{keyword} {text}")
    }
}

/// True if `value` contains a `url(` function call.
fn references_resource(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.match_indices("url(").any(|(i, _)| {
        lower[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '-'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::parse_stylesheet;
    use proptest::prelude::*;

    fn fragment(css: &str) -> String {
        let matcher = ColorMatcher::css().unwrap();
        extract_color_fragment(&parse_stylesheet(css), &matcher)
    }

    // =========================================================================
    // Declaration filter
    // =========================================================================

    #[test]
    fn test_style_rule_keeps_only_color_declarations() {
        assert_eq!(
            fragment("h1 { color: #FF0000; margin: 1px; }"),
            "h1 { color:#FF0000; }"
        );
    }

    #[test]
    fn test_color_property_without_color_literal_is_kept() {
        assert_eq!(
            fragment("a { color: inherit; background: none; padding: 0 }"),
            "a { color:inherit;\nbackground:none; }"
        );
    }

    #[test]
    fn test_color_literal_in_any_property_is_kept() {
        assert_eq!(
            fragment("a { border: 1px solid #ccc; box-shadow: 0 0 1px rgba(0,0,0,.2) }"),
            "a { border:1px solid #ccc;\nbox-shadow:0 0 1px rgba(0,0,0,.2); }"
        );
    }

    #[test]
    fn test_resource_reference_is_dropped() {
        assert_eq!(fragment("a { background: url(red.png) }"), "");
        assert_eq!(fragment("a { background-color: URL(x.png) }"), "");
        assert_eq!(
            fragment("a { background: url(x.png) blue }"),
            "a { background:url(x.png) blue; }"
        );
    }

    #[test]
    fn test_important_is_preserved() {
        assert_eq!(
            fragment("a { color: red !important }"),
            "a { color:red!important; }"
        );
    }

    // =========================================================================
    // Grouping rules
    // =========================================================================

    #[test]
    fn test_media_without_color_leaves_no_shell() {
        assert_eq!(fragment("@media print { a { margin: 0 } }"), "");
    }

    #[test]
    fn test_media_and_supports_wrap_children() {
        assert_eq!(
            fragment("@media (min-width: 1px) { a { color: red; margin: 0 } b { padding: 0 } c { color: blue } }"),
            "@media (min-width: 1px) { a { color:red; }\nc { color:blue; } }"
        );
        assert_eq!(
            fragment("@supports (color: red) { a { color: red } }"),
            "@supports (color: red) { a { color:red; } }"
        );
    }

    #[test]
    fn test_keyframes_keyed_by_offset() {
        assert_eq!(
            fragment("@keyframes flash { from { color: red; opacity: 0 } to { opacity: 1 } }"),
            "@keyframes flash { from { color:red; } }"
        );
    }

    #[test]
    fn test_unsupported_rules_contribute_nothing() {
        assert_eq!(fragment("@font-face { font-family: x; color: red }"), "");
        assert_eq!(fragment("@page { background: white }"), "");
    }

    // =========================================================================
    // Imports
    // =========================================================================

    #[test]
    fn test_unresolved_import_contributes_nothing() {
        assert_eq!(fragment("@import url(theme.css); a { color: red }"), "a { color:red; }");
    }

    #[test]
    fn test_resolved_import_is_spliced_unwrapped() {
        let matcher = ColorMatcher::css().unwrap();
        let mut sheet = parse_stylesheet("@import url(theme.css); a { color: red }");
        if let RuleNode::Import { sheet: imported, .. } = &mut sheet.rules[0] {
            *imported = Some(parse_stylesheet("b { background: #000; margin: 0 }"));
        }
        assert_eq!(
            extract_color_fragment(&sheet, &matcher),
            "b { background:#000; }\na { color:red; }"
        );
    }

    #[test]
    fn test_extract_with_maps_values_only() {
        let matcher = ColorMatcher::css().unwrap();
        let sheet = parse_stylesheet(
            "@media (color) { .red, #fab { color: red !important; margin: 0 } }",
        );
        let out = ColorFilter::new(&matcher).extract_with(&sheet, |value| value.to_uppercase());
        assert_eq!(out, "@media (color) { .red, #fab { color:RED!important; } }");
    }

    // =========================================================================
    // Fixed point
    // =========================================================================

    #[test]
    fn test_fragment_is_a_fixed_point() {
        let css = "a, b > c { color: red !important; margin: 0 }
                   @media screen { @supports (display: grid) { d { background: #fff } } }
                   @keyframes k { 0%, 50% { color: transparent } }";
        let once = fragment(css);
        assert!(!once.is_empty());
        assert_eq!(fragment(&once), once);
    }

    fn declaration() -> impl Strategy<Value = String> {
        let property = prop::sample::select(vec!["color", "background", "margin", "border", "fill"]);
        let value = prop::sample::select(vec![
            "red",
            "#AbC",
            "rgba(1, 2, 3, .5)",
            "hsl(10 20% 30%)",
            "1px solid transparent",
            "url(red.png)",
            "0",
            "inherit",
        ]);
        (property, value, any::<bool>()).prop_map(|(p, v, important)| {
            format!("{p}: {v}{}", if important { " !important" } else { "" })
        })
    }

    fn rule() -> impl Strategy<Value = String> {
        let selector = prop::sample::select(vec!["a", ".x > b", "#main", "li:hover"]);
        let style = (selector, prop::collection::vec(declaration(), 0..4))
            .prop_map(|(sel, decls)| format!("{sel} {{ {} }}", decls.join("; ")));
        style.prop_recursive(3, 16, 4, |inner| {
            let children = prop::collection::vec(inner, 0..3).prop_map(|rules| rules.join("\n"));
            prop_oneof![
                children.clone().prop_map(|body| format!("@media screen {{ {body} }}")),
                children.prop_map(|body| format!("@supports (color: red) {{ {body} }}")),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_fragment_fixed_point_holds_for_generated_sheets(
            rules in prop::collection::vec(rule(), 0..5)
        ) {
            let once = fragment(&rules.join("\n"));
            prop_assert_eq!(fragment(&once), once);
        }
    }

    #[test]
    fn test_references_resource() {
        assert!(references_resource("url(a.png)"));
        assert!(references_resource("red url( a.png )"));
        assert!(!references_resource("myurl(a)"));
        assert!(!references_resource("red"));
    }
}
