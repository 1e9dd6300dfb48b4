//! CSS text → [`Stylesheet`].
//!
//! Built on `cssparser`'s rule-list machinery, which recovers from malformed
//! rules by skipping them. Unlike a CSSOM, nothing is normalized: selectors,
//! conditions and declaration values keep their source text, so the raw color
//! tokens in a value are exactly the palette keys later on.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};

use super::{Declaration, RuleNode, Stylesheet};

/// Grouping rules nested deeper than this are kept as [`RuleNode::Other`].
pub const MAX_NESTING: usize = 32;

/// Parses a stylesheet. Never fails; rules that do not parse are dropped.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    Stylesheet {
        rules: parse_rule_list(&mut parser, 0),
    }
}

fn parse_rule_list<'i, 't>(input: &mut Parser<'i, 't>, depth: usize) -> Vec<RuleNode> {
    let mut rule_parser = RuleListParser { depth };
    StyleSheetParser::new(input, &mut rule_parser)
        .filter_map(|result| match result {
            Ok(rule) => Some(rule),
            Err((error, source)) => {
                tracing::debug!(?error, rule = %source.trim(), "skipping unparseable rule");
                None
            }
        })
        .collect()
}

fn parse_keyframe_list<'i, 't>(input: &mut Parser<'i, 't>) -> Vec<RuleNode> {
    StyleSheetParser::new(input, &mut KeyframeListParser)
        .filter_map(|result| match result {
            Ok(rule) => Some(rule),
            Err((error, source)) => {
                tracing::debug!(?error, keyframe = %source.trim(), "skipping unparseable keyframe");
                None
            }
        })
        .collect()
}

fn parse_declarations<'i, 't>(input: &mut Parser<'i, 't>) -> Vec<Declaration> {
    let mut decl_parser = DeclarationListParser;
    RuleBodyParser::new(input, &mut decl_parser)
        .filter_map(|result| match result {
            Ok(declaration) => Some(declaration),
            Err((error, source)) => {
                tracing::trace!(?error, declaration = %source.trim(), "skipping declaration");
                None
            }
        })
        .collect()
}

/// Consumes the rest of `input` and returns its source text, trimmed.
fn consume_raw<'i, 't>(input: &mut Parser<'i, 't>) -> String {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start).trim().to_string()
}

/// Splits a trailing `!important` off a raw value.
fn split_important(raw: &str) -> (&str, bool) {
    let trimmed = raw.trim();
    let keyword_start = trimmed.len().saturating_sub("important".len());
    if let Some(keyword) = trimmed.get(keyword_start..) {
        if keyword.eq_ignore_ascii_case("important") {
            if let Some(value) = trimmed[..keyword_start].trim_end().strip_suffix('!') {
                return (value.trim_end(), true);
            }
        }
    }
    (trimmed, false)
}

fn is_keyframes(name: &str) -> bool {
    name == "keyframes" || (name.starts_with('-') && name.ends_with("-keyframes"))
}

// ============================================================================
// Top-level and grouping rule lists
// ============================================================================

struct RuleListParser {
    depth: usize,
}

enum AtPrelude {
    Media(String),
    Supports(String),
    Keyframes { keyword: String, name: String },
    Import { href: String, conditions: String },
    Other(String),
}

impl<'i> QualifiedRuleParser<'i> for RuleListParser {
    type Prelude = String;
    type QualifiedRule = RuleNode;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let selector = consume_raw(input);
        if selector.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }
        Ok(selector)
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Ok(RuleNode::Style {
            selector,
            declarations: parse_declarations(input),
        })
    }
}

impl<'i> AtRuleParser<'i> for RuleListParser {
    type Prelude = AtPrelude;
    type AtRule = RuleNode;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let lower = name.as_ref().to_ascii_lowercase();
        let groups_allowed = self.depth < MAX_NESTING;

        let prelude = match lower.as_str() {
            "media" if groups_allowed => AtPrelude::Media(consume_raw(input)),
            "supports" if groups_allowed => AtPrelude::Supports(consume_raw(input)),
            "import" => {
                let href = input.expect_url_or_string()?.as_ref().to_string();
                AtPrelude::Import {
                    href,
                    conditions: consume_raw(input),
                }
            }
            _ if groups_allowed && is_keyframes(&lower) => AtPrelude::Keyframes {
                keyword: name.as_ref().to_string(),
                name: consume_raw(input),
            },
            _ => {
                consume_raw(input);
                AtPrelude::Other(lower)
            }
        };
        Ok(prelude)
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        match prelude {
            AtPrelude::Import { href, conditions } => Ok(RuleNode::Import {
                href,
                conditions,
                sheet: None,
            }),
            AtPrelude::Other(name) => Ok(RuleNode::Other { name }),
            _ => Err(()),
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let depth = self.depth + 1;
        let rule = match prelude {
            AtPrelude::Media(condition) => RuleNode::Media {
                condition,
                rules: parse_rule_list(input, depth),
            },
            AtPrelude::Supports(condition) => RuleNode::Supports {
                condition,
                rules: parse_rule_list(input, depth),
            },
            AtPrelude::Keyframes { keyword, name } => RuleNode::Keyframes {
                keyword,
                name,
                rules: parse_keyframe_list(input),
            },
            AtPrelude::Import { .. } => return Err(input.new_custom_error::<(), ()>(())),
            AtPrelude::Other(name) => {
                consume_raw(input);
                RuleNode::Other { name }
            }
        };
        Ok(rule)
    }
}

// ============================================================================
// Keyframe lists
// ============================================================================

struct KeyframeListParser;

impl<'i> QualifiedRuleParser<'i> for KeyframeListParser {
    type Prelude = String;
    type QualifiedRule = RuleNode;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Ok(consume_raw(input))
    }

    fn parse_block<'t>(
        &mut self,
        key: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Ok(RuleNode::Keyframe {
            key,
            declarations: parse_declarations(input),
        })
    }
}

impl<'i> AtRuleParser<'i> for KeyframeListParser {
    type Prelude = ();
    type AtRule = RuleNode;
    type Error = ();
}

// ============================================================================
// Declaration blocks
// ============================================================================

struct DeclarationListParser;

impl<'i> DeclarationParser<'i> for DeclarationListParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let raw = consume_raw(input);
        let (value, important) = split_important(&raw);
        if value.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }
        Ok(Declaration {
            property: name.as_ref().to_string(),
            value: value.to_string(),
            important,
        })
    }
}

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}
