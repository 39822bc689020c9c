//! Tag tidy and allow-list filter.
//!
//! Well-formed tags are recognized with a small tag grammar before anything
//! is parsed. Every other `<` is parked as the `[lt]` placeholder, so the
//! HTML parser only ever sees markup that looked like a real tag. When an
//! allow-list is given, elements outside of it are serialized back to text
//! and escaped instead of being dropped.

use crate::encoder::EntityCodec;
use crate::engine::{ElementPolicy, FragmentEngine};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

const DISALLOWED_OPEN: &str = "[[xlt]]";
const DISALLOWED_CLOSE: &str = "[[xgt]]";

static SELF_CLOSING_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\s+>").unwrap());

static NBSP_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\[nbsp\])+").unwrap());

// The patterns below are matched against the text following a `<`.

static COMMENT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^!--[\s\S]*-->").unwrap());

static PROCESSING_INSTRUCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\?[\s\S]*\?>").unwrap());

static CLOSING_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^/[^.\-0-9][^/\]'"\[!#$%&()*+,;<=>?@^`{|}~ ]*\s?/?>"#).unwrap()
});

static OPENING_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^[^.\-0-9][^/\]'"\[!#$%&()*+,;<=>?@^`{|}~ ]*"#,
        r#"(?:\s[^.\-0-9][^/\]'"\[!#$%&()*+,;<=>?@^`{|}~ ]*(?:=(?:"[^"]*"|'[^']*'|[^'"<\s]*))?)*"#,
        r#"\s?/?>"#,
    ))
    .unwrap()
});

/// Set of tag names allowed to stay markup.
///
/// Parsed from the `<p><span>` notation. An empty set disables allow-list
/// filtering altogether; it does not reject every tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AllowedTags {
    tags: BTreeSet<String>,
}

impl AllowedTags {
    /// Parse `<tag1><tag2>` notation. Names are lowercased.
    pub fn parse(spec: &str) -> Self {
        let tags = spec
            .replace('>', "")
            .split('<')
            .map(|name| name.trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        Self { tags }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl fmt::Display for AllowedTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.tags {
            write!(f, "<{}>", tag)?;
        }
        Ok(())
    }
}

impl FromStr for AllowedTags {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for AllowedTags {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}

impl From<String> for AllowedTags {
    fn from(spec: String) -> Self {
        Self::parse(&spec)
    }
}

impl From<AllowedTags> for String {
    fn from(tags: AllowedTags) -> Self {
        tags.to_string()
    }
}

impl ElementPolicy for AllowedTags {
    fn keeps(&self, tag: &str) -> bool {
        self.contains(tag)
    }

    fn neutralize(&self, markup: &str) -> String {
        markup
            .replace('<', DISALLOWED_OPEN)
            .replace('>', DISALLOWED_CLOSE)
    }
}

/// Run the tidy filter over a single value.
pub fn tidy<E>(engine: &E, value: &str, allowed: &AllowedTags, decode_entities: bool) -> String
where
    E: FragmentEngine + ?Sized,
{
    if value.is_empty() || value == "0" {
        return value.to_string();
    }

    if !EntityCodec::decode_entities(value).contains(['"', '\'', '<', '>', '(', ')']) {
        return value.to_string();
    }

    let value = SELF_CLOSING_WHITESPACE.replace_all(value, "/>");
    let value = encode_tag_openers(&value).replace('<', "[lt]");
    let value = EntityCodec::decode_entities(&value)
        .replace("&lt;!--", "<!--")
        .replace("&lt;![", "<![");
    let value = strip_encoded_nulls(value);

    let policy = (!allowed.is_empty()).then_some(allowed as &dyn ElementPolicy);
    let value = match engine.rewrite(&value, policy) {
        Ok(rendered) => rendered,
        Err(error) => {
            tracing::warn!(%error, "Fragment rewrite failed, keeping unparsed value");
            value
        }
    };

    let value = EntityCodec::decode_entities(&value);
    let value = NBSP_PLACEHOLDER.replace_all(&value, "");
    let mut value = EntityCodec::restore_basic_entities(&value, decode_entities);

    if !decode_entities {
        value = EntityCodec::encode_special_chars(&value);
    }

    value
        .replace(DISALLOWED_OPEN, "&#60;")
        .replace(DISALLOWED_CLOSE, "&#62;")
}

/// Encode the `<` of every well-formed tag as `&lt;`.
///
/// Only the opening bracket is rewritten. Scanning resumes after the end of
/// each recognized tag, so brackets inside attribute values of a matched tag
/// are left for the `[lt]` pass.
pub fn encode_tag_openers(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() + 16);
    let mut rest = value;

    while let Some(offset) = rest.find('<') {
        encoded.push_str(&rest[..offset]);
        let after = &rest[offset + 1..];

        match match_tag(after) {
            Some(len) => {
                encoded.push_str("&lt;");
                encoded.push_str(&after[..len]);
                rest = &after[len..];
            }
            None => {
                encoded.push('<');
                rest = after;
            }
        }
    }

    encoded.push_str(rest);
    encoded
}

/// Length of the tag starting right after a `<`, if it is well-formed.
fn match_tag(after: &str) -> Option<usize> {
    let pattern: &Regex = if after.starts_with("!--") {
        &COMMENT_TAG
    } else if after.starts_with('?') {
        &PROCESSING_INSTRUCTION
    } else if after.starts_with('/') {
        &CLOSING_TAG
    } else {
        &OPENING_TAG
    };

    pattern.find(after).map(|m| m.end())
}

fn strip_encoded_nulls(mut value: String) -> String {
    while value.contains("\\0") {
        value = value.replace("\\0", "");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_tags_parse() {
        let tags = AllowedTags::parse("<P><span><br>");

        assert_eq!(tags.len(), 3);
        assert!(tags.contains("p"));
        assert!(tags.contains("SPAN"));
        assert!(!tags.contains("b"));
        assert_eq!(tags.to_string(), "<br><p><span>");
    }

    #[test]
    fn test_allowed_tags_empty() {
        assert!(AllowedTags::parse("").is_empty());
        assert!(AllowedTags::parse("<>< >").is_empty());
    }

    #[test]
    fn test_allowed_tags_serde_as_string() {
        let tags: AllowedTags = serde_json::from_str(r#""<p><a>""#).unwrap();
        assert!(tags.contains("a"));
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#""<a><p>""#);
    }

    #[test]
    fn test_neutralize_markup() {
        let tags = AllowedTags::parse("<p>");
        assert_eq!(tags.neutralize("<b>x</b>"), "[[xlt]]b[[xgt]]x[[xlt]]/b[[xgt]]");
    }

    #[test]
    fn test_encode_well_formed_tags() {
        assert_eq!(
            encode_tag_openers(r#"<p class="a">x</p>"#),
            r#"&lt;p class="a">x&lt;/p>"#
        );
        assert_eq!(encode_tag_openers("<br/>"), "&lt;br/>");
        assert_eq!(encode_tag_openers("<!-- c -->"), "&lt;!-- c -->");
        assert_eq!(encode_tag_openers("<?php x ?>"), "&lt;?php x ?>");
    }

    #[test]
    fn test_malformed_brackets_left_alone() {
        assert_eq!(encode_tag_openers("a <5 b"), "a <5 b");
        assert_eq!(encode_tag_openers("<.x>"), "<.x>");
        assert_eq!(encode_tag_openers("<-x>"), "<-x>");
        assert_eq!(encode_tag_openers("bla << bla"), "bla << bla");
        assert_eq!(encode_tag_openers("<a.b@c.de>"), "<a.b@c.de>");
    }

    #[test]
    fn test_brackets_inside_attribute_value() {
        assert_eq!(
            encode_tag_openers(r#"<p title="a <b> c">"#),
            r#"&lt;p title="a <b> c">"#
        );
    }

    #[test]
    fn test_self_closing_whitespace() {
        assert_eq!(SELF_CLOSING_WHITESPACE.replace_all("<br / >", "/>"), "<br />");
    }
}
