//! `{{request_get::key}}` and `{{request_post::key}}` insert tags.

use crate::request::SanitizedRequest;

/// Tags handled by [`InsertTagResolver`].
pub const SUPPORTED_TAGS: [&str; 2] = ["request_get", "request_post"];

/// Renders request insert tags from cleaned request parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertTagResolver;

impl InsertTagResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a tag such as `request_get::page`, with or without braces.
    ///
    /// Returns `None` for tags this resolver does not handle. Missing keys
    /// and array values render as an empty string.
    pub fn resolve(&self, tag: &str, request: &mut SanitizedRequest) -> Option<String> {
        let tag = tag
            .trim()
            .strip_prefix("{{")
            .and_then(|inner| inner.strip_suffix("}}"))
            .unwrap_or(tag.trim());
        let (name, key) = tag.split_once("::").unwrap_or((tag, ""));

        let value = match name {
            "request_get" => request.get_get(key),
            "request_post" => request.get_post(key),
            _ => return None,
        };

        Some(value.to_text().into_owned())
    }

    pub fn supports(&self, tag: &str) -> bool {
        let name = tag.trim().trim_start_matches("{{");
        let name = name.split("::").next().unwrap_or(name);
        SUPPORTED_TAGS.contains(&name.trim_end_matches("}}"))
    }
}
