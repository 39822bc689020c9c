use crate::error::Result;
use crate::tidy::AllowedTags;
use serde::{Deserialize, Serialize};

/// Per-call cleaning options.
///
/// Every call carries its own options; nothing is shared between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Leave entities decoded instead of re-encoding special characters.
    pub decode_entities: bool,

    /// Escape `{{` and `}}` in the output.
    pub encode_placeholders: bool,

    /// Tags kept as markup by `clean_html`. Empty means no filtering.
    pub allowed_tags: AllowedTags,

    /// Run the tag tidy filter.
    pub tidy: bool,

    /// Strict XSS filtering (event handlers, script URLs).
    pub strict_mode: bool,
}

impl CleanOptions {
    /// Defaults of `clean`: tidy, strict, placeholders escaped.
    pub fn new() -> Self {
        Self {
            decode_entities: false,
            encode_placeholders: true,
            allowed_tags: AllowedTags::default(),
            tidy: true,
            strict_mode: true,
        }
    }

    /// Defaults for query parameters: no tidy, special characters encoded.
    pub fn query() -> Self {
        Self::new().with_tidy(false)
    }

    /// Defaults for body parameters.
    pub fn post() -> Self {
        Self::new()
    }

    /// Defaults of `clean_raw`: no tidy, lenient filtering.
    pub fn raw() -> Self {
        Self::new().with_tidy(false).with_strict_mode(false)
    }

    pub fn with_decode_entities(mut self, decode: bool) -> Self {
        self.decode_entities = decode;
        self
    }

    pub fn with_encode_placeholders(mut self, encode: bool) -> Self {
        self.encode_placeholders = encode;
        self
    }

    /// Set allowed tags from `<tag1><tag2>` notation or a parsed set.
    pub fn with_allowed_tags(mut self, tags: impl Into<AllowedTags>) -> Self {
        self.allowed_tags = tags.into();
        self
    }

    pub fn with_tidy(mut self, tidy: bool) -> Self {
        self.tidy = tidy;
        self
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Load options from a JSON object. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CleanOptions::default();

        assert!(!options.decode_entities);
        assert!(options.encode_placeholders);
        assert!(options.tidy);
        assert!(options.strict_mode);
        assert!(options.allowed_tags.is_empty());
    }

    #[test]
    fn test_presets() {
        assert!(!CleanOptions::query().tidy);
        assert!(CleanOptions::post().tidy);

        let raw = CleanOptions::raw();
        assert!(!raw.tidy);
        assert!(!raw.strict_mode);
        assert!(raw.encode_placeholders);
    }

    #[test]
    fn test_builder() {
        let options = CleanOptions::new()
            .with_decode_entities(true)
            .with_encode_placeholders(false)
            .with_allowed_tags("<p><span>");

        assert!(options.decode_entities);
        assert!(!options.encode_placeholders);
        assert!(options.allowed_tags.contains("span"));
    }

    #[test]
    fn test_from_json_partial() {
        let options =
            CleanOptions::from_json(r#"{"allowed_tags": "<p>", "strict_mode": false}"#).unwrap();

        assert!(options.allowed_tags.contains("p"));
        assert!(!options.strict_mode);
        assert!(options.tidy);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(CleanOptions::from_json("{").is_err());
    }
}
