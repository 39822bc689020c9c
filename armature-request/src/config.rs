// Request cleaning configuration

use crate::error::{RequestError, Result};
use armature_xss::{AllowedTags, CleanOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    /// Detect the format from a file path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RequestError::Load("No file extension found".to_string()))?;

        FileFormat::from_extension(ext).ok_or_else(|| RequestError::UnsupportedFormat(ext.to_string()))
    }
}

/// Default cleaning options for a [`SanitizedRequest`](crate::SanitizedRequest).
///
/// ```toml
/// html_allowed_tags = "<p><a><strong>"
/// encode_placeholders_in_backend = false
///
/// [post]
/// strict_mode = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Options for query getters. Placeholders are always escaped.
    pub query: CleanOptions,

    /// Options for body getters and the HTML body getters.
    pub post: CleanOptions,

    /// Options for raw body getters.
    pub raw: CleanOptions,

    /// Tags kept as markup by the HTML body getters.
    pub html_allowed_tags: AllowedTags,

    /// Escape placeholders in body values of backend requests too.
    pub encode_placeholders_in_backend: bool,
}

impl InputConfig {
    pub fn new() -> Self {
        Self {
            query: CleanOptions::query(),
            post: CleanOptions::post(),
            raw: CleanOptions::raw(),
            html_allowed_tags: AllowedTags::default(),
            encode_placeholders_in_backend: false,
        }
    }

    pub fn with_html_allowed_tags(mut self, tags: impl Into<AllowedTags>) -> Self {
        self.html_allowed_tags = tags.into();
        self
    }

    pub fn with_encode_placeholders_in_backend(mut self, encode: bool) -> Self {
        self.encode_placeholders_in_backend = encode;
        self
    }

    /// Parse configuration from a string in the given format.
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        let config = match format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| RequestError::Parse(format!("JSON parse error: {}", e)))?,
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| RequestError::Parse(format!("TOML parse error: {}", e)))?,
        };

        debug!(?format, "Loaded input configuration");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Self::parse(content, FileFormat::Json)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Self::parse(content, FileFormat::Toml)
    }

    /// Load configuration from a file, detecting the format from its extension.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = fs::read_to_string(path)
            .map_err(|e| RequestError::Load(format!("Failed to read file: {}", e)))?;

        debug!(path = %path.display(), "Reading input configuration");
        Self::parse(&content, format)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = InputConfig::default();

        assert!(!config.query.tidy);
        assert!(config.post.tidy);
        assert!(!config.raw.strict_mode);
        assert!(config.html_allowed_tags.is_empty());
        assert!(!config.encode_placeholders_in_backend);
    }

    #[test]
    fn test_parse_toml() {
        let config = InputConfig::from_toml(
            r#"
            html_allowed_tags = "<p><strong>"

            [post]
            strict_mode = false
        "#,
        )
        .unwrap();

        assert!(config.html_allowed_tags.contains("strong"));
        assert!(!config.post.strict_mode);
        assert!(config.post.tidy);
        assert!(!config.query.tidy);
    }

    #[test]
    fn test_parse_json() {
        let config =
            InputConfig::from_json(r#"{"encode_placeholders_in_backend": true}"#).unwrap();

        assert!(config.encode_placeholders_in_backend);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            InputConfig::from_json("{"),
            Err(RequestError::Parse(_))
        ));
        assert!(matches!(
            InputConfig::from_toml("post = "),
            Err(RequestError::Parse(_))
        ));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);

        assert!(matches!(
            FileFormat::from_path("input.yaml"),
            Err(RequestError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            FileFormat::from_path("input"),
            Err(RequestError::Load(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "html_allowed_tags = \"<em>\"").unwrap();

        let config = InputConfig::load_file(file.path()).unwrap();
        assert!(config.html_allowed_tags.contains("em"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            InputConfig::load_file("/nonexistent/input.json"),
            Err(RequestError::Load(_))
        ));
    }
}
