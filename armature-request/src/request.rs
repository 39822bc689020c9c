//! The sanitizing request wrapper.

use crate::bag::ParameterBag;
use crate::config::InputConfig;
use crate::query::{QueryParameterBag, UnusedParameterSource};
use crate::scope::ScopeMatcher;
use ammonia::Builder;
use armature_xss::{CleanOptions, EntityCodec, Params, Value, XssSanitizer};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{C}").unwrap());

/// Request parameters behind cleaning getters.
///
/// Built once per request and passed explicitly. Query getters always escape
/// placeholders; body getters escape them only for frontend requests (and for
/// backend requests when configured to).
///
/// # Examples
///
/// ```
/// use armature_request::{FixedScope, ParameterBag, SanitizedRequest};
/// use armature_xss::Value;
///
/// let query = ParameterBag::from_query_string("q=%3Cb%3Eterm%3C%2Fb%3E").unwrap();
/// let mut request = SanitizedRequest::new(query, ParameterBag::new(), FixedScope::Frontend);
///
/// assert_eq!(request.get_get("q"), Value::from("&#60;b&#62;term&#60;/b&#62;"));
/// ```
pub struct SanitizedRequest {
    query: QueryParameterBag,
    body: ParameterBag,
    attributes: ParameterBag,
    scope: Arc<dyn ScopeMatcher>,
    config: InputConfig,
    sanitizer: XssSanitizer,
}

impl SanitizedRequest {
    /// Wrap query and body parameters. Parameters holding `Null` are dropped.
    pub fn new(
        query: impl Into<QueryParameterBag>,
        body: ParameterBag,
        scope: impl ScopeMatcher + 'static,
    ) -> Self {
        Self::with_scope_matcher(query, body, Arc::new(scope))
    }

    /// Wrap parameters with a shared scope matcher.
    pub fn with_scope_matcher(
        query: impl Into<QueryParameterBag>,
        body: ParameterBag,
        scope: Arc<dyn ScopeMatcher>,
    ) -> Self {
        let mut query = query.into();
        query.inner_mut().remove_nulls();

        Self {
            query,
            body: body.without_nulls(),
            attributes: ParameterBag::new(),
            scope,
            config: InputConfig::default(),
            sanitizer: XssSanitizer::new(),
        }
    }

    pub fn with_config(mut self, config: InputConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_attributes(mut self, attributes: ParameterBag) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attach the source of unused query parameters.
    pub fn with_unused_source(mut self, source: Arc<dyn UnusedParameterSource>) -> Self {
        self.query.set_unused_source(source);
        self
    }

    // Query parameters

    /// Set a query parameter. `Null` removes it.
    ///
    /// Spaces, dots and opening brackets in the key become underscores
    /// before the key is cleaned.
    pub fn set_get(&mut self, key: &str, value: impl Into<Value>) {
        let normalized: String = key
            .chars()
            .map(|c| if matches!(c, ' ' | '.' | '[') { '_' } else { c })
            .collect();
        if normalized != key {
            debug!(key, normalized = %normalized, "Normalized query parameter key");
        }

        let key = self.clean_key(&normalized);
        let value = value.into();
        if value.is_null() {
            self.query.remove(&key);
        } else {
            self.query.set(key, value);
        }
    }

    pub fn has_get(&mut self, key: &str) -> bool {
        self.query.has(key)
    }

    /// A cleaned query parameter, or `Null` when absent.
    pub fn get_get(&mut self, key: &str) -> Value {
        let options = self.config.query.clone();
        self.get_get_with(key, &options)
    }

    /// A cleaned query parameter with explicit options. Placeholders are
    /// escaped regardless of `options`.
    pub fn get_get_with(&mut self, key: &str, options: &CleanOptions) -> Value {
        let options = options.clone().with_encode_placeholders(true);
        let value = self.query.get_or(key, Value::Null);
        self.sanitizer.clean(value, &options)
    }

    /// Every query parameter, cleaned.
    pub fn get_all_get(&mut self) -> Params {
        let keys = self.query.keys();
        keys.into_iter()
            .map(|key| {
                let value = self.get_get(&key);
                (key, value)
            })
            .collect()
    }

    // Body parameters

    /// Set a body parameter. `Null` removes it.
    pub fn set_post(&mut self, key: &str, value: impl Into<Value>) {
        let key = self.clean_key(key);
        let value = value.into();
        if value.is_null() {
            self.body.remove(&key);
        } else {
            self.body.set(key, value);
        }
    }

    pub fn has_post(&self, key: &str) -> bool {
        self.body.has(key)
    }

    /// A cleaned body parameter, or `Null` when absent.
    pub fn get_post(&mut self, key: &str) -> Value {
        let options = self.config.post.clone();
        self.get_post_with(key, &options)
    }

    /// A cleaned body parameter with explicit options. Placeholder escaping
    /// follows the request scope.
    pub fn get_post_with(&mut self, key: &str, options: &CleanOptions) -> Value {
        let options = self.body_options(options);
        let value = self.body.get_or(key, Value::Null);
        self.sanitizer.clean(value, &options)
    }

    pub fn get_all_post(&mut self) -> Params {
        self.clean_all_body(Self::get_post)
    }

    /// A body parameter with the configured allow-listed tags kept as markup.
    pub fn get_post_html(&mut self, key: &str) -> Value {
        let options = self
            .config
            .post
            .clone()
            .with_allowed_tags(self.config.html_allowed_tags.clone());
        self.get_post_html_with(key, &options)
    }

    pub fn get_post_html_with(&mut self, key: &str, options: &CleanOptions) -> Value {
        let options = self.body_options(options);
        let value = self.body.get_or(key, Value::Null);
        self.sanitizer.clean_html(value, &options)
    }

    pub fn get_all_post_html(&mut self) -> Params {
        self.clean_all_body(Self::get_post_html)
    }

    /// A filtered but unencoded body parameter.
    pub fn get_post_raw(&mut self, key: &str) -> Value {
        let options = self.config.raw.clone();
        self.get_post_raw_with(key, &options)
    }

    pub fn get_post_raw_with(&mut self, key: &str, options: &CleanOptions) -> Value {
        let options = self.body_options(options);
        let value = self.body.get_or(key, Value::Null);
        self.sanitizer.clean_raw(value, &options)
    }

    pub fn get_all_post_raw(&mut self) -> Params {
        self.clean_all_body(Self::get_post_raw)
    }

    fn clean_all_body(&mut self, getter: fn(&mut Self, &str) -> Value) -> Params {
        self.body
            .keys()
            .into_iter()
            .map(|key| {
                let value = getter(self, &key);
                (key, value)
            })
            .collect()
    }

    fn body_options(&self, options: &CleanOptions) -> CleanOptions {
        options
            .clone()
            .with_encode_placeholders(self.encode_body_placeholders())
    }

    fn encode_body_placeholders(&self) -> bool {
        let scope = Arc::clone(&self.scope);
        scope.is_frontend_request(self)
            || (self.config.encode_placeholders_in_backend && scope.is_backend_request(self))
    }

    // Scope

    pub fn is_frontend_request(&self) -> bool {
        self.scope.is_frontend_request(self)
    }

    pub fn is_backend_request(&self) -> bool {
        self.scope.is_backend_request(self)
    }

    /// Clean a parameter key: entities decoded, control characters and tags
    /// stripped, then strictly XSS-filtered.
    pub fn clean_key(&self, key: &str) -> String {
        let decoded = EntityCodec::decode_entities(key);
        let printable = CONTROL_CHARS.replace_all(&decoded, "");
        let stripped = Builder::empty().clean(&printable).to_string();
        let decoded = EntityCodec::decode_entities(&stripped);

        self.sanitizer.xss_clean(decoded, true).to_text().into_owned()
    }

    // Raw access

    pub fn query(&self) -> &QueryParameterBag {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryParameterBag {
        &mut self.query
    }

    pub fn body(&self) -> &ParameterBag {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut ParameterBag {
        &mut self.body
    }

    pub fn attributes(&self) -> &ParameterBag {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut ParameterBag {
        &mut self.attributes
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn sanitizer(&self) -> &XssSanitizer {
        &self.sanitizer
    }
}

impl fmt::Debug for SanitizedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizedRequest")
            .field("query", &self.query)
            .field("body", &self.body)
            .field("attributes", &self.attributes)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::FixedScope;

    fn request(scope: FixedScope) -> SanitizedRequest {
        SanitizedRequest::new(ParameterBag::new(), ParameterBag::new(), scope)
    }

    #[test]
    fn test_set_get() {
        let mut request = request(FixedScope::Frontend);

        request.set_get("test", Value::Null);
        assert!(!request.has_get("test"));

        request.set_get("test", "test");
        assert!(request.has_get("test"));
        assert_eq!(request.get_get("test"), Value::from("test"));
    }

    #[test]
    fn test_set_get_normalizes_key() {
        let mut request = request(FixedScope::Frontend);
        request.set_get("a b.c[d", "x");

        assert!(request.has_get("a_b_c_d"));
    }

    #[test]
    fn test_set_get_null_removes() {
        let mut request = request(FixedScope::Frontend);
        request.set_get("test", "x");
        request.set_get("test", Value::Null);

        assert!(!request.has_get("test"));
    }

    #[test]
    fn test_set_post() {
        let mut request = request(FixedScope::Frontend);

        request.set_post("test", Value::Null);
        assert!(!request.has_post("test"));

        request.set_post("test", "test");
        assert!(request.has_post("test"));
        assert_eq!(request.get_post("test"), Value::from("test"));
    }

    #[test]
    fn test_missing_keys_are_null() {
        let mut request = request(FixedScope::Frontend);

        assert_eq!(request.get_get("missing"), Value::Null);
        assert_eq!(request.get_post("missing"), Value::Null);
        assert_eq!(request.get_post_html("missing"), Value::Null);
        assert_eq!(request.get_post_raw("missing"), Value::Null);
    }

    #[test]
    fn test_get_post_stringifies_nested_leaves() {
        let mut request = request(FixedScope::Frontend);
        let mut nested = Params::new();
        nested.insert("id".to_string(), Value::from(12));
        request.body_mut().set("test", nested);

        let mut cleaned = Params::new();
        cleaned.insert("id".to_string(), Value::from("12"));
        let expected = Value::Array(cleaned);

        assert_eq!(request.get_post("test"), expected);
        assert_eq!(request.get_post_html("test"), expected);
        assert_eq!(request.get_post_raw("test"), expected);
    }

    #[test]
    fn test_construction_drops_nulls() {
        let query: ParameterBag = [("a", Value::Null), ("b", Value::from("1"))]
            .into_iter()
            .collect();
        let body: ParameterBag = [("name", Value::Null)].into_iter().collect();

        let mut request = SanitizedRequest::new(query, body, FixedScope::Unknown);

        assert!(!request.has_get("a"));
        assert!(request.has_get("b"));
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_clean_key() {
        let request = request(FixedScope::Frontend);

        assert_eq!(request.clean_key("name"), "name");
        assert_eq!(request.clean_key("na\u{0}me\u{7}"), "name");
        assert_eq!(request.clean_key("<b>title</b>"), "title");
        assert_eq!(request.clean_key("a&amp;b"), "a&b");
    }

    #[test]
    fn test_set_post_cleans_key() {
        let mut request = request(FixedScope::Frontend);
        request.set_post("<i>field</i>", "value");

        assert!(request.has_post("field"));
    }

    #[test]
    fn test_placeholders_follow_scope() {
        for (scope, expected) in [
            (FixedScope::Frontend, "&#123;&#123;date&#125;&#125;"),
            (FixedScope::Backend, "{{date}}"),
            (FixedScope::Unknown, "{{date}}"),
        ] {
            let mut request = request(scope);
            request.set_get("test", "{{date}}");
            request.set_post("test", "{{date}}");

            assert_eq!(
                request.get_get("test"),
                Value::from("&#123;&#123;date&#125;&#125;")
            );
            assert_eq!(request.get_post("test"), Value::from(expected));
        }
    }

    #[test]
    fn test_backend_placeholder_encoding_can_be_enabled() {
        let mut request = request(FixedScope::Backend)
            .with_config(InputConfig::default().with_encode_placeholders_in_backend(true));
        request.set_post("test", "{{date}}");

        assert_eq!(
            request.get_post("test"),
            Value::from("&#123;&#123;date&#125;&#125;")
        );
    }

    #[test]
    fn test_get_get_ignores_placeholder_option() {
        let mut request = request(FixedScope::Backend);
        request.set_get("test", "{{date}}");

        let options = CleanOptions::query().with_encode_placeholders(false);
        assert_eq!(
            request.get_get_with("test", &options),
            Value::from("&#123;&#123;date&#125;&#125;")
        );
    }

    #[test]
    fn test_get_all_get() {
        let mut request = request(FixedScope::Frontend);
        request.query_mut().replace(
            [("id".to_string(), Value::from(22))]
                .into_iter()
                .collect(),
        );

        let all = request.get_all_get();
        assert_eq!(all.len(), 1);
        assert_eq!(all["id"], Value::from("22"));
    }

    #[test]
    fn test_scope_accessors() {
        assert!(request(FixedScope::Frontend).is_frontend_request());
        assert!(request(FixedScope::Backend).is_backend_request());
        assert!(!request(FixedScope::Unknown).is_frontend_request());
    }
}
