use crate::config::CleanOptions;
use crate::encoder::EntityCodec;
use crate::engine::{FragmentEngine, Html5everEngine};
use crate::filter::XssFilter;
use crate::guard::UuidGuard;
use crate::placeholder::PlaceholderEscaper;
use crate::tidy::{self, AllowedTags};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

// Numeric character references missing their semicolon
static NUMERIC_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(&#[a-z0-9]+);?").unwrap()
});

// `">` / `'>` runs in front of a tag; applied only where no word character precedes
static BREAKOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:["|']>)+(<[^/^>]+>.*)"#).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Clean,
    Html,
    Raw,
}

/// Request-input cleaner.
///
/// Every scalar leaf runs through the same ordered stages: XSS pre-filter,
/// tag tidy (optional), entity normalization, placeholder escaping. Null
/// and binary identifiers are returned untouched and arrays keep their keys.
#[derive(Debug, Clone, Default)]
pub struct XssSanitizer<E = Html5everEngine> {
    engine: E,
}

impl XssSanitizer {
    /// Create a sanitizer backed by html5ever.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: FragmentEngine> XssSanitizer<E> {
    /// Create a sanitizer with a custom fragment engine.
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Clean a value for output in HTML.
    ///
    /// With `tidy` the value goes through the tag filter without an
    /// allow-list, so every tag ends up entity-encoded. Without it, entities
    /// are decoded and special characters encoded unless `decode_entities`
    /// is set.
    pub fn clean(&self, value: impl Into<Value>, options: &CleanOptions) -> Value {
        self.walk(value.into(), Mode::Clean, options)
    }

    /// Clean a value, keeping the allow-listed tags as markup.
    pub fn clean_html(&self, value: impl Into<Value>, options: &CleanOptions) -> Value {
        self.walk(value.into(), Mode::Html, options)
    }

    /// Filter a value but leave it unencoded.
    ///
    /// For output contexts that encode on their own. Basic entities are
    /// kept as placeholders (`[&]`, `[lt]`, ...).
    pub fn clean_raw(&self, value: impl Into<Value>, options: &CleanOptions) -> Value {
        self.walk(value.into(), Mode::Raw, options)
    }

    /// Apply only the XSS pre-filter.
    pub fn xss_clean(&self, value: impl Into<Value>, strict: bool) -> Value {
        map_leaves(value.into(), &mut |text| xss_clean_text(text, strict))
    }

    /// Run the tag tidy filter on a single string.
    pub fn tidy(&self, value: &str, allowed: &AllowedTags, decode_entities: bool) -> String {
        tidy::tidy(&self.engine, value, allowed, decode_entities)
    }

    /// Restore basic-entity placeholders; see [`EntityCodec::restore_basic_entities`].
    pub fn restore_basic_entities(&self, value: &str, decode_entities: bool) -> String {
        EntityCodec::restore_basic_entities(value, decode_entities)
    }

    fn walk(&self, value: Value, mode: Mode, options: &CleanOptions) -> Value {
        map_leaves(value, &mut |text| self.clean_text(text, mode, options))
    }

    fn clean_text(&self, text: &str, mode: Mode, options: &CleanOptions) -> String {
        let value = xss_clean_text(text, options.strict_mode);
        let no_filter = AllowedTags::default();

        let value = match mode {
            Mode::Raw => {
                let value = if options.tidy {
                    self.tidy(&value, &no_filter, false)
                } else {
                    value
                };
                EntityCodec::preserve_basic_entities(&value)
            }
            Mode::Clean | Mode::Html => {
                let value = match (options.tidy, mode) {
                    (true, Mode::Html) => {
                        self.tidy(&value, &options.allowed_tags, options.decode_entities)
                    }
                    (true, _) => self.tidy(&value, &no_filter, false),
                    (false, _) => EntityCodec::decode_input_entities(&value),
                };

                if !options.decode_entities && !options.tidy {
                    EntityCodec::encode_special_chars(&value)
                } else {
                    value
                }
            }
        };

        if options.encode_placeholders {
            PlaceholderEscaper::encode(&value)
        } else {
            value
        }
    }
}

/// Apply `clean` to every scalar leaf, keeping null, identifiers and keys.
fn map_leaves(value: Value, clean: &mut dyn FnMut(&str) -> String) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Array(params) => Value::Array(
            params
                .into_iter()
                .map(|(key, item)| (key, map_leaves(item, clean)))
                .collect(),
        ),
        leaf if UuidGuard::is_identifier(&leaf) => {
            tracing::trace!("Identifier bypasses cleaning");
            leaf
        }
        leaf => Value::String(clean(&leaf.to_text())),
    }
}

fn xss_clean_text(text: &str, strict: bool) -> String {
    // "0" must not go through the decoder
    let decoded = if text == "0" {
        text.to_string()
    } else {
        EntityCodec::decode_entities(text)
    };

    let terminated = NUMERIC_REFERENCE.replace_all(&decoded, "${1};");
    let defused = defuse_breakout(&terminated);

    XssFilter::clean(&defused, strict)
}

/// Strip the `">` prefix of an attribute breakout such as `"><script>`.
fn defuse_breakout(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut defused = String::with_capacity(value.len());
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        let candidate = matches!(bytes[pos], b'"' | b'\'' | b'|')
            && (pos == 0 || !is_word_byte(bytes[pos - 1]));

        if candidate {
            if let Some(tail) = BREAKOUT.captures(&value[pos..]).and_then(|caps| caps.get(1)) {
                defused.push_str(&value[copied..pos]);
                defused.push_str(tail.as_str());
                pos += tail.end();
                copied = pos;
                continue;
            }
        }

        pos += 1;
    }

    defused.push_str(&value[copied..]);
    defused
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
