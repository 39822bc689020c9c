use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Low-level pattern filter for known injection shapes.
pub struct XssFilter;

// Entities with control characters before the semicolon
static SPACED_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(&#*\w+)[\x00-\x20]+;").unwrap()
});

static HEX_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)&#x([0-9a-f]+);").unwrap()
});

static DECIMAL_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#([0-9]+);").unwrap()
});

// Keywords split up with whitespace, e.g. "j a v a s c r i p t"
static SPACED_KEYWORDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        "javascript",
        "vbscript",
        "vbscrpt",
        "script",
        "applet",
        "alert",
        "document",
        "write",
        "cookie",
        "window",
    ]
    .iter()
    .map(|keyword| {
        let letters: Vec<String> = keyword.chars().map(String::from).collect();
        Regex::new(&format!(r"(?is)\b{}\b", letters.join(r"\s*"))).unwrap()
    })
    .collect()
});

static ALWAYS_REMOVED: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)<(a|img)[^>]*[^a-z](<script|<xss)[^>]*>",
        r"(?is)<(a|img)[^>]*[^a-z]document\.cookie[^>]*>",
        r"(?is)<(a|img)[^>]*[^a-z]vbscri?pt\s*:[^>]*>",
        r"(?is)<(a|img)[^>]*[^a-z]expression\s*\([^>]*>",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static STRICT_REMOVED: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)vbscri?pt\s*:",
        r"(?is)javascript\s*:",
        r"(?is)<\s*embed.*swf",
        r"(?is)<(a|img)[^>]*[^a-z]alert\s*\([^>]*>",
        r"(?is)<(a|img)[^>]*[^a-z]javascript\s*:[^>]*>",
        r"(?is)<(a|img)[^>]*[^a-z]window\.[^>]*>",
        r"(?is)<(a|img)[^>]*[^a-z]document\.[^>]*>",
        // Inline event handlers such as onclick= or onload=
        r"(?is)<[^>]*[^a-z]on[a-z]+\s*=[^>]*>",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

impl XssFilter {
    /// Filter a value.
    ///
    /// Character references are resolved first so encoded payloads cannot
    /// slip past the patterns. Tags carrying script payloads are removed in
    /// every mode; strict mode also removes script URL schemes and any tag
    /// with an inline event handler.
    pub fn clean(text: &str, strict: bool) -> String {
        let mut value = SPACED_ENTITY.replace_all(text, "${1};").into_owned();
        value = value.replace('\r', "");

        value = HEX_REFERENCE
            .replace_all(&value, |caps: &Captures| {
                decode_reference(&caps[0], &caps[1], 16)
            })
            .into_owned();
        value = DECIMAL_REFERENCE
            .replace_all(&value, |caps: &Captures| {
                decode_reference(&caps[0], &caps[1], 10)
            })
            .into_owned();

        value = strip_null_bytes(value);

        for keyword in SPACED_KEYWORDS.iter() {
            value = keyword
                .replace_all(&value, |caps: &Captures| {
                    caps[0].chars().filter(|c| !c.is_whitespace()).collect::<String>()
                })
                .into_owned();
        }

        let strict_patterns: &[Regex] = if strict { &STRICT_REMOVED } else { &[] };
        for pattern in ALWAYS_REMOVED.iter().chain(strict_patterns) {
            value = pattern.replace_all(&value, "").into_owned();
        }

        strip_null_bytes(value)
    }

    /// Whether the strict filter would change the value.
    pub fn is_suspicious(text: &str) -> bool {
        Self::clean(text, true) != text
    }
}

fn decode_reference(whole: &str, digits: &str, radix: u32) -> String {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .map_or_else(|| whole.to_string(), String::from)
}

fn strip_null_bytes(value: String) -> String {
    let mut value = value.replace('\0', "");
    while value.contains("\\0") {
        value = value.replace("\\0", "");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(XssFilter::clean("Hello World", true), "Hello World");
        assert_eq!(XssFilter::clean("<p>Hello</p>", true), "<p>Hello</p>");
    }

    #[test]
    fn test_script_tag_kept_outside_strict_mode() {
        let value = "<script>alert('xss')</script>";
        assert_eq!(XssFilter::clean(value, false), value);
        assert_eq!(XssFilter::clean(value, true), value);
    }

    #[test]
    fn test_numeric_references_decoded() {
        assert_eq!(XssFilter::clean("&#60;b&#x3e;", false), "<b>");
        assert_eq!(XssFilter::clean("&#x110000;", false), "&#x110000;");
    }

    #[test]
    fn test_spaced_entity_normalized() {
        assert_eq!(XssFilter::clean("&#60 ;b", false), "<b");
    }

    #[test]
    fn test_null_bytes_removed() {
        assert_eq!(XssFilter::clean("a\0b\\0c\\\\00d", false), "abcd");
    }

    #[test]
    fn test_spaced_keyword_compacted() {
        assert_eq!(
            XssFilter::clean("j a v a s c r i p t:alert(1)", false),
            "javascript:alert(1)"
        );
        assert_eq!(XssFilter::clean("j a v a s c r i p t:alert(1)", true), "alert(1)");
    }

    #[test]
    fn test_cookie_theft_removed_in_all_modes() {
        let value = "<img src=x title=document.cookie>after";
        assert_eq!(XssFilter::clean(value, false), "after");
    }

    #[test]
    fn test_javascript_scheme_removed_in_strict_mode() {
        let value = r#"<iframe src="javascript:alert('XSS');"></iframe>"#;

        assert_eq!(XssFilter::clean(value, false), value);
        assert_eq!(
            XssFilter::clean(value, true),
            r#"<iframe src="alert('XSS');"></iframe>"#
        );
    }

    #[test]
    fn test_event_handler_tags_removed_in_strict_mode() {
        assert_eq!(XssFilter::clean("<BODY ONLOAD=alert('XSS')>", true), "");
        assert_eq!(
            XssFilter::clean("<BODY ONLOAD=alert('XSS')>", false),
            "<BODY ONLOAD=alert('XSS')>"
        );
        assert_eq!(
            XssFilter::clean(r#"<b>x</b><span onmouseover="go()">y</span>"#, true),
            "<b>x</b>y</span>"
        );
    }

    #[test]
    fn test_image_with_alert_removed_in_strict_mode() {
        assert_eq!(XssFilter::clean("<IMG SRC=javascript:alert('XSS')>", true), "");
        assert_eq!(
            XssFilter::clean("<IMG SRC=javascript:alert('XSS')>", false),
            "<IMG SRC=javascript:alert('XSS')>"
        );
    }

    #[test]
    fn test_is_suspicious() {
        assert!(XssFilter::is_suspicious("<a href=\"javascript:x()\">"));
        assert!(!XssFilter::is_suspicious("<a href=\"/home\">Home</a>"));
    }
}
