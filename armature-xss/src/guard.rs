use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Canonical hyphenated UUID, any version, either case.
static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

/// Classifies values that must bypass cleaning entirely.
pub struct UuidGuard;

impl UuidGuard {
    /// Check for the canonical textual UUID form.
    pub fn is_uuid(text: &str) -> bool {
        UUID_PATTERN.is_match(text)
    }

    /// Check for a 16-byte binary UUID.
    pub fn is_binary_uuid(bytes: &[u8]) -> bool {
        Uuid::from_slice(bytes).is_ok()
    }

    /// Whether a leaf is a binary identifier that no stage may touch.
    ///
    /// Only raw bytes count as binary. A 16-character string is never
    /// treated as a binary UUID, otherwise any short text would bypass
    /// cleaning.
    pub fn is_identifier(value: &Value) -> bool {
        match value {
            Value::String(s) => Self::is_uuid(s),
            Value::Bytes(b) => {
                Self::is_binary_uuid(b) || std::str::from_utf8(b).is_ok_and(Self::is_uuid)
            }
            _ => false,
        }
    }
}
