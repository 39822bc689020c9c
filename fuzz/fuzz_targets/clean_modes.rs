//! Fuzz target for the three cleaning modes.
//!
//! Checks that every mode keeps the value's shape and that `clean` never
//! lets a raw angle bracket through.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use armature_xss::{CleanOptions, Value, XssSanitizer};

/// Arbitrary cleaning input.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    text: String,
    allowed_tags: String,
    decode_entities: bool,
    tidy: bool,
    strict_mode: bool,
    encode_placeholders: bool,
}

fuzz_target!(|input: FuzzInput| {
    let sanitizer = XssSanitizer::new();
    let options = CleanOptions::new()
        .with_decode_entities(input.decode_entities)
        .with_tidy(input.tidy)
        .with_strict_mode(input.strict_mode)
        .with_encode_placeholders(input.encode_placeholders)
        .with_allowed_tags(input.allowed_tags.as_str());

    let _ = sanitizer.clean(input.text.as_str(), &options);
    let _ = sanitizer.clean_html(input.text.as_str(), &options);
    let _ = sanitizer.clean_raw(input.text.as_str(), &options);

    // Nested values keep their keys
    let nested = Value::list([input.text.as_str(), "x"]);
    let cleaned = sanitizer.clean(nested, &options);
    assert_eq!(cleaned.as_array().map(|items| items.len()), Some(2));

    // Default `clean` encodes every bracket
    let cleaned = sanitizer.clean(input.text.as_str(), &CleanOptions::post());
    let cleaned = cleaned.to_text();
    assert!(!cleaned.contains('<') && !cleaned.contains('>'));
});
