//! Fuzz target for the tag tidy filter.
//!
//! Exercises the tag scanner, the fragment engine and entity restoration
//! with arbitrary markup and allow-lists.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use armature_xss::tidy::encode_tag_openers;
use armature_xss::{AllowedTags, XssFilter, XssSanitizer};

/// Arbitrary markup for fuzzing.
#[derive(Debug, Arbitrary)]
struct FuzzMarkup {
    markup: String,
    allowed_tags: String,
    decode_entities: bool,
}

fuzz_target!(|data: FuzzMarkup| {
    let sanitizer = XssSanitizer::new();
    let allowed = AllowedTags::parse(&data.allowed_tags);

    let _ = sanitizer.tidy(&data.markup, &allowed, data.decode_entities);

    // Scanner output only ever grows
    let encoded = encode_tag_openers(&data.markup);
    assert!(encoded.len() >= data.markup.len());

    let _ = XssFilter::clean(&data.markup, true);
    let _ = XssFilter::clean(&data.markup, false);
});
