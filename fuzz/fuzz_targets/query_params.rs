//! Fuzz target for query parameter parsing.
//!
//! Tests bracket nesting, form bodies and the cleaning getters on top of
//! them.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use armature_request::{FixedScope, ParameterBag, SanitizedRequest};

/// Arbitrary query string for fuzzing.
#[derive(Debug, Arbitrary)]
struct FuzzQuery {
    /// Raw query string
    raw: String,
    /// Raw form body
    body: Vec<u8>,
    /// Key to set through the request wrapper
    key: String,
}

fuzz_target!(|data: FuzzQuery| {
    let Ok(query) = ParameterBag::from_query_string(&data.raw) else {
        return;
    };
    let body = ParameterBag::from_form_body(&data.body).unwrap_or_default();

    let mut request = SanitizedRequest::new(query, body, FixedScope::Frontend);

    let all_get = request.get_all_get();
    let all_post = request.get_all_post();
    assert_eq!(all_get.len(), request.query_mut().count());
    assert_eq!(all_post.len(), request.body().count());

    // Key cleaning never panics and a set key is readable under its cleaned name
    let cleaned = request.clean_key(&data.key);
    request.set_post(&data.key, "value");
    if !cleaned.is_empty() {
        assert!(request.has_post(&cleaned));
    }
});
